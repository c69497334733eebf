//! `SQLite` implementation of [`EventRepository`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use eventbot_app::ports::EventRepository;
use eventbot_domain::error::EventBotError;
use eventbot_domain::event::Event;
use eventbot_domain::id::{EventId, UserId};
use eventbot_domain::time::Timestamp;

use crate::error::StorageError;
use crate::timestamp;

/// Wrapper for converting database rows into domain [`Event`].
struct Wrapper(Event);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Event> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let starts_at: String = row.try_get("starts_at")?;
        let created_by: String = row.try_get("created_by")?;
        let created_at: String = row.try_get("created_at")?;

        let id = EventId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Event {
            id,
            name,
            starts_at: timestamp::decode(&starts_at)?,
            created_by: UserId::new(created_by),
            created_at: timestamp::decode(&created_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO events (id, name, starts_at, created_by, created_at)
    VALUES (?, ?, ?, ?, ?)
";
const SELECT_BY_ID: &str = "SELECT * FROM events WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM events ORDER BY starts_at, id";
const SELECT_UPCOMING: &str = "SELECT * FROM events WHERE starts_at > ? ORDER BY starts_at, id";
const DELETE_BY_ID: &str = "DELETE FROM events WHERE id = ?";

/// `SQLite`-backed event repository.
pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl EventRepository for SqliteEventRepository {
    fn create(&self, event: Event) -> impl Future<Output = Result<Event, EventBotError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(event.id.to_string())
                .bind(&event.name)
                .bind(timestamp::encode(event.starts_at))
                .bind(event.created_by.as_str())
                .bind(timestamp::encode(event.created_at))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(event)
        }
    }

    fn get_by_id(
        &self,
        id: EventId,
    ) -> impl Future<Output = Result<Option<Event>, EventBotError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn list_all(&self) -> impl Future<Output = Result<Vec<Event>, EventBotError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn list_upcoming(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = Result<Vec<Event>, EventBotError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_UPCOMING)
                .bind(timestamp::encode(now))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn delete(&self, id: EventId) -> impl Future<Output = Result<bool, EventBotError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(DELETE_BY_ID)
                .bind(id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected() > 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use chrono::Duration;
    use eventbot_domain::time;

    async fn setup() -> SqliteEventRepository {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteEventRepository::new(db.pool().clone())
    }

    fn event_at(name: &str, starts_at: Timestamp) -> Event {
        Event::builder()
            .name(name)
            .starts_at(starts_at)
            .created_by(UserId::new("1"))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_and_retrieve_event() {
        let repo = setup().await;
        let event = event_at("Meetup", time::now() + Duration::days(1));
        let id = event.id;
        repo.create(event).await.unwrap();

        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Meetup");
        assert_eq!(fetched.created_by, UserId::new("1"));
    }

    #[tokio::test]
    async fn should_return_none_when_event_not_found() {
        let repo = setup().await;
        assert!(repo.get_by_id(EventId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_list_only_strictly_future_events_in_order() {
        let repo = setup().await;
        let now = time::now();
        let later = event_at("Later", now + Duration::days(3));
        let sooner = event_at("Sooner", now + Duration::hours(1));
        let boundary = event_at("Now", now);
        let past = event_at("Past", now - Duration::days(1));
        for event in [&later, &sooner, &boundary, &past] {
            repo.create(event.clone()).await.unwrap();
        }

        let names: Vec<String> = repo
            .list_upcoming(now)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["Sooner", "Later"]);

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].name, "Past");
    }

    #[tokio::test]
    async fn should_report_whether_delete_removed_a_row() {
        let repo = setup().await;
        let event = event_at("Meetup", time::now() + Duration::days(1));
        let id = event.id;
        repo.create(event).await.unwrap();

        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
    }
}
