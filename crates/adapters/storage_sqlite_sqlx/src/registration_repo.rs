//! `SQLite` implementation of [`RegistrationRepository`].
//!
//! The `(user_id, event_id)` primary key is the authority on uniqueness: a
//! duplicate insert fails inside the database and is reported as a
//! [`ConflictError`], however many callers race.

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use eventbot_app::ports::RegistrationRepository;
use eventbot_domain::error::{ConflictError, EventBotError, NotFoundError};
use eventbot_domain::id::{EventId, UserId};
use eventbot_domain::registration::Registration;

use crate::error::StorageError;
use crate::timestamp;

struct Wrapper(Registration);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let user_id: String = row.try_get("user_id")?;
        let event_id: String = row.try_get("event_id")?;
        let created_at: String = row.try_get("created_at")?;

        let event_id =
            EventId::from_str(&event_id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Registration {
            user_id: UserId::new(user_id),
            event_id,
            created_at: timestamp::decode(&created_at)?,
        }))
    }
}

const INSERT: &str = "INSERT INTO registrations (user_id, event_id, created_at) VALUES (?, ?, ?)";
const DELETE: &str = "DELETE FROM registrations WHERE user_id = ? AND event_id = ?";
const EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM registrations WHERE user_id = ? AND event_id = ?)";
const SELECT_BY_USER: &str =
    "SELECT * FROM registrations WHERE user_id = ? ORDER BY created_at, event_id";
const SELECT_BY_EVENT: &str =
    "SELECT * FROM registrations WHERE event_id = ? ORDER BY created_at, user_id";

/// `SQLite`-backed registration repository.
pub struct SqliteRegistrationRepository {
    pool: SqlitePool,
}

impl SqliteRegistrationRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RegistrationRepository for SqliteRegistrationRepository {
    fn create(
        &self,
        registration: Registration,
    ) -> impl Future<Output = Result<Registration, EventBotError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(INSERT)
                .bind(registration.user_id.as_str())
                .bind(registration.event_id.to_string())
                .bind(timestamp::encode(registration.created_at))
                .execute(&pool)
                .await;

            match result {
                Ok(_) => Ok(registration),
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    Err(ConflictError::AlreadyRegistered {
                        user_id: registration.user_id.to_string(),
                        event_id: registration.event_id.to_string(),
                    }
                    .into())
                }
                Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                    Err(NotFoundError {
                        entity: "event",
                        id: registration.event_id.to_string(),
                    }
                    .into())
                }
                Err(err) => Err(StorageError::from(err).into()),
            }
        }
    }

    fn delete(
        &self,
        user_id: &UserId,
        event_id: EventId,
    ) -> impl Future<Output = Result<bool, EventBotError>> + Send {
        let pool = self.pool.clone();
        let user_id = user_id.as_str().to_string();
        async move {
            let result = sqlx::query(DELETE)
                .bind(user_id)
                .bind(event_id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected() > 0)
        }
    }

    fn exists(
        &self,
        user_id: &UserId,
        event_id: EventId,
    ) -> impl Future<Output = Result<bool, EventBotError>> + Send {
        let pool = self.pool.clone();
        let user_id = user_id.as_str().to_string();
        async move {
            let found: bool = sqlx::query_scalar(EXISTS)
                .bind(user_id)
                .bind(event_id.to_string())
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(found)
        }
    }

    fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Vec<Registration>, EventBotError>> + Send {
        let pool = self.pool.clone();
        let user_id = user_id.as_str().to_string();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_USER)
                .bind(user_id)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn list_for_event(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Vec<Registration>, EventBotError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_EVENT)
                .bind(event_id.to_string())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }
}
