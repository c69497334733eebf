//! `SQLite` implementation of [`UserRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use eventbot_app::ports::UserRepository;
use eventbot_domain::error::EventBotError;
use eventbot_domain::id::UserId;
use eventbot_domain::user::User;

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`User`].
struct Wrapper(User);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<User> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(User {
            id: UserId::new(row.try_get::<String, _>("user_id")?),
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            birth_year: row.try_get("birth_year")?,
            is_admin: row.try_get("is_admin")?,
        }))
    }
}

const UPSERT: &str = r"
    INSERT INTO users (user_id, first_name, last_name, birth_year, is_admin)
    VALUES (?, ?, ?, ?, ?)
    ON CONFLICT (user_id) DO UPDATE SET
        first_name = excluded.first_name,
        last_name = excluded.last_name,
        birth_year = excluded.birth_year,
        is_admin = excluded.is_admin
";
const SELECT_BY_ID: &str = "SELECT * FROM users WHERE user_id = ?";

/// `SQLite`-backed user repository.
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl UserRepository for SqliteUserRepository {
    fn get(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Option<User>, EventBotError>> + Send {
        let pool = self.pool.clone();
        let user_id = user_id.as_str().to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(user_id)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn put(&self, user: User) -> impl Future<Output = Result<User, EventBotError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPSERT)
                .bind(user.id.as_str())
                .bind(&user.first_name)
                .bind(&user.last_name)
                .bind(user.birth_year)
                .bind(user.is_admin)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(user)
        }
    }
}
