//! `SQLite` implementation of [`ConversationStateRepository`].
//!
//! A step is stored as its name plus a JSON object holding the partial-flow
//! data, `NULL` when there is none. Rows naming an unknown step, or missing
//! data the step requires, fail to decode.

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use eventbot_app::ports::ConversationStateRepository;
use eventbot_domain::conversation::{
    ConversationState, Step, StepKind, decode_context, encode_context,
};
use eventbot_domain::error::EventBotError;
use eventbot_domain::id::UserId;

use crate::error::StorageError;
use crate::timestamp;

struct Wrapper(ConversationState);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<ConversationState> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let user_id: String = row.try_get("user_id")?;
        let step: String = row.try_get("step")?;
        let context: Option<String> = row.try_get("context")?;
        let updated_at: String = row.try_get("updated_at")?;

        let kind: StepKind = step
            .parse()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let context = decode_context(context.as_deref())
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let step =
            Step::from_parts(kind, &context).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(ConversationState {
            user_id: UserId::new(user_id),
            step,
            updated_at: timestamp::decode(&updated_at)?,
        }))
    }
}

const UPSERT: &str = r"
    INSERT INTO conversation_states (user_id, step, context, updated_at)
    VALUES (?, ?, ?, ?)
    ON CONFLICT (user_id) DO UPDATE SET
        step = excluded.step,
        context = excluded.context,
        updated_at = excluded.updated_at
";
const SELECT_BY_USER: &str = "SELECT * FROM conversation_states WHERE user_id = ?";

/// `SQLite`-backed conversation state repository.
pub struct SqliteConversationStateRepository {
    pool: SqlitePool,
}

impl SqliteConversationStateRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ConversationStateRepository for SqliteConversationStateRepository {
    fn get(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Option<ConversationState>, EventBotError>> + Send {
        let pool = self.pool.clone();
        let user_id = user_id.as_str().to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_USER)
                .bind(user_id)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn put(
        &self,
        state: ConversationState,
    ) -> impl Future<Output = Result<(), EventBotError>> + Send {
        let pool = self.pool.clone();
        async move {
            let context = encode_context(&state.step.context()).map_err(StorageError::from)?;

            sqlx::query(UPSERT)
                .bind(state.user_id.as_str())
                .bind(state.step.kind().as_str())
                .bind(context)
                .bind(timestamp::encode(state.updated_at))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
