//! # eventbot-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `eventbot-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//! - Turn composite-key violations into domain conflicts
//!
//! ## Dependency rule
//! Depends on `eventbot-app` (for port traits) and `eventbot-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod conversation_state_repo;
pub mod error;
pub mod event_repo;
pub mod pool;
pub mod registration_repo;
pub mod user_repo;

mod timestamp;

pub use conversation_state_repo::SqliteConversationStateRepository;
pub use event_repo::SqliteEventRepository;
pub use pool::{Config, Database};
pub use registration_repo::SqliteRegistrationRepository;
pub use user_repo::SqliteUserRepository;
