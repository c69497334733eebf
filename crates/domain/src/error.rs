//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`EventBotError`] via `#[from]`. Validation, authorization, not-found and
//! conflict errors are expected outcomes of a conversation turn; storage
//! errors are not and abort the turn.

/// Top-level error shared by every crate of the workspace.
#[derive(Debug, thiserror::Error)]
pub enum EventBotError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("authorization error: {0}")]
    Authorization(#[from] AuthorizationError),

    #[error("not found: {0}")]
    NotFound(#[from] NotFoundError),

    #[error("conflict: {0}")]
    Conflict(#[from] ConflictError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl EventBotError {
    /// Whether this error is an expected business outcome, as opposed to an
    /// infrastructure failure.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

/// Which person-name field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameField {
    FirstName,
    LastName,
}

impl std::fmt::Display for NameField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstName => f.write_str("first name"),
            Self::LastName => f.write_str("last name"),
        }
    }
}

/// Malformed or out-of-range input, or a violated business rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("user id must not be empty")]
    MissingUserId,

    #[error("{0} must not be empty")]
    EmptyPersonName(NameField),

    #[error("{0} must contain only letters and spaces")]
    InvalidPersonName(NameField),

    #[error("{field} is too long (maximum {max} characters)")]
    PersonNameTooLong { field: NameField, max: usize },

    #[error("birth year must be a number")]
    BirthYearNotANumber,

    #[error("birth year must be between {min} and {max}")]
    BirthYearOutOfRange { year: i32, min: i32, max: i32 },

    #[error("event name must not be empty")]
    EmptyEventName,

    #[error("could not parse date {0:?}")]
    InvalidDate(String),

    #[error("event date must be in the future")]
    DateNotInFuture,

    #[error("event has already taken place")]
    EventNotUpcoming,

    #[error("not registered for this event")]
    NotRegistered,

    #[error("unknown action {0:?}")]
    UnknownAction(String),

    #[error("action {0:?} is not available here")]
    ActionNotAllowed(String),

    #[error("unknown conversation step {0:?}")]
    UnknownStep(String),

    #[error("conversation context is missing {0:?}")]
    MissingContext(&'static str),
}

/// A non-admin attempted a privileged action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("admin privileges required to {action}")]
pub struct AuthorizationError {
    pub action: &'static str,
}

/// A referenced record does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A write collided with existing state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("user {user_id} is already registered for event {event_id}")]
    AlreadyRegistered { user_id: String, event_id: String },
}
