//! Registration — a user's sign-up for an event.

use serde::{Deserialize, Serialize};

use crate::id::{EventId, UserId};
use crate::time::Timestamp;

/// Identified by the `(user_id, event_id)` pair; at most one exists per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub user_id: UserId,
    pub event_id: EventId,
    pub created_at: Timestamp,
}

impl Registration {
    #[must_use]
    pub fn new(user_id: UserId, event_id: EventId, created_at: Timestamp) -> Self {
        Self {
            user_id,
            event_id,
            created_at,
        }
    }
}
