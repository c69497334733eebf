//! Event — a dated gathering users can register for.

use serde::{Deserialize, Serialize};

use crate::error::{EventBotError, ValidationError};
use crate::id::{EventId, UserId};
use crate::time::Timestamp;

/// A scheduled event created by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub starts_at: Timestamp,
    pub created_by: UserId,
    pub created_at: Timestamp,
}

impl Event {
    /// Create a builder for constructing an [`Event`].
    #[must_use]
    pub fn builder() -> EventBuilder {
        EventBuilder::default()
    }

    /// Whether the event starts strictly after `now`.
    ///
    /// Derived at read time, so the same stored event changes classification
    /// as time passes.
    #[must_use]
    pub fn is_upcoming(&self, now: Timestamp) -> bool {
        self.starts_at > now
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`EventBotError::Validation`] when `name` is blank.
    pub fn validate(&self) -> Result<(), EventBotError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyEventName.into());
        }
        Ok(())
    }
}

/// Order events by start date, earliest first, ties broken by id so the
/// order is total.
pub fn sort_by_start(events: &mut [Event]) {
    events.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then(a.id.cmp(&b.id)));
}

/// Step-by-step builder for [`Event`].
#[derive(Debug, Default)]
pub struct EventBuilder {
    id: Option<EventId>,
    name: Option<String>,
    starts_at: Option<Timestamp>,
    created_by: Option<UserId>,
    created_at: Option<Timestamp>,
}

impl EventBuilder {
    #[must_use]
    pub fn id(mut self, id: EventId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn starts_at(mut self, ts: Timestamp) -> Self {
        self.starts_at = Some(ts);
        self
    }

    #[must_use]
    pub fn created_by(mut self, user_id: UserId) -> Self {
        self.created_by = Some(user_id);
        self
    }

    #[must_use]
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    /// Consume the builder, validate, and return an [`Event`].
    ///
    /// Missing timestamps default to the current time and a missing id is
    /// generated.
    ///
    /// # Errors
    ///
    /// Returns [`EventBotError::Validation`] if `name` is missing or blank.
    pub fn build(self) -> Result<Event, EventBotError> {
        let now = crate::time::now();
        let event = Event {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default().trim().to_string(),
            starts_at: self.starts_at.unwrap_or(now),
            created_by: self.created_by.unwrap_or_else(|| UserId::new("")),
            created_at: self.created_at.unwrap_or(now),
        };
        event.validate()?;
        Ok(event)
    }
}
