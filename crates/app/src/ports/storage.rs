//! Storage port — repository traits for persistence.
//!
//! Every method is async and reports infrastructure failures as
//! [`EventBotError::Storage`]. Expected outcomes (a missing row, a delete that
//! removed nothing) are encoded in the return type instead.

use std::future::Future;
use std::sync::Arc;

use eventbot_domain::conversation::ConversationState;
use eventbot_domain::error::EventBotError;
use eventbot_domain::event::Event;
use eventbot_domain::id::{EventId, UserId};
use eventbot_domain::registration::Registration;
use eventbot_domain::time::Timestamp;
use eventbot_domain::user::User;

/// Per-user dialogue position.
pub trait ConversationStateRepository {
    /// Load the stored state, `None` for a never-seen user.
    fn get(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Option<ConversationState>, EventBotError>> + Send;

    /// Insert or replace the state of `state.user_id`.
    fn put(&self, state: ConversationState)
    -> impl Future<Output = Result<(), EventBotError>> + Send;
}

/// Onboarded users.
pub trait UserRepository {
    fn get(&self, user_id: &UserId)
    -> impl Future<Output = Result<Option<User>, EventBotError>> + Send;

    /// Insert or replace the whole record.
    fn put(&self, user: User) -> impl Future<Output = Result<User, EventBotError>> + Send;
}

/// Scheduled events.
pub trait EventRepository {
    fn create(&self, event: Event) -> impl Future<Output = Result<Event, EventBotError>> + Send;

    fn get_by_id(
        &self,
        id: EventId,
    ) -> impl Future<Output = Result<Option<Event>, EventBotError>> + Send;

    /// Every event, earliest start first.
    fn list_all(&self) -> impl Future<Output = Result<Vec<Event>, EventBotError>> + Send;

    /// Events starting strictly after `now`, earliest first.
    fn list_upcoming(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = Result<Vec<Event>, EventBotError>> + Send;

    /// Remove the event and its registrations. Returns whether it existed.
    fn delete(&self, id: EventId) -> impl Future<Output = Result<bool, EventBotError>> + Send;
}

/// User sign-ups for events.
pub trait RegistrationRepository {
    /// Persist a registration.
    ///
    /// Implementations must report a duplicate `(user_id, event_id)` as
    /// [`EventBotError::Conflict`], atomically with the write.
    fn create(
        &self,
        registration: Registration,
    ) -> impl Future<Output = Result<Registration, EventBotError>> + Send;

    /// Returns whether a row was removed.
    fn delete(
        &self,
        user_id: &UserId,
        event_id: EventId,
    ) -> impl Future<Output = Result<bool, EventBotError>> + Send;

    fn exists(
        &self,
        user_id: &UserId,
        event_id: EventId,
    ) -> impl Future<Output = Result<bool, EventBotError>> + Send;

    fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Vec<Registration>, EventBotError>> + Send;

    fn list_for_event(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Vec<Registration>, EventBotError>> + Send;
}

impl<T: ConversationStateRepository + Send + Sync> ConversationStateRepository for Arc<T> {
    fn get(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Option<ConversationState>, EventBotError>> + Send {
        (**self).get(user_id)
    }

    fn put(
        &self,
        state: ConversationState,
    ) -> impl Future<Output = Result<(), EventBotError>> + Send {
        (**self).put(state)
    }
}

impl<T: UserRepository + Send + Sync> UserRepository for Arc<T> {
    fn get(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Option<User>, EventBotError>> + Send {
        (**self).get(user_id)
    }

    fn put(&self, user: User) -> impl Future<Output = Result<User, EventBotError>> + Send {
        (**self).put(user)
    }
}

impl<T: EventRepository + Send + Sync> EventRepository for Arc<T> {
    fn create(&self, event: Event) -> impl Future<Output = Result<Event, EventBotError>> + Send {
        (**self).create(event)
    }

    fn get_by_id(
        &self,
        id: EventId,
    ) -> impl Future<Output = Result<Option<Event>, EventBotError>> + Send {
        (**self).get_by_id(id)
    }

    fn list_all(&self) -> impl Future<Output = Result<Vec<Event>, EventBotError>> + Send {
        (**self).list_all()
    }

    fn list_upcoming(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = Result<Vec<Event>, EventBotError>> + Send {
        (**self).list_upcoming(now)
    }

    fn delete(&self, id: EventId) -> impl Future<Output = Result<bool, EventBotError>> + Send {
        (**self).delete(id)
    }
}

impl<T: RegistrationRepository + Send + Sync> RegistrationRepository for Arc<T> {
    fn create(
        &self,
        registration: Registration,
    ) -> impl Future<Output = Result<Registration, EventBotError>> + Send {
        (**self).create(registration)
    }

    fn delete(
        &self,
        user_id: &UserId,
        event_id: EventId,
    ) -> impl Future<Output = Result<bool, EventBotError>> + Send {
        (**self).delete(user_id, event_id)
    }

    fn exists(
        &self,
        user_id: &UserId,
        event_id: EventId,
    ) -> impl Future<Output = Result<bool, EventBotError>> + Send {
        (**self).exists(user_id, event_id)
    }

    fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Vec<Registration>, EventBotError>> + Send {
        (**self).list_for_user(user_id)
    }

    fn list_for_event(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Vec<Registration>, EventBotError>> + Send {
        (**self).list_for_event(event_id)
    }
}
