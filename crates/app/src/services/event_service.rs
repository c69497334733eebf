//! Event service — use-cases for events and registrations.

use eventbot_domain::error::{
    AuthorizationError, ConflictError, EventBotError, NotFoundError, ValidationError,
};
use eventbot_domain::event::{Event, sort_by_start};
use eventbot_domain::id::{EventId, UserId};
use eventbot_domain::registration::Registration;
use eventbot_domain::time::{self, parse_instant};
use eventbot_domain::user::User;

use crate::ports::{EventRepository, RegistrationRepository};

/// An event together with how many users registered for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOverview {
    pub event: Event,
    pub attendees: usize,
}

/// Application service for events and registrations.
pub struct EventService<ER, RR> {
    events: ER,
    registrations: RR,
}

impl<ER, RR> EventService<ER, RR>
where
    ER: EventRepository,
    RR: RegistrationRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(events: ER, registrations: RR) -> Self {
        Self {
            events,
            registrations,
        }
    }

    /// Create an event on behalf of an admin.
    ///
    /// `date_text` is parsed as RFC 3339 or a naive ISO-8601 date-time (taken
    /// as UTC) and must lie strictly in the future.
    ///
    /// # Errors
    ///
    /// Returns [`EventBotError::Authorization`] if `acting` is not an admin,
    /// [`EventBotError::Validation`] if the name is blank or the date is
    /// unparsable or not in the future, or a storage error.
    #[tracing::instrument(skip(self, acting), fields(user_id = %acting.id))]
    pub async fn create_event(
        &self,
        acting: &User,
        name: &str,
        date_text: &str,
    ) -> Result<Event, EventBotError> {
        require_admin(acting, "create events")?;
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyEventName.into());
        }
        let starts_at = parse_instant(date_text)?;
        let now = time::now();
        if starts_at <= now {
            return Err(ValidationError::DateNotInFuture.into());
        }
        let event = Event::builder()
            .name(name)
            .starts_at(starts_at)
            .created_by(acting.id.clone())
            .created_at(now)
            .build()?;
        let event = self.events.create(event).await?;
        tracing::info!(event_id = %event.id, "event created");
        Ok(event)
    }

    /// Events that have not started yet, earliest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_upcoming_events(&self) -> Result<Vec<Event>, EventBotError> {
        self.events.list_upcoming(time::now()).await
    }

    /// Register `user_id` for an upcoming event and return that event.
    ///
    /// The existence check is a shortcut for the common case; the repository
    /// is the authority on uniqueness, so two concurrent calls still yield one
    /// success and one conflict.
    ///
    /// # Errors
    ///
    /// Returns [`EventBotError::NotFound`] for an unknown event,
    /// [`EventBotError::Validation`] when it already started,
    /// [`EventBotError::Conflict`] when already registered, or a storage
    /// error.
    #[tracing::instrument(skip(self))]
    pub async fn register_for_event(
        &self,
        user_id: &UserId,
        event_id: EventId,
    ) -> Result<Event, EventBotError> {
        let event = self.get_event(event_id).await?;
        let now = time::now();
        if !event.is_upcoming(now) {
            return Err(ValidationError::EventNotUpcoming.into());
        }
        if self.registrations.exists(user_id, event_id).await? {
            return Err(already_registered(user_id, event_id));
        }
        self.registrations
            .create(Registration::new(user_id.clone(), event_id, now))
            .await?;
        tracing::info!("user registered");
        Ok(event)
    }

    /// Remove the registration of `user_id` for an event and return the
    /// event.
    ///
    /// # Errors
    ///
    /// Returns [`EventBotError::NotFound`] for an unknown event,
    /// [`ValidationError::NotRegistered`] when there was nothing to remove, or
    /// a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn unregister_from_event(
        &self,
        user_id: &UserId,
        event_id: EventId,
    ) -> Result<Event, EventBotError> {
        let event = self.get_event(event_id).await?;
        if !self.registrations.delete(user_id, event_id).await? {
            return Err(ValidationError::NotRegistered.into());
        }
        tracing::info!("user unregistered");
        Ok(event)
    }

    /// Upcoming events `user_id` is registered for, earliest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repositories.
    pub async fn list_my_upcoming_events(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Event>, EventBotError> {
        let now = time::now();
        let mut events = Vec::new();
        for registration in self.registrations.list_for_user(user_id).await? {
            if let Some(event) = self.events.get_by_id(registration.event_id).await?
                && event.is_upcoming(now)
            {
                events.push(event);
            }
        }
        sort_by_start(&mut events);
        Ok(events)
    }

    /// Every event with its attendee count, earliest first.
    ///
    /// # Errors
    ///
    /// Returns [`EventBotError::Authorization`] if `acting` is not an admin,
    /// or a storage error.
    #[tracing::instrument(skip(self, acting), fields(user_id = %acting.id))]
    pub async fn list_all_events(&self, acting: &User) -> Result<Vec<EventOverview>, EventBotError> {
        require_admin(acting, "list all events")?;
        let mut overviews = Vec::new();
        for event in self.events.list_all().await? {
            let attendees = self.registrations.list_for_event(event.id).await?.len();
            overviews.push(EventOverview { event, attendees });
        }
        Ok(overviews)
    }

    /// Delete an event and its registrations, returning the removed event.
    ///
    /// # Errors
    ///
    /// Returns [`EventBotError::Authorization`] if `acting` is not an admin,
    /// [`EventBotError::NotFound`] for an unknown event, or a storage error.
    #[tracing::instrument(skip(self, acting), fields(user_id = %acting.id))]
    pub async fn delete_event(
        &self,
        acting: &User,
        event_id: EventId,
    ) -> Result<Event, EventBotError> {
        require_admin(acting, "delete events")?;
        let event = self.get_event(event_id).await?;
        if !self.events.delete(event_id).await? {
            return Err(event_not_found(event_id));
        }
        tracing::info!("event deleted");
        Ok(event)
    }

    async fn get_event(&self, event_id: EventId) -> Result<Event, EventBotError> {
        self.events
            .get_by_id(event_id)
            .await?
            .ok_or_else(|| event_not_found(event_id))
    }
}

fn require_admin(user: &User, action: &'static str) -> Result<(), EventBotError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(AuthorizationError { action }.into())
    }
}

fn event_not_found(event_id: EventId) -> EventBotError {
    NotFoundError {
        entity: "event",
        id: event_id.to_string(),
    }
    .into()
}

fn already_registered(user_id: &UserId, event_id: EventId) -> EventBotError {
    ConflictError::AlreadyRegistered {
        user_id: user_id.to_string(),
        event_id: event_id.to_string(),
    }
    .into()
}
