//! Side effects requested by a transition and their results.

use eventbot_domain::event::Event;
use eventbot_domain::id::EventId;
use eventbot_domain::user::User;

use crate::services::event_service::EventOverview;

/// A domain operation the orchestration layer must run before the turn can
/// settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Persist the user collected by the onboarding wizard.
    CompleteOnboarding {
        first_name: String,
        last_name: String,
        birth_year: i32,
    },
    ShowUpcomingEvents,
    ShowMyEvents,
    ShowAllEvents,
    CreateEvent {
        name: String,
        date_text: String,
    },
    Register(EventId),
    Unregister(EventId),
    DeleteEvent(EventId),
}

/// Successful outcome of an [`Effect`], one arm per effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectOutput {
    Onboarded(User),
    UpcomingEvents(Vec<Event>),
    MyEvents(Vec<Event>),
    AllEvents(Vec<EventOverview>),
    EventCreated(Event),
    Registered(Event),
    Unregistered(Event),
    EventDeleted(Event),
}
