//! JSON REST API handlers.

use axum::Router;
use axum::routing::get;

use eventbot_app::ports::{
    ConversationStateRepository, EventRepository, RegistrationRepository, UserRepository,
};

use crate::state::AppState;

pub mod events;

/// Routes mounted under `/api`.
pub fn routes<UR, ER, RR, SR>() -> Router<AppState<UR, ER, RR, SR>>
where
    UR: UserRepository + Send + Sync + 'static,
    ER: EventRepository + Send + Sync + 'static,
    RR: RegistrationRepository + Send + Sync + 'static,
    SR: ConversationStateRepository + Send + Sync + 'static,
{
    Router::new().route("/events", get(events::list::<UR, ER, RR, SR>))
}
