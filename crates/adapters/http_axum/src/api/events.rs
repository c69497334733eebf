//! JSON REST handlers for events.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use eventbot_app::ports::{
    ConversationStateRepository, EventRepository, RegistrationRepository, UserRepository,
};
use eventbot_domain::event::Event;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Event>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/events` — upcoming events, soonest first.
pub async fn list<UR, ER, RR, SR>(
    State(state): State<AppState<UR, ER, RR, SR>>,
) -> Result<ListResponse, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    ER: EventRepository + Send + Sync + 'static,
    RR: RegistrationRepository + Send + Sync + 'static,
    SR: ConversationStateRepository + Send + Sync + 'static,
{
    let events = state.dialogue.events().list_upcoming_events().await?;
    Ok(ListResponse::Ok(Json(events)))
}
