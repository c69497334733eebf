//! Shared application state for axum handlers.

use std::sync::Arc;

use eventbot_app::ports::{
    ConversationStateRepository, EventRepository, RegistrationRepository, UserRepository,
};
use eventbot_app::services::dialogue_service::DialogueService;

/// Application state shared across all axum handlers.
///
/// Generic over the repository types to avoid dynamic dispatch. `Clone` is
/// implemented manually so the repositories themselves do not need to be
/// `Clone`; only the `Arc` is cloned.
pub struct AppState<UR, ER, RR, SR> {
    /// Conversation orchestrator, also the entry point to the event use-cases.
    pub dialogue: Arc<DialogueService<UR, ER, RR, SR>>,
}

impl<UR, ER, RR, SR> Clone for AppState<UR, ER, RR, SR> {
    fn clone(&self) -> Self {
        Self {
            dialogue: Arc::clone(&self.dialogue),
        }
    }
}

impl<UR, ER, RR, SR> AppState<UR, ER, RR, SR>
where
    UR: UserRepository + Send + Sync + 'static,
    ER: EventRepository + Send + Sync + 'static,
    RR: RegistrationRepository + Send + Sync + 'static,
    SR: ConversationStateRepository + Send + Sync + 'static,
{
    /// Create a new application state owning the orchestrator.
    pub fn new(dialogue: DialogueService<UR, ER, RR, SR>) -> Self {
        Self {
            dialogue: Arc::new(dialogue),
        }
    }
}
