//! Axum router assembly.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use eventbot_app::ports::{
    ConversationStateRepository, EventRepository, RegistrationRepository, UserRepository,
};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Mounts the webhook, the health probe and the JSON API under `/api`.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<UR, ER, RR, SR>(state: AppState<UR, ER, RR, SR>) -> Router
where
    UR: UserRepository + Send + Sync + 'static,
    ER: EventRepository + Send + Sync + 'static,
    RR: RegistrationRepository + Send + Sync + 'static,
    SR: ConversationStateRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/webhook", post(crate::webhook::handle::<UR, ER, RR, SR>))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use chrono::Duration;
    use eventbot_app::conversation::messages;
    use eventbot_app::services::dialogue_service::DialogueService;
    use eventbot_app::services::event_service::EventService;
    use eventbot_app::services::user_service::UserService;
    use eventbot_domain::conversation::ConversationState;
    use eventbot_domain::error::EventBotError;
    use eventbot_domain::event::Event;
    use eventbot_domain::id::{EventId, UserId};
    use eventbot_domain::registration::Registration;
    use eventbot_domain::time::{self, Timestamp};
    use eventbot_domain::user::User;
    use http_body_util::BodyExt;
    use std::collections::HashSet;
    use tower::ServiceExt;

    struct StubUserRepo;
    struct StubEventRepo(Vec<Event>);
    struct StubRegistrationRepo;
    struct StubStateRepo {
        fail_puts: bool,
    }

    impl UserRepository for StubUserRepo {
        async fn get(&self, _user_id: &UserId) -> Result<Option<User>, EventBotError> {
            Ok(None)
        }
        async fn put(&self, user: User) -> Result<User, EventBotError> {
            Ok(user)
        }
    }

    impl EventRepository for StubEventRepo {
        async fn create(&self, event: Event) -> Result<Event, EventBotError> {
            Ok(event)
        }
        async fn get_by_id(&self, id: EventId) -> Result<Option<Event>, EventBotError> {
            Ok(self.0.iter().find(|e| e.id == id).cloned())
        }
        async fn list_all(&self) -> Result<Vec<Event>, EventBotError> {
            Ok(self.0.clone())
        }
        async fn list_upcoming(&self, now: Timestamp) -> Result<Vec<Event>, EventBotError> {
            Ok(self
                .0
                .iter()
                .filter(|e| e.is_upcoming(now))
                .cloned()
                .collect())
        }
        async fn delete(&self, _id: EventId) -> Result<bool, EventBotError> {
            Ok(false)
        }
    }

    impl RegistrationRepository for StubRegistrationRepo {
        async fn create(&self, registration: Registration) -> Result<Registration, EventBotError> {
            Ok(registration)
        }
        async fn delete(&self, _user_id: &UserId, _event_id: EventId) -> Result<bool, EventBotError> {
            Ok(false)
        }
        async fn exists(&self, _user_id: &UserId, _event_id: EventId) -> Result<bool, EventBotError> {
            Ok(false)
        }
        async fn list_for_user(&self, _user_id: &UserId) -> Result<Vec<Registration>, EventBotError> {
            Ok(vec![])
        }
        async fn list_for_event(&self, _event_id: EventId) -> Result<Vec<Registration>, EventBotError> {
            Ok(vec![])
        }
    }

    impl ConversationStateRepository for StubStateRepo {
        async fn get(&self, _user_id: &UserId) -> Result<Option<ConversationState>, EventBotError> {
            Ok(None)
        }
        async fn put(&self, _state: ConversationState) -> Result<(), EventBotError> {
            if self.fail_puts {
                return Err(EventBotError::Storage("database is locked".into()));
            }
            Ok(())
        }
    }

    fn test_router(events: Vec<Event>, fail_puts: bool) -> Router {
        let dialogue = DialogueService::new(
            UserService::new(StubUserRepo, HashSet::new()),
            EventService::new(StubEventRepo(events), StubRegistrationRepo),
            StubStateRepo { fail_puts },
        );
        build(AppState::new(dialogue))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let app = test_router(vec![], false);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_answer_text_update_with_send_message() {
        let app = test_router(vec![], false);

        let response = app
            .oneshot(post_json(
                "/webhook",
                r#"{"update_id":1,"message":{"from":{"id":42},"chat":{"id":42},"text":"Ivan"}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["method"], "sendMessage");
        assert_eq!(body["chat_id"], 42);
        assert_eq!(body["text"], messages::ask_last_name("Ivan"));
    }

    #[tokio::test]
    async fn should_acknowledge_ignored_updates_with_empty_object() {
        let app = test_router(vec![], false);

        let response = app
            .oneshot(post_json("/webhook", r#"{"update_id":2,"edited_message":{}}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({}));
    }

    #[tokio::test]
    async fn should_acknowledge_malformed_updates_with_empty_object() {
        let app = test_router(vec![], false);

        let response = app
            .oneshot(post_json(
                "/webhook",
                r#"{"message":{"from":{"is_bot":false},"chat":{"id":42},"text":"hi"}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({}));
    }

    #[tokio::test]
    async fn should_ask_to_retry_when_storage_fails() {
        let app = test_router(vec![], true);

        let response = app
            .oneshot(post_json(
                "/webhook",
                r#"{"message":{"from":{"id":42},"chat":{"id":42},"text":"Ivan"}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["text"], messages::TRY_AGAIN);
        assert!(body.get("reply_markup").is_none());
    }

    #[tokio::test]
    async fn should_list_only_upcoming_events() {
        let now = time::now();
        let event = |name: &str, starts_at| {
            Event::builder()
                .name(name)
                .starts_at(starts_at)
                .created_by(UserId::new("1"))
                .build()
                .unwrap()
        };
        let app = test_router(
            vec![
                event("Meetup", now + Duration::days(1)),
                event("Retro", now - Duration::days(1)),
            ],
            false,
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/events")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Meetup"]);
    }
}
