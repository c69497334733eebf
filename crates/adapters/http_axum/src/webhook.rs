//! Bot-platform webhook.
//!
//! Accepts Telegram-style updates and answers inline with a `sendMessage`
//! method call, so no outbound client is needed. The endpoint always answers
//! `200 OK`: the platform retries anything else, and a retried update would
//! replay the turn.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use eventbot_app::conversation::messages;
use eventbot_app::ports::{
    ConversationStateRepository, EventRepository, RegistrationRepository, UserRepository,
};
use eventbot_domain::action::{Action, Button, Reply};
use eventbot_domain::id::UserId;

use crate::state::AppState;

/// One inbound update. Only the fields the bot reads are modelled.
#[derive(Debug, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub from: Option<Sender>,
    #[serde(default)]
    pub chat: Option<Chat>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Sender {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// A button press.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub from: Sender,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
}

impl Update {
    /// Extract the action and the chat to answer in, or `None` for updates
    /// the bot does not handle.
    pub fn into_action(self) -> Option<(Action, i64)> {
        if let Some(Message {
            from: Some(from),
            chat,
            text: Some(text),
        }) = self.message
        {
            let chat_id = chat.map_or(from.id, |c| c.id);
            return Some((Action::text(UserId::from(from.id), text), chat_id));
        }

        let query = self.callback_query?;
        let data = query.data?;
        let chat_id = query
            .message
            .and_then(|m| m.chat)
            .map_or(query.from.id, |c| c.id);
        Some((Action::token(UserId::from(query.from.id), data), chat_id))
    }
}

/// Outbound `sendMessage` method call.
#[derive(Debug, Serialize)]
pub struct SendMessage {
    pub method: &'static str,
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl From<Button> for InlineKeyboardButton {
    fn from(button: Button) -> Self {
        Self {
            text: button.label,
            callback_data: button.token,
        }
    }
}

impl SendMessage {
    fn new(chat_id: i64, text: String, keyboard: Vec<Vec<Button>>) -> Self {
        let reply_markup = (!keyboard.is_empty()).then(|| InlineKeyboardMarkup {
            inline_keyboard: keyboard
                .into_iter()
                .map(|row| row.into_iter().map(InlineKeyboardButton::from).collect())
                .collect(),
        });
        Self {
            method: "sendMessage",
            chat_id,
            text,
            reply_markup,
        }
    }

    fn from_reply(chat_id: i64, reply: Reply) -> Self {
        Self::new(chat_id, reply.text, reply.keyboard)
    }
}

/// Possible responses from the webhook endpoint.
pub enum WebhookResponse {
    Reply(Json<SendMessage>),
    Ignored,
}

impl IntoResponse for WebhookResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Reply(json) => json.into_response(),
            Self::Ignored => Json(serde_json::json!({})).into_response(),
        }
    }
}

/// `POST /webhook`
pub async fn handle<UR, ER, RR, SR>(
    State(state): State<AppState<UR, ER, RR, SR>>,
    update: Result<Json<Update>, JsonRejection>,
) -> WebhookResponse
where
    UR: UserRepository + Send + Sync + 'static,
    ER: EventRepository + Send + Sync + 'static,
    RR: RegistrationRepository + Send + Sync + 'static,
    SR: ConversationStateRepository + Send + Sync + 'static,
{
    let update = match update {
        Ok(Json(update)) => update,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "ignoring malformed update");
            return WebhookResponse::Ignored;
        }
    };
    let update_id = update.update_id;
    let Some((action, chat_id)) = update.into_action() else {
        tracing::debug!(?update_id, "ignoring update");
        return WebhookResponse::Ignored;
    };

    match state.dialogue.handle(action).await {
        Ok(reply) => WebhookResponse::Reply(Json(SendMessage::from_reply(chat_id, reply))),
        Err(err) => {
            tracing::error!(error = %err, ?update_id, "turn failed");
            WebhookResponse::Reply(Json(SendMessage::new(
                chat_id,
                messages::TRY_AGAIN.to_string(),
                Vec::new(),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Update {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn should_read_text_messages() {
        let update = parse(
            r#"{"update_id":1,"message":{"from":{"id":42},"chat":{"id":4200},"text":"Ivan"}}"#,
        );
        let (action, chat_id) = update.into_action().unwrap();
        assert_eq!(action, Action::text(UserId::from(42), "Ivan"));
        assert_eq!(chat_id, 4200);
    }

    #[test]
    fn should_read_button_presses() {
        let update = parse(
            r#"{"update_id":2,"callback_query":{"from":{"id":42},"data":"browse_events","message":{"chat":{"id":4200}}}}"#,
        );
        let (action, chat_id) = update.into_action().unwrap();
        assert_eq!(action, Action::token(UserId::from(42), "browse_events"));
        assert_eq!(chat_id, 4200);
    }

    #[test]
    fn should_fall_back_to_sender_as_chat() {
        let update = parse(r#"{"callback_query":{"from":{"id":42},"data":"help"}}"#);
        let (_, chat_id) = update.into_action().unwrap();
        assert_eq!(chat_id, 42);
    }

    #[test]
    fn should_ignore_updates_without_text_or_data() {
        assert!(parse(r#"{"update_id":3}"#).into_action().is_none());
        assert!(
            parse(r#"{"message":{"from":{"id":42},"chat":{"id":42}}}"#)
                .into_action()
                .is_none()
        );
        assert!(
            parse(r#"{"callback_query":{"from":{"id":42}}}"#)
                .into_action()
                .is_none()
        );
    }

    #[test]
    fn should_omit_markup_without_buttons() {
        let body = serde_json::to_value(SendMessage::new(1, "hi".to_string(), Vec::new())).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"method": "sendMessage", "chat_id": 1, "text": "hi"})
        );
    }

    #[test]
    fn should_render_buttons_as_inline_keyboard() {
        let keyboard = messages::retry_keyboard();
        let body = serde_json::to_value(SendMessage::new(1, "hi".to_string(), keyboard)).unwrap();
        assert_eq!(
            body["reply_markup"]["inline_keyboard"][0][0],
            serde_json::json!({"text": "Retry", "callback_data": "retry"})
        );
    }
}
