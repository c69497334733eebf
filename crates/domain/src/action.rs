//! Inbound actions and outbound replies exchanged with the chat transport.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::{EventId, UserId};

/// What the user sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Input {
    /// Typed message.
    Text(String),
    /// Button press carrying a command token.
    Token(String),
}

/// One inbound user turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub user_id: UserId,
    pub input: Input,
}

impl Action {
    #[must_use]
    pub fn text(user_id: impl Into<UserId>, text: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            input: Input::Text(text.into()),
        }
    }

    #[must_use]
    pub fn token(user_id: impl Into<UserId>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            input: Input::Token(token.into()),
        }
    }
}

const REGISTER_PREFIX: &str = "register_";
const UNREGISTER_PREFIX: &str = "unregister_";
const DELETE_EVENT_PREFIX: &str = "delete_event_";

/// A parsed command token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    MainMenu,
    BrowseEvents,
    MyEvents,
    AdminMenu,
    CreateEvent,
    AllEvents,
    Help,
    Cancel,
    Retry,
    Register(EventId),
    Unregister(EventId),
    DeleteEvent(EventId),
}

impl Command {
    /// The admin-only operation this command stands for, if any.
    #[must_use]
    pub fn privileged_action(self) -> Option<&'static str> {
        match self {
            Self::AdminMenu => Some("open the admin menu"),
            Self::CreateEvent => Some("create events"),
            Self::AllEvents => Some("list all events"),
            Self::DeleteEvent(_) => Some("delete events"),
            Self::Start
            | Self::MainMenu
            | Self::BrowseEvents
            | Self::MyEvents
            | Self::Help
            | Self::Cancel
            | Self::Retry
            | Self::Register(_)
            | Self::Unregister(_) => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::MainMenu => f.write_str("main_menu"),
            Self::BrowseEvents => f.write_str("browse_events"),
            Self::MyEvents => f.write_str("my_events"),
            Self::AdminMenu => f.write_str("admin_menu"),
            Self::CreateEvent => f.write_str("create_event"),
            Self::AllEvents => f.write_str("all_events"),
            Self::Help => f.write_str("help"),
            Self::Cancel => f.write_str("cancel"),
            Self::Retry => f.write_str("retry"),
            Self::Register(id) => write!(f, "{REGISTER_PREFIX}{id}"),
            Self::Unregister(id) => write!(f, "{UNREGISTER_PREFIX}{id}"),
            Self::DeleteEvent(id) => write!(f, "{DELETE_EVENT_PREFIX}{id}"),
        }
    }
}

impl FromStr for Command {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let unknown = || ValidationError::UnknownAction(token.to_string());
        let event_id = |raw: &str| raw.parse::<EventId>().map_err(|_| unknown());

        let command = match token {
            "start" | "/start" => Self::Start,
            "main_menu" => Self::MainMenu,
            "browse_events" => Self::BrowseEvents,
            "my_events" => Self::MyEvents,
            "admin_menu" => Self::AdminMenu,
            "create_event" => Self::CreateEvent,
            "all_events" => Self::AllEvents,
            "help" => Self::Help,
            "cancel" => Self::Cancel,
            "retry" => Self::Retry,
            other => {
                if let Some(raw) = other.strip_prefix(REGISTER_PREFIX) {
                    Self::Register(event_id(raw)?)
                } else if let Some(raw) = other.strip_prefix(UNREGISTER_PREFIX) {
                    Self::Unregister(event_id(raw)?)
                } else if let Some(raw) = other.strip_prefix(DELETE_EVENT_PREFIX) {
                    Self::DeleteEvent(event_id(raw)?)
                } else {
                    return Err(unknown());
                }
            }
        };
        Ok(command)
    }
}

/// Inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    #[must_use]
    pub fn new(label: impl Into<String>, command: Command) -> Self {
        Self {
            label: label.into(),
            token: command.to_string(),
        }
    }
}

/// What the bot answers for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub user_id: UserId,
    pub text: String,
    pub keyboard: Vec<Vec<Button>>,
}

impl Reply {
    #[must_use]
    pub fn new(user_id: UserId, text: impl Into<String>, keyboard: Vec<Vec<Button>>) -> Self {
        Self {
            user_id,
            text: text.into(),
            keyboard,
        }
    }

    /// Every token offered by the keyboard, row by row.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.keyboard.iter().flatten().map(|b| b.token.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_every_plain_token() {
        for token in [
            "start",
            "main_menu",
            "browse_events",
            "my_events",
            "admin_menu",
            "create_event",
            "all_events",
            "help",
            "cancel",
            "retry",
        ] {
            let command: Command = token.parse().unwrap();
            assert_eq!(command.to_string(), token);
        }
    }

    #[test]
    fn should_treat_slash_start_as_start() {
        assert_eq!("/start".parse::<Command>(), Ok(Command::Start));
    }

    #[test]
    fn should_parse_event_scoped_tokens() {
        let id = EventId::new();
        assert_eq!(
            format!("register_{id}").parse::<Command>(),
            Ok(Command::Register(id))
        );
        assert_eq!(
            format!("unregister_{id}").parse::<Command>(),
            Ok(Command::Unregister(id))
        );
        assert_eq!(
            format!("delete_event_{id}").parse::<Command>(),
            Ok(Command::DeleteEvent(id))
        );
    }

    #[test]
    fn should_reject_unknown_tokens() {
        assert_eq!(
            "dance".parse::<Command>(),
            Err(ValidationError::UnknownAction("dance".to_string()))
        );
        assert_eq!(
            "register_42".parse::<Command>(),
            Err(ValidationError::UnknownAction("register_42".to_string()))
        );
    }

    #[test]
    fn should_flag_admin_commands_as_privileged() {
        assert!(Command::CreateEvent.privileged_action().is_some());
        assert!(Command::DeleteEvent(EventId::new()).privileged_action().is_some());
        assert!(Command::Register(EventId::new()).privileged_action().is_none());
        assert!(Command::Help.privileged_action().is_none());
    }

    #[test]
    fn should_list_reply_tokens_in_order() {
        let reply = Reply::new(
            UserId::new("1"),
            "hi",
            vec![
                vec![Button::new("Events", Command::BrowseEvents)],
                vec![Button::new("Help", Command::Help)],
            ],
        );
        assert_eq!(reply.tokens().collect::<Vec<_>>(), ["browse_events", "help"]);
    }
}
