//! Conversation state — where each user currently is in the dialogue.
//!
//! A [`Step`] is a closed set of positions. Steps that belong to a multi-turn
//! flow (onboarding, event creation) carry the partial input collected so
//! far, so there is no free-form context bag to look things up in.
//!
//! For storage a step splits into a [`StepKind`] name and a flat
//! string-to-string [`ContextMap`]. The map is empty for every step outside
//! an in-progress flow, which is how context gets cleared when a flow
//! completes or is abandoned.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::UserId;
use crate::time::Timestamp;

/// Persisted partial-flow data.
pub type ContextMap = BTreeMap<String, String>;

const FIRST_NAME: &str = "firstName";
const LAST_NAME: &str = "lastName";
const EVENT_NAME: &str = "eventName";

/// Position of a user in the dialogue, with the data its flow collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    AwaitingFirstName,
    AwaitingLastName { first_name: String },
    AwaitingBirthYear { first_name: String, last_name: String },
    MainMenu,
    BrowsingEvents,
    MyEvents,
    AdminMenu,
    CreatingEventAwaitingName,
    CreatingEventAwaitingDate { name: String },
}

/// The closed enumeration of step names, as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    AwaitingFirstName,
    AwaitingLastName,
    AwaitingBirthYear,
    MainMenu,
    BrowsingEvents,
    MyEvents,
    AdminMenu,
    CreatingEventAwaitingName,
    CreatingEventAwaitingDate,
}

impl StepKind {
    /// Every member of the enumeration.
    pub const ALL: [Self; 9] = [
        Self::AwaitingFirstName,
        Self::AwaitingLastName,
        Self::AwaitingBirthYear,
        Self::MainMenu,
        Self::BrowsingEvents,
        Self::MyEvents,
        Self::AdminMenu,
        Self::CreatingEventAwaitingName,
        Self::CreatingEventAwaitingDate,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingFirstName => "awaiting_first_name",
            Self::AwaitingLastName => "awaiting_last_name",
            Self::AwaitingBirthYear => "awaiting_birth_year",
            Self::MainMenu => "main_menu",
            Self::BrowsingEvents => "browsing_events",
            Self::MyEvents => "my_events",
            Self::AdminMenu => "admin_menu",
            Self::CreatingEventAwaitingName => "creating_event_awaiting_name",
            Self::CreatingEventAwaitingDate => "creating_event_awaiting_date",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownStep(s.to_string()))
    }
}

impl Step {
    #[must_use]
    pub fn kind(&self) -> StepKind {
        match self {
            Self::AwaitingFirstName => StepKind::AwaitingFirstName,
            Self::AwaitingLastName { .. } => StepKind::AwaitingLastName,
            Self::AwaitingBirthYear { .. } => StepKind::AwaitingBirthYear,
            Self::MainMenu => StepKind::MainMenu,
            Self::BrowsingEvents => StepKind::BrowsingEvents,
            Self::MyEvents => StepKind::MyEvents,
            Self::AdminMenu => StepKind::AdminMenu,
            Self::CreatingEventAwaitingName => StepKind::CreatingEventAwaitingName,
            Self::CreatingEventAwaitingDate { .. } => StepKind::CreatingEventAwaitingDate,
        }
    }

    /// Whether the step is part of the onboarding wizard.
    #[must_use]
    pub fn is_onboarding(&self) -> bool {
        matches!(
            self,
            Self::AwaitingFirstName | Self::AwaitingLastName { .. } | Self::AwaitingBirthYear { .. }
        )
    }

    /// Whether the step is part of the admin event-creation flow.
    #[must_use]
    pub fn is_creating_event(&self) -> bool {
        matches!(
            self,
            Self::CreatingEventAwaitingName | Self::CreatingEventAwaitingDate { .. }
        )
    }

    /// Whether the user is in the middle of a multi-turn flow.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.is_onboarding() || self.is_creating_event()
    }

    /// The partial-flow data to persist next to the step name.
    #[must_use]
    pub fn context(&self) -> ContextMap {
        let mut map = ContextMap::new();
        match self {
            Self::AwaitingLastName { first_name } => {
                map.insert(FIRST_NAME.to_string(), first_name.clone());
            }
            Self::AwaitingBirthYear {
                first_name,
                last_name,
            } => {
                map.insert(FIRST_NAME.to_string(), first_name.clone());
                map.insert(LAST_NAME.to_string(), last_name.clone());
            }
            Self::CreatingEventAwaitingDate { name } => {
                map.insert(EVENT_NAME.to_string(), name.clone());
            }
            Self::AwaitingFirstName
            | Self::MainMenu
            | Self::BrowsingEvents
            | Self::MyEvents
            | Self::AdminMenu
            | Self::CreatingEventAwaitingName => {}
        }
        map
    }

    /// Rebuild a step from its stored name and context.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingContext`] when a flow step lacks one
    /// of the values it carries.
    pub fn from_parts(kind: StepKind, context: &ContextMap) -> Result<Self, ValidationError> {
        let take = |key: &'static str| {
            context
                .get(key)
                .cloned()
                .ok_or(ValidationError::MissingContext(key))
        };
        Ok(match kind {
            StepKind::AwaitingFirstName => Self::AwaitingFirstName,
            StepKind::AwaitingLastName => Self::AwaitingLastName {
                first_name: take(FIRST_NAME)?,
            },
            StepKind::AwaitingBirthYear => Self::AwaitingBirthYear {
                first_name: take(FIRST_NAME)?,
                last_name: take(LAST_NAME)?,
            },
            StepKind::MainMenu => Self::MainMenu,
            StepKind::BrowsingEvents => Self::BrowsingEvents,
            StepKind::MyEvents => Self::MyEvents,
            StepKind::AdminMenu => Self::AdminMenu,
            StepKind::CreatingEventAwaitingName => Self::CreatingEventAwaitingName,
            StepKind::CreatingEventAwaitingDate => Self::CreatingEventAwaitingDate {
                name: take(EVENT_NAME)?,
            },
        })
    }
}

/// Serialize a context map for storage. An empty map is stored as `None`.
///
/// # Errors
///
/// Returns the underlying `serde_json` error; string maps never fail in
/// practice.
pub fn encode_context(context: &ContextMap) -> Result<Option<String>, serde_json::Error> {
    if context.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(context).map(Some)
}

/// Inverse of [`encode_context`]. `None` and the empty string decode to an
/// empty map.
///
/// # Errors
///
/// Returns a `serde_json` error when the stored text is not a JSON object of
/// strings.
pub fn decode_context(stored: Option<&str>) -> Result<ContextMap, serde_json::Error> {
    match stored {
        None => Ok(ContextMap::new()),
        Some(text) if text.trim().is_empty() => Ok(ContextMap::new()),
        Some(text) => serde_json::from_str(text),
    }
}

/// The persisted conversation position of one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    pub user_id: UserId,
    pub step: Step,
    pub updated_at: Timestamp,
}

impl ConversationState {
    /// State for a user with no stored conversation.
    ///
    /// Never-seen users start onboarding; users that already have a record
    /// land on the main menu.
    #[must_use]
    pub fn initial(user_id: UserId, registered: bool, now: Timestamp) -> Self {
        let step = if registered {
            Step::MainMenu
        } else {
            Step::AwaitingFirstName
        };
        Self {
            user_id,
            step,
            updated_at: now,
        }
    }
}
