//! User-facing texts and keyboards.

use eventbot_domain::action::{Button, Command};
use eventbot_domain::error::EventBotError;
use eventbot_domain::event::Event;
use eventbot_domain::user::User;

use crate::services::event_service::EventOverview;

/// Rows of inline buttons.
pub type Keyboard = Vec<Vec<Button>>;

/// Shown when a turn fails for infrastructure reasons.
pub const TRY_AGAIN: &str = "Something went wrong on our side. Please try again in a moment.";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M UTC";
const LABEL_NAME_LEN: usize = 20;

pub fn ask_first_name() -> String {
    "Welcome! Let's get you registered. What is your first name?".to_string()
}

pub fn ask_last_name(first_name: &str) -> String {
    format!("Nice to meet you, {first_name}! What is your last name?")
}

pub fn ask_birth_year() -> String {
    "What year were you born? (for example 1990)".to_string()
}

pub fn onboarding_restarted() -> String {
    format!("Registration restarted. {}", ask_first_name())
}

pub fn finish_onboarding_first(prompt: &str) -> String {
    format!("Please finish registration first. {prompt}")
}

pub fn session_expired(prompt: &str) -> String {
    format!("Your previous session expired. {prompt}")
}

pub fn register_first() -> String {
    format!("You are not registered yet. {}", ask_first_name())
}

pub fn welcome(user: &User) -> String {
    format!(
        "Welcome, {}! Choose what you want to do.",
        user.full_name()
    )
}

pub fn main_menu(user: &User) -> String {
    format!("Main menu, {}. Choose what you want to do.", user.first_name)
}

pub fn help() -> String {
    [
        "Browse events: see upcoming events and register.",
        "My events: see what you registered for and unregister.",
        "Main menu: come back here at any time.",
    ]
    .join("\n")
}

pub fn use_buttons() -> String {
    "Please use the buttons below.".to_string()
}

pub fn admin_menu() -> String {
    "Admin menu. Create an event or review all events.".to_string()
}

pub fn ask_event_name() -> String {
    "What is the name of the new event?".to_string()
}

pub fn ask_event_date(name: &str) -> String {
    format!(
        "When does \"{name}\" start? Send an ISO-8601 date, for example 2030-05-01 18:30 (UTC)."
    )
}

pub fn no_upcoming_events() -> String {
    "There are no upcoming events right now.".to_string()
}

pub fn no_registrations() -> String {
    "You are not registered for any upcoming events.".to_string()
}

pub fn no_events() -> String {
    "No events have been created yet.".to_string()
}

pub fn upcoming_events(events: &[Event]) -> String {
    let mut text = String::from("Upcoming events:\n");
    for event in events {
        text.push_str(&event_line(event));
    }
    text
}

pub fn my_events(events: &[Event]) -> String {
    let mut text = String::from("Your upcoming events:\n");
    for event in events {
        text.push_str(&event_line(event));
    }
    text
}

pub fn all_events(overviews: &[EventOverview]) -> String {
    let mut text = String::from("All events:\n");
    for EventOverview { event, attendees } in overviews {
        text.push_str(&format!(
            "\n{} ({})\nAttendees: {attendees}\n",
            event.name,
            event.starts_at.format(DATE_FORMAT)
        ));
    }
    text
}

pub fn event_created(event: &Event) -> String {
    format!(
        "Event \"{}\" created for {}.",
        event.name,
        event.starts_at.format(DATE_FORMAT)
    )
}

pub fn registered(event: &Event) -> String {
    format!("You are registered for \"{}\".", event.name)
}

pub fn unregistered(event: &Event) -> String {
    format!("You are no longer registered for \"{}\".", event.name)
}

pub fn event_deleted(event: &Event) -> String {
    format!("Event \"{}\" deleted.", event.name)
}

/// Message for an expected business failure.
pub fn error(err: &EventBotError) -> String {
    match err {
        EventBotError::Validation(e) => format!("Invalid input: {e}."),
        EventBotError::Authorization(e) => format!("Access denied: {e}."),
        EventBotError::NotFound(e) => format!("Sorry, {e}."),
        EventBotError::Conflict(_) => "You are already registered for this event.".to_string(),
        EventBotError::Storage(_) => TRY_AGAIN.to_string(),
    }
}

fn event_line(event: &Event) -> String {
    format!("\n{}\nDate: {}\n", event.name, event.starts_at.format(DATE_FORMAT))
}

fn short(name: &str) -> String {
    if name.chars().count() <= LABEL_NAME_LEN {
        name.to_string()
    } else {
        let head: String = name.chars().take(LABEL_NAME_LEN).collect();
        format!("{head}...")
    }
}

pub fn main_keyboard(is_admin: bool) -> Keyboard {
    let mut rows = vec![
        vec![
            Button::new("Browse events", Command::BrowseEvents),
            Button::new("My events", Command::MyEvents),
        ],
        vec![Button::new("Help", Command::Help)],
    ];
    if is_admin {
        rows.push(vec![Button::new("Admin menu", Command::AdminMenu)]);
    }
    rows
}

pub fn admin_keyboard() -> Keyboard {
    vec![
        vec![
            Button::new("Create event", Command::CreateEvent),
            Button::new("All events", Command::AllEvents),
        ],
        vec![Button::new("Main menu", Command::MainMenu)],
    ]
}

/// Offered while a multi-turn flow waits for typed input.
pub fn retry_keyboard() -> Keyboard {
    vec![vec![
        Button::new("Retry", Command::Retry),
        Button::new("Cancel", Command::Cancel),
    ]]
}

pub fn cancel_keyboard() -> Keyboard {
    vec![vec![Button::new("Cancel", Command::Cancel)]]
}

pub fn register_keyboard(events: &[Event]) -> Keyboard {
    let mut rows: Keyboard = events
        .iter()
        .map(|e| {
            vec![Button::new(
                format!("Register: {}", short(&e.name)),
                Command::Register(e.id),
            )]
        })
        .collect();
    rows.push(vec![Button::new("Main menu", Command::MainMenu)]);
    rows
}

pub fn unregister_keyboard(events: &[Event]) -> Keyboard {
    let mut rows: Keyboard = events
        .iter()
        .map(|e| {
            vec![Button::new(
                format!("Unregister: {}", short(&e.name)),
                Command::Unregister(e.id),
            )]
        })
        .collect();
    rows.push(vec![Button::new("Main menu", Command::MainMenu)]);
    rows
}

pub fn delete_keyboard(overviews: &[EventOverview]) -> Keyboard {
    let mut rows: Keyboard = overviews
        .iter()
        .map(|o| {
            vec![Button::new(
                format!("Delete: {}", short(&o.event.name)),
                Command::DeleteEvent(o.event.id),
            )]
        })
        .collect();
    rows.extend(admin_keyboard());
    rows
}
