//! Pure transition functions.
//!
//! [`transition`] interprets one input against the current step. It either
//! settles the turn on its own or asks for an [`Effect`]; once the effect ran,
//! [`settle`] maps its result to the next step and reply. Neither function
//! performs IO.

use eventbot_domain::action::{Command, Input};
use eventbot_domain::conversation::Step;
use eventbot_domain::error::{AuthorizationError, EventBotError, NameField, ValidationError};
use eventbot_domain::time::{Timestamp, year_of};
use eventbot_domain::user::{User, parse_birth_year, validate_person_name};

use super::effect::{Effect, EffectOutput};
use super::messages::{self, Keyboard};

/// Next step and the reply that goes with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled {
    pub next: Step,
    pub text: String,
    pub keyboard: Keyboard,
}

impl Settled {
    fn new(next: Step, text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            next,
            text: text.into(),
            keyboard,
        }
    }
}

/// Outcome of [`transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Settled(Settled),
    Effect(Effect),
}

impl From<Settled> for Transition {
    fn from(settled: Settled) -> Self {
        Self::Settled(settled)
    }
}

/// What the user sent, after recognizing `/start` typed as text.
enum Parsed<'a> {
    Text(&'a str),
    Command(Result<Command, ValidationError>),
}

fn parse(input: &Input) -> Parsed<'_> {
    match input {
        Input::Text(text) if text.trim() == "/start" => Parsed::Command(Ok(Command::Start)),
        Input::Text(text) => Parsed::Text(text),
        Input::Token(token) => Parsed::Command(token.parse()),
    }
}

/// Interpret `input` in `step`.
///
/// `user` is the onboarded record of the sender, if any. `now` provides the
/// current year for birth-year validation.
#[must_use]
pub fn transition(step: &Step, user: Option<&User>, input: &Input, now: Timestamp) -> Transition {
    let parsed = parse(input);
    match (step, user) {
        (_, _) if step.is_onboarding() => onboarding(step, parsed, now),
        (_, None) => Settled::new(
            Step::AwaitingFirstName,
            messages::register_first(),
            messages::retry_keyboard(),
        )
        .into(),
        (Step::CreatingEventAwaitingName | Step::CreatingEventAwaitingDate { .. }, Some(user)) => {
            creating_event(step, user, parsed)
        }
        (_, Some(user)) => menu(step, user, parsed),
    }
}

fn onboarding_prompt(step: &Step) -> String {
    match step {
        Step::AwaitingLastName { first_name } => messages::ask_last_name(first_name),
        Step::AwaitingBirthYear { .. } => messages::ask_birth_year(),
        _ => messages::ask_first_name(),
    }
}

fn stay_with_error(step: &Step, err: &ValidationError, prompt: &str) -> Transition {
    let text = format!(
        "{} {prompt}",
        messages::error(&EventBotError::from(err.clone()))
    );
    Settled::new(step.clone(), text, messages::retry_keyboard()).into()
}

fn onboarding(step: &Step, parsed: Parsed<'_>, now: Timestamp) -> Transition {
    let prompt = onboarding_prompt(step);
    let text = match parsed {
        Parsed::Command(Ok(Command::Start | Command::Retry)) => {
            return Settled::new(step.clone(), prompt, messages::retry_keyboard()).into();
        }
        Parsed::Command(Ok(Command::Cancel)) => {
            return Settled::new(
                Step::AwaitingFirstName,
                messages::onboarding_restarted(),
                messages::retry_keyboard(),
            )
            .into();
        }
        Parsed::Command(Ok(_)) => {
            return Settled::new(
                step.clone(),
                messages::finish_onboarding_first(&prompt),
                messages::retry_keyboard(),
            )
            .into();
        }
        Parsed::Command(Err(err)) => return stay_with_error(step, &err, &prompt),
        Parsed::Text(text) => text,
    };

    match step {
        Step::AwaitingFirstName => match validate_person_name(NameField::FirstName, text) {
            Ok(first_name) => {
                let reply = messages::ask_last_name(&first_name);
                Settled::new(
                    Step::AwaitingLastName { first_name },
                    reply,
                    messages::retry_keyboard(),
                )
                .into()
            }
            Err(err) => stay_with_error(step, &err, &prompt),
        },
        Step::AwaitingLastName { first_name } => {
            match validate_person_name(NameField::LastName, text) {
                Ok(last_name) => Settled::new(
                    Step::AwaitingBirthYear {
                        first_name: first_name.clone(),
                        last_name,
                    },
                    messages::ask_birth_year(),
                    messages::retry_keyboard(),
                )
                .into(),
                Err(err) => stay_with_error(step, &err, &prompt),
            }
        }
        Step::AwaitingBirthYear {
            first_name,
            last_name,
        } => match parse_birth_year(text, year_of(now)) {
            Ok(birth_year) => Transition::Effect(Effect::CompleteOnboarding {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                birth_year,
            }),
            Err(err) => stay_with_error(step, &err, &prompt),
        },
        _ => Settled::new(
            Step::AwaitingFirstName,
            messages::ask_first_name(),
            messages::retry_keyboard(),
        )
        .into(),
    }
}

fn home(user: &User, text: String) -> Transition {
    Settled::new(Step::MainMenu, text, messages::main_keyboard(user.is_admin)).into()
}

fn admin_home(user: &User) -> Transition {
    if user.is_admin {
        Settled::new(
            Step::AdminMenu,
            messages::admin_menu(),
            messages::admin_keyboard(),
        )
        .into()
    } else {
        home(user, messages::main_menu(user))
    }
}

fn creating_event(step: &Step, user: &User, parsed: Parsed<'_>) -> Transition {
    let prompt = match step {
        Step::CreatingEventAwaitingDate { name } => messages::ask_event_date(name),
        _ => messages::ask_event_name(),
    };
    let text = match parsed {
        Parsed::Command(Ok(Command::Cancel | Command::AdminMenu)) => return admin_home(user),
        Parsed::Command(Ok(Command::MainMenu | Command::Start)) => {
            return home(user, messages::main_menu(user));
        }
        Parsed::Command(Ok(Command::Retry)) => {
            return Settled::new(step.clone(), prompt, messages::cancel_keyboard()).into();
        }
        Parsed::Command(Ok(other)) => {
            return stay_with_error(
                step,
                &ValidationError::ActionNotAllowed(other.to_string()),
                &prompt,
            );
        }
        Parsed::Command(Err(err)) => return stay_with_error(step, &err, &prompt),
        Parsed::Text(text) => text,
    };

    match step {
        Step::CreatingEventAwaitingDate { name } => Transition::Effect(Effect::CreateEvent {
            name: name.clone(),
            date_text: text.trim().to_string(),
        }),
        _ => {
            let name = text.trim();
            if name.is_empty() {
                return stay_with_error(step, &ValidationError::EmptyEventName, &prompt);
            }
            Settled::new(
                Step::CreatingEventAwaitingDate {
                    name: name.to_string(),
                },
                messages::ask_event_date(name),
                messages::cancel_keyboard(),
            )
            .into()
        }
    }
}

fn menu_keyboard(step: &Step, is_admin: bool) -> Keyboard {
    match step {
        Step::AdminMenu if is_admin => messages::admin_keyboard(),
        _ => messages::main_keyboard(is_admin),
    }
}

fn menu_stay(step: &Step, user: &User, err: &EventBotError) -> Transition {
    Settled::new(
        step.clone(),
        messages::error(err),
        menu_keyboard(step, user.is_admin),
    )
    .into()
}

fn menu(step: &Step, user: &User, parsed: Parsed<'_>) -> Transition {
    let command = match parsed {
        Parsed::Text(_) => {
            return Settled::new(
                step.clone(),
                messages::use_buttons(),
                menu_keyboard(step, user.is_admin),
            )
            .into();
        }
        Parsed::Command(Err(err)) => return menu_stay(step, user, &EventBotError::from(err)),
        Parsed::Command(Ok(command)) => command,
    };

    if let Some(action) = command.privileged_action()
        && !user.is_admin
    {
        return menu_stay(step, user, &EventBotError::from(AuthorizationError { action }));
    }

    match (step, command) {
        (_, Command::Start | Command::MainMenu | Command::Cancel) => {
            home(user, messages::main_menu(user))
        }
        (_, Command::Help) => home(user, messages::help()),
        (_, Command::BrowseEvents) => Transition::Effect(Effect::ShowUpcomingEvents),
        (_, Command::MyEvents) => Transition::Effect(Effect::ShowMyEvents),
        (_, Command::AdminMenu) => admin_home(user),
        (_, Command::CreateEvent) => Settled::new(
            Step::CreatingEventAwaitingName,
            messages::ask_event_name(),
            messages::cancel_keyboard(),
        )
        .into(),
        (_, Command::AllEvents) => Transition::Effect(Effect::ShowAllEvents),
        (Step::BrowsingEvents, Command::Register(id)) => Transition::Effect(Effect::Register(id)),
        (Step::MyEvents, Command::Unregister(id)) => Transition::Effect(Effect::Unregister(id)),
        (Step::AdminMenu, Command::DeleteEvent(id)) => Transition::Effect(Effect::DeleteEvent(id)),
        (_, other) => menu_stay(
            step,
            user,
            &EventBotError::from(ValidationError::ActionNotAllowed(other.to_string())),
        ),
    }
}

/// Map the result of the effect requested from `step` to the next step and
/// reply.
///
/// Expected business failures keep the user on `step` with an explanatory
/// message.
///
/// # Errors
///
/// Returns the error unchanged when it is a storage failure; the turn must
/// abort without persisting anything.
pub fn settle(
    step: &Step,
    is_admin: bool,
    result: Result<EffectOutput, EventBotError>,
) -> Result<Settled, EventBotError> {
    let output = match result {
        Ok(output) => output,
        Err(err) if err.is_expected() => return Ok(stay_after_failure(step, is_admin, &err)),
        Err(err) => return Err(err),
    };

    let settled = match output {
        EffectOutput::Onboarded(user) => Settled::new(
            Step::MainMenu,
            messages::welcome(&user),
            messages::main_keyboard(user.is_admin),
        ),
        EffectOutput::UpcomingEvents(events) if events.is_empty() => Settled::new(
            Step::MainMenu,
            messages::no_upcoming_events(),
            messages::main_keyboard(is_admin),
        ),
        EffectOutput::UpcomingEvents(events) => Settled::new(
            Step::BrowsingEvents,
            messages::upcoming_events(&events),
            messages::register_keyboard(&events),
        ),
        EffectOutput::MyEvents(events) if events.is_empty() => Settled::new(
            Step::MainMenu,
            messages::no_registrations(),
            messages::main_keyboard(is_admin),
        ),
        EffectOutput::MyEvents(events) => Settled::new(
            Step::MyEvents,
            messages::my_events(&events),
            messages::unregister_keyboard(&events),
        ),
        EffectOutput::AllEvents(overviews) if overviews.is_empty() => Settled::new(
            Step::AdminMenu,
            messages::no_events(),
            messages::admin_keyboard(),
        ),
        EffectOutput::AllEvents(overviews) => Settled::new(
            Step::AdminMenu,
            messages::all_events(&overviews),
            messages::delete_keyboard(&overviews),
        ),
        EffectOutput::EventCreated(event) => Settled::new(
            Step::AdminMenu,
            messages::event_created(&event),
            messages::admin_keyboard(),
        ),
        EffectOutput::Registered(event) => Settled::new(
            Step::MainMenu,
            messages::registered(&event),
            messages::main_keyboard(is_admin),
        ),
        EffectOutput::Unregistered(event) => Settled::new(
            Step::MainMenu,
            messages::unregistered(&event),
            messages::main_keyboard(is_admin),
        ),
        EffectOutput::EventDeleted(event) => Settled::new(
            Step::AdminMenu,
            messages::event_deleted(&event),
            messages::admin_keyboard(),
        ),
    };
    Ok(settled)
}

/// Abandon a flow left idle for too long.
///
/// Onboarding restarts from the first question and event creation falls back
/// to the admin menu. Returns `None` for steps outside a flow.
#[must_use]
pub fn expire(step: &Step, is_admin: bool) -> Option<Settled> {
    if step.is_onboarding() {
        Some(Settled::new(
            Step::AwaitingFirstName,
            messages::session_expired(&messages::ask_first_name()),
            messages::retry_keyboard(),
        ))
    } else if step.is_creating_event() {
        let (next, prompt, keyboard) = if is_admin {
            (Step::AdminMenu, messages::admin_menu(), messages::admin_keyboard())
        } else {
            (
                Step::MainMenu,
                messages::use_buttons(),
                messages::main_keyboard(false),
            )
        };
        Some(Settled::new(next, messages::session_expired(&prompt), keyboard))
    } else {
        None
    }
}

fn stay_after_failure(step: &Step, is_admin: bool, err: &EventBotError) -> Settled {
    let text = messages::error(err);
    match step {
        Step::AwaitingBirthYear { .. } => Settled::new(
            step.clone(),
            format!("{text} {}", messages::ask_birth_year()),
            messages::retry_keyboard(),
        ),
        Step::CreatingEventAwaitingDate { name } => Settled::new(
            step.clone(),
            format!("{text} {}", messages::ask_event_date(name)),
            messages::cancel_keyboard(),
        ),
        _ if step.is_in_progress() => Settled::new(step.clone(), text, messages::retry_keyboard()),
        _ => Settled::new(step.clone(), text, menu_keyboard(step, is_admin)),
    }
}
