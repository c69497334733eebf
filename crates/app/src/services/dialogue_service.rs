//! Dialogue service — runs one conversation turn end to end.
//!
//! A turn holds the sender's lock from the first read to the final write:
//! load state and user, let the engine decide, run the requested effect,
//! settle, persist, reply. A storage failure anywhere aborts the turn before
//! the state is written.

use chrono::Duration;
use eventbot_domain::action::{Action, Reply};
use eventbot_domain::conversation::ConversationState;
use eventbot_domain::error::{EventBotError, NotFoundError};
use eventbot_domain::id::UserId;
use eventbot_domain::time::{self, Timestamp};
use eventbot_domain::user::User;

use crate::conversation::{self, Effect, EffectOutput, Settled, Transition};
use crate::ports::{
    ConversationStateRepository, EventRepository, RegistrationRepository, UserRepository,
};
use crate::services::event_service::EventService;
use crate::services::user_service::UserService;
use crate::user_locks::UserLocks;

/// Conversation orchestrator shared by every transport.
pub struct DialogueService<UR, ER, RR, SR> {
    users: UserService<UR>,
    events: EventService<ER, RR>,
    states: SR,
    locks: UserLocks,
    flow_expiry: Option<Duration>,
}

impl<UR, ER, RR, SR> DialogueService<UR, ER, RR, SR>
where
    UR: UserRepository,
    ER: EventRepository,
    RR: RegistrationRepository,
    SR: ConversationStateRepository,
{
    /// Create a new orchestrator. Flows never expire unless
    /// [`with_flow_expiry`](Self::with_flow_expiry) says otherwise.
    pub fn new(users: UserService<UR>, events: EventService<ER, RR>, states: SR) -> Self {
        Self {
            users,
            events,
            states,
            locks: UserLocks::new(),
            flow_expiry: None,
        }
    }

    /// Abandon multi-turn flows idle for longer than `expiry`.
    #[must_use]
    pub fn with_flow_expiry(mut self, expiry: Option<Duration>) -> Self {
        self.flow_expiry = expiry;
        self
    }

    /// The event use-cases, for read-only transports.
    pub fn events(&self) -> &EventService<ER, RR> {
        &self.events
    }

    /// Process one inbound action and return the reply to send.
    ///
    /// # Errors
    ///
    /// Returns a storage error when loading, running the effect or saving
    /// fails. Nothing is persisted in that case. Business failures are not
    /// errors; they come back as a reply.
    #[tracing::instrument(skip(self, action), fields(user_id = %action.user_id))]
    pub async fn handle(&self, action: Action) -> Result<Reply, EventBotError> {
        let Action { user_id, input } = action;
        let _turn = self.locks.acquire(&user_id).await;

        let now = time::now();
        let user = self.users.find(&user_id).await?;
        let is_admin = user.as_ref().is_some_and(|u| u.is_admin);
        let state = self
            .states
            .get(&user_id)
            .await?
            .unwrap_or_else(|| ConversationState::initial(user_id.clone(), user.is_some(), now));

        let settled = if let Some(expired) = self.expired(&state, is_admin, now) {
            tracing::info!(step = %state.step.kind(), "flow expired");
            expired
        } else {
            match conversation::transition(&state.step, user.as_ref(), &input, now) {
                Transition::Settled(settled) => settled,
                Transition::Effect(effect) => {
                    let result = self.run(&user_id, user.as_ref(), effect).await;
                    if let Err(err) = &result
                        && err.is_expected()
                    {
                        tracing::debug!(error = %err, "effect rejected");
                    }
                    conversation::settle(&state.step, is_admin, result)?
                }
            }
        };

        tracing::debug!(from = %state.step.kind(), to = %settled.next.kind(), "turn settled");
        self.states
            .put(ConversationState {
                user_id: user_id.clone(),
                step: settled.next,
                updated_at: now,
            })
            .await?;
        Ok(Reply::new(user_id, settled.text, settled.keyboard))
    }

    fn expired(&self, state: &ConversationState, is_admin: bool, now: Timestamp) -> Option<Settled> {
        let expiry = self.flow_expiry?;
        if now - state.updated_at <= expiry {
            return None;
        }
        conversation::expire(&state.step, is_admin)
    }

    async fn run(
        &self,
        user_id: &UserId,
        user: Option<&User>,
        effect: Effect,
    ) -> Result<EffectOutput, EventBotError> {
        match effect {
            Effect::CompleteOnboarding {
                first_name,
                last_name,
                birth_year,
            } => self
                .users
                .complete_onboarding(user_id.clone(), &first_name, &last_name, birth_year)
                .await
                .map(EffectOutput::Onboarded),
            Effect::ShowUpcomingEvents => self
                .events
                .list_upcoming_events()
                .await
                .map(EffectOutput::UpcomingEvents),
            Effect::ShowMyEvents => self
                .events
                .list_my_upcoming_events(user_id)
                .await
                .map(EffectOutput::MyEvents),
            Effect::ShowAllEvents => self
                .events
                .list_all_events(acting(user_id, user)?)
                .await
                .map(EffectOutput::AllEvents),
            Effect::CreateEvent { name, date_text } => self
                .events
                .create_event(acting(user_id, user)?, &name, &date_text)
                .await
                .map(EffectOutput::EventCreated),
            Effect::Register(event_id) => self
                .events
                .register_for_event(user_id, event_id)
                .await
                .map(EffectOutput::Registered),
            Effect::Unregister(event_id) => self
                .events
                .unregister_from_event(user_id, event_id)
                .await
                .map(EffectOutput::Unregistered),
            Effect::DeleteEvent(event_id) => self
                .events
                .delete_event(acting(user_id, user)?, event_id)
                .await
                .map(EffectOutput::EventDeleted),
        }
    }
}

fn acting<'a>(user_id: &UserId, user: Option<&'a User>) -> Result<&'a User, EventBotError> {
    user.ok_or_else(|| {
        NotFoundError {
            entity: "user",
            id: user_id.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        InMemoryEventRepo, InMemoryRegistrationRepo, InMemoryStateRepo, InMemoryUserRepo,
    };
    use eventbot_domain::action::Command;
    use eventbot_domain::conversation::Step;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    type Service = DialogueService<
        Arc<InMemoryUserRepo>,
        Arc<InMemoryEventRepo>,
        Arc<InMemoryRegistrationRepo>,
        Arc<InMemoryStateRepo>,
    >;

    const ADMIN: &str = "1";
    const MEMBER: &str = "2";

    struct Harness {
        svc: Service,
        states: Arc<InMemoryStateRepo>,
        events: Arc<InMemoryEventRepo>,
        registrations: Arc<InMemoryRegistrationRepo>,
    }

    fn harness() -> Harness {
        let users = Arc::new(InMemoryUserRepo::default());
        let events = Arc::new(InMemoryEventRepo::default());
        let registrations = Arc::new(InMemoryRegistrationRepo::default());
        let states = Arc::new(InMemoryStateRepo::default());
        let admins: HashSet<UserId> = [UserId::new(ADMIN)].into_iter().collect();
        let svc = DialogueService::new(
            UserService::new(users, admins),
            EventService::new(Arc::clone(&events), Arc::clone(&registrations)),
            Arc::clone(&states),
        );
        Harness {
            svc,
            states,
            events,
            registrations,
        }
    }

    impl Harness {
        async fn text(&self, user: &str, text: &str) -> Reply {
            self.svc.handle(Action::text(user, text)).await.unwrap()
        }

        async fn press(&self, user: &str, token: impl ToString) -> Reply {
            self.svc
                .handle(Action::token(user, token.to_string()))
                .await
                .unwrap()
        }

        fn step(&self, user: &str) -> Step {
            self.states.snapshot(&UserId::new(user)).unwrap().step
        }

        async fn onboard(&self, user: &str) {
            self.text(user, "/start").await;
            self.text(user, "Ivan").await;
            self.text(user, "Petrov").await;
            self.text(user, "1990").await;
            assert_eq!(self.step(user), Step::MainMenu);
        }

        async fn create_event(&self, name: &str, starts_in: Duration) -> Reply {
            self.press(ADMIN, Command::AdminMenu).await;
            self.press(ADMIN, Command::CreateEvent).await;
            self.text(ADMIN, name).await;
            self.text(ADMIN, &(time::now() + starts_in).to_rfc3339())
                .await
        }
    }

    fn token_with_prefix(reply: &Reply, prefix: &str) -> String {
        reply
            .tokens()
            .find(|t| t.starts_with(prefix))
            .map(str::to_string)
            .unwrap()
    }

    #[tokio::test]
    async fn should_ask_last_name_after_first_name_for_fresh_user() {
        let h = harness();
        let reply = h.text(MEMBER, "Ivan").await;

        assert!(reply.text.contains("last name"));
        let step = h.step(MEMBER);
        assert_eq!(step.kind().as_str(), "awaiting_last_name");
        assert_eq!(step.context().get("firstName").map(String::as_str), Some("Ivan"));
    }

    #[tokio::test]
    async fn should_keep_birth_year_step_on_out_of_range_year() {
        let h = harness();
        h.text(MEMBER, "Ivan").await;
        h.text(MEMBER, "Petrov").await;
        let reply = h.text(MEMBER, "1800").await;

        assert!(reply.text.contains("between 1900"));
        assert!(matches!(h.step(MEMBER), Step::AwaitingBirthYear { .. }));
    }

    #[tokio::test]
    async fn should_land_on_main_menu_after_onboarding() {
        let h = harness();
        h.onboard(MEMBER).await;
        let state = h.states.snapshot(&UserId::new(MEMBER)).unwrap();
        assert!(state.step.context().is_empty());
    }

    #[tokio::test]
    async fn should_deny_create_event_to_non_admin() {
        let h = harness();
        h.onboard(MEMBER).await;
        let reply = h.press(MEMBER, "create_event").await;

        assert!(reply.text.contains("admin privileges required"));
        assert_eq!(h.step(MEMBER), Step::MainMenu);
    }

    #[tokio::test]
    async fn should_let_admin_create_an_event() {
        let h = harness();
        h.onboard(ADMIN).await;
        let reply = h.create_event("Meetup", Duration::days(1)).await;

        assert!(reply.text.contains("Meetup"));
        assert_eq!(h.step(ADMIN), Step::AdminMenu);
        let upcoming = h.svc.events().list_upcoming_events().await.unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].name, "Meetup");
    }

    #[tokio::test]
    async fn should_keep_date_step_when_date_is_in_the_past() {
        let h = harness();
        h.onboard(ADMIN).await;
        let reply = h.create_event("Meetup", -Duration::days(1)).await;

        assert!(reply.text.contains("future"));
        assert_eq!(
            h.step(ADMIN),
            Step::CreatingEventAwaitingDate {
                name: "Meetup".to_string()
            }
        );
    }

    #[tokio::test]
    async fn should_register_then_unregister() {
        let h = harness();
        h.onboard(ADMIN).await;
        h.onboard(MEMBER).await;
        h.create_event("Meetup", Duration::days(1)).await;

        let listing = h.press(MEMBER, Command::BrowseEvents).await;
        assert_eq!(h.step(MEMBER), Step::BrowsingEvents);
        let register = token_with_prefix(&listing, "register_");
        let reply = h.press(MEMBER, &register).await;
        assert!(reply.text.contains("registered"));
        assert_eq!(h.step(MEMBER), Step::MainMenu);

        let mine = h.press(MEMBER, Command::MyEvents).await;
        assert_eq!(h.step(MEMBER), Step::MyEvents);
        let unregister = token_with_prefix(&mine, "unregister_");
        let reply = h.press(MEMBER, &unregister).await;
        assert_eq!(h.step(MEMBER), Step::MainMenu);
        assert!(reply.tokens().all(|t| !t.starts_with("unregister_")));

        let user_id = UserId::new(MEMBER);
        assert!(
            h.svc
                .events()
                .list_my_upcoming_events(&user_id)
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(h.registrations.count(), 0);
    }

    #[tokio::test]
    async fn should_report_double_registration_as_conflict() {
        let h = harness();
        h.onboard(ADMIN).await;
        h.onboard(MEMBER).await;
        h.create_event("Meetup", Duration::days(1)).await;

        let listing = h.press(MEMBER, Command::BrowseEvents).await;
        let register = token_with_prefix(&listing, "register_");
        h.press(MEMBER, &register).await;
        h.press(MEMBER, Command::BrowseEvents).await;
        let reply = h.press(MEMBER, &register).await;

        assert!(reply.text.contains("already registered"));
        assert_eq!(h.step(MEMBER), Step::BrowsingEvents);
        assert_eq!(h.registrations.count(), 1);
    }

    #[tokio::test]
    async fn should_reject_register_token_outside_browsing() {
        let h = harness();
        h.onboard(MEMBER).await;
        let reply = h
            .press(MEMBER, Command::Register(eventbot_domain::id::EventId::new()))
            .await;
        assert!(reply.text.contains("not available"));
        assert_eq!(h.step(MEMBER), Step::MainMenu);
    }

    #[tokio::test]
    async fn should_show_admin_button_only_to_admins() {
        let h = harness();
        h.onboard(ADMIN).await;
        h.onboard(MEMBER).await;
        let admin = h.press(ADMIN, Command::MainMenu).await;
        let member = h.press(MEMBER, Command::MainMenu).await;
        assert!(admin.tokens().any(|t| t == "admin_menu"));
        assert!(!member.tokens().any(|t| t == "admin_menu"));
    }

    #[tokio::test]
    async fn should_serialize_concurrent_turns_of_one_user() {
        let h = harness();
        let (first, second) = tokio::join!(
            h.svc.handle(Action::text(MEMBER, "Ivan")),
            h.svc.handle(Action::text(MEMBER, "Petrov"))
        );
        first.unwrap();
        second.unwrap();

        assert_eq!(
            h.step(MEMBER),
            Step::AwaitingBirthYear {
                first_name: "Ivan".to_string(),
                last_name: "Petrov".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn should_not_persist_state_when_storage_fails() {
        let h = harness();
        h.onboard(MEMBER).await;

        h.events.fail_reads.store(true, Ordering::SeqCst);
        let result = h.svc.handle(Action::token(MEMBER, "browse_events")).await;
        assert!(matches!(result, Err(EventBotError::Storage(_))));
        assert_eq!(h.step(MEMBER), Step::MainMenu);
    }

    #[tokio::test]
    async fn should_fail_turn_when_state_cannot_be_saved() {
        let h = harness();
        h.states.fail_puts.store(true, Ordering::SeqCst);
        let result = h.svc.handle(Action::text(MEMBER, "Ivan")).await;
        assert!(result.is_err());
        assert!(h.states.snapshot(&UserId::new(MEMBER)).is_none());
    }

    #[tokio::test]
    async fn should_restart_stale_onboarding_when_expiry_is_set() {
        let mut h = harness();
        h.svc = h.svc.with_flow_expiry(Some(Duration::minutes(30)));
        h.states.insert(ConversationState {
            user_id: UserId::new(MEMBER),
            step: Step::AwaitingLastName {
                first_name: "Ivan".to_string(),
            },
            updated_at: time::now() - Duration::hours(1),
        });

        let reply = h.text(MEMBER, "Petrov").await;
        assert!(reply.text.contains("expired"));
        assert_eq!(h.step(MEMBER), Step::AwaitingFirstName);
    }

    #[tokio::test]
    async fn should_keep_stale_flows_without_expiry() {
        let h = harness();
        h.states.insert(ConversationState {
            user_id: UserId::new(MEMBER),
            step: Step::AwaitingLastName {
                first_name: "Ivan".to_string(),
            },
            updated_at: time::now() - Duration::days(30),
        });

        h.text(MEMBER, "Petrov").await;
        assert!(matches!(h.step(MEMBER), Step::AwaitingBirthYear { .. }));
    }
}
