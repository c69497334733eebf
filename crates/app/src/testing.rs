//! In-memory port implementations shared by the app-layer tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use eventbot_domain::conversation::ConversationState;
use eventbot_domain::error::{ConflictError, EventBotError};
use eventbot_domain::event::{Event, sort_by_start};
use eventbot_domain::id::{EventId, UserId};
use eventbot_domain::registration::Registration;
use eventbot_domain::time::Timestamp;
use eventbot_domain::user::User;

use crate::ports::{
    ConversationStateRepository, EventRepository, RegistrationRepository, UserRepository,
};

fn storage_failure() -> EventBotError {
    EventBotError::Storage(Box::new(std::io::Error::other("storage offline")))
}

#[derive(Default)]
pub struct InMemoryStateRepo {
    store: Mutex<HashMap<UserId, ConversationState>>,
    pub fail_puts: AtomicBool,
}

impl InMemoryStateRepo {
    pub fn snapshot(&self, user_id: &UserId) -> Option<ConversationState> {
        self.store.lock().unwrap().get(user_id).cloned()
    }

    pub fn insert(&self, state: ConversationState) {
        self.store
            .lock()
            .unwrap()
            .insert(state.user_id.clone(), state);
    }
}

impl ConversationStateRepository for InMemoryStateRepo {
    fn get(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Option<ConversationState>, EventBotError>> + Send {
        let result = self.store.lock().unwrap().get(user_id).cloned();
        async move {
            // give concurrent turns a chance to interleave
            tokio::task::yield_now().await;
            Ok(result)
        }
    }

    fn put(
        &self,
        state: ConversationState,
    ) -> impl Future<Output = Result<(), EventBotError>> + Send {
        let result = if self.fail_puts.load(Ordering::SeqCst) {
            Err(storage_failure())
        } else {
            self.insert(state);
            Ok(())
        };
        async { result }
    }
}

#[derive(Default)]
pub struct InMemoryUserRepo {
    store: Mutex<HashMap<UserId, User>>,
}

impl UserRepository for InMemoryUserRepo {
    fn get(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Option<User>, EventBotError>> + Send {
        let result = self.store.lock().unwrap().get(user_id).cloned();
        async { Ok(result) }
    }

    fn put(&self, user: User) -> impl Future<Output = Result<User, EventBotError>> + Send {
        self.store
            .lock()
            .unwrap()
            .insert(user.id.clone(), user.clone());
        async { Ok(user) }
    }
}

#[derive(Default)]
pub struct InMemoryEventRepo {
    store: Mutex<HashMap<EventId, Event>>,
    pub fail_reads: AtomicBool,
}

impl InMemoryEventRepo {
    fn sorted(&self, keep: impl Fn(&Event) -> bool) -> Result<Vec<Event>, EventBotError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(storage_failure());
        }
        let mut events: Vec<Event> = self
            .store
            .lock()
            .unwrap()
            .values()
            .filter(|e| keep(e))
            .cloned()
            .collect();
        sort_by_start(&mut events);
        Ok(events)
    }
}

impl EventRepository for InMemoryEventRepo {
    fn create(&self, event: Event) -> impl Future<Output = Result<Event, EventBotError>> + Send {
        self.store.lock().unwrap().insert(event.id, event.clone());
        async { Ok(event) }
    }

    fn get_by_id(
        &self,
        id: EventId,
    ) -> impl Future<Output = Result<Option<Event>, EventBotError>> + Send {
        let result = self.store.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn list_all(&self) -> impl Future<Output = Result<Vec<Event>, EventBotError>> + Send {
        let result = self.sorted(|_| true);
        async { result }
    }

    fn list_upcoming(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = Result<Vec<Event>, EventBotError>> + Send {
        let result = self.sorted(|e| e.is_upcoming(now));
        async { result }
    }

    fn delete(&self, id: EventId) -> impl Future<Output = Result<bool, EventBotError>> + Send {
        let removed = self.store.lock().unwrap().remove(&id).is_some();
        async move { Ok(removed) }
    }
}

#[derive(Default)]
pub struct InMemoryRegistrationRepo {
    store: Mutex<Vec<Registration>>,
}

impl InMemoryRegistrationRepo {
    pub fn count(&self) -> usize {
        self.store.lock().unwrap().len()
    }
}

impl RegistrationRepository for InMemoryRegistrationRepo {
    fn create(
        &self,
        registration: Registration,
    ) -> impl Future<Output = Result<Registration, EventBotError>> + Send {
        let mut store = self.store.lock().unwrap();
        let duplicate = store
            .iter()
            .any(|r| r.user_id == registration.user_id && r.event_id == registration.event_id);
        let result: Result<Registration, EventBotError> = if duplicate {
            Err(ConflictError::AlreadyRegistered {
                user_id: registration.user_id.to_string(),
                event_id: registration.event_id.to_string(),
            }
            .into())
        } else {
            store.push(registration.clone());
            Ok(registration)
        };
        async { result }
    }

    fn delete(
        &self,
        user_id: &UserId,
        event_id: EventId,
    ) -> impl Future<Output = Result<bool, EventBotError>> + Send {
        let mut store = self.store.lock().unwrap();
        let before = store.len();
        store.retain(|r| !(&r.user_id == user_id && r.event_id == event_id));
        let removed = store.len() != before;
        async move { Ok(removed) }
    }

    fn exists(
        &self,
        user_id: &UserId,
        event_id: EventId,
    ) -> impl Future<Output = Result<bool, EventBotError>> + Send {
        let found = self
            .store
            .lock()
            .unwrap()
            .iter()
            .any(|r| &r.user_id == user_id && r.event_id == event_id);
        async move {
            // lets racing registrations both pass the advisory check
            tokio::task::yield_now().await;
            Ok(found)
        }
    }

    fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Vec<Registration>, EventBotError>> + Send {
        let result: Vec<Registration> = self
            .store
            .lock()
            .unwrap()
            .iter()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn list_for_event(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Vec<Registration>, EventBotError>> + Send {
        let result: Vec<Registration> = self
            .store
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect();
        async { Ok(result) }
    }
}
