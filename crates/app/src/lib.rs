//! # eventbot-app
//!
//! Application layer — use-cases, the conversation engine and **port
//! definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ConversationStateRepository` — per-user dialogue position
//!   - `UserRepository` — onboarded users
//!   - `EventRepository` — scheduled events
//!   - `RegistrationRepository` — sign-ups, unique per user and event
//! - Define **driving/inbound ports** as use-case structs:
//!   - `UserService` — onboarding and admin bootstrap
//!   - `EventService` — create, list, register, unregister, delete
//!   - `DialogueService` — one conversation turn end to end
//! - Provide the **conversation engine**, a pure state machine
//! - Serialize turns per user without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `eventbot-domain` only (plus `tokio::sync` for locks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod conversation;
pub mod ports;
pub mod services;
pub mod user_locks;

#[cfg(test)]
pub(crate) mod testing;
