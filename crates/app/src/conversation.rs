//! Conversation engine — the pure finite-state machine behind the dialogue.
//!
//! The engine never touches storage. The orchestration layer feeds it the
//! current step, runs the [`Effect`] it asks for and hands the result back to
//! [`settle`].

pub mod effect;
pub mod messages;
pub mod transition;

pub use effect::{Effect, EffectOutput};
pub use transition::{Settled, Transition, expire, settle, transition};
