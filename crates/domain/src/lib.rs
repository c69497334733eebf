//! # eventbot-domain
//!
//! Pure domain model for the event registration bot.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Users** (people who completed onboarding, optionally admins)
//! - Define **Events** and **Registrations**
//! - Define **Conversation state** (the closed set of dialogue steps)
//! - Define **Actions** and **Replies** exchanged with the chat transport
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod action;
pub mod conversation;
pub mod event;
pub mod registration;
pub mod user;
