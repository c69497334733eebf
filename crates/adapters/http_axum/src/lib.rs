//! # eventbot-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Receive bot-platform updates on `POST /webhook`, turn them into
//!   [`Action`](eventbot_domain::action::Action)s and answer with the reply
//!   inline, as a `sendMessage` method call
//! - Serve a read-only JSON listing of upcoming events (`GET /api/events`)
//! - Answer the liveness probe (`GET /health`)
//!
//! ## Dependency rule
//! Depends on `eventbot-app` (for port traits and services) and
//! `eventbot-domain` (for the types used in request/response mapping). Never
//! leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
pub mod webhook;
