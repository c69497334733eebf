//! # eventbotd — eventbot daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`eventbot.toml`, environment overrides)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Build the axum router, injecting the dialogue service
//! - Bind to a TCP port and serve until SIGTERM/SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use eventbot_adapter_http_axum::router;
use eventbot_adapter_http_axum::state::AppState;
use eventbot_adapter_storage_sqlite_sqlx::{
    Config as StorageConfig, SqliteConversationStateRepository, SqliteEventRepository,
    SqliteRegistrationRepository, SqliteUserRepository,
};
use eventbot_app::services::dialogue_service::DialogueService;
use eventbot_app::services::event_service::EventService;
use eventbot_app::services::user_service::UserService;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Services
    let users = UserService::new(SqliteUserRepository::new(pool.clone()), config.admin_ids());
    let events = EventService::new(
        SqliteEventRepository::new(pool.clone()),
        SqliteRegistrationRepository::new(pool.clone()),
    );
    let dialogue = DialogueService::new(users, events, SqliteConversationStateRepository::new(pool))
        .with_flow_expiry(config.flow_expiry());

    // HTTP
    let app = router::build(AppState::new(dialogue));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, admins = config.bot.admins.len(), "eventbotd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("eventbotd stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM. In-flight turns finish before the server
/// returns.
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(err), _) | (_, Err(err)) => {
            tracing::error!(error = %err, "failed to install signal handlers");
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => tracing::info!("received SIGINT, shutting down"),
    }
}
