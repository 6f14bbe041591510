//! Crewdesk portal - member and admin task assignment site.
//!
//! This binary serves both audiences from one process:
//!
//! - Axum web framework with Askama server-side rendering
//! - Two independent OpenID Connect realms (member and admin)
//! - `PostgreSQL` for the member registry and the task list
//! - SNS for task assignment notifications (optional)
//!
//! A realm or notification channel that fails to initialize is disabled
//! with a log line; the process always comes up.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crewdesk_web::config::AppConfig;
use crewdesk_web::db::{self, PgMemberStore, PgTaskStore};
use crewdesk_web::services::{AuthService, NotificationPipeline, SnsChannel, TaskWorkflow};
use crewdesk_web::state::AppState;

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AppConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "crewdesk_web=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // Initialize database connection pool and schema
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    // Provider discovery for both realms; failures disable that realm only
    let http = reqwest::Client::new();
    let auth = AuthService::initialize(&http, &config.auth).await;

    // Notification channel is optional
    let pipeline = match &config.topic_arn {
        Some(topic_arn) => {
            NotificationPipeline::new(Arc::new(SnsChannel::new(topic_arn.clone()).await))
        }
        None => NotificationPipeline::disabled(),
    };

    let members = Arc::new(PgMemberStore::new(pool.clone()));
    let tasks = Arc::new(PgTaskStore::new(pool));
    let workflow = TaskWorkflow::new(tasks.clone(), members.clone(), pipeline);

    let state = AppState::new(config.clone(), auth, members, tasks, workflow);

    // Sentry layers outermost for full request coverage
    let app = crewdesk_web::build_app(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("portal listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
