//! Jacarandá Assistant - Customer assistant API.
//!
//! This binary serves the customer assistant API on port 8000.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and out
//! - Candle-based sentence embeddings, computed once at startup for the
//!   product catalog and the SAC policy document
//! - OpenAI-compatible chat completions for policy answers
//! - SQLite for the append-only interaction log
//!
//! # Request flow
//!
//! `POST /mensagem` dispatches by `type`: "catalog" runs the semantic
//! catalog search, "policy" retrieves policy passages and asks the language
//! model. Every successful request appends one record to the interaction
//! log, readable via `GET /historico`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

mod catalog;
mod config;
mod db;
mod embedding;
mod error;
mod llm;
mod middleware;
mod models;
mod policy;
mod routes;
mod search;
mod state;

use config::AssistantConfig;
use embedding::{BertEmbedder, Embedder};
use sentry::integrations::tracing as sentry_tracing;
use state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AssistantConfig) -> Option<sentry::ClientInitGuard> {
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
    let config = AssistantConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "jacaranda_assistant=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // Interaction log: pool + idempotent schema
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    db::init_schema(&pool)
        .await
        .expect("Failed to initialize database schema");
    tracing::info!("Interaction log ready");

    // Load the embedding model, then embed the catalog and the policy
    // document before accepting traffic: the corpus and its index stay
    // aligned for the whole process lifetime. All of this is CPU/IO-bound,
    // so it runs on the blocking pool.
    let embedding_config = config.embedding.clone();
    let embedder: Arc<dyn Embedder> = tokio::task::spawn_blocking(move || {
        BertEmbedder::load(&embedding_config.model_id, &embedding_config.revision)
    })
    .await
    .expect("Embedding model task panicked")
    .map(|loaded| Arc::new(loaded) as Arc<dyn Embedder>)
    .expect("Failed to load embedding model");
    tracing::info!(
        model = %config.embedding.model_id,
        dimension = embedder.dimension(),
        "Embedding model loaded"
    );

    let catalog_path = config.catalog_path.clone();
    let index_embedder = Arc::clone(&embedder);
    let catalog_index =
        tokio::task::spawn_blocking(move || search::build_index(index_embedder.as_ref(), &catalog_path))
            .await
            .expect("Catalog index task panicked")
            .expect("Failed to build catalog index");

    let policy_path = config.policy_doc_path.clone();
    let policy_embedder = Arc::clone(&embedder);
    let policy = tokio::task::spawn_blocking(move || {
        policy::PolicyQa::from_file(policy_embedder.as_ref(), &policy_path)
    })
    .await
    .expect("Policy pipeline task panicked")
    .expect("Failed to build policy pipeline");
    tracing::info!(passages = policy.len(), "Policy document embedded");

    let chat_model: Arc<dyn llm::ChatModel> =
        Arc::new(llm::OpenAiChatClient::new(&config.llm).expect("Failed to create chat client"));

    // Build application state
    let state = AppState::new(
        config.clone(),
        pool,
        embedder,
        Arc::new(catalog_index),
        Arc::new(policy),
        chat_model,
    );

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    // Start server
    let addr = config.socket_addr();
    tracing::info!("assistant listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
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
