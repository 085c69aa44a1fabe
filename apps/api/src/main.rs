mod analysis;
mod config;
mod db;
mod errors;
mod jobs;
mod llm_client;
mod quiz;
mod retrieval;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::GeminiAnalysisGenerator;
use crate::config::Config;
use crate::db::create_pool;
use crate::jobs::JobSearchClient;
use crate::llm_client::GeminiClient;
use crate::quiz::registry::ModuleRegistry;
use crate::quiz::session::{spawn_session_sweeper, PgSessionStore, SessionStore};
use crate::retrieval::VectorContextRetriever;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Advisor API v{}", env!("CARGO_PKG_VERSION"));

    // Parse and validate the quiz modules before accepting traffic:
    // a broken graph must fail here, not when a user reaches the bad edge.
    let modules = Arc::new(ModuleRegistry::builtin()?);
    info!("Quiz modules loaded and validated");

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;

    // Initialize Gemini client (generation + embeddings)
    let gemini = GeminiClient::new(config.gemini_api_key.clone());
    info!(
        "Gemini client initialized (generation: {}, embedding: {})",
        llm_client::GENERATION_MODEL,
        llm_client::EMBEDDING_MODEL
    );

    // Initialize job search client
    if config.theirstack_api_key.is_none() {
        info!("No job search API key configured; job postings will be empty");
    }
    let job_client = JobSearchClient::new(config.theirstack_api_key.clone());

    // Session store + expiry sweep for abandoned sessions
    let sessions: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(pool.clone()));
    spawn_session_sweeper(sessions.clone(), config.session_ttl_minutes);
    info!(
        "Session sweeper running (TTL: {} minutes)",
        config.session_ttl_minutes
    );

    // Build app state
    let state = AppState {
        modules,
        sessions,
        retriever: Arc::new(VectorContextRetriever::new(gemini.clone(), pool)),
        generator: Arc::new(GeminiAnalysisGenerator::new(gemini)),
        jobs: job_client,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
