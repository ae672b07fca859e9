mod config;
mod errors;
mod generation;
mod layout;
mod llm_client;
mod models;
mod render;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{load_system_prompt, Config};
use crate::llm_client::LlmClient;
use crate::render::{DocumentRenderer, HttpRenderer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Offerte API v{}", env!("CARGO_PKG_VERSION"));

    // System instruction is startup configuration — loaded here, passed down.
    let system_prompt = load_system_prompt(&config.system_prompt_path)?;
    info!(
        "System prompt loaded from {} ({} chars)",
        config.system_prompt_path,
        system_prompt.len()
    );

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize document renderer
    let renderer: Arc<dyn DocumentRenderer> =
        Arc::new(HttpRenderer::new(config.renderer_url.clone()));
    info!("Document renderer endpoint: {}", config.renderer_url);

    // Build app state
    let state = AppState {
        llm,
        system_prompt: Arc::from(system_prompt),
        renderer,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
