use std::sync::Arc;

use crate::llm_client::LlmClient;
use crate::render::DocumentRenderer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// System instruction for the analyze call — loaded once at startup and
    /// passed down as a value; nothing below `main` touches the filesystem.
    pub system_prompt: Arc<str>,
    /// Pluggable document renderer. Production: `HttpRenderer`; tests swap in
    /// a stub.
    pub renderer: Arc<dyn DocumentRenderer>,
}
