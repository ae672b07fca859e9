//! Document rendering — the handoff seam to the external PDF renderer.
//!
//! The assembled [`Document`] is a declarative block model; turning it into
//! PDF bytes (pagination, fonts, drawing) is delegated to a renderer service
//! behind the [`DocumentRenderer`] trait. `AppState` carries the renderer as
//! `Arc<dyn DocumentRenderer>`, so tests swap in a stub without touching the
//! handlers.

pub mod handlers;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::layout::Document;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("renderer error (status {status}): {message}")]
    Service { status: u16, message: String },
}

/// Turns an assembled document into PDF bytes.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, document: &Document) -> Result<Bytes, RenderError>;
}

/// Production renderer: POSTs the serialized document to the configured
/// renderer endpoint and returns the PDF body it answers with.
pub struct HttpRenderer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRenderer {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl DocumentRenderer for HttpRenderer {
    async fn render(&self, document: &Document) -> Result<Bytes, RenderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(document)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RenderError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let pdf = response.bytes().await?;
        debug!("renderer returned {} bytes", pdf.len());
        Ok(pdf)
    }
}
