//! Axum route handlers for the analyze pipeline and the JSON export.

use std::convert::Infallible;

use axum::extract::State;
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use futures::{Stream, StreamExt};
use serde::Deserialize;

use crate::errors::AppError;
use crate::generation::coordinator::generate_proposal;
use crate::models::proposal::Proposal;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub briefing_text: String,
}

/// POST /api/analyze
///
/// Validates the briefing synchronously, then streams session events over SSE:
/// progress notifications while the model responds, and exactly one terminal
/// `complete` or `error` event. Client disconnect drops the stream, which
/// abandons the upstream call.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let briefing = request.briefing_text.trim().to_string();
    if briefing.is_empty() {
        return Err(AppError::Validation(
            "Geen briefing tekst ontvangen.".to_string(),
        ));
    }

    let events =
        generate_proposal(state.llm.clone(), state.system_prompt.clone(), briefing).map(|event| {
            let sse = Event::default().json_data(&event).unwrap_or_else(|_| {
                Event::default().data(r#"{"type":"error","error":"Interne serialisatiefout."}"#)
            });
            Ok::<_, Infallible>(sse)
        });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// POST /api/export-json
///
/// Returns the proposal as an indented JSON download — the durable artifact
/// next to the PDF. Key order follows the schema declaration.
pub async fn handle_export_json(
    Json(proposal): Json<Proposal>,
) -> Result<impl IntoResponse, AppError> {
    let body = serde_json::to_string_pretty(&proposal)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize proposal: {e}")))?;

    let filename = format!("{}.json", proposal.filename_stem());
    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/json; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    ))
}
