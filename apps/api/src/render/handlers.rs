//! Axum route handlers for PDF generation.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;

use crate::errors::AppError;
use crate::layout::assemble;
use crate::models::proposal::Proposal;
use crate::state::AppState;

/// POST /api/generate-pdf
///
/// Assembles the (reviewed) proposal into a document, hands it to the
/// renderer, and returns the PDF as a download. The only hard requirement on
/// the record is a present `meta` object — everything else degrades to
/// placeholders.
pub async fn handle_generate_pdf(
    State(state): State<AppState>,
    Json(proposal): Json<Proposal>,
) -> Result<impl IntoResponse, AppError> {
    if proposal.meta.is_none() {
        return Err(AppError::Validation(
            "JSON mist het \"meta\" object.".to_string(),
        ));
    }

    let document = assemble(&proposal);
    let pdf = state
        .renderer
        .render(&document)
        .await
        .map_err(|e| AppError::Render(e.to_string()))?;

    let filename = format!("{}.pdf", proposal.filename_stem());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        pdf,
    ))
}
