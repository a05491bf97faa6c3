//! Professor ingestion endpoint handlers

use axum::{
  extract::{rejection::JsonRejection, Extension, Json, State},
  http::StatusCode,
  response::Json as ResponseJson,
};
use chrono::Utc;

use super::status_for;
use crate::server::middleware::RequestContext;
use crate::server::state::AppState;
use crate::server::types::{ErrorResponse, IngestRequest, IngestResponse};

const SUCCESS_MESSAGE: &str = "Data successfully scraped and upserted into the vector index";

/// POST /api/scrape-professor - Scrape a profile page and store the professor
pub async fn scrape_professor(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<ResponseJson<IngestResponse>, (StatusCode, ResponseJson<ErrorResponse>)> {
  // Body errors get the same JSON error shape as pipeline failures
  let Json(request) = payload.map_err(|rejection| {
    tracing::debug!(request_id = %context.request_id, error = %rejection, "unreadable ingest body");
    (
      StatusCode::BAD_REQUEST,
      ResponseJson(ErrorResponse::new(format!("Invalid request body: {}", rejection.body_text()))),
    )
  })?;

  let url = match request.url.as_deref().map(str::trim) {
    Some(url) if !url.is_empty() => url.to_string(),
    _ => {
      return Err((StatusCode::BAD_REQUEST, ResponseJson(ErrorResponse::new("URL is required"))));
    }
  };

  match state.ingestion.ingest(&url).await {
    Ok(ingested) => {
      tracing::info!(request_id = %context.request_id, id = %ingested.id, "professor stored");
      Ok(ResponseJson(IngestResponse {
        message: SUCCESS_MESSAGE.to_string(),
        id: ingested.id,
        ingested_at: Utc::now(),
        data: ingested.record,
      }))
    }
    Err(e) => {
      tracing::error!(
        request_id = %context.request_id,
        kind = e.kind(),
        error = %e,
        %url,
        "failed to scrape or upsert professor"
      );
      Err((status_for(&e), ResponseJson(ErrorResponse::new(e.to_string()))))
    }
  }
}
