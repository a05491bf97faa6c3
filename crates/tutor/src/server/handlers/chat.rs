//! Chat endpoint handler streaming grounded completions

use axum::{
  body::Body,
  extract::{Extension, Json, State},
  http::header,
  response::{IntoResponse, Response},
};

use super::status_for;
use crate::error::Error;
use crate::server::middleware::RequestContext;
use crate::server::models::chat::ChatMessage;
use crate::server::services::streaming::relay;
use crate::server::state::AppState;

const COMPLETION_FAILURE: &str = "Error creating chat completion";

/// POST /api/chat - Answer the last message of a conversation as a raw text stream
pub async fn chat(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(messages): Json<Vec<ChatMessage>>,
) -> Response {
  tracing::debug!(request_id = %context.request_id, messages = messages.len(), "chat request");

  match state.retrieval.answer(&messages).await {
    Ok(stream) => {
      let body = Body::from_stream(relay(stream));
      ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
    }
    Err(e) => {
      tracing::error!(
        request_id = %context.request_id,
        kind = e.kind(),
        error = %e,
        "chat request failed before streaming"
      );
      failure_response(&e)
    }
  }
}

fn failure_response(error: &Error) -> Response {
  let body = match error {
    Error::Completion { .. } => COMPLETION_FAILURE.to_string(),
    other => other.to_string(),
  };
  (status_for(error), body).into_response()
}
