pub mod chat;
pub mod professors;
pub mod status;

use axum::http::StatusCode;

use crate::error::Error;

/// HTTP status for a pipeline failure
pub fn status_for(error: &Error) -> StatusCode {
  match error {
    Error::Validation { .. } => StatusCode::BAD_REQUEST,
    Error::Fetch { .. } => StatusCode::BAD_GATEWAY,
    Error::Embedding { .. }
    | Error::Store { .. }
    | Error::Completion { .. }
    | Error::Stream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
  }
}
