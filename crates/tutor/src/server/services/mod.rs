pub mod completions;
pub mod embeddings;
pub mod ingestion;
pub mod pinecone;
pub mod prompts;
pub mod retrieval;
pub mod scraper;
pub mod sse;
pub mod streaming;
pub mod vector_database;

use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};

/// Run one external call under a deadline, mapping expiry to the caller's error kind
pub(crate) async fn within<T>(
  deadline: Duration,
  call: impl Future<Output = Result<T>>,
  on_timeout: impl FnOnce(String) -> Error,
) -> Result<T> {
  match tokio::time::timeout(deadline, call).await {
    Ok(result) => result,
    Err(_) => Err(on_timeout(format!("timed out after {}s", deadline.as_secs_f32()))),
  }
}

/// Pull a readable message out of a provider error body, falling back to the raw text
pub(crate) fn provider_error_message(status: reqwest::StatusCode, body: &str) -> String {
  let detail = serde_json::from_str::<serde_json::Value>(body)
    .ok()
    .and_then(|value| {
      value
        .pointer("/error/message")
        .or_else(|| value.get("message"))
        .and_then(|message| message.as_str())
        .map(str::to_string)
    })
    .unwrap_or_else(|| body.trim().to_string());

  if detail.is_empty() {
    format!("status {status}")
  } else {
    format!("status {status}: {detail}")
  }
}
