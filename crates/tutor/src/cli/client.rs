//! HTTP client for the tutor REST API
//!
//! Thin wrapper the CLI uses to talk to a local or remote tutor server.

use anyhow::{anyhow, Context, Result};
use futures::StreamExt;
use reqwest::{Client, Response};
use std::time::Duration;
use tokio::time::timeout;

use crate::server::models::chat::ChatMessage;
use crate::server::types::{ErrorResponse, IngestRequest, IngestResponse, StatusResponse};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Configuration for the tutor HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Base URL of the tutor server (e.g., "http://localhost:3000")
  pub base_url: String,
  /// Timeout in seconds for a request to get its response headers
  pub timeout_secs: u64,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self { base_url: DEFAULT_SERVER_URL.to_string(), timeout_secs: 30 }
  }
}

impl ClientConfig {
  pub fn with_base_url(base_url: impl Into<String>) -> Self {
    Self { base_url: base_url.into().trim_end_matches('/').to_string(), ..Self::default() }
  }
}

/// HTTP client for the tutor REST API
pub struct TutorClient {
  client: Client,
  config: ClientConfig,
}

impl TutorClient {
  /// Create a new client with custom configuration
  pub fn with_config(config: ClientConfig) -> Result<Self> {
    // Only the wait for headers is bounded; answers stream for as long as they need
    let client = Client::builder().build().context("Failed to create HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url, path)
  }

  fn deadline(&self) -> Duration {
    Duration::from_secs(self.config.timeout_secs)
  }

  /// Ask the server to scrape and store one profile page
  pub async fn ingest(&self, url: &str) -> Result<IngestResponse> {
    let request = IngestRequest { url: Some(url.to_string()) };

    // Scraping, embedding and upserting each get the server-side deadline
    let response = timeout(
      self.deadline() * 3,
      self.client.post(self.url("/api/scrape-professor")).json(&request).send(),
    )
    .await
    .context("Timed out waiting for the server")??;

    if !response.status().is_success() {
      return Err(failure("Ingestion failed", response).await);
    }

    Ok(response.json().await?)
  }

  /// Send a conversation and feed each decoded chunk of the answer to `on_chunk`
  ///
  /// Returns the full answer once the stream ends.
  pub async fn chat_stream<F>(&self, messages: &[ChatMessage], mut on_chunk: F) -> Result<String>
  where
    F: FnMut(&str),
  {
    let response =
      timeout(self.deadline(), self.client.post(self.url("/api/chat")).json(messages).send())
        .await
        .context("Timed out waiting for the server")??;

    if !response.status().is_success() {
      return Err(failure("Chat failed", response).await);
    }

    let mut answer = String::new();
    let mut chunker = Utf8Chunker::default();
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
      let chunk = chunk.context("Answer stream was interrupted")?;
      let text = chunker.push(&chunk);
      if !text.is_empty() {
        on_chunk(&text);
        answer.push_str(&text);
      }
    }

    let rest = chunker.finish();
    if !rest.is_empty() {
      on_chunk(&rest);
      answer.push_str(&rest);
    }

    Ok(answer)
  }

  /// Fetch server health
  pub async fn status(&self) -> Result<StatusResponse> {
    let response = timeout(Duration::from_secs(5), self.client.get(self.url("/status")).send())
      .await
      .context("Timed out waiting for the server")??;

    if !response.status().is_success() {
      return Err(anyhow!("Server health check failed: {}", response.status()));
    }

    Ok(response.json().await?)
  }
}

/// Turn a failed response into an error, preferring the JSON `error` field
async fn failure(action: &str, response: Response) -> anyhow::Error {
  let status = response.status();
  let body = response.text().await.unwrap_or_default();
  let detail = match serde_json::from_str::<ErrorResponse>(&body) {
    Ok(parsed) => parsed.error,
    Err(_) if body.trim().is_empty() => status.to_string(),
    Err(_) => body.trim().to_string(),
  };
  anyhow!("{action} ({}): {detail}", status.as_u16())
}

/// Reassembles UTF-8 text from byte chunks that may split a character
#[derive(Debug, Default)]
pub struct Utf8Chunker {
  pending: Vec<u8>,
}

impl Utf8Chunker {
  /// Append bytes and return all text that is complete so far
  pub fn push(&mut self, bytes: &[u8]) -> String {
    self.pending.extend_from_slice(bytes);
    let mut text = String::new();

    loop {
      match std::str::from_utf8(&self.pending) {
        Ok(valid) => {
          text.push_str(valid);
          self.pending.clear();
          break;
        }
        Err(e) => {
          let valid_up_to = e.valid_up_to();
          text.push_str(&String::from_utf8_lossy(&self.pending[..valid_up_to]));
          match e.error_len() {
            // Incomplete trailing sequence, wait for more bytes
            None => {
              self.pending.drain(..valid_up_to);
              break;
            }
            Some(invalid) => {
              text.push(char::REPLACEMENT_CHARACTER);
              self.pending.drain(..valid_up_to + invalid);
            }
          }
        }
      }
    }

    text
  }

  /// Flush whatever is left at end of stream
  pub fn finish(&mut self) -> String {
    let rest = String::from_utf8_lossy(&self.pending).into_owned();
    self.pending.clear();
    rest
  }
}

/// Build a client for the given server URL
pub fn get_client(base_url: &str) -> Result<TutorClient> {
  TutorClient::with_config(ClientConfig::with_base_url(base_url))
}
