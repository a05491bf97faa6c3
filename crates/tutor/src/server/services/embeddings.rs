//! Embedding adapter for an OpenAI-compatible `/embeddings` endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::provider_error_message;
use crate::error::{Error, Result};

/// Turns text into a fixed-length vector
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Embedder: Send + Sync {
  async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
  model: &'a str,
  input: &'a str,
  encoding_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
  #[serde(default)]
  data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
  #[serde(default)]
  embedding: Vec<f32>,
}

pub struct OpenAiEmbedder {
  client: Client,
  base_url: String,
  api_key: String,
  model: String,
}

impl OpenAiEmbedder {
  pub fn new(
    client: Client,
    base_url: impl Into<String>,
    api_key: impl Into<String>,
    model: impl Into<String>,
  ) -> Self {
    Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
      api_key: api_key.into(),
      model: model.into(),
    }
  }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
  async fn embed(&self, text: &str) -> Result<Vec<f32>> {
    let url = format!("{}/embeddings", self.base_url);
    let request = EmbeddingRequest { model: &self.model, input: text, encoding_format: "float" };

    tracing::debug!(model = %self.model, chars = text.len(), "requesting embedding");

    let response = self
      .client
      .post(&url)
      .bearer_auth(&self.api_key)
      .json(&request)
      .send()
      .await
      .map_err(|e| Error::embedding(format!("request to {url} failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(Error::embedding(provider_error_message(status, &body)));
    }

    let parsed: EmbeddingResponse = response
      .json()
      .await
      .map_err(|e| Error::embedding(format!("invalid embedding response: {e}")))?;

    let embedding = parsed
      .data
      .into_iter()
      .next()
      .map(|data| data.embedding)
      .ok_or_else(|| Error::embedding("response contained no embedding data"))?;

    if embedding.is_empty() {
      return Err(Error::embedding("response contained an empty embedding"));
    }

    Ok(embedding)
  }
}
