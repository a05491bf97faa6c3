//! Pinecone data plane adapter
//!
//! Talks to a single index namespace over the REST API. The data plane host
//! is either configured directly or looked up once by describing the index
//! on the control plane.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::provider_error_message;
use super::vector_database::{VectorDatabase, VectorMatch};
use crate::error::{Error, Result};

const API_VERSION: &str = "2024-07";

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
  vectors: Vec<UpsertVector<'a>>,
  namespace: &'a str,
}

#[derive(Debug, Serialize)]
struct UpsertVector<'a> {
  id: &'a str,
  values: Vec<f32>,
  metadata: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
  vector: Vec<f32>,
  top_k: usize,
  include_metadata: bool,
  include_values: bool,
  namespace: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
  #[serde(default)]
  matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
  id: String,
  #[serde(default)]
  score: Option<f32>,
  #[serde(default)]
  metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
  host: String,
}

pub struct PineconeVectorDatabase {
  client: Client,
  host: String,
  api_key: String,
  namespace: String,
}

impl PineconeVectorDatabase {
  pub fn new(
    client: Client,
    host: impl AsRef<str>,
    api_key: impl Into<String>,
    namespace: impl Into<String>,
  ) -> Self {
    Self {
      client,
      host: normalize_host(host.as_ref()),
      api_key: api_key.into(),
      namespace: namespace.into(),
    }
  }

  /// Build an adapter for `index`, resolving its host unless one is given
  pub async fn connect(
    client: Client,
    control_url: &str,
    index: &str,
    host: Option<&str>,
    api_key: &str,
    namespace: &str,
  ) -> Result<Self> {
    let host = match host {
      Some(host) => host.to_string(),
      None => describe_index_host(&client, control_url, index, api_key).await?,
    };
    tracing::info!(index, host = %host, namespace, "using vector index");
    Ok(Self::new(client, host, api_key, namespace))
  }

  pub fn host(&self) -> &str {
    &self.host
  }

  fn post(&self, path: &str) -> RequestBuilder {
    self
      .client
      .post(format!("{}{path}", self.host))
      .header("Api-Key", &self.api_key)
      .header("X-Pinecone-API-Version", API_VERSION)
  }
}

#[async_trait]
impl VectorDatabase for PineconeVectorDatabase {
  async fn upsert(&self, id: &str, vector: Vec<f32>, metadata: Map<String, Value>) -> Result<()> {
    let request = UpsertRequest {
      vectors: vec![UpsertVector { id, values: vector, metadata }],
      namespace: &self.namespace,
    };

    let response = self
      .post("/vectors/upsert")
      .json(&request)
      .send()
      .await
      .map_err(|e| Error::store(format!("upsert request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(Error::store(provider_error_message(status, &body)));
    }

    tracing::debug!(id, namespace = %self.namespace, "upserted vector");
    Ok(())
  }

  async fn query(
    &self,
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
  ) -> Result<Vec<VectorMatch>> {
    let request = QueryRequest {
      vector,
      top_k,
      include_metadata,
      include_values: false,
      namespace: &self.namespace,
    };

    let response = self
      .post("/query")
      .json(&request)
      .send()
      .await
      .map_err(|e| Error::store(format!("query request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(Error::store(provider_error_message(status, &body)));
    }

    let parsed: QueryResponse =
      response.json().await.map_err(|e| Error::store(format!("invalid query response: {e}")))?;

    Ok(
      parsed
        .matches
        .into_iter()
        .take(top_k)
        .map(|m| VectorMatch { id: m.id, score: m.score, metadata: m.metadata })
        .collect(),
    )
  }
}

/// Look up the data plane host of an index by name
async fn describe_index_host(
  client: &Client,
  control_url: &str,
  index: &str,
  api_key: &str,
) -> Result<String> {
  let url = format!("{}/indexes/{index}", control_url.trim_end_matches('/'));
  let response = client
    .get(&url)
    .header("Api-Key", api_key)
    .header("X-Pinecone-API-Version", API_VERSION)
    .send()
    .await
    .map_err(|e| Error::store(format!("describe index request failed: {e}")))?;

  let status = response.status();
  if !status.is_success() {
    let body = response.text().await.unwrap_or_default();
    return Err(Error::store(format!(
      "could not describe index '{index}': {}",
      provider_error_message(status, &body)
    )));
  }

  let description: IndexDescription = response
    .json()
    .await
    .map_err(|e| Error::store(format!("invalid index description: {e}")))?;
  Ok(description.host)
}

/// Index hosts are reported without a scheme; default to https
fn normalize_host(host: &str) -> String {
  let host = host.trim().trim_end_matches('/');
  if host.starts_with("http://") || host.starts_with("https://") {
    host.to_string()
  } else {
    format!("https://{host}")
  }
}
