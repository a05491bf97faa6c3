//! REST API types with schemars annotations for schema generation

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::server::models::professor::ProfessorRecord;

// Ingestion Endpoint
// ==================

/// Request for /api/scrape-professor
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct IngestRequest {
  /// Profile page to scrape
  #[serde(default)]
  pub url: Option<String>,
}

/// Successful response for /api/scrape-professor
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct IngestResponse {
  /// Human readable outcome
  pub message: String,

  /// Vector id the record was stored under
  pub id: String,

  /// When the record was written
  pub ingested_at: DateTime<Utc>,

  /// The scraped record exactly as stored
  pub data: ProfessorRecord,
}

/// Error body for JSON endpoints
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ErrorResponse {
  pub error: String,
}

impl ErrorResponse {
  pub fn new(error: impl Into<String>) -> Self {
    Self { error: error.into() }
  }
}

// Status/Version Endpoints
// =======================

/// Response for /status
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StatusResponse {
  pub status: String,
  pub version: String,
  /// Vector index the service reads and writes
  pub index: String,
  /// Namespace inside the index
  pub namespace: String,
}

/// Response for /version
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VersionResponse {
  pub version: String,
}

/// One route served by the API
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct EndpointInfo {
  pub method: String,
  pub path: String,
  pub description: String,
}

/// Response for /api: routes plus JSON schemas of the request and response bodies
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiInfoResponse {
  pub version: String,
  pub endpoints: Vec<EndpointInfo>,
  pub schemas: BTreeMap<String, serde_json::Value>,
}
