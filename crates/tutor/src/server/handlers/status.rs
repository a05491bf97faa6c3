//! Status and version endpoint handlers

use axum::{extract::State, response::Json};
use schemars::schema_for;
use std::collections::BTreeMap;

use crate::server::models::chat::ChatMessage;
use crate::server::state::AppState;
use crate::server::types::{
  ApiInfoResponse, EndpointInfo, ErrorResponse, IngestRequest, IngestResponse, StatusResponse,
  VersionResponse,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GET /status - Health check endpoint
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
  Json(StatusResponse {
    status: "healthy".to_string(),
    version: VERSION.to_string(),
    index: state.index.index.clone(),
    namespace: state.index.namespace.clone(),
  })
}

/// GET /version - Returns current API version
pub async fn version() -> Json<VersionResponse> {
  Json(VersionResponse { version: VERSION.to_string() })
}

/// GET /api - Returns the routes and body schemas
pub async fn api_info() -> Json<ApiInfoResponse> {
  let endpoint = |method: &str, path: &str, description: &str| EndpointInfo {
    method: method.to_string(),
    path: path.to_string(),
    description: description.to_string(),
  };

  let mut schemas = BTreeMap::new();
  schemas.insert("ChatMessage".to_string(), schema_value(schema_for!(ChatMessage)));
  schemas.insert("IngestRequest".to_string(), schema_value(schema_for!(IngestRequest)));
  schemas.insert("IngestResponse".to_string(), schema_value(schema_for!(IngestResponse)));
  schemas.insert("ErrorResponse".to_string(), schema_value(schema_for!(ErrorResponse)));
  schemas.insert("StatusResponse".to_string(), schema_value(schema_for!(StatusResponse)));

  Json(ApiInfoResponse {
    version: VERSION.to_string(),
    endpoints: vec![
      endpoint("POST", "/api/chat", "Stream a grounded answer to the last message (array of ChatMessage)"),
      endpoint("POST", "/api/scrape-professor", "Scrape a profile page and store the professor"),
      endpoint("GET", "/status", "Health check"),
      endpoint("GET", "/version", "Service version"),
      endpoint("GET", "/api", "This document"),
    ],
    schemas,
  })
}

fn schema_value(schema: schemars::schema::RootSchema) -> serde_json::Value {
  serde_json::to_value(schema).unwrap_or(serde_json::Value::Null)
}
