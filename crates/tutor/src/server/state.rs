//! Shared application state handed to every handler

use std::sync::Arc;

use crate::server::services::ingestion::IngestionPipeline;
use crate::server::services::retrieval::RetrievalPipeline;

/// Where records are stored, reported by the status endpoint
#[derive(Debug, Clone)]
pub struct IndexInfo {
  pub index: String,
  pub namespace: String,
}

/// Immutable collaborators shared across requests
#[derive(Clone)]
pub struct AppState {
  pub retrieval: Arc<RetrievalPipeline>,
  pub ingestion: Arc<IngestionPipeline>,
  pub index: Arc<IndexInfo>,
}

impl AppState {
  pub fn new(retrieval: RetrievalPipeline, ingestion: IngestionPipeline, index: IndexInfo) -> Self {
    Self { retrieval: Arc::new(retrieval), ingestion: Arc::new(ingestion), index: Arc::new(index) }
  }
}
