//! Vector database abstraction for professor embeddings
//!
//! The service only needs two operations from the store: a full-replacement
//! upsert and a top-k similarity query. Keeping them behind a trait lets the
//! hosted index be swapped for an in-memory fake in tests.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;

/// One ranked result of a similarity query
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
  /// Record id as written at upsert time
  pub id: String,
  /// Similarity as reported by the store, if any
  pub score: Option<f32>,
  /// Metadata stored with the vector, present when requested
  pub metadata: Option<Map<String, Value>>,
}

impl VectorMatch {
  /// Read a metadata field as display text.
  ///
  /// Strings are returned as-is, numbers and booleans are formatted and
  /// string lists are joined with "; ". Missing or null fields give `None`.
  pub fn metadata_text(&self, key: &str) -> Option<String> {
    let value = self.metadata.as_ref()?.get(key)?;
    match value {
      Value::Null => None,
      Value::String(text) => Some(text.clone()),
      Value::Array(items) => Some(
        items
          .iter()
          .map(|item| match item {
            Value::String(text) => text.clone(),
            other => other.to_string(),
          })
          .collect::<Vec<_>>()
          .join("; "),
      ),
      other => Some(other.to_string()),
    }
  }
}

/// Vector database interface over a single namespaced collection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorDatabase: Send + Sync {
  /// Write a vector, replacing any existing record with the same id entirely
  async fn upsert(&self, id: &str, vector: Vec<f32>, metadata: Map<String, Value>) -> Result<()>;

  /// Return up to `top_k` nearest records in the store's ranking order
  async fn query(
    &self,
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
  ) -> Result<Vec<VectorMatch>>;
}
