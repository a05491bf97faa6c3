//! Ingestion pipeline: scrape a profile page, embed its reviews, upsert the record

use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::embeddings::Embedder;
use super::scraper::ProfileScraper;
use super::vector_database::VectorDatabase;
use super::within;
use crate::error::{Error, Result};
use crate::server::models::professor::ProfessorRecord;

/// A record as written to the vector store
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedProfessor {
  pub id: String,
  pub record: ProfessorRecord,
}

pub struct IngestionPipeline {
  scraper: Arc<dyn ProfileScraper>,
  embedder: Arc<dyn Embedder>,
  store: Arc<dyn VectorDatabase>,
  deadline: Duration,
}

impl IngestionPipeline {
  pub fn new(
    scraper: Arc<dyn ProfileScraper>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorDatabase>,
    deadline: Duration,
  ) -> Self {
    Self { scraper, embedder, store, deadline }
  }

  /// Scrape `raw_url` and store the professor it describes.
  ///
  /// Fails fast at the first failing step; nothing is written unless every
  /// step before the upsert succeeded. Re-ingesting a page overwrites the
  /// previous record because the id only depends on the professor's name.
  pub async fn ingest(&self, raw_url: &str) -> Result<IngestedProfessor> {
    let url = parse_profile_url(raw_url)?;

    let record = self.scraper.scrape(&url).await?;
    if !record.has_name() {
      return Err(Error::validation(format!("no professor name found on {url}")));
    }

    let id = record.id();
    let text = record.embedding_text();
    tracing::debug!(%id, reviews = record.reviews.len(), chars = text.len(), "embedding reviews");

    let vector = within(self.deadline, self.embedder.embed(&text), Error::embedding).await?;
    within(self.deadline, self.store.upsert(&id, vector, record.to_metadata()), Error::store)
      .await?;

    tracing::info!(%id, %url, "ingested professor");
    Ok(IngestedProfessor { id, record })
  }
}

/// Accept only absolute http(s) URLs
pub fn parse_profile_url(raw: &str) -> Result<Url> {
  let url = Url::parse(raw.trim()).map_err(|e| Error::validation(format!("invalid url '{raw}': {e}")))?;
  match url.scheme() {
    "http" | "https" => Ok(url),
    scheme => Err(Error::validation(format!("unsupported url scheme '{scheme}'"))),
  }
}
