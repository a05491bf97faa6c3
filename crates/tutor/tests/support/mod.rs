//! In-process fakes for every external collaborator
#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use futures::{stream, StreamExt};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

use tutor::error::{Error, Result};
use tutor::server::models::chat::ChatMessage;
use tutor::server::models::professor::ProfessorRecord;
use tutor::server::routing::create_router;
use tutor::server::services::completions::{ChatCompleter, DeltaStream};
use tutor::server::services::embeddings::Embedder;
use tutor::server::services::ingestion::IngestionPipeline;
use tutor::server::services::retrieval::{RetrievalPipeline, RetrievalSettings};
use tutor::server::services::scraper::ProfileScraper;
use tutor::server::services::vector_database::{VectorDatabase, VectorMatch};
use tutor::server::state::{AppState, IndexInfo};

const VOCABULARY: &[&str] =
  &["calculus", "limits", "derivatives", "history", "essays", "chemistry", "lab"];

/// Keyword-count embedder over a small fixed vocabulary
#[derive(Default)]
pub struct WordEmbedder {
  pub calls: AtomicUsize,
}

impl WordEmbedder {
  pub fn vector_for(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0; VOCABULARY.len() + 1];
    for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
      let word = word.to_lowercase();
      if let Some(position) = VOCABULARY.iter().position(|known| *known == word) {
        vector[position] += 1.0;
      }
    }
    // Bias term keeps every vector non-zero so cosine similarity stays defined
    vector[VOCABULARY.len()] = 0.01;
    vector
  }
}

#[async_trait]
impl Embedder for WordEmbedder {
  async fn embed(&self, text: &str) -> Result<Vec<f32>> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok(Self::vector_for(text))
  }
}

/// Brute-force cosine store with full-replacement upserts
#[derive(Default)]
pub struct InMemoryVectorDatabase {
  records: Mutex<HashMap<String, (Vec<f32>, Map<String, Value>)>>,
  pub queries: AtomicUsize,
  pub upserts: AtomicUsize,
}

impl InMemoryVectorDatabase {
  pub fn len(&self) -> usize {
    self.records.lock().unwrap().len()
  }

  pub fn metadata(&self, id: &str) -> Option<Map<String, Value>> {
    self.records.lock().unwrap().get(id).map(|(_, metadata)| metadata.clone())
  }

  pub fn seed(&self, record: &ProfessorRecord) {
    let vector = WordEmbedder::vector_for(&record.embedding_text());
    self.records.lock().unwrap().insert(record.id(), (vector, record.to_metadata()));
  }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
  let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
  let norm = |v: &[f32]| v.iter().map(|x| x * x).sum::<f32>().sqrt();
  dot / (norm(a) * norm(b))
}

#[async_trait]
impl VectorDatabase for InMemoryVectorDatabase {
  async fn upsert(&self, id: &str, vector: Vec<f32>, metadata: Map<String, Value>) -> Result<()> {
    self.upserts.fetch_add(1, Ordering::SeqCst);
    self.records.lock().unwrap().insert(id.to_string(), (vector, metadata));
    Ok(())
  }

  async fn query(
    &self,
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
  ) -> Result<Vec<VectorMatch>> {
    self.queries.fetch_add(1, Ordering::SeqCst);
    let records = self.records.lock().unwrap();

    let mut matches: Vec<VectorMatch> = records
      .iter()
      .map(|(id, (stored, metadata))| VectorMatch {
        id: id.clone(),
        score: Some(cosine(&vector, stored)),
        metadata: include_metadata.then(|| metadata.clone()),
      })
      .collect();
    matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    matches.truncate(top_k);
    Ok(matches)
  }
}

/// Replays fixed chunks, or refuses, and records every prompt it was given
#[derive(Default)]
pub struct ScriptedCompleter {
  pub chunks: Vec<String>,
  pub refuse: bool,
  /// Stream error emitted after the chunks instead of a clean end
  pub breaks_with: Option<String>,
  pub seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedCompleter {
  pub fn replying(chunks: &[&str]) -> Self {
    Self { chunks: chunks.iter().map(|c| c.to_string()).collect(), ..Self::default() }
  }

  pub fn breaking(chunks: &[&str], error: &str) -> Self {
    Self { breaks_with: Some(error.to_string()), ..Self::replying(chunks) }
  }

  pub fn refusing() -> Self {
    Self { refuse: true, ..Self::default() }
  }

  pub fn prompts(&self) -> Vec<Vec<ChatMessage>> {
    self.seen.lock().unwrap().clone()
  }
}

#[async_trait]
impl ChatCompleter for ScriptedCompleter {
  async fn stream_completion(&self, messages: &[ChatMessage]) -> Result<DeltaStream> {
    self.seen.lock().unwrap().push(messages.to_vec());
    if self.refuse {
      return Err(Error::completion("status 401: Incorrect API key provided"));
    }
    let mut items: Vec<Result<String>> = self.chunks.iter().cloned().map(Ok).collect();
    if let Some(error) = &self.breaks_with {
      items.push(Err(Error::stream(error.clone())));
    }
    Ok(stream::iter(items).boxed())
  }
}

/// Returns the same record for any URL, or fails like an unreachable host
pub struct StaticScraper {
  pub record: Option<ProfessorRecord>,
}

#[async_trait]
impl ProfileScraper for StaticScraper {
  async fn scrape(&self, url: &Url) -> Result<ProfessorRecord> {
    match &self.record {
      Some(record) => Ok(record.clone()),
      None => Err(Error::fetch(format!("{url}: connection refused"))),
    }
  }
}

/// Everything a test needs to drive the router and inspect the fakes
pub struct Harness {
  pub embedder: Arc<WordEmbedder>,
  pub store: Arc<InMemoryVectorDatabase>,
  pub completer: Arc<ScriptedCompleter>,
  pub router: Router,
}

impl Harness {
  pub fn new(completer: ScriptedCompleter, scraped: Option<ProfessorRecord>) -> Self {
    let embedder = Arc::new(WordEmbedder::default());
    let store = Arc::new(InMemoryVectorDatabase::default());
    let completer = Arc::new(completer);
    let scraper = Arc::new(StaticScraper { record: scraped });

    let retrieval = RetrievalPipeline::new(
      embedder.clone(),
      store.clone(),
      completer.clone(),
      RetrievalSettings::default(),
    );
    let ingestion =
      IngestionPipeline::new(scraper, embedder.clone(), store.clone(), Duration::from_secs(5));
    let index = IndexInfo { index: "rag".to_string(), namespace: "ns1".to_string() };

    let router = create_router(AppState::new(retrieval, ingestion, index));
    Self { embedder, store, completer, router }
  }
}

pub fn calculus_professors() -> Vec<ProfessorRecord> {
  vec![
    ProfessorRecord::new(
      "Jane Smith",
      "4.5",
      "Mathematics",
      vec!["Great calculus teacher, clear explanations of limits and derivatives.".to_string()],
    ),
    ProfessorRecord::new(
      "Michael Johnson",
      "5.0",
      "Mathematics",
      vec!["Makes calculus easy to understand, best calculus class ever.".to_string()],
    ),
    ProfessorRecord::new(
      "Emily Chen",
      "3.9",
      "History",
      vec!["Long essays about medieval Europe.".to_string()],
    ),
    ProfessorRecord::new(
      "Robert Brown",
      "2.1",
      "Chemistry",
      vec!["Lab reports are graded harshly.".to_string()],
    ),
  ]
}
