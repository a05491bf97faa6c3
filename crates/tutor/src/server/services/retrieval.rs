//! Retrieval-and-grounding pipeline
//!
//! Turns a conversation into a grounded prompt and a streamed reply:
//! the last message is embedded, the nearest professor records are fetched
//! from the vector store, rendered into a plain-text context block appended
//! to the question, and the whole conversation is sent for a streamed
//! completion. Every step runs once, in order, with no retries.

use clap::ValueEnum;
use futures::{future, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Duration;

use super::completions::{ChatCompleter, DeltaStream};
use super::embeddings::Embedder;
use super::prompts::{CONTEXT_HEADER, SYSTEM_PROMPT};
use super::vector_database::{VectorDatabase, VectorMatch};
use super::within;
use crate::error::{Error, Result};
use crate::server::models::chat::ChatMessage;

/// Which stored fields are written into the grounding context
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContextStyle {
  /// Name, subject, star rating and reviews
  Full,
  /// Reviews only
  ReviewsOnly,
}

#[derive(Debug, Clone)]
pub struct RetrievalSettings {
  pub top_k: usize,
  pub style: ContextStyle,
  /// Deadline applied separately to the embed, query and completion-setup calls
  pub deadline: Duration,
}

impl Default for RetrievalSettings {
  fn default() -> Self {
    Self { top_k: 3, style: ContextStyle::Full, deadline: Duration::from_secs(30) }
  }
}

/// Prompt ready to be sent to the completion provider
#[derive(Debug, Clone)]
pub struct GroundedPrompt {
  pub messages: Vec<ChatMessage>,
  pub matches: Vec<VectorMatch>,
}

pub struct RetrievalPipeline {
  embedder: Arc<dyn Embedder>,
  store: Arc<dyn VectorDatabase>,
  completer: Arc<dyn ChatCompleter>,
  settings: RetrievalSettings,
}

impl RetrievalPipeline {
  pub fn new(
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorDatabase>,
    completer: Arc<dyn ChatCompleter>,
    settings: RetrievalSettings,
  ) -> Self {
    Self { embedder, store, completer, settings }
  }

  /// Steps 1 to 5: extract the query, embed it, search, and assemble the prompt
  pub async fn ground(&self, messages: &[ChatMessage]) -> Result<GroundedPrompt> {
    let (history, query) = split_query(messages)?;
    let deadline = self.settings.deadline;

    let vector = within(deadline, self.embedder.embed(&query.content), Error::embedding).await?;
    tracing::debug!(dimensions = vector.len(), "embedded query");

    let matches =
      within(deadline, self.store.query(vector, self.settings.top_k, true), Error::store).await?;
    tracing::debug!(matches = matches.len(), "vector query returned");

    let context = format_context(&matches, self.settings.style);
    let messages = assemble_prompt(history, &query.content, &context);

    Ok(GroundedPrompt { messages, matches })
  }

  /// Run the whole pipeline and return the reply as a stream of non-empty chunks
  pub async fn answer(&self, messages: &[ChatMessage]) -> Result<DeltaStream> {
    let prompt = self.ground(messages).await?;
    tracing::info!(
      ids = ?prompt.matches.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
      "answering from grounding records"
    );

    let stream = within(
      self.settings.deadline,
      self.completer.stream_completion(&prompt.messages),
      Error::completion,
    )
    .await?;

    Ok(stream.try_filter(|chunk| future::ready(!chunk.is_empty())).boxed())
  }
}

/// Take the last message as the live query; everything before it is history
pub fn split_query(messages: &[ChatMessage]) -> Result<(&[ChatMessage], &ChatMessage)> {
  match messages.split_last() {
    Some((query, history)) => Ok((history, query)),
    None => Err(Error::validation("conversation must contain at least one message")),
  }
}

/// Render matches into the grounding block, keeping the store's order
pub fn format_context(matches: &[VectorMatch], style: ContextStyle) -> String {
  let mut context = String::from(CONTEXT_HEADER);

  for found in matches {
    let reviews = found.metadata_text("reviews").unwrap_or_default();
    context.push_str("\n\n");
    match style {
      ContextStyle::Full => {
        let name = found.metadata_text("professor").unwrap_or_else(|| found.id.clone());
        let subject = found.metadata_text("subject").unwrap_or_default();
        let rating = found.metadata_text("star_rating").unwrap_or_default();
        context.push_str(&format!(
          "Professor: {name}\nSubject: {subject}\nStar Rating: {rating}\nReview summary: {reviews}"
        ));
      }
      ContextStyle::ReviewsOnly => {
        context.push_str(&format!("Review summary: {reviews}"));
      }
    }
  }

  context
}

/// Build the provider prompt by copy-and-append; `history` is never modified
pub fn assemble_prompt(history: &[ChatMessage], query: &str, context: &str) -> Vec<ChatMessage> {
  let mut messages = Vec::with_capacity(history.len() + 2);
  messages.push(ChatMessage::system(SYSTEM_PROMPT));
  messages.extend(history.iter().cloned());
  messages.push(ChatMessage::user(format!("{query}\n\n{context}")));
  messages
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::server::models::chat::Role;
  use crate::server::services::embeddings::MockEmbedder;
  use crate::server::services::vector_database::MockVectorDatabase;
  use async_trait::async_trait;
  use futures::stream;
  use serde_json::json;
  use std::sync::Mutex;

  /// Replays fixed chunks and records the prompt it was given
  #[derive(Default)]
  struct ScriptedCompleter {
    chunks: Vec<String>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
  }

  #[async_trait]
  impl ChatCompleter for ScriptedCompleter {
    async fn stream_completion(&self, messages: &[ChatMessage]) -> Result<DeltaStream> {
      self.seen.lock().unwrap().push(messages.to_vec());
      Ok(stream::iter(self.chunks.clone().into_iter().map(Ok)).boxed())
    }
  }

  fn professor_match(id: &str, name: &str, rating: serde_json::Value, reviews: &[&str]) -> VectorMatch {
    VectorMatch {
      id: id.to_string(),
      score: Some(0.8),
      metadata: json!({
        "professor": name,
        "subject": "Math",
        "star_rating": rating,
        "reviews": reviews,
      })
      .as_object()
      .cloned(),
    }
  }

  fn calculus_matches() -> Vec<VectorMatch> {
    vec![
      professor_match("professor-jane-smith", "Jane Smith", json!(4), &["Clear explanations of limits."]),
      professor_match(
        "professor-michael-johnson",
        "Michael Johnson",
        json!(5),
        &["Makes calculus easy to understand."],
      ),
    ]
  }

  #[test]
  fn test_split_query_rejects_empty_conversation() {
    let result = split_query(&[]);
    assert!(matches!(result, Err(Error::Validation { .. })));
  }

  #[test]
  fn test_split_query_uses_last_message() {
    let messages = vec![ChatMessage::assistant("Hi!"), ChatMessage::user("Who teaches calculus?")];
    let (history, query) = split_query(&messages).unwrap();
    assert_eq!(history, &messages[..1]);
    assert_eq!(query.content, "Who teaches calculus?");
  }

  #[test]
  fn test_format_context_without_matches_is_header_only() {
    assert_eq!(format_context(&[], ContextStyle::Full), "Returned results:");
  }

  #[test]
  fn test_format_context_preserves_store_order() {
    let context = format_context(&calculus_matches(), ContextStyle::Full);

    let jane = context.find("Professor: Jane Smith").unwrap();
    let michael = context.find("Professor: Michael Johnson").unwrap();
    assert!(jane < michael);
    assert!(context.contains("Star Rating: 4\n"));
    assert!(context.contains("Review summary: Makes calculus easy to understand."));
  }

  #[test]
  fn test_format_context_reviews_only() {
    let context = format_context(&calculus_matches(), ContextStyle::ReviewsOnly);

    assert!(!context.contains("Professor:"));
    assert!(!context.contains("Star Rating:"));
    assert!(context.contains("Review summary: Clear explanations of limits."));
  }

  #[test]
  fn test_format_context_falls_back_to_id_without_name() {
    let bare = VectorMatch { id: "professor-emily-chen".to_string(), score: None, metadata: None };
    let context = format_context(&[bare], ContextStyle::Full);
    assert!(context.contains("Professor: professor-emily-chen"));
  }

  #[test]
  fn test_assemble_prompt_copies_history() {
    let history = vec![ChatMessage::assistant("Hi!"), ChatMessage::user("Physics?"), ChatMessage::assistant("Dr. Chen.")];
    let before = history.clone();

    let prompt = assemble_prompt(&history, "And math?", "Returned results:");

    assert_eq!(history, before);
    assert_eq!(prompt.len(), 5);
    assert_eq!(prompt[0].role, Role::System);
    assert_eq!(&prompt[1..4], &history[..]);
    assert_eq!(prompt[4], ChatMessage::user("And math?\n\nReturned results:"));
  }

  #[tokio::test]
  async fn test_ground_builds_calculus_prompt() {
    let mut embedder = MockEmbedder::new();
    embedder
      .expect_embed()
      .withf(|text| text == "Who teaches calculus well?")
      .times(1)
      .returning(|_| Ok(vec![0.1, 0.2, 0.3]));

    let mut store = MockVectorDatabase::new();
    store
      .expect_query()
      .withf(|vector, top_k, include_metadata| vector == &vec![0.1, 0.2, 0.3] && *top_k == 3 && *include_metadata)
      .times(1)
      .returning(|_, _, _| Ok(calculus_matches()));

    let pipeline = RetrievalPipeline::new(
      Arc::new(embedder),
      Arc::new(store),
      Arc::new(ScriptedCompleter::default()),
      RetrievalSettings::default(),
    );

    let prompt = pipeline.ground(&[ChatMessage::user("Who teaches calculus well?")]).await.unwrap();
    let last = prompt.messages.last().unwrap();
    let ids: Vec<&str> = prompt.matches.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["professor-jane-smith", "professor-michael-johnson"]);

    assert_eq!(last.role, Role::User);
    assert!(last.content.starts_with("Who teaches calculus well?"));
    let jane = last.content.find("Jane Smith").unwrap();
    let michael = last.content.find("Michael Johnson").unwrap();
    assert!(jane < michael);
    assert!(last.content.contains("Clear explanations of limits."));
    assert!(last.content.contains("Makes calculus easy to understand."));
  }

  #[tokio::test]
  async fn test_answer_with_empty_collection_still_completes() {
    let mut embedder = MockEmbedder::new();
    embedder.expect_embed().returning(|_| Ok(vec![1.0]));
    let mut store = MockVectorDatabase::new();
    store.expect_query().returning(|_, _, _| Ok(Vec::new()));

    let completer = Arc::new(ScriptedCompleter {
      chunks: vec!["No ".to_string(), "".to_string(), "matches.".to_string()],
      ..Default::default()
    });
    let pipeline = RetrievalPipeline::new(
      Arc::new(embedder),
      Arc::new(store),
      completer.clone(),
      RetrievalSettings::default(),
    );

    let stream = pipeline.answer(&[ChatMessage::user("Anyone for art history?")]).await.unwrap();
    let chunks: Vec<String> = stream.try_collect().await.unwrap();

    assert_eq!(chunks, vec!["No ", "matches."]);
    let seen = completer.seen.lock().unwrap();
    assert_eq!(seen[0].last().unwrap().content, "Anyone for art history?\n\nReturned results:");
  }

  #[tokio::test]
  async fn test_embedding_failure_skips_store() {
    let mut embedder = MockEmbedder::new();
    embedder.expect_embed().returning(|_| Err(Error::embedding("quota")));
    let mut store = MockVectorDatabase::new();
    store.expect_query().never();

    let pipeline = RetrievalPipeline::new(
      Arc::new(embedder),
      Arc::new(store),
      Arc::new(ScriptedCompleter::default()),
      RetrievalSettings::default(),
    );

    let result = pipeline.answer(&[ChatMessage::user("hi")]).await;
    assert!(matches!(result, Err(Error::Embedding { .. })));
  }

  #[tokio::test]
  async fn test_store_failure_propagates() {
    let mut embedder = MockEmbedder::new();
    embedder.expect_embed().returning(|_| Ok(vec![1.0]));
    let mut store = MockVectorDatabase::new();
    store.expect_query().returning(|_, _, _| Err(Error::store("401 Unauthorized")));

    let completer = Arc::new(ScriptedCompleter::default());
    let pipeline = RetrievalPipeline::new(
      Arc::new(embedder),
      Arc::new(store),
      completer.clone(),
      RetrievalSettings::default(),
    );

    let result = pipeline.answer(&[ChatMessage::user("hi")]).await;
    assert!(matches!(result, Err(Error::Store { .. })));
    assert!(completer.seen.lock().unwrap().is_empty());
  }
}
