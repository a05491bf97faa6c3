//! Streaming chat completions against an OpenAI-compatible `/chat/completions` endpoint

use async_trait::async_trait;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;

use super::provider_error_message;
use super::sse::SseDecoder;
use crate::error::{Error, Result};
use crate::server::models::chat::ChatMessage;

const DONE_SENTINEL: &str = "[DONE]";

/// Lazy, finite sequence of text deltas in arrival order
pub type DeltaStream = BoxStream<'static, Result<String>>;

/// Produces a streamed reply for a full prompt
#[async_trait]
pub trait ChatCompleter: Send + Sync {
  /// Start a streamed completion.
  ///
  /// Fails with [`Error::Completion`] when the provider rejects the request;
  /// failures after that point arrive as [`Error::Stream`] items.
  async fn stream_completion(&self, messages: &[ChatMessage]) -> Result<DeltaStream>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
  model: &'a str,
  messages: &'a [ChatMessage],
  stream: bool,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
  #[serde(default)]
  choices: Vec<StreamChoice>,
  #[serde(default)]
  error: Option<StreamErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
  #[serde(default)]
  delta: Option<StreamDelta>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
  #[serde(default)]
  content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamErrorDetail {
  #[serde(default)]
  message: String,
}

pub struct OpenAiCompleter {
  client: Client,
  base_url: String,
  api_key: String,
  model: String,
}

impl OpenAiCompleter {
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
impl ChatCompleter for OpenAiCompleter {
  async fn stream_completion(&self, messages: &[ChatMessage]) -> Result<DeltaStream> {
    let url = format!("{}/chat/completions", self.base_url);
    let request = CompletionRequest { model: &self.model, messages, stream: true };

    tracing::debug!(model = %self.model, messages = messages.len(), "requesting streamed completion");

    let response = self
      .client
      .post(&url)
      .bearer_auth(&self.api_key)
      .json(&request)
      .send()
      .await
      .map_err(|e| Error::completion(format!("request to {url} failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(Error::completion(provider_error_message(status, &body)));
    }

    Ok(decode_deltas(response.bytes_stream()))
  }
}

/// What one decoded event means for the delta stream
#[derive(Debug, PartialEq)]
enum Frame {
  Delta(String),
  Done,
}

fn parse_frame(payload: &str) -> Result<Frame> {
  if payload.trim() == DONE_SENTINEL {
    return Ok(Frame::Done);
  }

  let chunk: StreamChunk = serde_json::from_str(payload)
    .map_err(|e| Error::stream(format!("undecodable completion chunk: {e}")))?;

  if let Some(error) = chunk.error {
    return Err(Error::stream(error.message));
  }

  let content = chunk
    .choices
    .into_iter()
    .next()
    .and_then(|choice| choice.delta)
    .and_then(|delta| delta.content)
    .unwrap_or_default();
  Ok(Frame::Delta(content))
}

struct DecodeState<S> {
  body: Pin<Box<S>>,
  decoder: SseDecoder,
  pending: VecDeque<Result<String>>,
  finished: bool,
}

impl<S> DecodeState<S> {
  /// Queue the outcome of each decoded payload, stopping at the first terminal one
  fn absorb(&mut self, payloads: Vec<String>) {
    for payload in payloads {
      if self.finished {
        break;
      }
      match parse_frame(&payload) {
        Ok(Frame::Delta(text)) => self.pending.push_back(Ok(text)),
        Ok(Frame::Done) => self.finished = true,
        Err(error) => {
          self.finished = true;
          self.pending.push_back(Err(error));
        }
      }
    }
  }

  fn fail(&mut self, error: Error) {
    self.finished = true;
    self.pending.push_back(Err(error));
  }
}

/// Decode a provider byte stream of server-sent events into text deltas.
///
/// Ends cleanly on the `[DONE]` sentinel. A transport failure, an in-band
/// error event, or the body closing before `[DONE]` yields a single
/// [`Error::Stream`] item after the deltas already received, then ends the stream.
pub fn decode_deltas<S, B, E>(body: S) -> DeltaStream
where
  S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
  B: AsRef<[u8]> + Send + 'static,
  E: Display + Send + 'static,
{
  let state = DecodeState {
    body: Box::pin(body),
    decoder: SseDecoder::new(),
    pending: VecDeque::new(),
    finished: false,
  };

  stream::unfold(state, |mut state| async move {
    loop {
      if let Some(item) = state.pending.pop_front() {
        return Some((item, state));
      }
      if state.finished {
        return None;
      }

      match state.body.next().await {
        Some(Ok(bytes)) => {
          let payloads = state.decoder.feed(bytes.as_ref());
          state.absorb(payloads);
        }
        Some(Err(e)) => state.fail(Error::stream(format!("upstream connection failed: {e}"))),
        None => {
          let payloads = state.decoder.finish().into_iter().collect();
          state.absorb(payloads);
          if !state.finished {
            state.fail(Error::stream("upstream closed before signalling completion"));
          }
        }
      }
    }
  })
  .boxed()
}
