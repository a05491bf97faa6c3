//! Error taxonomy shared by the ingestion and retrieval pipelines

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("Invalid request: {message}")]
  Validation { message: String },

  #[error("Failed to fetch profile page: {message}")]
  Fetch { message: String },

  #[error("Embedding request failed: {message}")]
  Embedding { message: String },

  #[error("Vector store request failed: {message}")]
  Store { message: String },

  #[error("Chat completion request failed: {message}")]
  Completion { message: String },

  #[error("Completion stream failed: {message}")]
  Stream { message: String },
}

impl Error {
  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation { message: message.into() }
  }

  pub fn fetch(message: impl Into<String>) -> Self {
    Self::Fetch { message: message.into() }
  }

  pub fn embedding(message: impl Into<String>) -> Self {
    Self::Embedding { message: message.into() }
  }

  pub fn store(message: impl Into<String>) -> Self {
    Self::Store { message: message.into() }
  }

  pub fn completion(message: impl Into<String>) -> Self {
    Self::Completion { message: message.into() }
  }

  pub fn stream(message: impl Into<String>) -> Self {
    Self::Stream { message: message.into() }
  }

  /// Short machine-readable name of the error kind, used in log fields
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Validation { .. } => "validation",
      Self::Fetch { .. } => "fetch",
      Self::Embedding { .. } => "embedding",
      Self::Store { .. } => "store",
      Self::Completion { .. } => "completion",
      Self::Stream { .. } => "stream",
    }
  }
}

pub type Result<T> = std::result::Result<T, Error>;
