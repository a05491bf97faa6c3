//! Server configuration, read from command line flags with environment fallbacks

use clap::builder::RangedU64ValueParser;
use clap::Args;
use std::net::SocketAddr;
use std::time::Duration;

use crate::server::services::retrieval::{ContextStyle, RetrievalSettings};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_PINECONE_CONTROL_URL: &str = "https://api.pinecone.io";

/// Everything the server needs to build its collaborators
#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
  /// Server bind address
  #[arg(long, env = "TUTOR_BIND", default_value = "127.0.0.1:3000")]
  pub bind: SocketAddr,

  /// API key for the embedding and chat completion provider
  #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, help_heading = "Model provider")]
  pub openai_api_key: String,

  /// Base URL of an OpenAI-compatible API
  #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL, help_heading = "Model provider")]
  pub openai_base_url: String,

  /// Model used to embed reviews and queries
  #[arg(long, env = "TUTOR_EMBEDDING_MODEL", default_value = "text-embedding-3-small", help_heading = "Model provider")]
  pub embedding_model: String,

  /// Model used for streamed chat completions
  #[arg(long, env = "TUTOR_CHAT_MODEL", default_value = "gpt-4o-mini", help_heading = "Model provider")]
  pub chat_model: String,

  /// Pinecone API key
  #[arg(long, env = "PINECONE_API_KEY", hide_env_values = true, help_heading = "Vector store")]
  pub pinecone_api_key: String,

  /// Name of the index holding professor embeddings
  #[arg(long, env = "PINECONE_INDEX", default_value = "rag", help_heading = "Vector store")]
  pub pinecone_index: String,

  /// Data plane host of the index; resolved from the index name when absent
  #[arg(long, env = "PINECONE_HOST", help_heading = "Vector store")]
  pub pinecone_host: Option<String>,

  /// Namespace inside the index
  #[arg(long, env = "PINECONE_NAMESPACE", default_value = "ns1", help_heading = "Vector store")]
  pub pinecone_namespace: String,

  /// Control plane URL used to resolve the index host
  #[arg(long, env = "PINECONE_CONTROL_URL", default_value = DEFAULT_PINECONE_CONTROL_URL, help_heading = "Vector store")]
  pub pinecone_control_url: String,

  /// Number of professor records used to ground each answer
  #[arg(
    long,
    env = "TUTOR_TOP_K",
    default_value_t = 3,
    value_parser = RangedU64ValueParser::<usize>::new().range(1..),
    help_heading = "Retrieval"
  )]
  pub top_k: usize,

  /// Which record fields are written into the grounding context
  #[arg(long, env = "TUTOR_CONTEXT_STYLE", value_enum, default_value_t = ContextStyle::Full, help_heading = "Retrieval")]
  pub context_style: ContextStyle,

  /// Deadline for each embedding, vector store and completion-setup call
  #[arg(
    long,
    env = "TUTOR_REQUEST_TIMEOUT_SECS",
    default_value_t = 30,
    value_parser = clap::value_parser!(u64).range(1..),
    help_heading = "Retrieval"
  )]
  pub request_timeout_secs: u64,

  /// Enable verbose logging
  #[arg(short, long)]
  pub verbose: bool,
}

impl ServerConfig {
  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }

  pub fn retrieval_settings(&self) -> RetrievalSettings {
    RetrievalSettings {
      top_k: self.top_k,
      style: self.context_style,
      deadline: self.request_timeout(),
    }
  }

  /// Log filter used when RUST_LOG is not set
  pub fn default_log_filter(&self) -> &'static str {
    if self.verbose {
      "info,tutor=debug,hyper=warn,reqwest=warn,html5ever=warn"
    } else {
      "tutor=info,tower_http=warn,warn"
    }
  }
}
