//! REST server startup and configuration

use anyhow::{Context, Result};
use axum::serve;
use reqwest::Client;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::server::routing::create_router;
use crate::server::services::completions::OpenAiCompleter;
use crate::server::services::embeddings::OpenAiEmbedder;
use crate::server::services::ingestion::IngestionPipeline;
use crate::server::services::pinecone::PineconeVectorDatabase;
use crate::server::services::retrieval::RetrievalPipeline;
use crate::server::services::scraper::HttpProfileScraper;
use crate::server::state::{AppState, IndexInfo};

const USER_AGENT: &str = concat!("tutor/", env!("CARGO_PKG_VERSION"));

/// Construct every external collaborator from configuration
pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
  // No client-wide timeout: it would also cut off long completion streams
  let client = Client::builder().user_agent(USER_AGENT).build().context("Failed to create HTTP client")?;
  let scrape_client = Client::builder()
    .user_agent(USER_AGENT)
    .timeout(config.request_timeout())
    .build()
    .context("Failed to create scraping HTTP client")?;

  let store = Arc::new(
    PineconeVectorDatabase::connect(
      client.clone(),
      &config.pinecone_control_url,
      &config.pinecone_index,
      config.pinecone_host.as_deref(),
      &config.pinecone_api_key,
      &config.pinecone_namespace,
    )
    .await
    .context("Failed to connect to the vector index")?,
  );
  let embedder = Arc::new(OpenAiEmbedder::new(
    client.clone(),
    &config.openai_base_url,
    &config.openai_api_key,
    &config.embedding_model,
  ));
  let completer = Arc::new(OpenAiCompleter::new(
    client,
    &config.openai_base_url,
    &config.openai_api_key,
    &config.chat_model,
  ));
  let scraper = Arc::new(HttpProfileScraper::new(scrape_client));

  let retrieval =
    RetrievalPipeline::new(embedder.clone(), store.clone(), completer, config.retrieval_settings());
  let ingestion = IngestionPipeline::new(scraper, embedder, store, config.request_timeout());
  let index =
    IndexInfo { index: config.pinecone_index.clone(), namespace: config.pinecone_namespace.clone() };

  Ok(AppState::new(retrieval, ingestion, index))
}

/// Start the REST server and run until ctrl-c
pub async fn start_server(config: ServerConfig) -> Result<()> {
  let state = build_state(&config).await?;

  tracing::info!(addr = %config.bind, "Starting tutor REST server");

  // The chat UI may be served from another origin
  let app = create_router(state).layer(
    ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()),
  );

  let listener = TcpListener::bind(config.bind)
    .await
    .with_context(|| format!("Failed to bind {}", config.bind))?;
  tracing::info!(addr = %config.bind, "Server listening");

  serve(listener, app).with_graceful_shutdown(shutdown_signal()).await.context("Server error")?;

  tracing::info!("Server shutdown gracefully");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!(error = %e, "could not listen for shutdown signal");
    std::future::pending::<()>().await;
  }
}
