//! REST API module for the tutor service
//!
//! Exposes the ingestion and chat endpoints over axum, with the model
//! provider, vector store and scraper injected through [`state::AppState`].

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routing;
pub mod services;
pub mod startup;
pub mod state;
pub mod types;
