//! Tutor - professor review retrieval-augmented chat
//!
//! Scrapes professor review pages into a hosted vector index and answers
//! student questions with streamed completions grounded in the closest
//! matching professor records.

pub mod cli;
pub mod config;
pub mod error;
pub mod server;
