//! Terminal client for the tutor REST API

pub mod client;
pub mod commands;
pub mod display;
