//! Error types and handling
//!
//! This module provides the error types used at startup and at component
//! boundaries. Conversation-turn failures never surface these errors to the
//! end user; the router converts them to static apology text (see
//! [`crate::router`]). Error messages here must therefore stay safe to log:
//! no secrets, no API keys.

use thiserror::Error;

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: Invalid or missing configuration, including a
///   missing API key
/// - **Search**: Fallback web search failures, absorbed at the turn boundary
/// - **Network**: HTTP binding and server failures
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Search backend errors
    #[error("Search error: {0}")]
    Search(String),

    // Network / server errors
    #[error("Network error: {0}")]
    Network(String),
}
