//! Aftercare Engine Library
//!
//! This library provides the core functionality of the aftercare service:
//! a post-discharge assistant that looks up patient discharge reports,
//! classifies incoming questions, and answers them through a hosted LLM,
//! optionally backed by a clinical reference index or a web search.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Secret management module
pub mod secrets;

/// Error types module
pub mod errors;

/// LLM provider abstraction layer
pub mod llm;

/// Patient discharge record store
pub mod records;

/// Clinical reference query service
pub mod reference;

/// Fallback web search service
pub mod search;

/// Conversation router (per-turn decision logic)
pub mod router;

/// Session store module
pub mod session;

/// HTTP server module
pub mod server;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;
