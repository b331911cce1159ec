//! Secret management
//!
//! The only credential this service needs is the hosted LLM API key. It is
//! supplied through the deployment environment and wrapped in [`SecretString`]
//! so it can never leak through `Debug` or `Display` formatting (and thus
//! never through tracing output).

use crate::errors::EngineError;
use std::fmt;

/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// A wrapper for sensitive string data that prevents accidental logging.
///
/// `Debug` and `Display` always print `[REDACTED]`. To access the actual
/// secret value, use [`SecretString::unsecure`].
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new SecretString
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Access the raw underlying string
    pub fn unsecure(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Read the Gemini API key from the process environment.
///
/// # Errors
///
/// Returns a configuration error if the variable is unset or empty.
pub fn gemini_api_key() -> Result<SecretString, EngineError> {
    match std::env::var(GEMINI_API_KEY_VAR) {
        Ok(value) if !value.trim().is_empty() => Ok(SecretString::new(value)),
        _ => Err(EngineError::Config(format!(
            "{} is not set; export it before starting the service",
            GEMINI_API_KEY_VAR
        ))),
    }
}
