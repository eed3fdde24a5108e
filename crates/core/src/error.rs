//! Error types for the Navigator domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] unifies them at the
//! request boundary.

use std::path::PathBuf;

use thiserror::Error;

use crate::session::SessionId;

/// The top-level error type for request-level operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller supplied invalid input (e.g. an empty question).
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum AgentError {
    #[error("Failed to initialize agent '{agent_id}': {reason}")]
    Init { agent_id: String, reason: String },

    #[error("Agent run failed: {0}")]
    Run(String),

    #[error("Agent did not respond within {secs}s")]
    Timeout { secs: u64 },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read session data at {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to write session data at {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("Session not found")]
    NotFound(SessionId),

    #[error("Session storage did not respond within {secs}s")]
    Timeout { secs: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_errors_surface_underlying_message() {
        let err = Error::from(AgentError::Init {
            agent_id: "abc123".into(),
            reason: "401 Unauthorized".into(),
        });
        let msg = err.to_string();
        assert!(msg.contains("abc123"));
        assert!(msg.contains("401 Unauthorized"));
    }

    #[test]
    fn not_found_has_fixed_message() {
        let err = Error::from(StoreError::NotFound(SessionId(42)));
        assert_eq!(err.to_string(), "Session not found");
    }

    #[test]
    fn validation_displays_bare_message() {
        let err = Error::Validation("Question is required".into());
        assert_eq!(err.to_string(), "Question is required");
    }
}
