//! Error types for the dispatch kernel
//!
//! Every failure that aborts processing of a single activity is an
//! `KernelError`. Unrecognized object or activity types are not errors;
//! they come back as successful `DispatchResult`s.

use thiserror::Error;

/// Kernel-wide error type
#[derive(Debug, Error)]
pub enum KernelError {
    /// The activity names an author other than the authenticated actor
    #[error("invalid actor: activity claims {claimed}, authenticated as {authenticated}")]
    InvalidActor {
        claimed: String,
        authenticated: String,
    },

    /// No object identifier could be derived, or the document shape is unusable
    #[error("Malformed activity: {0}")]
    MalformedActivity(String),

    /// Failure reported by a deletion handler, passed through untouched
    #[error("Handler error: {0}")]
    Handler(#[source] anyhow::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl KernelError {
    /// Short label used for the `error_type` metric dimension.
    pub fn error_type(&self) -> &'static str {
        match self {
            KernelError::InvalidActor { .. } => "invalid_actor",
            KernelError::MalformedActivity(_) => "malformed_activity",
            KernelError::Handler(_) => "handler",
            KernelError::Config(_) => "config",
        }
    }

    /// Whether retrying the same activity could possibly succeed.
    ///
    /// Authorization and shape failures are properties of the document
    /// itself. Handler failures are left to the caller's retry policy.
    pub fn is_retryable(&self) -> bool {
        matches!(self, KernelError::Handler(_))
    }
}

impl From<config::ConfigError> for KernelError {
    fn from(err: config::ConfigError) -> Self {
        KernelError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for KernelError {
    fn from(err: serde_json::Error) -> Self {
        KernelError::MalformedActivity(err.to_string())
    }
}

/// Result type alias using KernelError
pub type Result<T> = std::result::Result<T, KernelError>;
