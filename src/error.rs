//! Error types shared by the registry, session, orchestrator and provider layers.

use thiserror::Error;

/// Errors surfaced by parley operations.
///
/// Each variant is scoped to the single operation that produced it; none is
/// fatal to the process and the caller may always reset and retry.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Agent already exists: {0}")]
    DuplicateName(String),

    #[error("Agent name cannot be empty")]
    EmptyName,

    #[error("Agent not found: {0}")]
    NotFound(String),

    #[error("A conversation needs at least two participants, got {0}")]
    InsufficientParticipants(usize),

    #[error("max_turns must be at least 1, got {0}")]
    InvalidMaxTurns(usize),

    #[error("Session is not running (status: {0})")]
    SessionNotRunning(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::ProviderRequestFailed(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::StorageError(err.to_string())
    }
}
