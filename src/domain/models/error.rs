#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::TokenUsage;

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
pub enum BackendErrorKind {
    #[strum(serialize = "authentication failed")]
    Auth,
    #[strum(serialize = "rate limited")]
    RateLimit,
    #[strum(serialize = "network failure")]
    Network,
    #[strum(serialize = "invalid model")]
    InvalidModel,
    #[strum(serialize = "timed out")]
    Timeout,
    #[strum(serialize = "interrupted")]
    Interrupted,
    #[strum(serialize = "request failed")]
    Other,
}

/// Failure reported by a model backend. The kind is shown to the user, the
/// message carries whatever detail the provider returned.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> BackendError {
        return BackendError {
            kind,
            message: message.into(),
        };
    }

    /// Maps an HTTP status returned by a provider to an error kind.
    pub fn from_status(status: u16, message: impl Into<String>) -> BackendError {
        let kind = match status {
            401 | 403 => BackendErrorKind::Auth,
            404 => BackendErrorKind::InvalidModel,
            408 | 504 => BackendErrorKind::Timeout,
            429 => BackendErrorKind::RateLimit,
            _ => BackendErrorKind::Other,
        };

        return BackendError::new(kind, message);
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Model '{model}' is not supported. Supported models: {supported}")]
    UnknownModel { model: String, supported: String },

    #[error("Token usage must not be negative (prompt: {}, completion: {}, total: {})", .usage.prompt_tokens, .usage.completion_tokens, .usage.total_tokens)]
    InvalidUsage { usage: TokenUsage },

    #[error("Failed to write {path}: {source}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File not found: {path}")]
    IoNotFound { path: PathBuf },

    #[error("{path} is not a valid conversation file: {source}")]
    CorruptSession {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Error communicating with AI, {0}")]
    ModelClient(#[from] BackendError),
}

impl ChatError {
    pub fn io_write(path: impl Into<PathBuf>, source: io::Error) -> ChatError {
        return ChatError::IoWrite {
            path: path.into(),
            source,
        };
    }

    pub fn io_read(path: impl Into<PathBuf>, source: io::Error) -> ChatError {
        return ChatError::IoRead {
            path: path.into(),
            source,
        };
    }
}
