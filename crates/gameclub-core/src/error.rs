use thiserror::Error;

use crate::http_client::HttpError;

/// Failure surfaced by every layer of the API service pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Network or HTTP failure produced by the request executor.
    #[error("transport error: {0}")]
    Transport(#[from] HttpError),

    /// The retry layer was configured with fewer than one attempt.
    #[error("retry budget exhausted after {attempts} attempt(s)")]
    RetryExhausted { attempts: u32 },

    /// The resource path is empty or has surrounding whitespace.
    #[error("resource path must be non-empty without surrounding whitespace")]
    InvalidPath,

    /// A settled payload did not match the caller's typed shape.
    #[error("failed to decode response payload: {message}")]
    Decode { message: String },

    #[error("failed to encode request body: {message}")]
    Encode { message: String },
}

impl ApiError {
    pub fn decode(error: &serde_json::Error) -> Self {
        Self::Decode {
            message: error.to_string(),
        }
    }

    pub fn encode(error: &serde_json::Error) -> Self {
        Self::Encode {
            message: error.to_string(),
        }
    }

    /// Whether the retry layer may re-attempt the call that produced this error.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(error) => error.retryable(),
            Self::RetryExhausted { .. }
            | Self::InvalidPath
            | Self::Decode { .. }
            | Self::Encode { .. } => false,
        }
    }

    /// HTTP status code when the failure came from a non-2xx response.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(error) => error.status(),
            _ => None,
        }
    }
}

/// Invalid client configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base url cannot be empty")]
    EmptyBaseUrl,

    #[error("base url must start with http:// or https://: '{value}'")]
    InvalidBaseUrl { value: String },

    #[error("{name} must be an unsigned integer: '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("backoff must be one of linear, fixed or exponential: '{value}'")]
    InvalidBackoff { value: String },
}
