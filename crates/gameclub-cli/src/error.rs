use gameclub_core::ApiError;
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] gameclub_core::ConfigError),

    #[error("invalid --data document: {0}")]
    InvalidData(serde_json::Error),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::InvalidData(_) => 2,
            Self::Api(ApiError::Transport(_)) => 3,
            Self::Api(ApiError::RetryExhausted { .. }) => 3,
            Self::Api(_) => 4,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
