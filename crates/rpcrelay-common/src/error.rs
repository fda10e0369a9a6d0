use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Upstream request timed out after {0}ms")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
