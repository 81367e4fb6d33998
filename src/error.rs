use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum CoinViewError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A query whose error was shared between several waiters.
    #[error("{0}")]
    Shared(Arc<CoinViewError>),
}

pub type Result<T> = std::result::Result<T, CoinViewError>;
