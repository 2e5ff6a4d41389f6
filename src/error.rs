use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to fetch discussions: {status}\n{body}")]
    ApiError { status: u16, body: String },

    #[error("Failed to fetch discussions: {status}\n{body}")]
    QueryError { status: u16, body: String },

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Invalid repository format: {0}")]
    InvalidRepository(String),

    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, FetchError>;
