use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupportRagError {
    #[error("Query cannot be empty")]
    InvalidQuery,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Vector store error: {0}")]
    VectorStoreError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Ingestion error: {0}")]
    IngestError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SupportRagError {
    /// Errors caused by a malformed request rather than a backend failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidQuery | Self::InvalidRequest(_))
    }

    /// Errors that mean the service cannot answer at all right now.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_))
    }
}

impl From<reqwest::Error> for SupportRagError {
    fn from(e: reqwest::Error) -> Self {
        Self::HttpError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SupportRagError>;
