use thiserror::Error;

use crate::domain::error::ScriptError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors returned by the block indexer API.
#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("indexer at {url} is unreachable: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("indexer resource not found: {0}")]
    NotFound(String),

    #[error("bad indexer request {path}: {body}")]
    BadRequest { path: String, body: String },

    #[error("indexer returned status {status} for {path}")]
    Status { status: u16, path: String },

    #[error("failed to decode indexer response for {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no indexer urls configured")]
    NoUrls,
}

impl IndexerError {
    /// Whether another indexer instance might answer the same request.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable { .. } | Self::NotFound(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::BadRequest { .. } | Self::Decode { .. } | Self::NoUrls => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Indexer(#[from] IndexerError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("price feed error: {0}")]
    Price(String),

    #[error("notification error: {0}")]
    Notify(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
