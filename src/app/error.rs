use thiserror::Error;

#[derive(Error, Debug)]
pub enum FedicatError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported address: {0}")]
    UnsupportedAddress(String),

    #[error("Malformed Link header: {0}")]
    MalformedLinkHeader(String),

    #[error("Refusing to follow pagination link outside the API: {0}")]
    SuspiciousContinuation(String),

    #[error("Unexpected content encoding: {0}")]
    UnexpectedEncoding(String),

    #[error("Unexpected response from {url}: {reason}")]
    UnexpectedResponse { url: String, reason: String },

    #[error("Pager failed: {0}")]
    Pager(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FedicatError>;
