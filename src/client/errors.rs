use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("Request to {route} failed: {source}")]
    Transport {
        route: String,
        source: reqwest::Error,
    },

    #[error("Response (status {status}) is not a valid run output: {source}")]
    Decode {
        status: u16,
        source: serde_json::Error,
    },
}
