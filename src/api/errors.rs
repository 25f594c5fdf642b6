//! Error types for the drug catalog API boundary

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode drugs response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Drugs endpoint returned status {status}")]
    Status { status: reqwest::StatusCode },
}
