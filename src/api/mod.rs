//! Client-side boundary for the drug catalog REST API

pub mod client;
pub mod errors;
pub mod types;

pub use client::DrugsClient;
pub use errors::ApiError;
pub use types::DrugsPage;
