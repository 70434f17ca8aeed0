use reqwest::{Method, StatusCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Registry URL is required. Use --registry or REGSWEEP_REGISTRY")]
    MissingRegistry,

    #[error("Invalid registry URL '{url}': {reason}")]
    InvalidRegistryUrl { url: String, reason: String },

    #[error("Unsupported registry URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{method} {url} returned status {status}")]
    UnexpectedStatus {
        method: Method,
        url: String,
        status: StatusCode,
    },

    #[error("Missing Docker-Content-Digest header for {repository}:{tag}")]
    MissingDigestHeader { repository: String, tag: String },

    #[error("Manifest for {repository}:{tag} has no config digest")]
    MissingConfig { repository: String, tag: String },
}
