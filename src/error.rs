//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.
//! The HTTP layer maps these onto status codes in [`crate::server::ApiError`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Upload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Classification failed: {0}")]
    Classification(String),

    /// The generation service answered, but not with an image.
    #[error("Image generation service unavailable: {0}")]
    GenerationUnavailable(String),

    /// The generation service could not be reached at all.
    #[error("Image generation service unreachable: {0}")]
    GenerationUnreachable(String),

    #[error("Generic error: {0}")]
    Generic(String),
}

pub type Result<T> = std::result::Result<T, Error>;
