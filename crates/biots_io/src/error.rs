//! Error types for the biots_io crate.
//!
//! Every fallible pool, game-state and serialization call returns
//! [`Result`], so callers can attach context with [`IoError::with_context`]
//! as the error crosses layers.

use biots_data::GenomeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Invalid genome: {0}")]
    Genome(#[from] GenomeError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<IoError>,
    },
}

pub type Result<T> = std::result::Result<T, IoError>;

impl IoError {
    #[must_use]
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    #[must_use]
    pub fn compression<S: Into<String>>(msg: S) -> Self {
        Self::Compression(msg.into())
    }

    #[must_use]
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    #[must_use]
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound(resource.into())
    }

    /// Wraps an error with additional context.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IoError::validation("pool is empty");
        assert_eq!(err.to_string(), "Validation error: pool is empty");
    }

    #[test]
    fn test_error_context() {
        let err = IoError::not_found("seeds.json").with_context("loading pool");
        assert_eq!(err.to_string(), "loading pool: Resource not found: seeds.json");
    }

    #[test]
    fn test_from_genome_error() {
        let err: IoError = GenomeError::NoHiddenLayers { id: "x".into() }.into();
        assert!(matches!(err, IoError::Genome(_)));
        assert!(err.to_string().contains("hidden layer"));
    }
}
