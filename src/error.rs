//! Fatal generation errors
//!
//! Anything that is not one of these is either a skipped service or the
//! "no services" result. None of these leave a partial output file behind.

use std::path::PathBuf;
use thiserror::Error;

/// Error codes for fatal generation failures
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The services directory could not be listed
    #[error("failed to read services directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A descriptor exists but could not be read
    #[error("failed to read descriptor {}: {source}", path.display())]
    ReadDescriptor {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A descriptor is not valid YAML
    #[error("failed to parse descriptor {}: {source}", path.display())]
    DescriptorParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A descriptor is valid YAML but has the wrong shape
    #[error("invalid descriptor {}: {message}", path.display())]
    DescriptorShape { path: PathBuf, message: String },

    /// A field that has no default is missing
    #[error("service '{service}' is missing required field '{field}'")]
    MissingField { service: String, field: String },

    /// The generator configuration is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// The output file could not be written
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    /// Stable identifier for log fields
    pub fn code(&self) -> &'static str {
        match self {
            GenerateError::ReadDir { .. } => "READ_DIR",
            GenerateError::ReadDescriptor { .. } => "READ_DESCRIPTOR",
            GenerateError::DescriptorParse { .. } => "DESCRIPTOR_PARSE",
            GenerateError::DescriptorShape { .. } => "DESCRIPTOR_SHAPE",
            GenerateError::MissingField { .. } => "MISSING_FIELD",
            GenerateError::Config(_) => "CONFIG",
            GenerateError::Write { .. } => "WRITE",
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerateError>;
