//! Unified error handling for PMT
//!
//! Decoders report block-level failures through their own outcome values and
//! only surface here when nothing at all could be decoded, or when the failure
//! is at an I/O, configuration or export boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all PMT operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // ==================== Decode Errors ====================

    /// A decoder could not produce any output for the file
    #[error("Decode failed: {0}")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),

    // ==================== Format and Export Errors ====================

    /// File type or export target with no handler
    #[error("Unsupported format: {format}")]
    UnsupportedFormat {
        format: String,
    },

    /// Export failed
    #[error("Export failed: {message}")]
    ExportFailed {
        message: String,
    },

    // ==================== Configuration Errors ====================

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: String,
    },

    // ==================== General Errors ====================

    /// Custom error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an export failure
    pub fn export_failed(message: impl Into<String>) -> Self {
        Error::ExportFailed {
            message: message.into(),
        }
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::FileNotFound(_) => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            Error::WithContext { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Check if this is a decode/format error
    pub fn is_decode_error(&self) -> bool {
        match self {
            Error::Decode(_) => true,
            Error::WithContext { source, .. } => source.is_decode_error(),
            _ => false,
        }
    }
}
