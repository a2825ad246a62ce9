//! Error types for the addbit application.
//!
//! This module defines custom error types that categorize the failures that
//! can occur while turning freeform text into a persisted bit.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the addbit application.
#[derive(Error, Debug)]
pub enum BitError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport-level failures talking to the language model.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Errors related to configuration.
    #[error("{message}")]
    ConfigError { message: String },

    /// The language model call failed or returned no usable bit.
    #[error("Structuring failed: {message}")]
    StructuringFailed { message: String },

    /// Invalid bit format or content.
    #[error("Invalid bit: {message}")]
    InvalidFormat { message: String },

    /// The bits store could not be read or written.
    #[error("Bits store {path}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The bits store does not hold a valid JSON list of bits.
    #[error("Bits store {path} is not valid: {source}")]
    StoreCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{message}")]
    EditorError { message: String },

    /// The site rebuild step failed after the store was written.
    #[error("Rebuild failed: {message}")]
    RebuildFailed { message: String },
}
