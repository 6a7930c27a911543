// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for loading and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a sketch.
///
/// Any of these is fatal for the load attempt that produced it: no partial
/// playback is ever started.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A document could not be fetched
    #[error("Failed to fetch {document}: {reason}")]
    Fetch {
        /// Document path relative to the sketch
        document: String,
        /// Underlying reason
        reason: String,
    },

    /// A document does not exist
    #[error("Missing document {document}")]
    Missing {
        /// Document path relative to the sketch
        document: String,
    },

    /// A document could not be parsed
    #[error("Failed to parse {document}: {source}")]
    Parse {
        /// Document path relative to the sketch
        document: String,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The media resource could not be opened
    #[error("Failed to open media {url}: {reason}")]
    Media {
        /// Resolved media URL
        url: String,
        /// Underlying reason
        reason: String,
    },

    /// The action log contains no stroke to replay
    #[error("Sketch {0} has no strokes")]
    EmptySketch(String),
}

impl LoadError {
    /// Build a fetch error from any displayable reason
    pub fn fetch(document: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Fetch {
            document: document.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a fetch error from an I/O error, telling absent files apart
    pub fn from_io(document: impl Into<String>, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::Missing {
                document: document.into(),
            },
            _ => Self::fetch(document, error),
        }
    }
}

/// Result type for load operations
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors raised while reading or writing the player configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File system error
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// I/O error
        #[source]
        source: std::io::Error,
    },

    /// RON deserialization error
    #[error("Invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}
