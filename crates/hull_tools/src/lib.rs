//! # Hull Development Tools
//!
//! Command-line tools for working on ship layouts:
//! - ASCII inspection of a hull's grid and exposure
//! - Layout file validation
//! - Seeded parallel damage barrages

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod barrage;
pub mod render;
pub mod validate;

use hull_core::error::HullError;
use thiserror::Error;

/// Errors raised by the tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Layout or hull error.
    #[error(transparent)]
    Hull(#[from] HullError),

    /// Filesystem error.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// Path being accessed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A directory contained no layouts.
    #[error("No layout files found in '{0}'")]
    NoLayouts(String),
}

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;
