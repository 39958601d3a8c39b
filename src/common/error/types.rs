//! Unified error types for lesson-deck.
//!
//! This module provides the crate-level error returned by the generator and
//! the template catalog, wrapping the package-layer errors.
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for lesson-deck operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Presentation package error
    #[error("Package error: {0}")]
    Ooxml(#[from] crate::ooxml::error::OoxmlError),

    /// The style source resolved to a document without any layout
    #[error("Layout catalog is empty; cannot create slides")]
    EmptyLayoutCatalog,

    /// A required input file does not exist
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The output artifact could not be allocated or written
    #[error("Cannot write output to {}: {source}", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request or response JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error means a referenced input does not exist.
    ///
    /// Front ends map this to a "not found" outcome and everything else to an
    /// internal failure.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            Error::Ooxml(crate::ooxml::error::OoxmlError::Opc(
                crate::ooxml::opc::error::OpcError::PackageNotFound(_),
            )) => true,
            _ => false,
        }
    }
}

/// Result type for lesson-deck operations.
pub type Result<T> = std::result::Result<T, Error>;
