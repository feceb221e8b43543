//! Error handling for MDS conversion operations.
//!
//! Provides error types with enough context (field name, iteration,
//! file path) to diagnose a failed conversion without re-running it.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid metadata in {path}: {reason}")]
    MetaFormat { path: PathBuf, reason: String },

    #[error("unsupported dimensionality {found} in {path}: expected 2 or 3")]
    UnsupportedDimensionality { path: PathBuf, found: i64 },

    #[error("payload size mismatch in {path}: expected {expected} bytes, found {found}")]
    PayloadSize {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("no 3-D reference variable among requested fields: {fields:?}")]
    MissingReferenceVariable { fields: Vec<String> },

    #[error("output already exists: {path}")]
    OutputExists { path: PathBuf },

    #[error("shape mismatch for {name}: {reason}")]
    ShapeMismatch { name: String, reason: String },

    #[error("input directory not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("invalid discovery pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl ConvertError {
    /// Create a metadata format error with file context.
    pub fn meta_format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MetaFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a shape mismatch error for a named array.
    pub fn shape_mismatch(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
