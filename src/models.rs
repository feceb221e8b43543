//! Core data structures for MDS conversion.
//!
//! Defines the typed schema extracted from sidecar metadata files and
//! the statistics returned by a conversion run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Numeric precision of a binary payload.
///
/// `kind` is the first character of the metadata precision descriptor
/// (`'f'` for `float32`/`float64`) and `byte_width` is the element size
/// in bytes (4 or 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precision {
    pub kind: char,
    pub byte_width: usize,
}

impl Precision {
    /// Parse a precision descriptor such as `float32` or `float64`.
    ///
    /// Returns `None` for non-float kinds or byte widths other than 4/8;
    /// the payload decoder only understands IEEE floats.
    pub fn from_descriptor(descriptor: &str) -> Option<Self> {
        let kind = descriptor.chars().next()?;
        if kind != 'f' {
            return None;
        }
        let digits: String = descriptor
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .collect();
        let bits: usize = digits.parse().ok()?;
        match bits / 8 {
            byte_width @ (4 | 8) => Some(Self { kind, byte_width }),
            _ => None,
        }
    }
}

/// Typed schema for one variable, extracted from its `.meta` sidecar.
///
/// Invariant: `dimensionality == 2` implies `z_extent == None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSchema {
    /// Number of axes: 2 or 3.
    pub dimensionality: usize,
    pub precision: Precision,
    pub x_extent: usize,
    pub y_extent: usize,
    pub z_extent: Option<usize>,
}

impl VariableSchema {
    /// Logical shape `(x, y[, z])` of the decoded array.
    pub fn shape(&self) -> Vec<usize> {
        match self.z_extent {
            Some(z) => vec![self.x_extent, self.y_extent, z],
            None => vec![self.x_extent, self.y_extent],
        }
    }

    /// Total number of elements in the payload.
    pub fn element_count(&self) -> usize {
        self.x_extent * self.y_extent * self.z_extent.unwrap_or(1)
    }

    /// Whether the variable has a vertical axis.
    pub fn is_volume(&self) -> bool {
        self.z_extent.is_some()
    }
}

/// Statistics for one conversion run.
#[derive(Debug, Default)]
pub struct ConversionStats {
    pub iterations_converted: usize,
    pub iterations_skipped: usize,
    pub iterations_failed: usize,
    pub output_files: Vec<PathBuf>,
    pub processing_time_ms: u128,
}
