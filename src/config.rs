//! Conversion configuration.
//!
//! An explicit, immutable configuration record merged once per call:
//! caller-supplied values override the named defaults. There is no
//! mutable global state shared between call sites.

use crate::constants::REFERENCE_VARIABLES;
use serde::{Deserialize, Serialize};

/// Which coordinate variant of the grid to read.
///
/// Cell centers and cell corners are offset by half a grid cell; a
/// single conversion uses one variant, never both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridVariant {
    #[default]
    Center,
    Corner,
}

impl GridVariant {
    /// The axis file prefixes (x, y, z) for this variant.
    pub fn axis_files(&self) -> [&'static str; 3] {
        match self {
            GridVariant::Center => crate::constants::CENTER_AXIS_FILES,
            GridVariant::Corner => crate::constants::CORNER_AXIS_FILES,
        }
    }
}

/// What to do when an output file for an iteration already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExistingFilePolicy {
    /// Leave the existing file untouched and continue with the next
    /// iteration (the default).
    #[default]
    Skip,
    /// Replace the existing file.
    Overwrite,
    /// Fail the iteration with an error.
    Error,
}

/// Configuration for a conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Grid coordinate variant to read.
    pub grid_variant: GridVariant,

    /// Policy applied when an iteration's output file already exists.
    pub on_exists: ExistingFilePolicy,

    /// Candidate 3-D variables used to establish the grid size. The
    /// last candidate present among the requested fields is used.
    pub reference_variables: Vec<String>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            grid_variant: GridVariant::default(),
            on_exists: ExistingFilePolicy::default(),
            reference_variables: REFERENCE_VARIABLES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ConvertConfig {
    /// Use the cell-corner grid variant.
    pub fn with_corner_grid(mut self) -> Self {
        self.grid_variant = GridVariant::Corner;
        self
    }

    /// Overwrite existing output files instead of skipping them.
    pub fn with_overwrite(mut self) -> Self {
        self.on_exists = ExistingFilePolicy::Overwrite;
        self
    }

    /// Set the existing-file policy explicitly.
    pub fn with_on_exists(mut self, policy: ExistingFilePolicy) -> Self {
        self.on_exists = policy;
        self
    }

    /// Replace the reference variable candidate list.
    pub fn with_reference_variables(mut self, variables: Vec<String>) -> Self {
        self.reference_variables = variables;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConvertConfig::default();
        assert_eq!(config.grid_variant, GridVariant::Center);
        assert_eq!(config.on_exists, ExistingFilePolicy::Skip);
        assert_eq!(
            config.reference_variables,
            vec!["T", "Rho", "U", "V", "W"]
        );
    }

    #[test]
    fn test_builders_override_defaults() {
        let config = ConvertConfig::default()
            .with_corner_grid()
            .with_overwrite()
            .with_reference_variables(vec!["Theta".to_string()]);
        assert_eq!(config.grid_variant, GridVariant::Corner);
        assert_eq!(config.on_exists, ExistingFilePolicy::Overwrite);
        assert_eq!(config.reference_variables, vec!["Theta"]);
    }

    #[test]
    fn test_axis_files_per_variant() {
        assert_eq!(GridVariant::Center.axis_files(), ["XC", "YC", "RC"]);
        assert_eq!(GridVariant::Corner.axis_files(), ["XG", "YG", "RF"]);
    }
}
