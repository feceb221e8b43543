//! Application constants for the MDS converter.
//!
//! File naming conventions, reference grid variables, and the fill
//! value used for fully-land columns.

// =============================================================================
// File naming conventions
// =============================================================================

/// Extension of the sidecar metadata file describing a binary payload.
pub const META_EXTENSION: &str = "meta";

/// Extension of the raw binary payload file.
pub const DATA_EXTENSION: &str = "data";

/// Width of the zero-padded iteration number in MDS file names,
/// e.g. `T.0000001440.data`.
pub const ITERATION_DIGITS: usize = 10;

/// Prefix of generated NetCDF files (`output_<iteration>.nc`).
pub const OUTPUT_FILE_PREFIX: &str = "output_";

/// Extension of generated NetCDF files.
pub const OUTPUT_FILE_EXTENSION: &str = "nc";

// =============================================================================
// Grid reference variables
// =============================================================================

/// 3-D variables that may serve as the reference for establishing
/// the grid size (Nx, Ny, Nz). The last candidate present among the
/// requested fields wins.
pub const REFERENCE_VARIABLES: &[&str] = &["T", "Rho", "U", "V", "W"];

/// Axis files for the cell-center grid variant (x, y, z).
pub const CENTER_AXIS_FILES: [&str; 3] = ["XC", "YC", "RC"];

/// Axis files for the cell-corner grid variant (x, y, z).
pub const CORNER_AXIS_FILES: [&str; 3] = ["XG", "YG", "RF"];

/// Name of the 2-D seafloor depth field (positive downward).
pub const DEPTH_VARIABLE: &str = "Depth";

// =============================================================================
// Topography handling
// =============================================================================

/// Fill value written to every level of a fully-land column.
///
/// Deliberately a fixed zero rather than a dataset-derived minimum:
/// land columns carry no physical sample, so a deterministic null-like
/// sentinel keeps output reproducible across datasets.
pub const LAND_COLUMN_FILL: f64 = 0.0;
