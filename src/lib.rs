//! MDS to NetCDF converter.
//!
//! Reads MITgcm-style MDS output (paired `.meta`/`.data` files, raw
//! big-endian payloads in Fortran order), applies topography-aware
//! vertical remapping against the seafloor depth field, and writes one
//! self-describing NetCDF file per model iteration.
//!
//! # Example
//!
//! ```no_run
//! use mds_converter::{ConvertConfig, Converter};
//!
//! # fn main() -> mds_converter::Result<()> {
//! let converter = Converter::new("run", "out")?
//!     .with_config(ConvertConfig::default().with_overwrite());
//! let stats = converter.convert(&["T".to_string(), "Rho".to_string()], None)?;
//! println!("{} files written", stats.iterations_converted);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod converter;
pub mod discovery;
pub mod error;
pub mod grid;
pub mod meta;
pub mod models;
pub mod payload;
pub mod topography;
pub mod writer;

pub use config::{ConvertConfig, ExistingFilePolicy, GridVariant};
pub use converter::Converter;
pub use error::{ConvertError, Result};
pub use models::{ConversionStats, Precision, VariableSchema};
pub use topography::TopographyMask;
