//! NetCDF dataset writer.
//!
//! One self-describing output file per iteration, with dimensions
//! `x`, `y`, `z`, `time` (time length 1), coordinate variables
//! `x`/`y`/`z`/`zc`/`time`, and one variable per converted field.
//! The existence check runs before anything is created, so a skipped
//! iteration never leaves a partial file behind.

use crate::config::ExistingFilePolicy;
use crate::constants::{OUTPUT_FILE_EXTENSION, OUTPUT_FILE_PREFIX};
use crate::error::{ConvertError, Result};
use crate::grid::Grid;
use chrono::Utc;
use ndarray::{Array2, Array3};
use std::path::PathBuf;
use tracing::{debug, info};

/// A field tensor ready to be written, oriented `(y, x)` or `(z, y, x)`.
#[derive(Debug, Clone)]
pub enum FieldTensor {
    Surface(Array2<f64>),
    Volume(Array3<f64>),
}

/// One iteration's fully assembled output record.
#[derive(Debug)]
pub struct OutputDataset<'a> {
    pub iteration: u64,
    pub grid: &'a Grid,
    /// Topography-adjusted physical depth per cell, `(z, y, x)`.
    pub zc: &'a Array3<f64>,
    pub fields: Vec<(String, FieldTensor)>,
}

/// Writes one NetCDF file per iteration into a fixed output directory.
#[derive(Debug, Clone)]
pub struct DatasetWriter {
    output_dir: PathBuf,
    policy: ExistingFilePolicy,
}

impl DatasetWriter {
    pub fn new(output_dir: PathBuf, policy: ExistingFilePolicy) -> Self {
        Self { output_dir, policy }
    }

    /// Output file path for an iteration, e.g. `output_0000001440.nc`.
    pub fn output_path(&self, iteration: u64) -> PathBuf {
        self.output_dir.join(format!(
            "{OUTPUT_FILE_PREFIX}{iteration:0width$}.{OUTPUT_FILE_EXTENSION}",
            width = crate::constants::ITERATION_DIGITS
        ))
    }

    /// Apply the existing-file policy before any conversion work.
    ///
    /// Returns the existing path when the iteration should be skipped,
    /// `None` when writing may proceed, and an error under
    /// [`ExistingFilePolicy::Error`].
    pub fn check_existing(&self, iteration: u64) -> Result<Option<PathBuf>> {
        let path = self.output_path(iteration);
        if !path.exists() {
            return Ok(None);
        }
        match self.policy {
            ExistingFilePolicy::Skip => {
                info!("skipping existing file {}", path.display());
                Ok(Some(path))
            }
            ExistingFilePolicy::Overwrite => {
                info!("overwriting file {}", path.display());
                Ok(None)
            }
            ExistingFilePolicy::Error => Err(ConvertError::OutputExists { path }),
        }
    }

    /// Persist one iteration's dataset.
    pub fn write(&self, dataset: &OutputDataset<'_>) -> Result<PathBuf> {
        let path = self.output_path(dataset.iteration);
        let grid = dataset.grid;
        let (nx, ny, nz) = (grid.nx(), grid.ny(), grid.nz());

        if dataset.zc.dim() != (nz, ny, nx) {
            return Err(ConvertError::shape_mismatch(
                "zc",
                format!("expected ({nz}, {ny}, {nx}), found {:?}", dataset.zc.dim()),
            ));
        }

        debug!("creating {}", path.display());
        let mut file = netcdf::create(&path)?;

        file.add_dimension("x", nx)?;
        file.add_dimension("y", ny)?;
        file.add_dimension("z", nz)?;
        file.add_dimension("time", 1)?;

        {
            let mut x_var = file.add_variable::<f64>("x", &["x"])?;
            x_var.put_attribute("long_name", "x coordinate of cell")?;
            x_var.put_values(&grid.x.to_vec(), ..)?;
        }

        {
            let mut y_var = file.add_variable::<f64>("y", &["y"])?;
            y_var.put_attribute("long_name", "y coordinate of cell")?;
            y_var.put_values(&grid.y.to_vec(), ..)?;
        }

        {
            // Index levels; the physical depth lives in `zc`.
            let levels: Vec<f64> = (0..nz).map(|k| k as f64).collect();
            let mut z_var = file.add_variable::<f64>("z", &["z"])?;
            z_var.put_attribute("long_name", "vertical level index")?;
            z_var.put_values(&levels, ..)?;
        }

        {
            let mut zc_var = file.add_variable::<f64>("zc", &["z", "y", "x"])?;
            zc_var.put_attribute("long_name", "physical depth of cell")?;
            zc_var.put_attribute("units", "m")?;
            let values: Vec<f64> = dataset.zc.iter().copied().collect();
            zc_var.put_values(&values, ..)?;
        }

        {
            let mut time_var = file.add_variable::<f64>("time", &["time"])?;
            time_var.put_attribute("long_name", "model iteration")?;
            time_var.put_values(&[dataset.iteration as f64], ..)?;
        }

        for (name, tensor) in &dataset.fields {
            match tensor {
                FieldTensor::Surface(values) => {
                    if values.dim() != (ny, nx) {
                        return Err(ConvertError::shape_mismatch(
                            name,
                            format!("expected ({ny}, {nx}), found {:?}", values.dim()),
                        ));
                    }
                    let mut var = file.add_variable::<f64>(name, &["y", "x"])?;
                    let flat: Vec<f64> = values.iter().copied().collect();
                    var.put_values(&flat, ..)?;
                }
                FieldTensor::Volume(values) => {
                    if values.dim() != (nz, ny, nx) {
                        return Err(ConvertError::shape_mismatch(
                            name,
                            format!("expected ({nz}, {ny}, {nx}), found {:?}", values.dim()),
                        ));
                    }
                    let mut var = file.add_variable::<f64>(name, &["z", "y", "x"])?;
                    let flat: Vec<f64> = values.iter().copied().collect();
                    var.put_values(&flat, ..)?;
                }
            }
        }

        file.add_attribute("source", env!("CARGO_PKG_NAME"))?;
        file.add_attribute(
            "history",
            format!(
                "{}: converted from MDS binary output",
                Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
            )
            .as_str(),
        )?;

        debug!("wrote {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use std::path::Path;
    use tempfile::TempDir;

    fn small_grid() -> Grid {
        Grid::assemble(
            Array1::from(vec![100.0, 200.0]),
            Array1::from(vec![10.0, 20.0]),
            Array1::from(vec![-1.0, -10.0, -20.0]),
        )
    }

    #[test]
    fn test_output_path_is_zero_padded() {
        let writer = DatasetWriter::new(PathBuf::from("/out"), ExistingFilePolicy::Skip);
        assert_eq!(
            writer.output_path(1440),
            Path::new("/out/output_0000001440.nc")
        );
    }

    #[test]
    fn test_write_and_reopen() {
        let temp = TempDir::new().unwrap();
        let writer = DatasetWriter::new(temp.path().to_path_buf(), ExistingFilePolicy::Skip);
        let grid = small_grid();
        let zc = grid.z3.clone();

        let surface = Array2::from_shape_fn((2, 2), |(j, i)| (10 * j + i) as f64);
        let volume = Array3::from_shape_fn((3, 2, 2), |(k, j, i)| (100 * k + 10 * j + i) as f64);

        let dataset = OutputDataset {
            iteration: 720,
            grid: &grid,
            zc: &zc,
            fields: vec![
                ("IceFract".to_string(), FieldTensor::Surface(surface.clone())),
                ("T".to_string(), FieldTensor::Volume(volume.clone())),
            ],
        };

        let path = writer.write(&dataset).unwrap();
        assert!(path.exists());

        let file = netcdf::open(&path).unwrap();
        assert_eq!(file.dimension("x").unwrap().len(), 2);
        assert_eq!(file.dimension("y").unwrap().len(), 2);
        assert_eq!(file.dimension("z").unwrap().len(), 3);
        assert_eq!(file.dimension("time").unwrap().len(), 1);

        let x: Vec<f64> = file.variable("x").unwrap().get_values(..).unwrap();
        assert_eq!(x, vec![100.0, 200.0]);
        let z: Vec<f64> = file.variable("z").unwrap().get_values(..).unwrap();
        assert_eq!(z, vec![0.0, 1.0, 2.0]);
        let time: Vec<f64> = file.variable("time").unwrap().get_values(..).unwrap();
        assert_eq!(time, vec![720.0]);

        let t: Vec<f64> = file.variable("T").unwrap().get_values(..).unwrap();
        assert_eq!(t, volume.iter().copied().collect::<Vec<_>>());
        let ice: Vec<f64> = file.variable("IceFract").unwrap().get_values(..).unwrap();
        assert_eq!(ice, surface.iter().copied().collect::<Vec<_>>());
    }

    #[test]
    fn test_existing_file_policies() {
        let temp = TempDir::new().unwrap();
        let grid = small_grid();
        let zc = grid.z3.clone();
        let dataset = OutputDataset {
            iteration: 0,
            grid: &grid,
            zc: &zc,
            fields: vec![],
        };

        let writer = DatasetWriter::new(temp.path().to_path_buf(), ExistingFilePolicy::Skip);
        assert_eq!(writer.check_existing(0).unwrap(), None);
        writer.write(&dataset).unwrap();

        // Skip: existing path reported, nothing rewritten
        let existing = writer.check_existing(0).unwrap();
        assert_eq!(existing, Some(writer.output_path(0)));

        // Overwrite: proceed
        let writer = DatasetWriter::new(temp.path().to_path_buf(), ExistingFilePolicy::Overwrite);
        assert_eq!(writer.check_existing(0).unwrap(), None);
        writer.write(&dataset).unwrap();

        // Error: fail the iteration
        let writer = DatasetWriter::new(temp.path().to_path_buf(), ExistingFilePolicy::Error);
        assert!(matches!(
            writer.check_existing(0),
            Err(ConvertError::OutputExists { .. })
        ));
    }

    #[test]
    fn test_field_shape_is_validated() {
        let temp = TempDir::new().unwrap();
        let writer = DatasetWriter::new(temp.path().to_path_buf(), ExistingFilePolicy::Skip);
        let grid = small_grid();
        let zc = grid.z3.clone();

        let dataset = OutputDataset {
            iteration: 1,
            grid: &grid,
            zc: &zc,
            fields: vec![(
                "T".to_string(),
                FieldTensor::Volume(Array3::zeros((1, 1, 1))),
            )],
        };
        assert!(matches!(
            writer.write(&dataset),
            Err(ConvertError::ShapeMismatch { .. })
        ));
    }
}
