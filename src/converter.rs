//! Conversion orchestration.
//!
//! A [`Converter`] is bound to one input and one output directory and
//! runs the full pipeline: establish grid sizes from a reference
//! variable, assemble the coordinate grid, classify the topography,
//! then convert each iteration into one NetCDF file. Iterations are
//! processed sequentially; a failed iteration is logged and counted
//! but never aborts the remaining ones.

use crate::config::ConvertConfig;
use crate::constants::DEPTH_VARIABLE;
use crate::discovery;
use crate::error::{ConvertError, Result};
use crate::grid::{self, Grid};
use crate::meta;
use crate::models::{ConversionStats, VariableSchema};
use crate::payload;
use crate::topography::TopographyMask;
use crate::writer::{DatasetWriter, FieldTensor, OutputDataset};
use ndarray::{Array3, ArrayD};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Converts MDS output from one run directory into NetCDF files.
pub struct Converter {
    input_dir: PathBuf,
    output_dir: PathBuf,
    config: ConvertConfig,
}

impl Converter {
    /// Create a converter for the given directories.
    ///
    /// The input directory must exist; the output directory is created
    /// on demand.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let input_dir = input_dir.into();
        if !input_dir.is_dir() {
            return Err(ConvertError::InputNotFound { path: input_dir });
        }
        Ok(Self {
            input_dir,
            output_dir: output_dir.into(),
            config: ConvertConfig::default(),
        })
    }

    /// Replace the default configuration.
    pub fn with_config(mut self, config: ConvertConfig) -> Self {
        self.config = config;
        self
    }

    /// Convert the requested fields for the given iterations.
    ///
    /// When `iterations` is `None`, the available iterations are
    /// discovered from the first field's payload files.
    pub fn convert(
        &self,
        fields: &[String],
        iterations: Option<&[u64]>,
    ) -> Result<ConversionStats> {
        let started = Instant::now();
        let mut stats = ConversionStats::default();

        if fields.is_empty() {
            warn!("no fields requested, nothing to convert");
            return Ok(stats);
        }

        let iterations = match iterations {
            Some(iterations) => iterations.to_vec(),
            None => discovery::discover_iterations(&self.input_dir, &fields[0])?,
        };
        if iterations.is_empty() {
            warn!(
                "no iterations found for `{}` in {}",
                fields[0],
                self.input_dir.display()
            );
            return Ok(stats);
        }
        info!(
            "converting {} fields over {} iterations",
            fields.len(),
            iterations.len()
        );

        let reference = self.select_reference(fields)?;
        let schema = self.reference_schema(reference, iterations[0])?;
        let Some(nz) = schema.z_extent else {
            return Err(ConvertError::shape_mismatch(
                reference,
                "reference variable has no vertical axis",
            ));
        };
        debug!(
            "grid sizes from `{reference}`: {} x {} x {nz}",
            schema.x_extent, schema.y_extent
        );

        let grid = self.read_grid(&schema)?;
        let depth = {
            let (_, raw) = self.read_variable(DEPTH_VARIABLE, None)?;
            payload::into_yx(raw, DEPTH_VARIABLE)?
        };

        let mask = TopographyMask::classify(&grid.z3, &depth)?;
        mask.report();

        let mut zc = grid.z3.clone();
        mask.remap_coordinates(&mut zc)?;

        fs::create_dir_all(&self.output_dir)?;
        let writer = DatasetWriter::new(self.output_dir.clone(), self.config.on_exists);

        for &iteration in &iterations {
            match self.convert_iteration(&writer, iteration, fields, &grid, &zc, &mask) {
                Ok(Some(path)) => {
                    info!("converted iteration {iteration} -> {}", path.display());
                    stats.output_files.push(path);
                    stats.iterations_converted += 1;
                }
                Ok(None) => {
                    stats.iterations_skipped += 1;
                }
                Err(e) => {
                    warn!("iteration {iteration} failed: {e}");
                    stats.iterations_failed += 1;
                }
            }
        }

        stats.processing_time_ms = started.elapsed().as_millis();
        Ok(stats)
    }

    /// Convert one iteration, or skip it under the existing-file policy.
    fn convert_iteration(
        &self,
        writer: &DatasetWriter,
        iteration: u64,
        fields: &[String],
        grid: &Grid,
        zc: &Array3<f64>,
        mask: &TopographyMask,
    ) -> Result<Option<PathBuf>> {
        // Policy check comes first so a skipped iteration reads nothing.
        if writer.check_existing(iteration)?.is_some() {
            return Ok(None);
        }

        let mut converted = Vec::with_capacity(fields.len());
        for field in fields {
            let (schema, raw) = self.read_variable(field, Some(iteration))?;
            let tensor = if schema.is_volume() {
                let mut volume = payload::into_zyx(raw, field)?;
                mask.remap_field(&mut volume)?;
                FieldTensor::Volume(volume)
            } else {
                // Surface fields have no vertical axis to remap.
                FieldTensor::Surface(payload::into_yx(raw, field)?)
            };
            converted.push((field.clone(), tensor));
        }

        let dataset = OutputDataset {
            iteration,
            grid,
            zc,
            fields: converted,
        };
        writer.write(&dataset).map(Some)
    }

    /// Pick the variable that establishes the grid sizes: the last
    /// configured candidate present among the requested fields.
    fn select_reference<'a>(&self, fields: &'a [String]) -> Result<&'a str> {
        let mut reference = None;
        for candidate in &self.config.reference_variables {
            if let Some(field) = fields.iter().find(|f| *f == candidate) {
                reference = Some(field.as_str());
            }
        }
        reference.ok_or_else(|| ConvertError::MissingReferenceVariable {
            fields: fields.to_vec(),
        })
    }

    /// Schema of the reference variable, from its iteration-free
    /// sidecar when one exists, otherwise from the first iteration.
    fn reference_schema(&self, reference: &str, first_iteration: u64) -> Result<VariableSchema> {
        let plain = discovery::meta_path(&self.input_dir, reference, None);
        if plain.is_file() {
            return self.read_schema(reference, None);
        }
        self.read_schema(reference, Some(first_iteration))
    }

    /// Read the coordinate axis files for the configured grid variant
    /// and assemble the broadcast grid.
    fn read_grid(&self, reference: &VariableSchema) -> Result<Grid> {
        let [x_file, y_file, z_file] = self.config.grid_variant.axis_files();
        let nz = reference.z_extent.unwrap_or(0);

        let (_, x_plane) = self.read_variable(x_file, None)?;
        let x = grid::x_axis(&x_plane, x_file)?;
        let (_, y_plane) = self.read_variable(y_file, None)?;
        let y = grid::y_axis(&y_plane, y_file)?;
        let (_, z_column) = self.read_variable(z_file, None)?;
        let mut z = grid::z_axis(&z_column, z_file)?;
        // Face-centered vertical axes carry one extra boundary entry.
        if z.len() == nz + 1 {
            z = z.slice(ndarray::s![..nz]).to_owned();
        }

        let check = |name: &str, found: usize, expected: usize| -> Result<()> {
            if found != expected {
                return Err(ConvertError::shape_mismatch(
                    name,
                    format!("axis length {found} does not match reference extent {expected}"),
                ));
            }
            Ok(())
        };
        check(x_file, x.len(), reference.x_extent)?;
        check(y_file, y.len(), reference.y_extent)?;
        check(z_file, z.len(), nz)?;

        Ok(Grid::assemble(x, y, z))
    }

    fn read_schema(&self, prefix: &str, iteration: Option<u64>) -> Result<VariableSchema> {
        let path = discovery::meta_path(&self.input_dir, prefix, iteration);
        let text = fs::read_to_string(&path).map_err(|source| ConvertError::FileRead {
            path: path.clone(),
            source,
        })?;
        meta::parse_meta(&text, &path)
    }

    fn read_variable(
        &self,
        prefix: &str,
        iteration: Option<u64>,
    ) -> Result<(VariableSchema, ArrayD<f64>)> {
        let schema = self.read_schema(prefix, iteration)?;
        let path = discovery::data_path(&self.input_dir, prefix, iteration);
        let data = payload::read_payload(&path, &schema)?;
        Ok((schema, data))
    }
}
