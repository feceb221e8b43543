//! Topography-aware vertical remapping.
//!
//! A column's seafloor cuts through the vertical axis at an arbitrary
//! level, leaving sub-seafloor samples that would show up as
//! discontinuities in the output. The mask classifies every horizontal
//! column once, from the assembled vertical coordinate tensor and the
//! seafloor depth field, and then projects field and coordinate
//! columns onto their above-seafloor prefix:
//!
//! - levels at or below the seafloor are clamped to the value at the
//!   first sub-seafloor level, so each column is constant below the
//!   boundary;
//! - fully-land columns (no valid level at all) are filled with a
//!   fixed sentinel;
//! - fully-open columns are left untouched.
//!
//! Remapping is a projection: applying it twice changes nothing.

use crate::constants::LAND_COLUMN_FILL;
use crate::error::{ConvertError, Result};
use ndarray::{Array2, Array3, Axis, Zip, s};
use tracing::info;

/// Per-column seafloor classification, computed once per run.
#[derive(Debug, Clone)]
pub struct TopographyMask {
    nz: usize,
    /// Number of levels at or above the seafloor, per `(j, i)` column.
    active_levels: Array2<usize>,
    land_columns: usize,
    open_columns: usize,
}

impl TopographyMask {
    /// Classify every column of the grid.
    ///
    /// `z3` is the assembled vertical coordinate tensor `(z, y, x)`,
    /// monotonically decreasing in its first axis; `depth` is the 2-D
    /// seafloor depth `(y, x)`, positive downward. A level is active
    /// when `z >= -depth`; the boundary itself counts as active so a
    /// seafloor coinciding with a level leaves no off-by-one gap.
    pub fn classify(z3: &Array3<f64>, depth: &Array2<f64>) -> Result<Self> {
        let (nz, ny, nx) = z3.dim();
        if depth.dim() != (ny, nx) {
            return Err(ConvertError::shape_mismatch(
                "Depth",
                format!("expected ({ny}, {nx}), found {:?}", depth.dim()),
            ));
        }

        // Broadcast comparison against the negated depth, counted
        // level by level instead of per-column loops.
        let mut active_levels = Array2::<usize>::zeros((ny, nx));
        for level in z3.axis_iter(Axis(0)) {
            Zip::from(&mut active_levels)
                .and(&level)
                .and(depth)
                .for_each(|count, &z, &d| {
                    if z >= -d {
                        *count += 1;
                    }
                });
        }

        let land_columns = active_levels.iter().filter(|&&a| a == 0).count();
        let open_columns = active_levels.iter().filter(|&&a| a == nz).count();

        Ok(Self {
            nz,
            active_levels,
            land_columns,
            open_columns,
        })
    }

    pub fn active_levels(&self) -> &Array2<usize> {
        &self.active_levels
    }

    /// Columns with no level above the seafloor.
    pub fn land_columns(&self) -> usize {
        self.land_columns
    }

    /// Columns with every level above the seafloor.
    pub fn open_columns(&self) -> usize {
        self.open_columns
    }

    /// Columns where the seafloor cuts between levels.
    pub fn partial_columns(&self) -> usize {
        self.active_levels.len() - self.land_columns - self.open_columns
    }

    pub fn land_fraction(&self) -> f64 {
        self.land_columns as f64 / self.active_levels.len() as f64
    }

    pub fn open_fraction(&self) -> f64 {
        self.open_columns as f64 / self.active_levels.len() as f64
    }

    /// Log the diagnostic counters as percentages of the grid.
    pub fn report(&self) {
        let total = self.active_levels.len();
        info!(
            "{} of {} columns ({:.3}%) are purely topographic",
            self.land_columns,
            total,
            100.0 * self.land_fraction()
        );
        info!(
            "{} of {} columns ({:.3}%) have no topography",
            self.open_columns,
            total,
            100.0 * self.open_fraction()
        );
    }

    /// Clamp the vertical coordinate tensor at and below the seafloor.
    ///
    /// Every level at index `>= activeCount` takes the value at index
    /// `activeCount`, so the coordinate is constant through the
    /// seafloor instead of continuing into it.
    pub fn remap_coordinates(&self, z3: &mut Array3<f64>) -> Result<()> {
        self.check_dims(z3, "z coordinate")?;
        for ((j, i), &active) in self.active_levels.indexed_iter() {
            if active < self.nz {
                let mut column = z3.slice_mut(s![.., j, i]);
                let pinned = column[active];
                column.slice_mut(s![active..]).fill(pinned);
            }
        }
        Ok(())
    }

    /// Remap one 3-D field in place.
    ///
    /// Partially-open columns are clamped like the coordinate tensor;
    /// fully-land columns are filled with the sentinel. 2-D fields
    /// have no vertical axis and must not be passed here at all.
    pub fn remap_field(&self, field: &mut Array3<f64>) -> Result<()> {
        self.check_dims(field, "field")?;
        for ((j, i), &active) in self.active_levels.indexed_iter() {
            if active == 0 {
                field.slice_mut(s![.., j, i]).fill(LAND_COLUMN_FILL);
            } else if active < self.nz {
                let mut column = field.slice_mut(s![.., j, i]);
                let pinned = column[active];
                column.slice_mut(s![active..]).fill(pinned);
            }
        }
        Ok(())
    }

    fn check_dims(&self, tensor: &Array3<f64>, name: &str) -> Result<()> {
        let (ny, nx) = self.active_levels.dim();
        if tensor.dim() != (self.nz, ny, nx) {
            return Err(ConvertError::shape_mismatch(
                name,
                format!(
                    "expected ({}, {ny}, {nx}), found {:?}",
                    self.nz,
                    tensor.dim()
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use ndarray::{Array1, arr2};

    /// 2x2x3 reference scenario: cell-center levels at -1, -10, -20 m
    /// and seafloor depths 5, 15, 25 and 0 m.
    fn scenario() -> (Grid, Array2<f64>) {
        let x = Array1::from(vec![0.0, 1.0]);
        let y = Array1::from(vec![0.0, 1.0]);
        let z = Array1::from(vec![-1.0, -10.0, -20.0]);
        let depth = arr2(&[[5.0, 15.0], [25.0, 0.0]]);
        (Grid::assemble(x, y, z), depth)
    }

    fn scenario_field() -> Array3<f64> {
        // value encodes (k, j, i)
        Array3::from_shape_fn((3, 2, 2), |(k, j, i)| (100 * k + 10 * j + i) as f64)
    }

    #[test]
    fn test_scenario_active_counts() {
        let (grid, depth) = scenario();
        let mask = TopographyMask::classify(&grid.z3, &depth).unwrap();
        assert_eq!(
            mask.active_levels(),
            &arr2(&[[1usize, 2], [3, 0]])
        );
    }

    #[test]
    fn test_column_classification_is_complete() {
        let (grid, depth) = scenario();
        let mask = TopographyMask::classify(&grid.z3, &depth).unwrap();

        assert_eq!(mask.land_columns(), 1);
        assert_eq!(mask.open_columns(), 1);
        assert_eq!(mask.partial_columns(), 2);
        assert_eq!(
            mask.land_columns() + mask.open_columns() + mask.partial_columns(),
            4
        );
        for &a in mask.active_levels() {
            assert!(a <= 3);
        }
        assert_eq!(mask.land_fraction(), 0.25);
        assert_eq!(mask.open_fraction(), 0.25);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        // Seafloor exactly at the second level: that level stays active.
        let x = Array1::from(vec![0.0]);
        let y = Array1::from(vec![0.0]);
        let z = Array1::from(vec![-1.0, -10.0, -20.0]);
        let grid = Grid::assemble(x, y, z);
        let depth = arr2(&[[10.0]]);

        let mask = TopographyMask::classify(&grid.z3, &depth).unwrap();
        assert_eq!(mask.active_levels()[[0, 0]], 2);
    }

    #[test]
    fn test_field_remapping() {
        let (grid, depth) = scenario();
        let mask = TopographyMask::classify(&grid.z3, &depth).unwrap();

        let mut field = scenario_field();
        let original = field.clone();
        mask.remap_field(&mut field).unwrap();

        // Column (0,0): one active level; levels 1-2 take level 1's value
        assert_eq!(field[[0, 0, 0]], original[[0, 0, 0]]);
        assert_eq!(field[[1, 0, 0]], original[[1, 0, 0]]);
        assert_eq!(field[[2, 0, 0]], original[[1, 0, 0]]);

        // Column (0,1): two active levels; level 2 takes its own value
        assert_eq!(field[[0, 0, 1]], original[[0, 0, 1]]);
        assert_eq!(field[[1, 0, 1]], original[[1, 0, 1]]);
        assert_eq!(field[[2, 0, 1]], original[[2, 0, 1]]);

        // Column (1,0): fully open, untouched
        for k in 0..3 {
            assert_eq!(field[[k, 1, 0]], original[[k, 1, 0]]);
        }

        // Column (1,1): fully land, every level gets the sentinel
        for k in 0..3 {
            assert_eq!(field[[k, 1, 1]], LAND_COLUMN_FILL);
        }
    }

    #[test]
    fn test_coordinate_remapping() {
        let (grid, depth) = scenario();
        let mask = TopographyMask::classify(&grid.z3, &depth).unwrap();

        let mut zc = grid.z3.clone();
        mask.remap_coordinates(&mut zc).unwrap();

        // Column (0,0): levels 1-2 clamped to z[1]
        assert_eq!(zc[[0, 0, 0]], -1.0);
        assert_eq!(zc[[1, 0, 0]], -10.0);
        assert_eq!(zc[[2, 0, 0]], -10.0);

        // Column (1,0): fully open, untouched
        assert_eq!(zc[[2, 1, 0]], -20.0);

        // Column (1,1): fully land, flattened to the surface level
        for k in 0..3 {
            assert_eq!(zc[[k, 1, 1]], -1.0);
        }
    }

    #[test]
    fn test_remap_is_idempotent() {
        let (grid, depth) = scenario();
        let mask = TopographyMask::classify(&grid.z3, &depth).unwrap();

        let mut field = scenario_field();
        mask.remap_field(&mut field).unwrap();
        let once = field.clone();
        mask.remap_field(&mut field).unwrap();
        assert_eq!(field, once);

        let mut zc = grid.z3.clone();
        mask.remap_coordinates(&mut zc).unwrap();
        let once = zc.clone();
        mask.remap_coordinates(&mut zc).unwrap();
        assert_eq!(zc, once);

        // Reclassifying the remapped coordinate yields the same mask:
        // clamped levels stay below the seafloor.
        let remask = TopographyMask::classify(&zc, &depth).unwrap();
        assert_eq!(remask.active_levels(), mask.active_levels());
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let (grid, depth) = scenario();
        let mask = TopographyMask::classify(&grid.z3, &depth).unwrap();

        let mut wrong = Array3::<f64>::zeros((2, 2, 2));
        assert!(mask.remap_field(&mut wrong).is_err());

        let bad_depth = arr2(&[[1.0, 2.0, 3.0]]);
        assert!(TopographyMask::classify(&grid.z3, &bad_depth).is_err());
    }
}
