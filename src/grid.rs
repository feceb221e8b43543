//! Grid assembly.
//!
//! Builds full-rank `(z, y, x)` coordinate tensors from 1-D axis
//! arrays by pure geometric broadcasting; no interpolation. The 1-D
//! axes themselves are extracted from the grid reference files, which
//! store x and y coordinates as 2-D planes and z as a degenerate
//! `(1, 1, Nz)` column.

use crate::error::{ConvertError, Result};
use ndarray::{Array1, Array3, ArrayD, s};

/// The immutable reference grid shared by every iteration.
///
/// Holds the 1-D coordinate axes and their broadcast 3-D counterparts,
/// all indexed `(z, y, x)` to match the remapper and writer.
#[derive(Debug, Clone)]
pub struct Grid {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    pub z: Array1<f64>,
    pub x3: Array3<f64>,
    pub y3: Array3<f64>,
    pub z3: Array3<f64>,
}

impl Grid {
    /// Broadcast the three 1-D axes into full-rank coordinate tensors.
    pub fn assemble(x: Array1<f64>, y: Array1<f64>, z: Array1<f64>) -> Self {
        let (nx, ny, nz) = (x.len(), y.len(), z.len());
        let x3 = Array3::from_shape_fn((nz, ny, nx), |(_, _, i)| x[i]);
        let y3 = Array3::from_shape_fn((nz, ny, nx), |(_, j, _)| y[j]);
        let z3 = Array3::from_shape_fn((nz, ny, nx), |(k, _, _)| z[k]);
        Self {
            x,
            y,
            z,
            x3,
            y3,
            z3,
        }
    }

    pub fn nx(&self) -> usize {
        self.x.len()
    }

    pub fn ny(&self) -> usize {
        self.y.len()
    }

    pub fn nz(&self) -> usize {
        self.z.len()
    }
}

/// Extract the x axis from a 2-D coordinate plane shaped `(x, y)`:
/// the values along the first column.
pub fn x_axis(plane: &ArrayD<f64>, name: &str) -> Result<Array1<f64>> {
    if plane.ndim() != 2 {
        return Err(ConvertError::shape_mismatch(name, "expected a 2-D plane"));
    }
    Ok(plane.slice(s![.., 0]).to_owned().into_dimensionality().map_err(
        |_| ConvertError::shape_mismatch(name, "x axis is not 1-D"),
    )?)
}

/// Extract the y axis from a 2-D coordinate plane shaped `(x, y)`:
/// the values along the first row.
pub fn y_axis(plane: &ArrayD<f64>, name: &str) -> Result<Array1<f64>> {
    if plane.ndim() != 2 {
        return Err(ConvertError::shape_mismatch(name, "expected a 2-D plane"));
    }
    Ok(plane.slice(s![0, ..]).to_owned().into_dimensionality().map_err(
        |_| ConvertError::shape_mismatch(name, "y axis is not 1-D"),
    )?)
}

/// Extract the z axis from the vertical coordinate file, stored as a
/// degenerate array with all horizontal extents equal to one.
pub fn z_axis(column: &ArrayD<f64>, name: &str) -> Result<Array1<f64>> {
    if column.is_empty() {
        return Err(ConvertError::shape_mismatch(name, "empty z axis"));
    }
    Ok(Array1::from_iter(column.iter().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn, ShapeBuilder};

    fn plane_xy(nx: usize, ny: usize, f: impl Fn(usize, usize) -> f64) -> ArrayD<f64> {
        let mut values = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                values.push(f(i, j));
            }
        }
        ArrayD::from_shape_vec(IxDyn(&[nx, ny]).f(), values).unwrap()
    }

    #[test]
    fn test_axis_extraction() {
        // XC-style plane: value depends on x only
        let xc = plane_xy(3, 2, |i, _| 100.0 * (i + 1) as f64);
        let x = x_axis(&xc, "XC").unwrap();
        assert_eq!(x.to_vec(), vec![100.0, 200.0, 300.0]);

        // YC-style plane: value depends on y only
        let yc = plane_xy(3, 2, |_, j| 10.0 * (j + 1) as f64);
        let y = y_axis(&yc, "YC").unwrap();
        assert_eq!(y.to_vec(), vec![10.0, 20.0]);

        // RC-style column: (1, 1, nz)
        let rc = ArrayD::from_shape_vec(IxDyn(&[1, 1, 3]).f(), vec![-1.0, -10.0, -20.0]).unwrap();
        let z = z_axis(&rc, "RC").unwrap();
        assert_eq!(z.to_vec(), vec![-1.0, -10.0, -20.0]);
    }

    #[test]
    fn test_axis_extraction_rejects_wrong_rank() {
        let column = ArrayD::from_shape_vec(IxDyn(&[3]), vec![1.0, 2.0, 3.0]).unwrap();
        assert!(x_axis(&column, "XC").is_err());
        assert!(y_axis(&column, "YC").is_err());
    }

    #[test]
    fn test_assemble_broadcasts_each_axis() {
        let x = Array1::from(vec![1.0, 2.0]);
        let y = Array1::from(vec![10.0, 20.0, 30.0]);
        let z = Array1::from(vec![-1.0, -2.0, -3.0, -4.0]);
        let grid = Grid::assemble(x, y, z);

        assert_eq!((grid.nx(), grid.ny(), grid.nz()), (2, 3, 4));
        assert_eq!(grid.x3.dim(), (4, 3, 2));
        assert_eq!(grid.y3.dim(), (4, 3, 2));
        assert_eq!(grid.z3.dim(), (4, 3, 2));

        for k in 0..4 {
            for j in 0..3 {
                for i in 0..2 {
                    assert_eq!(grid.x3[[k, j, i]], grid.x[i]);
                    assert_eq!(grid.y3[[k, j, i]], grid.y[j]);
                    assert_eq!(grid.z3[[k, j, i]], grid.z[k]);
                }
            }
        }
    }
}
