//! Binary payload decoding.
//!
//! MDS payloads are raw big-endian arrays with no header, stored with
//! the first logical axis varying fastest (Fortran / column-major
//! order). The decoder reconstructs an array of shape `(x, y[, z])` by
//! reshaping with the *first* declared axis as the fastest-varying
//! dimension; a naive row-major reshape would silently transpose the
//! data.
//!
//! All precisions are widened to `f64` on decode, matching the output
//! container.

use crate::error::{ConvertError, Result};
use crate::models::VariableSchema;
use byteorder::{BigEndian, ByteOrder};
use ndarray::{Array2, Array3, ArrayD, IxDyn, ShapeBuilder};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Decode the payload file paired with `schema` into an array shaped
/// `(x, y[, z])`.
pub fn read_payload(path: &Path, schema: &VariableSchema) -> Result<ArrayD<f64>> {
    let bytes = fs::read(path).map_err(|source| ConvertError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    decode_payload(&bytes, schema, path)
}

/// Decode an in-memory payload. Split out from [`read_payload`] so the
/// wire format can be tested without touching the filesystem.
pub fn decode_payload(bytes: &[u8], schema: &VariableSchema, path: &Path) -> Result<ArrayD<f64>> {
    let expected = schema.element_count() * schema.precision.byte_width;
    if bytes.len() != expected {
        return Err(ConvertError::PayloadSize {
            path: path.to_path_buf(),
            expected,
            found: bytes.len(),
        });
    }

    let values: Vec<f64> = match schema.precision.byte_width {
        4 => bytes
            .chunks_exact(4)
            .map(|chunk| BigEndian::read_f32(chunk) as f64)
            .collect(),
        _ => bytes
            .chunks_exact(8)
            .map(BigEndian::read_f64)
            .collect(),
    };

    debug!(
        "decoded {} elements with shape {:?} from {}",
        values.len(),
        schema.shape(),
        path.display()
    );

    // `.f()` makes the first axis the fastest-varying one.
    ArrayD::from_shape_vec(IxDyn(&schema.shape()).f(), values).map_err(|e| {
        ConvertError::shape_mismatch(path.display().to_string(), e.to_string())
    })
}

/// Reorient a decoded 3-D array from `(x, y, z)` to the `(z, y, x)`
/// standard layout used for remapping and writing.
pub fn into_zyx(array: ArrayD<f64>, name: &str) -> Result<Array3<f64>> {
    let array = array
        .into_dimensionality::<ndarray::Ix3>()
        .map_err(|_| ConvertError::shape_mismatch(name, "expected a 3-D array"))?;
    Ok(array.permuted_axes([2, 1, 0]).as_standard_layout().to_owned())
}

/// Reorient a decoded 2-D array from `(x, y)` to `(y, x)`.
pub fn into_yx(array: ArrayD<f64>, name: &str) -> Result<Array2<f64>> {
    let array = array
        .into_dimensionality::<ndarray::Ix2>()
        .map_err(|_| ConvertError::shape_mismatch(name, "expected a 2-D array"))?;
    Ok(array.permuted_axes([1, 0]).as_standard_layout().to_owned())
}
