//! Iteration discovery and file naming conventions.
//!
//! MDS output pairs are named `<prefix>.<10-digit zero-padded
//! iteration>.meta` / `.data`; reference files written once per run
//! (grid coordinates, `Depth`) drop the iteration qualifier.

use crate::constants::{DATA_EXTENSION, ITERATION_DIGITS, META_EXTENSION};
use crate::error::Result;
use glob::glob;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File stem for a variable, with or without an iteration qualifier.
fn file_base(prefix: &str, iteration: Option<u64>) -> String {
    match iteration {
        Some(iteration) => format!("{prefix}.{iteration:0width$}", width = ITERATION_DIGITS),
        None => prefix.to_string(),
    }
}

/// Path of the sidecar metadata file for a variable.
pub fn meta_path(dir: &Path, prefix: &str, iteration: Option<u64>) -> PathBuf {
    dir.join(format!("{}.{META_EXTENSION}", file_base(prefix, iteration)))
}

/// Path of the binary payload file for a variable.
pub fn data_path(dir: &Path, prefix: &str, iteration: Option<u64>) -> PathBuf {
    dir.join(format!("{}.{DATA_EXTENSION}", file_base(prefix, iteration)))
}

/// Discover the iterations available for a field by scanning its
/// payload files, sorted ascending.
pub fn discover_iterations(dir: &Path, prefix: &str) -> Result<Vec<u64>> {
    let pattern = dir
        .join(format!("{prefix}.*.{DATA_EXTENSION}"))
        .to_string_lossy()
        .into_owned();
    let matcher = Regex::new(&format!(
        r"^{}\.(\d{{{ITERATION_DIGITS}}})\.{DATA_EXTENSION}$",
        regex::escape(prefix)
    ))
    .expect("iteration pattern is valid");

    let mut iterations = Vec::new();
    for entry in glob(&pattern)? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("skipping unreadable entry during discovery: {e}");
                continue;
            }
        };
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(captures) = matcher.captures(name) {
            if let Ok(iteration) = captures[1].parse::<u64>() {
                iterations.push(iteration);
            }
        }
    }

    iterations.sort_unstable();
    iterations.dedup();
    debug!(
        "discovered {} iterations for `{prefix}` in {}",
        iterations.len(),
        dir.display()
    );
    Ok(iterations)
}
