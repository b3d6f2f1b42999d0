//! Whitespace-separated float files for controller weights, parameters and
//! usage counts.
//!
//! Loading is infallible by contract: a missing or malformed file means "use
//! the built-in defaults" and is only logged. Saving reports I/O failures.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SearchError;

/// Parse every whitespace-separated token as `f64`.
///
/// Returns `None` if any token is not a finite number.
#[must_use]
pub fn parse_floats(text: &str) -> Option<Vec<f64>> {
    text.split_whitespace()
        .map(|token| token.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect()
}

/// Load a float file, or `None` if it is missing or malformed.
#[must_use]
pub fn load_floats(path: &Path) -> Option<Vec<f64>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            debug!(event = "checkpoint_missing", path = %path.display(), error = %e);
            return None;
        }
    };
    let values = parse_floats(&text);
    if values.is_none() {
        debug!(event = "checkpoint_malformed", path = %path.display());
    }
    values
}

/// Load a float file and check its length.
#[must_use]
pub fn load_floats_exact(path: &Path, expected: usize) -> Option<Vec<f64>> {
    let values = load_floats(path)?;
    if values.len() == expected {
        Some(values)
    } else {
        debug!(
            event = "checkpoint_malformed",
            path = %path.display(),
            expected,
            actual = values.len()
        );
        None
    }
}

/// Write `rows` one per line, values separated by single spaces.
///
/// # Errors
///
/// [`SearchError::CheckpointWrite`] when the file cannot be written.
pub fn save_rows<T: std::fmt::Display>(path: &Path, rows: &[Vec<T>]) -> Result<(), SearchError> {
    let mut text = String::new();
    for row in rows {
        let mut first = true;
        for value in row {
            if !first {
                text.push(' ');
            }
            first = false;
            // String formatting cannot fail.
            let _ = write!(text, "{value}");
        }
        text.push('\n');
    }
    fs::write(path, text).map_err(|source| SearchError::CheckpointWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Path of the usage-count file that sits next to a weights checkpoint.
#[must_use]
pub fn usage_path(checkpoint: &Path) -> PathBuf {
    checkpoint.with_extension("usage")
}

/// Load usage counts, one row per context. Rows must all have `width` counts.
#[must_use]
pub fn load_usage(path: &Path, rows: usize, width: usize) -> Option<Vec<Vec<u64>>> {
    let values = load_floats_exact(path, rows * width)?;
    if values.iter().any(|v| *v < 0.0 || v.fract() != 0.0) {
        debug!(event = "checkpoint_malformed", path = %path.display());
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let counts = values
        .chunks(width.max(1))
        .map(|row| row.iter().map(|v| *v as u64).collect())
        .collect();
    Some(counts)
}
