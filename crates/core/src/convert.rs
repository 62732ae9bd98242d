//! Adapter around the external mesh-conversion utility.
//!
//! The utility is an opaque child process invoked as
//! `<bin> <input_path> <output_directory>`. A zero exit status plus the
//! expected output file on disk is the only success condition.

use std::path::{Path, PathBuf};

/// Extension produced by the conversion utility.
const TARGET_EXT: &str = "gltf";

/// Error type for mesh conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("conversion utility not found: {0}")]
    NotFound(std::io::Error),

    #[error("conversion failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("conversion produced no output file at {0}")]
    OutputMissing(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Expected output path for a given input: `<out_dir>/<input_basename>.gltf`.
pub fn output_path(input: &Path, out_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    out_dir.join(stem).with_extension(TARGET_EXT)
}

/// Run the conversion utility on `input`, writing into `out_dir`.
///
/// Returns the path of the converted file. A non-zero exit carries the
/// utility's stderr as the diagnostic; a zero exit without the expected
/// output file is also an error. The utility is invoked exactly once,
/// no retry.
pub async fn convert_mesh(
    bin: &Path,
    input: &Path,
    out_dir: &Path,
) -> Result<PathBuf, ConvertError> {
    let output = tokio::process::Command::new(bin)
        .arg(input)
        .arg(out_dir)
        .output()
        .await
        .map_err(ConvertError::NotFound)?;

    if !output.status.success() {
        return Err(ConvertError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let converted = output_path(input, out_dir);
    if !converted.is_file() {
        return Err(ConvertError::OutputMissing(converted));
    }

    tracing::debug!(
        input = %input.display(),
        output = %converted.display(),
        "Mesh conversion complete",
    );

    Ok(converted)
}
