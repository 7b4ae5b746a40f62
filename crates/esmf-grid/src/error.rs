//! Error types for grid definition and mesh generation.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for grid definition operations.
pub type GridResult<T> = Result<T, GridError>;

/// Error types for grid definition and mesh generation.
///
/// None of these are retried internally; every variant carries the path,
/// variable name or exit code needed to log the failure meaningfully.
#[derive(Error, Debug)]
pub enum GridError {
    /// Coordinate arrays are malformed or do not agree with each other
    #[error("Invalid grid shape: {0}")]
    InvalidGridShape(String),

    /// None of the conventional coordinate names are present in the source file
    #[error("No coordinate variable found in {}: tried {}", path.display(), tried.join(", "))]
    CoordinateNotFound { path: PathBuf, tried: Vec<String> },

    /// A named (non-coordinate) variable is missing from the source file
    #[error("Variable '{name}' not found in {}", path.display())]
    VariableNotFound { path: PathBuf, name: String },

    /// Input file or destination directory does not exist
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// The external conversion executable could not be resolved
    #[error("Mesh conversion tool not found: {0}")]
    ToolNotFound(String),

    /// The external conversion process failed or timed out
    #[error("Mesh conversion failed for {}: {reason}{}", path.display(), exit_suffix(exit_code))]
    MeshConversionFailed {
        path: PathBuf,
        exit_code: Option<i32>,
        reason: String,
    },

    /// The mesh destination is the same file as the intermediate SCRIP file
    #[error("Mesh output {} would overwrite the SCRIP file it is built from", .0.display())]
    OutputConflict(PathBuf),

    /// Requested output format is not one of `scrip` or `mesh`
    #[error("Unsupported grid format: {0}")]
    UnsupportedFormat(String),

    /// Error reported by the NetCDF library
    #[error("NetCDF error on {}: {message}", path.display())]
    NetCdf { path: PathBuf, message: String },

    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl GridError {
    /// Create an InvalidGridShape error.
    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidGridShape(msg.into())
    }

    /// Create a ToolNotFound error.
    pub fn tool_not_found(msg: impl Into<String>) -> Self {
        Self::ToolNotFound(msg.into())
    }

    /// Create a NetCdf error tied to the file it occurred on.
    pub fn netcdf(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::NetCdf {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Create a MeshConversionFailed error.
    pub fn conversion_failed(
        path: &Path,
        exit_code: Option<i32>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MeshConversionFailed {
            path: path.to_path_buf(),
            exit_code,
            reason: reason.into(),
        }
    }
}

fn exit_suffix(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!(" (exit code {})", code),
        None => String::new(),
    }
}
