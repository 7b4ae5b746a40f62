//! Reading grid coordinates from forcing data files.
//!
//! Source files are opened with the native netcdf library (which wraps
//! HDF5). Values are read exactly as stored: no scale/offset is applied
//! and fill values are not masked, so corner inference sees the grid as
//! declared.

use std::path::{Path, PathBuf};
use std::sync::Once;

use tracing::debug;

use crate::error::{GridError, GridResult};
use crate::grid::{CenterGrid, CoordinateArray};

/// Longitude variable names, in lookup order.
pub const LON_CANDIDATES: &[&str] = &["longitude", "lon", "geolon"];

/// Latitude variable names, in lookup order.
pub const LAT_CANDIDATES: &[&str] = &["latitude", "lat", "geolat"];

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when
/// errors are handled gracefully (e.g. when probing for a variable that
/// doesn't exist). It only needs to be called once per process, but is safe
/// to call multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// An open source data file.
///
/// The underlying file handle is released when this value is dropped,
/// including on early error returns.
pub struct SourceDataset {
    path: PathBuf,
    file: netcdf::File,
}

impl SourceDataset {
    /// Open a source file read-only.
    pub fn open(path: impl AsRef<Path>) -> GridResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(GridError::PathNotFound(path.to_path_buf()));
        }

        silence_hdf5_errors();

        let file = netcdf::open(path).map_err(|e| GridError::netcdf(path, e))?;
        debug!(path = %path.display(), "Opened source dataset");

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Path of the opened file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if a variable exists.
    pub fn has_variable(&self, name: &str) -> bool {
        self.file.variables().any(|var| var.name() == name)
    }

    /// Return the first candidate name present in the file.
    pub fn find_coordinate<'a>(&self, candidates: &[&'a str]) -> GridResult<&'a str> {
        candidates
            .iter()
            .copied()
            .find(|name| self.has_variable(name))
            .ok_or_else(|| GridError::CoordinateNotFound {
                path: self.path.clone(),
                tried: candidates.iter().map(|s| s.to_string()).collect(),
            })
    }

    fn variable(&self, name: &str) -> GridResult<netcdf::Variable<'_>> {
        self.file
            .variable(name)
            .ok_or_else(|| GridError::VariableNotFound {
                path: self.path.clone(),
                name: name.to_string(),
            })
    }

    /// Read a coordinate variable with its dimension lengths.
    pub fn read_coordinate(&self, name: &str) -> GridResult<CoordinateArray> {
        let var = self.variable(name)?;
        let dims: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let values: Vec<f64> = var
            .get_values(..)
            .map_err(|e| GridError::netcdf(&self.path, format!("failed to read {}: {}", name, e)))?;

        debug!(variable = name, dims = ?dims, "Read coordinate variable");
        Ok(CoordinateArray::new(dims, values))
    }

    /// Read a mask variable, flattened.
    pub fn read_mask(&self, name: &str) -> GridResult<Vec<i32>> {
        let var = self.variable(name)?;
        var.get_values(..)
            .map_err(|e| GridError::netcdf(&self.path, format!("failed to read {}: {}", name, e)))
    }

    /// Locate and read both coordinates, normalized to a 2D center grid.
    ///
    /// Both names are resolved before any coordinate data is read.
    pub fn read_center_grid(&self) -> GridResult<CenterGrid> {
        let lon_name = self.find_coordinate(LON_CANDIDATES)?;
        let lat_name = self.find_coordinate(LAT_CANDIDATES)?;

        let lon = self.read_coordinate(lon_name)?;
        let lat = self.read_coordinate(lat_name)?;
        CenterGrid::from_coordinates(lon, lat)
    }
}
