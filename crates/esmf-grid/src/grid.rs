//! Cell-center grids for logically-rectangular model domains.

use crate::error::{GridError, GridResult};

/// A raw coordinate variable as read from a source file.
///
/// `dims` holds the variable's dimension lengths in file order (slowest
/// varying first); `values` is the flattened data.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateArray {
    pub dims: Vec<usize>,
    pub values: Vec<f64>,
}

impl CoordinateArray {
    /// Create a new coordinate array.
    pub fn new(dims: Vec<usize>, values: Vec<f64>) -> Self {
        Self { dims, values }
    }

    /// A 1D coordinate vector.
    pub fn vector(values: Vec<f64>) -> Self {
        Self {
            dims: vec![values.len()],
            values,
        }
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    fn check_len(&self, name: &str) -> GridResult<()> {
        let expected: usize = self.dims.iter().product();
        if expected != self.values.len() {
            return Err(GridError::invalid_shape(format!(
                "{} has dims {:?} but {} values",
                name,
                self.dims,
                self.values.len()
            )));
        }
        Ok(())
    }
}

/// Cell-center longitudes and latitudes on a 2D grid.
///
/// Values are stored row-major: the center of cell `(j, i)` lives at
/// index `j * nx + i`, with `j` the row (y) and `i` the column (x).
#[derive(Debug, Clone, PartialEq)]
pub struct CenterGrid {
    /// Number of points in X (longitude) direction
    pub nx: usize,
    /// Number of points in Y (latitude) direction
    pub ny: usize,
    /// Center longitudes in degrees
    pub lon: Vec<f64>,
    /// Center latitudes in degrees
    pub lat: Vec<f64>,
}

impl CenterGrid {
    /// Create a grid from already two-dimensional, flattened arrays.
    pub fn new(nx: usize, ny: usize, lon: Vec<f64>, lat: Vec<f64>) -> GridResult<Self> {
        if nx == 0 || ny == 0 {
            return Err(GridError::invalid_shape(format!(
                "grid must have at least one cell, got {}x{}",
                nx, ny
            )));
        }
        let size = nx * ny;
        if lon.len() != size || lat.len() != size {
            return Err(GridError::invalid_shape(format!(
                "expected {} centers for a {}x{} grid, got {} lon and {} lat",
                size,
                nx,
                ny,
                lon.len(),
                lat.len()
            )));
        }
        Ok(Self { nx, ny, lon, lat })
    }

    /// Build a grid from source coordinate variables.
    ///
    /// Separable 1D vectors (lon of length `nx`, lat of length `ny`) are
    /// broadcast to the full 2D form; 2D variables must share their shape.
    pub fn from_coordinates(lon: CoordinateArray, lat: CoordinateArray) -> GridResult<Self> {
        lon.check_len("longitude")?;
        lat.check_len("latitude")?;

        match (lon.rank(), lat.rank()) {
            (1, 1) => {
                let nx = lon.values.len();
                let ny = lat.values.len();
                let mut lon2 = Vec::with_capacity(nx * ny);
                let mut lat2 = Vec::with_capacity(nx * ny);
                for &y in &lat.values {
                    lon2.extend_from_slice(&lon.values);
                    lat2.extend(std::iter::repeat(y).take(nx));
                }
                Self::new(nx, ny, lon2, lat2)
            }
            (2, 2) => {
                if lon.dims != lat.dims {
                    return Err(GridError::invalid_shape(format!(
                        "longitude dims {:?} do not match latitude dims {:?}",
                        lon.dims, lat.dims
                    )));
                }
                let (ny, nx) = (lon.dims[0], lon.dims[1]);
                Self::new(nx, ny, lon.values, lat.values)
            }
            (lon_rank, lat_rank) => Err(GridError::invalid_shape(format!(
                "coordinates must both be 1D or both be 2D, got rank {} longitude and rank {} latitude",
                lon_rank, lat_rank
            ))),
        }
    }

    /// Row-major shape `(ny, nx)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    /// Column-count-first dimensions `[nx, ny]`, as written to `grid_dims`.
    pub fn dims_xy(&self) -> [usize; 2] {
        [self.nx, self.ny]
    }

    /// Flat index for cell `(j, i)`.
    pub fn flat_index(&self, j: usize, i: usize) -> usize {
        j * self.nx + i
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    /// Check if grid is empty.
    pub fn is_empty(&self) -> bool {
        self.nx == 0 || self.ny == 0
    }
}
