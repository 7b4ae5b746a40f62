//! SCRIP grid definition files.
//!
//! A SCRIP file is the flattened interchange form of a grid: cell centers,
//! cell corners and an integer mask, all indexed by a single `grid_size`
//! dimension. It is the input format of `ESMF_Scrip2Unstruct`.
//!
//! # File layout
//!
//! ```text
//! dimensions:
//!     grid_rank = 2 ;
//!     grid_size = nx * ny ;
//!     grid_corners = 4 ;
//! variables:
//!     int    grid_dims(grid_rank) ;                     // [nx, ny]
//!     double grid_center_lon(grid_size) ;               // degrees
//!     double grid_center_lat(grid_size) ;               // degrees
//!     double grid_corner_lon(grid_size, grid_corners) ; // degrees
//!     double grid_corner_lat(grid_size, grid_corners) ; // degrees
//!     int    grid_imask(grid_size) ;                    // 1 = active, 0 = masked
//! ```
//!
//! No `_FillValue` attribute is written unless one is explicitly set on the
//! record; ESMF's converters treat a stray fill value as masked data.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::corners::{CornerSet, CORNERS_PER_CELL};
use crate::error::{GridError, GridResult};
use crate::grid::CenterGrid;

/// Default file name for the SCRIP file inside an output directory.
pub const SCRIP_FILE_NAME: &str = "scrip.nc";

/// Value of the `created_by` global attribute.
pub const CREATED_BY: &str = "esmf-grid";

/// The flattened, serializable form of a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridInterchangeRecord {
    /// Grid dimensions, column count first: `[nx, ny]`
    pub grid_dims: [i32; 2],
    pub center_lon: Vec<f64>,
    pub center_lat: Vec<f64>,
    pub corner_lon: Vec<[f64; CORNERS_PER_CELL]>,
    pub corner_lat: Vec<[f64; CORNERS_PER_CELL]>,
    pub imask: Vec<i32>,
    /// Explicit `_FillValue` for the coordinate fields, if any
    pub fill_value: Option<f64>,
    /// Value of the `date_created` global attribute
    pub date_created: String,
}

impl GridInterchangeRecord {
    /// Assemble a record from centers, corners and an optional mask.
    ///
    /// Without a mask every cell is active.
    pub fn new(grid: &CenterGrid, corners: CornerSet, mask: Option<Vec<i32>>) -> GridResult<Self> {
        let size = grid.len();
        if corners.len() != size || corners.lat.len() != size {
            return Err(GridError::invalid_shape(format!(
                "expected {} corner sets, got {} lon and {} lat",
                size,
                corners.lon.len(),
                corners.lat.len()
            )));
        }

        let imask = match mask {
            Some(mask) if mask.len() != size => {
                return Err(GridError::invalid_shape(format!(
                    "mask has {} values but grid has {} cells",
                    mask.len(),
                    size
                )));
            }
            Some(mask) => mask,
            None => vec![1; size],
        };

        let [nx, ny] = grid.dims_xy();
        let grid_dims = [dim_to_i32(nx)?, dim_to_i32(ny)?];

        Ok(Self {
            grid_dims,
            center_lon: grid.lon.clone(),
            center_lat: grid.lat.clone(),
            corner_lon: corners.lon,
            corner_lat: corners.lat,
            imask,
            fill_value: None,
            date_created: Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        })
    }

    /// Set an explicit `_FillValue` on the coordinate fields.
    pub fn with_fill_value(mut self, fill_value: f64) -> Self {
        self.fill_value = Some(fill_value);
        self
    }

    /// Number of cells.
    pub fn grid_size(&self) -> usize {
        self.center_lon.len()
    }

    /// Value of the `title` global attribute, e.g. `Grid with 4x3 size`.
    pub fn title(&self) -> String {
        format!("Grid with {}x{} size", self.grid_dims[0], self.grid_dims[1])
    }
}

fn dim_to_i32(n: usize) -> GridResult<i32> {
    i32::try_from(n).map_err(|_| GridError::invalid_shape(format!("dimension {} exceeds int32", n)))
}

fn flatten_corners(corners: &[[f64; CORNERS_PER_CELL]]) -> Vec<f64> {
    corners.iter().flat_map(|c| c.iter().copied()).collect()
}

/// Write `record` as a SCRIP file at `destination`, replacing any existing file.
///
/// The parent directory must already exist.
pub fn write_interchange(
    record: &GridInterchangeRecord,
    destination: &Path,
) -> GridResult<PathBuf> {
    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(GridError::PathNotFound(parent.to_path_buf()));
    }

    let err = |e: netcdf::Error| GridError::netcdf(destination, e);

    let mut file = netcdf::create(destination).map_err(err)?;

    file.add_dimension("grid_rank", 2).map_err(err)?;
    file.add_dimension("grid_size", record.grid_size()).map_err(err)?;
    file.add_dimension("grid_corners", CORNERS_PER_CELL).map_err(err)?;

    {
        let mut var = file.add_variable::<i32>("grid_dims", &["grid_rank"]).map_err(err)?;
        var.put_values(&record.grid_dims[..], ..).map_err(err)?;
    }

    let centers = [
        ("grid_center_lon", &record.center_lon),
        ("grid_center_lat", &record.center_lat),
    ];
    for (name, values) in centers {
        let mut var = file.add_variable::<f64>(name, &["grid_size"]).map_err(err)?;
        if let Some(fill) = record.fill_value {
            var.put_attribute("_FillValue", fill).map_err(err)?;
        }
        var.put_attribute("units", "degrees").map_err(err)?;
        var.put_values(values.as_slice(), ..).map_err(err)?;
    }

    let corners = [
        ("grid_corner_lon", &record.corner_lon),
        ("grid_corner_lat", &record.corner_lat),
    ];
    for (name, values) in corners {
        let mut var = file
            .add_variable::<f64>(name, &["grid_size", "grid_corners"])
            .map_err(err)?;
        if let Some(fill) = record.fill_value {
            var.put_attribute("_FillValue", fill).map_err(err)?;
        }
        var.put_attribute("units", "degrees").map_err(err)?;
        var.put_values(&flatten_corners(values), ..).map_err(err)?;
    }

    {
        let mut var = file.add_variable::<i32>("grid_imask", &["grid_size"]).map_err(err)?;
        var.put_attribute("units", "unitless").map_err(err)?;
        var.put_values(record.imask.as_slice(), ..).map_err(err)?;
    }

    file.add_attribute("title", record.title()).map_err(err)?;
    file.add_attribute("created_by", CREATED_BY).map_err(err)?;
    file.add_attribute("date_created", record.date_created.as_str()).map_err(err)?;
    file.add_attribute("conventions", "SCRIP").map_err(err)?;

    drop(file);

    info!(
        path = %destination.display(),
        nx = record.grid_dims[0],
        ny = record.grid_dims[1],
        "Wrote SCRIP grid definition"
    );

    Ok(destination.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corners::calc_corners;

    fn small_grid() -> CenterGrid {
        CenterGrid::new(
            2,
            2,
            vec![0.0, 1.0, 0.0, 1.0],
            vec![0.0, 0.0, 1.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_record_defaults_mask_to_ones() {
        let grid = small_grid();
        let corners = calc_corners(&grid).unwrap();
        let record = GridInterchangeRecord::new(&grid, corners, None).unwrap();
        assert_eq!(record.imask, vec![1, 1, 1, 1]);
        assert_eq!(record.grid_dims, [2, 2]);
        assert!(record.fill_value.is_none());
    }

    #[test]
    fn test_record_rejects_wrong_mask_length() {
        let grid = small_grid();
        let corners = calc_corners(&grid).unwrap();
        let err = GridInterchangeRecord::new(&grid, corners, Some(vec![1, 0])).unwrap_err();
        assert!(matches!(err, GridError::InvalidGridShape(_)));
    }

    #[test]
    fn test_title() {
        let grid = CenterGrid::new(4, 3, vec![0.0; 12], vec![0.0; 12]).unwrap();
        let corners = CornerSet {
            lon: vec![[0.0; 4]; 12],
            lat: vec![[0.0; 4]; 12],
        };
        let record = GridInterchangeRecord::new(&grid, corners, None).unwrap();
        assert_eq!(record.title(), "Grid with 4x3 size");
    }

    #[test]
    fn test_flatten_corners_row_major() {
        let flat = flatten_corners(&[[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]]);
        assert_eq!(flat, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_write_to_missing_directory() {
        let grid = small_grid();
        let corners = calc_corners(&grid).unwrap();
        let record = GridInterchangeRecord::new(&grid, corners, None).unwrap();
        let err = write_interchange(&record, Path::new("/nonexistent/dir/scrip.nc")).unwrap_err();
        assert!(matches!(err, GridError::PathNotFound(_)));
    }
}
