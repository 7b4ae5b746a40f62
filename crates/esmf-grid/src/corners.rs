//! Corner coordinate inference from cell centers.
//!
//! Corners are found by averaging the four cell centers that share each
//! corner. Cells along the grid edge have no neighbor on one side, so the
//! center array is first padded with a ring of ghost cells whose values are
//! linearly extrapolated one step past the edge (the mirror of the next
//! interior cell about the edge cell). This is the same approach as NCL's
//! `calc_SCRIP_corners_noboundaries`.
//!
//! # Limitations
//!
//! Only non-periodic, logically-rectangular grids are handled. Longitudes
//! that wrap around the dateline and grids touching a pole are extrapolated
//! naively, so corners there may fall outside the valid coordinate range.

use tracing::debug;

use crate::error::{GridError, GridResult};
use crate::grid::CenterGrid;

/// Number of corners per cell.
pub const CORNERS_PER_CELL: usize = 4;

/// Four corner coordinates per cell.
///
/// Corners are ordered lower-left, lower-right, upper-right, upper-left for
/// a grid whose rows run south to north and columns west to east, i.e.
/// counter-clockwise. For cell `(j, i)` they are corner points `(j, i)`,
/// `(j, i+1)`, `(j+1, i+1)` and `(j+1, i)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerSet {
    pub lon: Vec<[f64; CORNERS_PER_CELL]>,
    pub lat: Vec<[f64; CORNERS_PER_CELL]>,
}

impl CornerSet {
    /// Number of cells.
    pub fn len(&self) -> usize {
        self.lon.len()
    }

    /// Check if there are no cells.
    pub fn is_empty(&self) -> bool {
        self.lon.is_empty()
    }
}

/// Mirror of `p1` with respect to `p0`.
#[inline]
pub fn mirror(p1: f64, p0: f64) -> f64 {
    p0 - (p1 - p0)
}

fn check_axes(nx: usize, ny: usize) -> GridResult<()> {
    if nx < 2 || ny < 2 {
        return Err(GridError::invalid_shape(format!(
            "corner inference needs at least 2x2 cells, got {}x{}",
            nx, ny
        )));
    }
    Ok(())
}

fn check_len(values: &[f64], expected: usize, what: &str) -> GridResult<()> {
    if values.len() != expected {
        return Err(GridError::invalid_shape(format!(
            "{} has {} values, expected {}",
            what,
            values.len(),
            expected
        )));
    }
    Ok(())
}

/// Pad a `ny x nx` array with one ring of extrapolated ghost cells.
///
/// Returns a row-major array of shape `(ny + 2, nx + 2)`. Fails with
/// `InvalidGridShape` unless `nx >= 2`, `ny >= 2` and `values` holds
/// `nx * ny` entries.
pub fn pad_with_ghosts(values: &[f64], nx: usize, ny: usize) -> GridResult<Vec<f64>> {
    check_axes(nx, ny)?;
    check_len(values, nx * ny, "center array")?;

    let nxe = nx + 2;
    let nye = ny + 2;
    let c = |j: usize, i: usize| values[j * nx + i];

    let mut ext = vec![0.0; nxe * nye];
    for j in 0..ny {
        let start = (j + 1) * nxe + 1;
        ext[start..start + nx].copy_from_slice(&values[j * nx..(j + 1) * nx]);
    }

    // Left and right columns
    for j in 0..ny {
        ext[(j + 1) * nxe] = mirror(c(j, 1), c(j, 0));
        ext[(j + 1) * nxe + nxe - 1] = mirror(c(j, nx - 2), c(j, nx - 1));
    }

    // First and last rows
    for i in 0..nx {
        ext[i + 1] = mirror(c(1, i), c(0, i));
        ext[(nye - 1) * nxe + i + 1] = mirror(c(ny - 2, i), c(ny - 1, i));
    }

    // Outer corners, from the diagonal interior neighbor
    ext[0] = mirror(c(1, 1), c(0, 0));
    ext[nxe - 1] = mirror(c(1, nx - 2), c(0, nx - 1));
    ext[(nye - 1) * nxe] = mirror(c(ny - 2, 1), c(ny - 1, 0));
    ext[nye * nxe - 1] = mirror(c(ny - 2, nx - 2), c(ny - 1, nx - 1));

    Ok(ext)
}

/// Average each 2x2 block of the padded array into a corner point.
///
/// `padded` has shape `(ny + 2, nx + 2)`; the result has shape
/// `(ny + 1, nx + 1)`.
pub fn corner_points(padded: &[f64], nx: usize, ny: usize) -> GridResult<Vec<f64>> {
    check_axes(nx, ny)?;
    check_len(padded, (nx + 2) * (ny + 2), "padded array")?;

    let nxe = nx + 2;
    let nxc = nx + 1;
    let nyc = ny + 1;

    // Horizontal pair sums first, then the vertical pair scaled by 0.25.
    let pair = |j: usize, i: usize| padded[j * nxe + i + 1] + padded[j * nxe + i];

    let mut out = Vec::with_capacity(nxc * nyc);
    for j in 0..nyc {
        for i in 0..nxc {
            out.push(0.25 * (pair(j + 1, i) + pair(j, i)));
        }
    }
    Ok(out)
}

fn gather_corners(points: &[f64], nx: usize, ny: usize) -> Vec<[f64; CORNERS_PER_CELL]> {
    let nxc = nx + 1;
    let mut cells = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            cells.push([
                points[j * nxc + i],
                points[j * nxc + i + 1],
                points[(j + 1) * nxc + i + 1],
                points[(j + 1) * nxc + i],
            ]);
        }
    }
    cells
}

/// Compute the four corners of every cell in `grid`.
///
/// Fails with `InvalidGridShape` when either axis has fewer than two cells,
/// since the edge extrapolation needs a second interior point.
pub fn calc_corners(grid: &CenterGrid) -> GridResult<CornerSet> {
    let (ny, nx) = grid.shape();
    check_axes(nx, ny)?;

    debug!(nx, ny, "Calculating corner coordinates");

    Ok(CornerSet {
        lon: cell_corners(&grid.lon, nx, ny)?,
        lat: cell_corners(&grid.lat, nx, ny)?,
    })
}

fn cell_corners(
    values: &[f64],
    nx: usize,
    ny: usize,
) -> GridResult<Vec<[f64; CORNERS_PER_CELL]>> {
    let points = corner_points(&pad_with_ghosts(values, nx, ny)?, nx, ny)?;
    Ok(gather_corners(&points, nx, ny))
}
