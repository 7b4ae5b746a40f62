//! Synthetic cell-center grids.
//!
//! All generators return `(lon, lat)` as row-major `Vec<f64>` of length
//! `nx * ny`, where index `j * nx + i` is the cell in row `j`, column `i`.

/// Creates a uniform grid with `center(i, j) = (lon0 + i*dx, lat0 + j*dy)`.
///
/// # Example
///
/// ```
/// use test_utils::uniform_centers;
///
/// let (lon, lat) = uniform_centers(3, 2, -80.0, 30.0, 0.5, 0.25);
/// assert_eq!(lon.len(), 6);
/// assert_eq!(lon[1], -79.5);  // i=1, j=0
/// assert_eq!(lat[3], 30.25);  // i=0, j=1
/// ```
pub fn uniform_centers(
    nx: usize,
    ny: usize,
    lon0: f64,
    lat0: f64,
    dx: f64,
    dy: f64,
) -> (Vec<f64>, Vec<f64>) {
    let mut lon = Vec::with_capacity(nx * ny);
    let mut lat = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            lon.push(lon0 + i as f64 * dx);
            lat.push(lat0 + j as f64 * dy);
        }
    }
    (lon, lat)
}

/// Separable 1D coordinate vectors for the same grid as [`uniform_centers`].
pub fn uniform_axes(
    nx: usize,
    ny: usize,
    lon0: f64,
    lat0: f64,
    dx: f64,
    dy: f64,
) -> (Vec<f64>, Vec<f64>) {
    let lon = (0..nx).map(|i| lon0 + i as f64 * dx).collect();
    let lat = (0..ny).map(|j| lat0 + j as f64 * dy).collect();
    (lon, lat)
}

/// Creates a curvilinear grid: a uniform grid rotated by `angle_deg`
/// about `(lon0, lat0)` with a gentle sinusoidal warp.
///
/// Useful for checking properties that must hold on non-rectilinear grids.
pub fn curvilinear_centers(
    nx: usize,
    ny: usize,
    lon0: f64,
    lat0: f64,
    spacing: f64,
    angle_deg: f64,
) -> (Vec<f64>, Vec<f64>) {
    let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
    let mut lon = Vec::with_capacity(nx * ny);
    let mut lat = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let u = i as f64 * spacing;
            let v = j as f64 * spacing + 0.1 * spacing * (i as f64 * 0.7).sin();
            lon.push(lon0 + u * cos_a - v * sin_a);
            lat.push(lat0 + u * sin_a + v * cos_a);
        }
    }
    (lon, lat)
}

/// Creates a land/sea mask with the first `land_cols` columns masked out.
pub fn column_mask(nx: usize, ny: usize, land_cols: usize) -> Vec<i32> {
    let mut mask = Vec::with_capacity(nx * ny);
    for _ in 0..ny {
        for i in 0..nx {
            mask.push(if i < land_cols { 0 } else { 1 });
        }
    }
    mask
}
