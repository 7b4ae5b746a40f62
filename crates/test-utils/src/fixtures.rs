//! Common test fixtures for grid definition tests.
//!
//! Forcing files are written with the netcdf library in the same layouts
//! the real downloads use: regular lat/lon files with 1D `longitude` and
//! `latitude` axes, and curvilinear files with 2D coordinate variables on
//! `(y, x)` dimensions.

use std::path::{Path, PathBuf};

/// Name of the stand-in converter executable.
pub const CONVERTER_NAME: &str = "ESMF_Scrip2Unstruct";

/// Converter script that copies the SCRIP file to the mesh path and
/// records its arguments and working directory.
pub const CONVERTER_OK: &str = r#"#!/bin/sh
echo "$@" > args.txt
pwd > cwd.txt
echo "Scrip2Unstruct: converting $1 to $2"
cp "$1" "$2"
"#;

/// Converter script that leaves a partial file behind and fails.
pub const CONVERTER_FAILS: &str = r#"#!/bin/sh
echo "ERROR: unable to read corner coordinates" >&2
printf partial > "$2"
exit 3
"#;

/// Converter script that exits cleanly without writing anything.
pub const CONVERTER_NO_OUTPUT: &str = r#"#!/bin/sh
exit 0
"#;

/// Converter script that never finishes on its own.
pub const CONVERTER_HANGS: &str = r#"#!/bin/sh
printf partial > "$2"
exec sleep 30
"#;

/// Writes a regular lat/lon forcing file with 1D coordinate axes.
///
/// The axes are stored as coordinate variables named `lon_name` and
/// `lat_name` on dimensions of the same names, alongside a 2D `t2m` field.
pub fn write_regular_forcing(
    path: &Path,
    lon_name: &str,
    lat_name: &str,
    lon: &[f64],
    lat: &[f64],
) -> Result<(), netcdf::Error> {
    let mut file = netcdf::create(path)?;
    file.add_dimension(lat_name, lat.len())?;
    file.add_dimension(lon_name, lon.len())?;

    {
        let mut var = file.add_variable::<f64>(lon_name, &[lon_name])?;
        var.put_attribute("units", "degrees_east")?;
        var.put_values(lon, ..)?;
    }
    {
        let mut var = file.add_variable::<f64>(lat_name, &[lat_name])?;
        var.put_attribute("units", "degrees_north")?;
        var.put_values(lat, ..)?;
    }
    {
        let mut var = file.add_variable::<f32>("t2m", &[lat_name, lon_name])?;
        var.put_attribute("units", "K")?;
        var.put_attribute("_FillValue", -9999.0f32)?;
        let values = vec![288.15f32; lon.len() * lat.len()];
        var.put_values(&values, ..)?;
    }

    file.add_attribute("title", "Synthetic regular forcing")?;
    Ok(())
}

/// Writes a curvilinear forcing file with 2D coordinate variables.
///
/// `lon` and `lat` are row-major `(ny, nx)`. When `mask` is given it is
/// stored as an int variable of that name on the same dimensions.
#[allow(clippy::too_many_arguments)]
pub fn write_curvilinear_forcing(
    path: &Path,
    lon_name: &str,
    lat_name: &str,
    nx: usize,
    ny: usize,
    lon: &[f64],
    lat: &[f64],
    mask: Option<(&str, &[i32])>,
) -> Result<(), netcdf::Error> {
    let mut file = netcdf::create(path)?;
    file.add_dimension("y", ny)?;
    file.add_dimension("x", nx)?;

    {
        let mut var = file.add_variable::<f64>(lon_name, &["y", "x"])?;
        var.put_attribute("units", "degrees_east")?;
        var.put_values(lon, ..)?;
    }
    {
        let mut var = file.add_variable::<f64>(lat_name, &["y", "x"])?;
        var.put_attribute("units", "degrees_north")?;
        var.put_values(lat, ..)?;
    }
    if let Some((name, values)) = mask {
        let mut var = file.add_variable::<i32>(name, &["y", "x"])?;
        var.put_attribute("flag_values", "0 1")?;
        var.put_values(values, ..)?;
    }

    file.add_attribute("title", "Synthetic curvilinear forcing")?;
    Ok(())
}

/// Writes a file with a data field but no recognizable coordinates.
pub fn write_forcing_without_coordinates(path: &Path) -> Result<(), netcdf::Error> {
    let mut file = netcdf::create(path)?;
    file.add_dimension("row", 3)?;
    file.add_dimension("col", 4)?;
    {
        let mut var = file.add_variable::<f64>("xc", &["col"])?;
        var.put_values(&[0.0, 1.0, 2.0, 3.0], ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("yc", &["row"])?;
        var.put_values(&[0.0, 1.0, 2.0], ..)?;
    }
    Ok(())
}

/// Installs a stand-in converter script under `dir/bin` and writes an
/// ESMF manifest pointing at it.
///
/// Returns the manifest path.
#[cfg(unix)]
pub fn install_fake_converter(dir: &Path, script: &str) -> std::io::Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let bindir = dir.join("bin");
    std::fs::create_dir_all(&bindir)?;

    let exe = bindir.join(CONVERTER_NAME);
    std::fs::write(&exe, script)?;
    std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755))?;

    write_manifest(dir, &bindir)
}

/// Writes an ESMF manifest (`esmf.mk`) whose `ESMF_APPSDIR` is `bindir`.
pub fn write_manifest(dir: &Path, bindir: &Path) -> std::io::Result<PathBuf> {
    let manifest = dir.join("esmf.mk");
    let contents = format!(
        "# ESMF application makefile fragment\n\
         ESMF_VERSION_STRING=8.6.0\n\
         ESMF_APPSDIR={}\n\
         ESMF_LIBSDIR={}\n",
        bindir.display(),
        dir.join("lib").display()
    );
    std::fs::write(&manifest, contents)?;
    Ok(manifest)
}

/// Creates a fresh temporary directory for a test.
pub fn scratch_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}
