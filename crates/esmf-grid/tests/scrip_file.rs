//! Integration tests: write SCRIP files and read them back with netcdf.

use std::path::Path;

use esmf_grid::{calc_corners, write_interchange, CenterGrid, GridInterchangeRecord};
use test_utils::{column_mask, scratch_dir, uniform_centers};

fn record_4x3(mask: Option<Vec<i32>>) -> GridInterchangeRecord {
    let (lon, lat) = uniform_centers(4, 3, -75.0, 35.0, 0.5, 0.5);
    let grid = CenterGrid::new(4, 3, lon, lat).unwrap();
    let corners = calc_corners(&grid).unwrap();
    GridInterchangeRecord::new(&grid, corners, mask).unwrap()
}

fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn string_attr(file: &netcdf::File, name: &str) -> Option<String> {
    let value = file.attribute(name)?.value().ok()?;
    match value {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

#[test]
fn test_write_layout() {
    let dir = scratch_dir();
    let path = dir.path().join("scrip.nc");
    let record = record_4x3(None);
    let written = write_interchange(&record, &path).unwrap();
    assert_eq!(written, path);

    let file = netcdf::open(&path).unwrap();
    assert_eq!(file.dimension("grid_rank").unwrap().len(), 2);
    assert_eq!(file.dimension("grid_size").unwrap().len(), 12);
    assert_eq!(file.dimension("grid_corners").unwrap().len(), 4);

    let dims: Vec<i32> = file.variable("grid_dims").unwrap().get_values(..).unwrap();
    assert_eq!(dims, vec![4, 3]);

    let center_lon: Vec<f64> = file
        .variable("grid_center_lon")
        .unwrap()
        .get_values(..)
        .unwrap();
    assert_eq!(center_lon, record.center_lon);

    let corner_var = file.variable("grid_corner_lat").unwrap();
    let corner_dims: Vec<usize> = corner_var.dimensions().iter().map(|d| d.len()).collect();
    assert_eq!(corner_dims, vec![12, 4]);
    let corner_lat: Vec<f64> = corner_var.get_values(..).unwrap();
    assert_eq!(&corner_lat[0..4], &record.corner_lat[0][..]);
    assert_eq!(&corner_lat[44..48], &record.corner_lat[11][..]);

    let imask: Vec<i32> = file.variable("grid_imask").unwrap().get_values(..).unwrap();
    assert_eq!(imask, vec![1; 12]);
}

#[test]
fn test_global_attributes() {
    let dir = scratch_dir();
    let path = dir.path().join("scrip.nc");
    write_interchange(&record_4x3(None), &path).unwrap();

    let file = netcdf::open(&path).unwrap();
    assert_eq!(string_attr(&file, "title").as_deref(), Some("Grid with 4x3 size"));
    assert_eq!(string_attr(&file, "conventions").as_deref(), Some("SCRIP"));
    assert_eq!(string_attr(&file, "created_by").as_deref(), Some("esmf-grid"));
    assert!(string_attr(&file, "date_created").is_some());
}

#[test]
fn test_no_fill_value_by_default() {
    let dir = scratch_dir();
    let path = dir.path().join("scrip.nc");
    write_interchange(&record_4x3(None), &path).unwrap();

    let file = netcdf::open(&path).unwrap();
    for name in [
        "grid_dims",
        "grid_center_lon",
        "grid_center_lat",
        "grid_corner_lon",
        "grid_corner_lat",
        "grid_imask",
    ] {
        let var = file.variable(name).unwrap();
        assert!(!has_attr(&var, "_FillValue"), "{} carries a _FillValue", name);
    }
    let units = file.variable("grid_center_lon").unwrap();
    assert!(has_attr(&units, "units"));
}

#[test]
fn test_explicit_fill_value_written() {
    let dir = scratch_dir();
    let path = dir.path().join("scrip.nc");
    let record = record_4x3(None).with_fill_value(1.0e20);
    write_interchange(&record, &path).unwrap();

    let file = netcdf::open(&path).unwrap();
    let var = file.variable("grid_corner_lon").unwrap();
    assert!(has_attr(&var, "_FillValue"));
    let imask = file.variable("grid_imask").unwrap();
    assert!(!has_attr(&imask, "_FillValue"));
}

#[test]
fn test_mask_written() {
    let dir = scratch_dir();
    let path = dir.path().join("scrip.nc");
    let mask = column_mask(4, 3, 1);
    write_interchange(&record_4x3(Some(mask.clone())), &path).unwrap();

    let file = netcdf::open(&path).unwrap();
    let imask: Vec<i32> = file.variable("grid_imask").unwrap().get_values(..).unwrap();
    assert_eq!(imask, mask);
}

#[test]
fn test_overwrites_existing_file() {
    let dir = scratch_dir();
    let path = dir.path().join("scrip.nc");
    std::fs::write(&path, b"stale contents").unwrap();

    write_interchange(&record_4x3(None), &path).unwrap();
    let file = netcdf::open(&path).unwrap();
    assert_eq!(file.dimension("grid_size").unwrap().len(), 12);
}

#[test]
fn test_missing_parent_directory() {
    let dir = scratch_dir();
    let path = dir.path().join("missing").join("scrip.nc");
    let err = write_interchange(&record_4x3(None), &path).unwrap_err();
    match err {
        esmf_grid::GridError::PathNotFound(p) => assert_eq!(p, dir.path().join("missing")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!Path::new(&path).exists());
}
