//! Run configuration to CDEPS update, end to end with SCRIP output.

use esmf_grid::{gen_grid_definition, GridFormat};
use mesh_gen::cdeps;
use mesh_gen::config::MeshGenConfig;
use test_utils::{scratch_dir, uniform_axes, write_regular_forcing};

#[tokio::test]
async fn test_config_file_run_updates_cdeps() {
    let dir = scratch_dir();
    let source = dir.path().join("era5.nc");
    let (lon, lat) = uniform_axes(6, 5, 280.0, 30.0, 0.25, 0.25);
    write_regular_forcing(&source, "longitude", "latitude", &lon, &lat).unwrap();

    let cdeps_path = dir.path().join("cdeps.yaml");
    std::fs::write(
        &cdeps_path,
        "cdeps:\n  atm_in:\n    update_values:\n      datm_nml:\n        datamode: CORE2_NYF\n",
    )
    .unwrap();

    let config_path = dir.path().join("mesh-gen.yaml");
    std::fs::write(
        &config_path,
        format!(
            "source_file: {}\nformat: scrip\noutput_dir: {}\ncdeps_config: {}\nstream: stream02\n",
            source.display(),
            dir.path().display(),
            cdeps_path.display()
        ),
    )
    .unwrap();

    let settings = MeshGenConfig::load(&config_path)
        .unwrap()
        .merge(MeshGenConfig::default())
        .resolve()
        .unwrap();
    assert_eq!(settings.request.format, GridFormat::Scrip);

    let result = gen_grid_definition(&settings.request, &settings.converter)
        .await
        .unwrap();
    assert_eq!(result.shape, (6, 5));

    cdeps::update_file(
        settings.cdeps_config.as_deref().unwrap(),
        &result.datm_update(),
        &settings.stream,
    )
    .unwrap();

    let doc = cdeps::load(&cdeps_path).unwrap();
    let nml = &doc["cdeps"]["atm_in"]["update_values"]["datm_nml"];
    assert_eq!(nml["nx_global"].as_u64(), Some(6));
    assert_eq!(nml["ny_global"].as_u64(), Some(5));
    assert_eq!(nml["datamode"].as_str(), Some("CORE2_NYF"));

    let scrip = dir.path().join("scrip.nc").display().to_string();
    assert_eq!(nml["model_meshfile"].as_str(), Some(scrip.as_str()));
    assert_eq!(
        doc["cdeps"]["atm_streams"]["streams"]["stream02"]["stream_mesh_file"].as_str(),
        Some(scrip.as_str())
    );
}

#[test]
fn test_empty_cdeps_file_is_filled_in() {
    let dir = scratch_dir();
    let path = dir.path().join("cdeps.yaml");
    std::fs::write(&path, "").unwrap();

    let update = esmf_grid::DatmGridUpdate {
        nx_global: 10,
        ny_global: 20,
        model_maskfile: "mesh.nc".into(),
        model_meshfile: "mesh.nc".into(),
        stream_mesh_file: "mesh.nc".into(),
    };
    cdeps::update_file(&path, &update, "stream01").unwrap();

    let doc = cdeps::load(&path).unwrap();
    assert_eq!(
        doc["cdeps"]["atm_in"]["update_values"]["datm_nml"]["ny_global"].as_u64(),
        Some(20)
    );
}

#[test]
fn test_command_line_overrides_file() {
    let dir = scratch_dir();
    let config_path = dir.path().join("mesh-gen.yaml");
    std::fs::write(&config_path, "source_file: a.nc\nformat: scrip\ntimeout_secs: 30\n").unwrap();

    let cli = MeshGenConfig {
        format: Some(GridFormat::Mesh),
        ..Default::default()
    };
    let settings = MeshGenConfig::load(&config_path)
        .unwrap()
        .merge(cli)
        .resolve()
        .unwrap();

    assert_eq!(settings.request.format, GridFormat::Mesh);
    assert_eq!(settings.request.source_file, std::path::PathBuf::from("a.nc"));
    assert_eq!(
        settings.converter.timeout,
        Some(std::time::Duration::from_secs(30))
    );
}

#[test]
fn test_missing_config_file() {
    let dir = scratch_dir();
    let err = MeshGenConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
