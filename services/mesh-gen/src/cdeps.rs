//! Merging grid definitions into a CDEPS data atmosphere configuration.
//!
//! The configuration is an arbitrary YAML document. Only these keys are
//! touched:
//!
//! ```yaml
//! cdeps:
//!   atm_in:
//!     update_values:
//!       datm_nml:
//!         nx_global: ...
//!         ny_global: ...
//!         model_maskfile: ...
//!         model_meshfile: ...
//!   atm_streams:
//!     streams:
//!       stream01:
//!         stream_mesh_file: ...
//! ```
//!
//! Missing intermediate mappings are created and every other key is kept.
//! YAML comments do not survive a rewrite.

use std::path::Path;

use anyhow::{bail, Context, Result};
use esmf_grid::DatmGridUpdate;
use serde_yaml::{Mapping, Number, Value};
use tracing::info;

fn as_mapping<'a>(value: &'a mut Value, at: &str) -> Result<&'a mut Mapping> {
    if value.is_null() {
        *value = Value::Mapping(Mapping::new());
    }
    match value {
        Value::Mapping(map) => Ok(map),
        other => bail!("Expected a mapping at '{}', found {:?}", at, other),
    }
}

/// Walk `keys` from `root`, creating empty mappings along the way.
fn mapping_at<'a>(root: &'a mut Value, keys: &[&str]) -> Result<&'a mut Mapping> {
    let mut current = root;
    let mut at = String::new();
    for key in keys {
        let map = as_mapping(current, &at)?;
        current = map
            .entry(Value::String(key.to_string()))
            .or_insert(Value::Null);
        if !at.is_empty() {
            at.push('.');
        }
        at.push_str(key);
    }
    as_mapping(current, &at)
}

fn path_value(path: &Path) -> Value {
    Value::String(path.display().to_string())
}

/// Write the grid fields of `update` into `doc`.
///
/// `stream` names the entry under `cdeps.atm_streams.streams` that gets the
/// mesh file.
pub fn apply_datm_update(doc: &mut Value, update: &DatmGridUpdate, stream: &str) -> Result<()> {
    let nml = mapping_at(doc, &["cdeps", "atm_in", "update_values", "datm_nml"])?;
    nml.insert(
        Value::from("nx_global"),
        Value::Number(Number::from(update.nx_global as u64)),
    );
    nml.insert(
        Value::from("ny_global"),
        Value::Number(Number::from(update.ny_global as u64)),
    );
    nml.insert(Value::from("model_maskfile"), path_value(&update.model_maskfile));
    nml.insert(Value::from("model_meshfile"), path_value(&update.model_meshfile));

    let entry = mapping_at(doc, &["cdeps", "atm_streams", "streams", stream])?;
    entry.insert(
        Value::from("stream_mesh_file"),
        path_value(&update.stream_mesh_file),
    );

    Ok(())
}

/// Load a CDEPS configuration file. An empty file is an empty document.
pub fn load(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read CDEPS config: {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse CDEPS config: {}", path.display()))
}

/// Apply `update` to the CDEPS configuration at `path` in place.
pub fn update_file(path: &Path, update: &DatmGridUpdate, stream: &str) -> Result<()> {
    let mut doc = load(path)?;
    apply_datm_update(&mut doc, update, stream)
        .with_context(|| format!("Failed to update CDEPS config: {}", path.display()))?;

    let content = serde_yaml::to_string(&doc)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write CDEPS config: {}", path.display()))?;

    info!(
        path = %path.display(),
        nx_global = update.nx_global,
        ny_global = update.ny_global,
        stream = stream,
        "Updated CDEPS configuration"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn update() -> DatmGridUpdate {
        DatmGridUpdate {
            nx_global: 4,
            ny_global: 3,
            model_maskfile: PathBuf::from("/run/mesh.nc"),
            model_meshfile: PathBuf::from("/run/mesh.nc"),
            stream_mesh_file: PathBuf::from("/run/mesh.nc"),
        }
    }

    fn get<'a>(doc: &'a Value, keys: &[&str]) -> &'a Value {
        keys.iter().fold(doc, |v, k| &v[*k])
    }

    #[test]
    fn test_creates_missing_sections() {
        let mut doc = Value::Null;
        apply_datm_update(&mut doc, &update(), "stream01").unwrap();

        let nml = ["cdeps", "atm_in", "update_values", "datm_nml"];
        assert_eq!(get(&doc, &nml)["nx_global"].as_u64(), Some(4));
        assert_eq!(get(&doc, &nml)["ny_global"].as_u64(), Some(3));
        assert_eq!(get(&doc, &nml)["model_meshfile"].as_str(), Some("/run/mesh.nc"));
        assert_eq!(
            get(&doc, &["cdeps", "atm_streams", "streams", "stream01", "stream_mesh_file"])
                .as_str(),
            Some("/run/mesh.nc")
        );
    }

    #[test]
    fn test_preserves_other_keys() {
        let mut doc: Value = serde_yaml::from_str(
            r#"
cdeps:
  atm_in:
    update_values:
      datm_nml:
        datamode: CORE2_NYF
        nx_global: 1
  atm_streams:
    streams:
      stream01:
        stream_data_variables: ["t2m Sa_tbot"]
        stream_mesh_file: old.nc
      stream02:
        stream_mesh_file: other.nc
model: schism
"#,
        )
        .unwrap();

        apply_datm_update(&mut doc, &update(), "stream01").unwrap();

        let nml = get(&doc, &["cdeps", "atm_in", "update_values", "datm_nml"]);
        assert_eq!(nml["datamode"].as_str(), Some("CORE2_NYF"));
        assert_eq!(nml["nx_global"].as_u64(), Some(4));

        let streams = get(&doc, &["cdeps", "atm_streams", "streams"]);
        assert_eq!(streams["stream01"]["stream_mesh_file"].as_str(), Some("/run/mesh.nc"));
        assert!(streams["stream01"]["stream_data_variables"].is_sequence());
        assert_eq!(streams["stream02"]["stream_mesh_file"].as_str(), Some("other.nc"));
        assert_eq!(doc["model"].as_str(), Some("schism"));
    }

    #[test]
    fn test_custom_stream() {
        let mut doc = Value::Null;
        apply_datm_update(&mut doc, &update(), "stream03").unwrap();
        let streams = get(&doc, &["cdeps", "atm_streams", "streams"]);
        assert!(streams["stream03"]["stream_mesh_file"].is_string());
        assert!(streams["stream01"].is_null());
    }

    #[test]
    fn test_scalar_in_the_way_is_an_error() {
        let mut doc: Value = serde_yaml::from_str("cdeps:\n  atm_in: 5\n").unwrap();
        let err = apply_datm_update(&mut doc, &update(), "stream01").unwrap_err();
        assert!(err.to_string().contains("cdeps.atm_in"));
    }
}
