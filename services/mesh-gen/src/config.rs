//! Run configuration for grid definition generation.
//!
//! Values come from an optional YAML file and the command line. Every field
//! is optional in both places; command line values win, and anything still
//! unset after merging falls back to the defaults below.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use esmf_grid::{ConverterConfig, GridDefinitionRequest, GridFormat};
use serde::Deserialize;
use tracing::debug;

/// Default CDEPS stream receiving the mesh file.
pub const DEFAULT_STREAM: &str = "stream01";

/// Default mesh file name.
pub const DEFAULT_OUTPUT_FILE: &str = "mesh.nc";

/// Run configuration as read from YAML or assembled from CLI flags.
///
/// Example file:
///
/// ```yaml
/// source_file: /data/hrrr/hrrr_forcing.nc
/// format: mesh
/// output_dir: /run/datm
/// esmf_makefile: /opt/esmf/lib/esmf.mk
/// timeout_secs: 600
/// cdeps_config: /run/cdeps.yaml
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshGenConfig {
    /// Forcing file holding the grid coordinates (required)
    #[serde(default)]
    pub source_file: Option<PathBuf>,

    /// Variable used as the cell mask (default: all cells active)
    #[serde(default)]
    pub mask_variable: Option<String>,

    /// `scrip` or `mesh` (default: mesh)
    #[serde(default)]
    pub format: Option<GridFormat>,

    /// Output directory (default: current directory)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Mesh file name, relative to `output_dir` unless absolute (default: mesh.nc)
    #[serde(default)]
    pub output_file: Option<PathBuf>,

    /// ESMF build manifest (default: `$ESMFMKFILE`)
    #[serde(default)]
    pub esmf_makefile: Option<PathBuf>,

    /// Converter timeout in seconds (default: no limit)
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// CDEPS YAML file to update with the grid (default: none)
    #[serde(default)]
    pub cdeps_config: Option<PathBuf>,

    /// CDEPS stream receiving `stream_mesh_file` (default: stream01)
    #[serde(default)]
    pub stream: Option<String>,
}

impl MeshGenConfig {
    /// Load a run configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: MeshGenConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), "Loaded run config");
        Ok(config)
    }

    /// Overlay `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: MeshGenConfig) -> Self {
        Self {
            source_file: overrides.source_file.or(self.source_file),
            mask_variable: overrides.mask_variable.or(self.mask_variable),
            format: overrides.format.or(self.format),
            output_dir: overrides.output_dir.or(self.output_dir),
            output_file: overrides.output_file.or(self.output_file),
            esmf_makefile: overrides.esmf_makefile.or(self.esmf_makefile),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
            cdeps_config: overrides.cdeps_config.or(self.cdeps_config),
            stream: overrides.stream.or(self.stream),
        }
    }

    /// Fill in defaults, failing if no source file was given.
    pub fn resolve(self) -> Result<RunSettings> {
        let Some(source_file) = self.source_file else {
            bail!("No source file given (use --source or source_file in the config file)");
        };

        let mut request = GridDefinitionRequest::new(
            source_file,
            self.output_dir.unwrap_or_else(|| PathBuf::from(".")),
        )
        .with_format(self.format.unwrap_or(GridFormat::Mesh))
        .with_output_file(
            self.output_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
        );
        if let Some(mask) = self.mask_variable {
            request = request.with_mask_variable(mask);
        }

        let mut converter = ConverterConfig::from_env();
        if let Some(manifest) = self.esmf_makefile {
            converter = converter.with_manifest(manifest);
        }
        if let Some(secs) = self.timeout_secs {
            converter = converter.with_timeout(Duration::from_secs(secs));
        }

        Ok(RunSettings {
            request,
            converter,
            cdeps_config: self.cdeps_config,
            stream: self.stream.unwrap_or_else(|| DEFAULT_STREAM.to_string()),
        })
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub request: GridDefinitionRequest,
    pub converter: ConverterConfig,
    pub cdeps_config: Option<PathBuf>,
    pub stream: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
source_file: /data/hrrr/hrrr_forcing.nc
mask_variable: landmask
format: scrip
output_dir: /run/datm
output_file: atm_mesh.nc
esmf_makefile: /opt/esmf/lib/esmf.mk
timeout_secs: 600
cdeps_config: /run/cdeps.yaml
stream: stream02
"#;
        let config: MeshGenConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.format, Some(GridFormat::Scrip));
        assert_eq!(config.timeout_secs, Some(600));
        assert_eq!(config.stream.as_deref(), Some("stream02"));
    }

    #[test]
    fn test_empty_config_is_all_defaults() {
        let config: MeshGenConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, MeshGenConfig::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_yaml::from_str::<MeshGenConfig>("sourcefile: x.nc").is_err());
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let file = MeshGenConfig {
            source_file: Some(PathBuf::from("file.nc")),
            output_dir: Some(PathBuf::from("/from/file")),
            stream: Some("stream02".to_string()),
            ..Default::default()
        };
        let cli = MeshGenConfig {
            output_dir: Some(PathBuf::from("/from/cli")),
            ..Default::default()
        };

        let merged = file.merge(cli);
        assert_eq!(merged.source_file, Some(PathBuf::from("file.nc")));
        assert_eq!(merged.output_dir, Some(PathBuf::from("/from/cli")));
        assert_eq!(merged.stream.as_deref(), Some("stream02"));
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = MeshGenConfig {
            source_file: Some(PathBuf::from("forcing.nc")),
            ..Default::default()
        }
        .resolve()
        .unwrap();

        assert_eq!(settings.request.format, GridFormat::Mesh);
        assert_eq!(settings.request.output_dir, PathBuf::from("."));
        assert_eq!(settings.request.output_file, PathBuf::from("mesh.nc"));
        assert_eq!(settings.request.mask_variable, None);
        assert_eq!(settings.stream, "stream01");
        assert!(settings.cdeps_config.is_none());
    }

    #[test]
    fn test_resolve_converter_overrides() {
        let settings = MeshGenConfig {
            source_file: Some(PathBuf::from("forcing.nc")),
            esmf_makefile: Some(PathBuf::from("/opt/esmf/lib/esmf.mk")),
            timeout_secs: Some(90),
            ..Default::default()
        }
        .resolve()
        .unwrap();

        assert_eq!(
            settings.converter.manifest,
            Some(PathBuf::from("/opt/esmf/lib/esmf.mk"))
        );
        assert_eq!(settings.converter.timeout, Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_resolve_requires_source() {
        assert!(MeshGenConfig::default().resolve().is_err());
    }
}
