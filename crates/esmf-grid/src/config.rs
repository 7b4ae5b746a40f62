//! Configuration for the external mesh converter.

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the path of the ESMF build manifest (`esmf.mk`).
pub const ESMFMKFILE_ENV: &str = "ESMFMKFILE";

/// Environment variable for the conversion timeout, in seconds.
pub const TIMEOUT_ENV: &str = "MESH_CONVERSION_TIMEOUT_SECS";

/// How to find and run the SCRIP-to-mesh conversion tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterConfig {
    /// Path of the `KEY = value` manifest listing ESMF install directories.
    pub manifest: Option<PathBuf>,

    /// Manifest key whose value is the directory containing the executable.
    pub executable_key: String,

    /// File name of the conversion executable.
    pub executable_name: String,

    /// Kill the converter and fail if it runs longer than this.
    pub timeout: Option<Duration>,

    /// Name of the log file written next to the mesh file.
    pub log_file_name: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            manifest: None,
            executable_key: "ESMF_APPSDIR".to_string(),
            executable_name: "ESMF_Scrip2Unstruct".to_string(),
            timeout: None,
            log_file_name: "mesh.log".to_string(),
        }
    }
}

impl ConverterConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var(ESMFMKFILE_ENV) {
            if !val.trim().is_empty() {
                config.manifest = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var(TIMEOUT_ENV) {
            if let Ok(secs) = val.parse() {
                config.timeout = Some(Duration::from_secs(secs));
            }
        }

        config
    }

    /// Use the given manifest file.
    pub fn with_manifest(mut self, manifest: impl Into<PathBuf>) -> Self {
        self.manifest = Some(manifest.into());
        self
    }

    /// Limit how long the converter may run.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConverterConfig::default();
        assert_eq!(config.executable_key, "ESMF_APPSDIR");
        assert_eq!(config.executable_name, "ESMF_Scrip2Unstruct");
        assert!(config.manifest.is_none());
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_builders() {
        let config = ConverterConfig::default()
            .with_manifest("/opt/esmf/lib/esmf.mk")
            .with_timeout(Duration::from_secs(30));
        assert_eq!(config.manifest, Some(PathBuf::from("/opt/esmf/lib/esmf.mk")));
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }
}
