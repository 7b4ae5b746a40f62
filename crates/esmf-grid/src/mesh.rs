//! Conversion of SCRIP files to ESMF unstructured mesh files.
//!
//! The conversion itself is done by ESMF's `ESMF_Scrip2Unstruct`
//! application. Its install directory is recovered from the ESMF build
//! manifest (`esmf.mk`), a line-oriented `KEY = value` file whose path is
//! normally published through the `ESMFMKFILE` environment variable.
//!
//! The mesh file format is opaque here: only the exit status of the tool
//! and the existence of its output are checked.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::ConverterConfig;
use crate::error::{GridError, GridResult};

/// Look up `key` in a `KEY = value` manifest.
///
/// Blank lines and `#` comments are skipped. The first matching key wins.
pub fn parse_manifest(contents: &str, key: &str) -> Option<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim().to_string())
}

/// Resolve the conversion executable from the manifest.
pub fn locate_executable(config: &ConverterConfig) -> GridResult<PathBuf> {
    let manifest = config.manifest.as_ref().ok_or_else(|| {
        GridError::tool_not_found("no ESMF manifest configured (is ESMFMKFILE set?)")
    })?;

    let contents = std::fs::read_to_string(manifest).map_err(|e| {
        GridError::tool_not_found(format!(
            "cannot read manifest {}: {}",
            manifest.display(),
            e
        ))
    })?;

    let bindir = parse_manifest(&contents, &config.executable_key)
        .filter(|dir| !dir.is_empty())
        .ok_or_else(|| {
            GridError::tool_not_found(format!(
                "key {} not found in {}",
                config.executable_key,
                manifest.display()
            ))
        })?;

    let exe = Path::new(&bindir).join(&config.executable_name);
    if !exe.is_file() {
        return Err(GridError::tool_not_found(format!(
            "{} does not exist",
            exe.display()
        )));
    }

    debug!(executable = %exe.display(), "Located mesh conversion tool");
    Ok(exe)
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

async fn discard_partial(destination: &Path) {
    if destination.exists() {
        if let Err(e) = tokio::fs::remove_file(destination).await {
            warn!(path = %destination.display(), error = %e, "Failed to remove partial mesh file");
        }
    }
}

/// Convert the SCRIP file `interchange` into an ESMF mesh file at `destination`.
///
/// The tool runs as `<exe> <interchange> <destination> 0` inside the
/// destination directory, with its output captured in a log file there.
/// Any existing destination file is removed first; on failure whatever the
/// tool left behind is removed as well.
pub async fn convert_to_mesh(
    interchange: &Path,
    destination: &Path,
    config: &ConverterConfig,
) -> GridResult<PathBuf> {
    let exe = locate_executable(config)?;

    let parent = parent_dir(destination);
    if !parent.is_dir() {
        return Err(GridError::PathNotFound(parent.to_path_buf()));
    }
    if !interchange.is_file() {
        return Err(GridError::PathNotFound(interchange.to_path_buf()));
    }

    // Absolute paths, since the tool runs with the destination dir as cwd
    let workdir = std::fs::canonicalize(parent)?;
    let input = std::fs::canonicalize(interchange)?;
    let output = match destination.file_name() {
        Some(name) => workdir.join(name),
        None => {
            return Err(GridError::conversion_failed(
                destination,
                None,
                "destination has no file name",
            ))
        }
    };

    discard_partial(&output).await;

    let log_path = workdir.join(&config.log_file_name);
    let log = std::fs::File::create(&log_path)?;
    let log_err = log.try_clone()?;

    let mut cmd = Command::new(&exe);
    cmd.arg(&input)
        .arg(&output)
        .arg("0")
        .current_dir(&workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(log_err))
        .kill_on_drop(true);

    info!(
        executable = %exe.display(),
        input = %input.display(),
        output = %output.display(),
        log = %log_path.display(),
        "Running mesh conversion"
    );

    let mut child = cmd.spawn().map_err(|e| {
        GridError::conversion_failed(
            &output,
            None,
            format!("failed to start {}: {}", exe.display(), e),
        )
    })?;

    let status = match config.timeout {
        Some(limit) => {
            let waited = tokio::time::timeout(limit, child.wait()).await;
            match waited {
                Ok(status) => status?,
                Err(_) => {
                    if let Err(e) = child.kill().await {
                        warn!(error = %e, "Failed to kill mesh conversion process");
                    }
                    discard_partial(&output).await;
                    return Err(GridError::conversion_failed(
                        &output,
                        None,
                        format!("timed out after {}s", limit.as_secs_f64()),
                    ));
                }
            }
        }
        None => child.wait().await?,
    };

    if !status.success() {
        discard_partial(&output).await;
        return Err(GridError::conversion_failed(
            &output,
            status.code(),
            format!("{} failed, see {}", exe.display(), log_path.display()),
        ));
    }

    if !output.is_file() {
        return Err(GridError::conversion_failed(
            &output,
            status.code(),
            "tool exited successfully but produced no mesh file",
        ));
    }

    info!(path = %output.display(), "Mesh conversion complete");
    Ok(output)
}
