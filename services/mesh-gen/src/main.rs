//! Grid definition generator.
//!
//! Builds the SCRIP grid file (and by default the ESMF mesh) for a gridded
//! forcing file, then optionally writes the grid into a CDEPS data
//! atmosphere configuration:
//! - Reads longitude/latitude (and an optional mask) from the forcing file
//! - Infers cell corners and writes `scrip.nc`
//! - Runs `ESMF_Scrip2Unstruct` for mesh output
//! - Updates `nx_global`, `ny_global` and the mesh file entries in CDEPS YAML

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use esmf_grid::{gen_grid_definition, silence_hdf5_errors, GridFormat};
use mesh_gen::cdeps;
use mesh_gen::config::MeshGenConfig;

#[derive(Parser, Debug)]
#[command(name = "mesh-gen")]
#[command(about = "Generate SCRIP grid definitions and ESMF meshes from forcing data")]
struct Args {
    /// Forcing file holding the grid coordinates
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Variable to use as the cell mask
    #[arg(long)]
    mask_variable: Option<String>,

    /// Output format: scrip or mesh (default: mesh)
    #[arg(short, long)]
    format: Option<GridFormat>,

    /// Directory for the output files (default: current directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Mesh file name (default: mesh.nc)
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// ESMF build manifest locating ESMF_Scrip2Unstruct
    #[arg(long, env = "ESMFMKFILE")]
    esmf_makefile: Option<PathBuf>,

    /// Kill the mesh converter after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// CDEPS YAML configuration to update with the grid
    #[arg(long)]
    cdeps_config: Option<PathBuf>,

    /// CDEPS stream receiving the mesh file (default: stream01)
    #[arg(long)]
    stream: Option<String>,

    /// YAML run configuration; command line flags take precedence
    #[arg(short, long, env = "MESH_GEN_CONFIG")]
    config: Option<PathBuf>,

    /// Print the result as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> MeshGenConfig {
        MeshGenConfig {
            source_file: self.source.clone(),
            mask_variable: self.mask_variable.clone(),
            format: self.format,
            output_dir: self.output_dir.clone(),
            output_file: self.output_file.clone(),
            esmf_makefile: self.esmf_makefile.clone(),
            timeout_secs: self.timeout_secs,
            cdeps_config: self.cdeps_config.clone(),
            stream: self.stream.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing; RUST_LOG wins over --log-level. Logs go to stderr
    // so --json output stays clean.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    silence_hdf5_errors();

    let file_config = match &args.config {
        Some(path) => MeshGenConfig::load(path)?,
        None => MeshGenConfig::default(),
    };
    let settings = file_config.merge(args.overrides()).resolve()?;

    info!(
        source = %settings.request.source_file.display(),
        format = %settings.request.format,
        output_dir = %settings.request.output_dir.display(),
        "Starting grid definition"
    );

    let result = gen_grid_definition(&settings.request, &settings.converter)
        .await
        .with_context(|| {
            format!(
                "Failed to generate grid definition for {}",
                settings.request.source_file.display()
            )
        })?;

    if let Some(path) = &settings.cdeps_config {
        cdeps::update_file(path, &result.datm_update(), &settings.stream)?;
    }

    info!(
        output = %result.output_file.display(),
        nx = result.shape.0,
        ny = result.shape.1,
        "Grid definition complete"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}
