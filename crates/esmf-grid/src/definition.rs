//! Grid definition files from forcing data.
//!
//! [`gen_grid_definition`] is the single entry point used by the workflow:
//! read the coordinates from a forcing file, infer cell corners, write a
//! SCRIP file and optionally convert it to an ESMF mesh. The result tells
//! the caller which file to reference and the grid shape, which it merges
//! into its own model configuration via [`DatmGridUpdate`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ConverterConfig;
use crate::corners::calc_corners;
use crate::error::{GridError, GridResult};
use crate::mesh::convert_to_mesh;
use crate::scrip::{write_interchange, GridInterchangeRecord, SCRIP_FILE_NAME};
use crate::source::SourceDataset;

/// Default mesh file name.
pub const MESH_FILE_NAME: &str = "mesh.nc";

/// Output format of a grid definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridFormat {
    /// SCRIP file only
    #[default]
    Scrip,
    /// SCRIP file converted to an ESMF unstructured mesh
    Mesh,
}

impl FromStr for GridFormat {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scrip" => Ok(GridFormat::Scrip),
            "mesh" => Ok(GridFormat::Mesh),
            _ => Err(GridError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for GridFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridFormat::Scrip => write!(f, "scrip"),
            GridFormat::Mesh => write!(f, "mesh"),
        }
    }
}

/// Parameters for one grid definition run.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDefinitionRequest {
    /// Forcing data file holding the grid coordinates
    pub source_file: PathBuf,
    /// Variable to use as the cell mask (all cells active when absent)
    pub mask_variable: Option<String>,
    pub format: GridFormat,
    /// Directory receiving the output files; must exist
    pub output_dir: PathBuf,
    /// Mesh file name; relative paths are resolved against `output_dir`
    pub output_file: PathBuf,
}

impl GridDefinitionRequest {
    /// Create a SCRIP request with default file names.
    pub fn new(source_file: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_file: source_file.into(),
            mask_variable: None,
            format: GridFormat::default(),
            output_dir: output_dir.into(),
            output_file: PathBuf::from(MESH_FILE_NAME),
        }
    }

    pub fn with_format(mut self, format: GridFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_mask_variable(mut self, name: impl Into<String>) -> Self {
        self.mask_variable = Some(name.into());
        self
    }

    pub fn with_output_file(mut self, output_file: impl Into<PathBuf>) -> Self {
        self.output_file = output_file.into();
        self
    }

    /// Full path of the mesh file.
    pub fn mesh_path(&self) -> PathBuf {
        if self.output_file.is_absolute() {
            self.output_file.clone()
        } else {
            self.output_dir.join(&self.output_file)
        }
    }

    /// Full path of the SCRIP file.
    ///
    /// For mesh output it sits next to the mesh file.
    pub fn scrip_path(&self) -> PathBuf {
        match self.format {
            GridFormat::Scrip => self.output_dir.join(SCRIP_FILE_NAME),
            GridFormat::Mesh => match self.mesh_path().parent() {
                Some(dir) => dir.join(SCRIP_FILE_NAME),
                None => PathBuf::from(SCRIP_FILE_NAME),
            },
        }
    }
}

/// Output file and grid shape of a grid definition run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshConversionResult {
    pub output_file: PathBuf,
    /// Grid shape as `(nx, ny)`, column count first
    pub shape: (usize, usize),
}

impl MeshConversionResult {
    /// The configuration fields the data atmosphere component needs from this grid.
    pub fn datm_update(&self) -> DatmGridUpdate {
        DatmGridUpdate {
            nx_global: self.shape.0,
            ny_global: self.shape.1,
            model_maskfile: self.output_file.clone(),
            model_meshfile: self.output_file.clone(),
            stream_mesh_file: self.output_file.clone(),
        }
    }
}

/// Configuration values computed from a grid definition.
///
/// Returned to the caller to merge into its own configuration instead of
/// being written into shared state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatmGridUpdate {
    pub nx_global: usize,
    pub ny_global: usize,
    pub model_maskfile: PathBuf,
    pub model_meshfile: PathBuf,
    pub stream_mesh_file: PathBuf,
}

fn require_dir(dir: &Path) -> GridResult<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(GridError::PathNotFound(dir.to_path_buf()))
    }
}

/// Build the grid definition described by `request`.
///
/// Existing output files are overwritten. For mesh output the SCRIP file
/// is an intermediate: it is removed again if the conversion fails, so a
/// failed run leaves no usable new file behind.
pub async fn gen_grid_definition(
    request: &GridDefinitionRequest,
    converter: &ConverterConfig,
) -> GridResult<MeshConversionResult> {
    require_dir(&request.output_dir)?;

    if request.format == GridFormat::Mesh && request.mesh_path() == request.scrip_path() {
        return Err(GridError::OutputConflict(request.mesh_path()));
    }

    let (grid, mask) = {
        let dataset = SourceDataset::open(&request.source_file)?;
        let grid = dataset.read_center_grid()?;
        let mask = match &request.mask_variable {
            Some(name) => Some(dataset.read_mask(name)?),
            None => None,
        };
        (grid, mask)
    };

    info!(
        source = %request.source_file.display(),
        nx = grid.nx,
        ny = grid.ny,
        format = %request.format,
        "Generating grid definition"
    );

    let corners = calc_corners(&grid)?;
    let record = GridInterchangeRecord::new(&grid, corners, mask)?;

    let scrip_path = request.scrip_path();
    let output_file = match request.format {
        GridFormat::Scrip => write_interchange(&record, &scrip_path)?,
        GridFormat::Mesh => {
            let mesh_path = request.mesh_path();
            write_interchange(&record, &scrip_path)?;
            match convert_to_mesh(&scrip_path, &mesh_path, converter).await {
                Ok(path) => path,
                Err(e) => {
                    if let Err(rm) = tokio::fs::remove_file(&scrip_path).await {
                        warn!(
                            path = %scrip_path.display(),
                            error = %rm,
                            "Failed to remove SCRIP file"
                        );
                    }
                    return Err(e);
                }
            }
        }
    };

    Ok(MeshConversionResult {
        output_file,
        shape: (grid.nx, grid.ny),
    })
}
