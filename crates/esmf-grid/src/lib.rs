//! SCRIP grid definitions and ESMF meshes for coupled model forcing.
//!
//! This crate turns the coordinates of a gridded forcing file (for example
//! HRRR or ERA5 data subset to a coastal domain) into the grid description
//! a coupling framework needs:
//!
//! 1. **Read** longitude/latitude from the source file, broadcasting
//!    separable 1D coordinates to 2D ([`source`], [`grid`])
//! 2. **Infer corners** for every cell from the cell centers ([`corners`])
//! 3. **Write** a SCRIP grid definition file ([`scrip`])
//! 4. **Convert** it to an ESMF unstructured mesh with
//!    `ESMF_Scrip2Unstruct` ([`mesh`])
//!
//! # Example
//!
//! ```ignore
//! use esmf_grid::{gen_grid_definition, ConverterConfig, GridDefinitionRequest, GridFormat};
//!
//! let request = GridDefinitionRequest::new("hrrr_forcing.nc", "/run")
//!     .with_format(GridFormat::Mesh);
//! let result = gen_grid_definition(&request, &ConverterConfig::from_env()).await?;
//!
//! // shape is (nx, ny)
//! let update = result.datm_update();
//! assert_eq!(update.nx_global, result.shape.0);
//! ```

pub mod config;
pub mod corners;
pub mod definition;
pub mod error;
pub mod grid;
pub mod mesh;
pub mod scrip;
pub mod source;

pub use config::ConverterConfig;
pub use corners::{calc_corners, CornerSet, CORNERS_PER_CELL};
pub use definition::{
    gen_grid_definition, DatmGridUpdate, GridDefinitionRequest, GridFormat, MeshConversionResult,
};
pub use error::{GridError, GridResult};
pub use grid::{CenterGrid, CoordinateArray};
pub use mesh::{convert_to_mesh, locate_executable};
pub use scrip::{write_interchange, GridInterchangeRecord, SCRIP_FILE_NAME};
pub use source::{silence_hdf5_errors, SourceDataset};
