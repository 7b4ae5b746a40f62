//! Grid definition service library.
//!
//! Run configuration and CDEPS configuration handling for the `mesh-gen`
//! binary.

pub mod cdeps;
pub mod config;
