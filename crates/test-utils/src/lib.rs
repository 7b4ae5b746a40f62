//! Shared test utilities for the coastal-prep workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic cell-center grid generators
//! - NetCDF forcing file fixtures
//! - A stand-in for the ESMF mesh conversion tool
//! - Approximate floating-point assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures, generators};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for approximate equality of two cells' corner arrays.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_corners_approx_eq;
///
/// assert_corners_approx_eq!([0.0, 1.0, 1.0, 0.0], [0.0, 1.0, 1.0, 1e-9], 1e-6);
/// ```
#[macro_export]
macro_rules! assert_corners_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left = $left;
        let right = $right;
        for c in 0..4 {
            $crate::assert_approx_eq!(left[c], right[c], $epsilon);
        }
    }};
}
