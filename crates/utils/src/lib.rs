//! Common utility for extended `std` types and shared physics constants
//!
#![doc = include_str!("../readme.md")]
//!
//! These are left public for convenience.
//!
//! For example, a checked `acos` or prettier formatting for scientific
//! numbers are useful everywhere.

// Alias for the format! macro
pub use std::format as f;

// Modules
mod constants;
mod error;
mod float_ext;
mod value_ext;

// Flatten
pub use constants::{E_TO_K2, K2_TO_E, SIGMA_TO_FWHM, SIGMA_TO_HWHM};
pub use error::{Error, ErrorKind, Result};
pub use float_ext::{FloatExt, DOMAIN_TOLERANCE};
pub use value_ext::ValueExt;
