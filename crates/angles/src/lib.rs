//! Triple-axis spectrometer angles from crystal lattices
#![doc = include_str!("../readme.md")]
//!
//! ## Implementation
//!
//! Q vectors are given in reciprocal lattice units (rlu) and converted to the
//! lab frame (1/A) with the B matrix of the [Lattice]. Dot and cross products
//! of rlu vectors are taken in the crystal metric, see [metric], [dot] and
//! [cross].
//!
//! Every function returns an [Error] rather than a `NAN` when an angle or
//! wavevector can not be reached, and [Error::kind] tells geometry problems
//! (bad lattice or orientation) apart from kinematic ones (Q out of reach).

// Split into subfiles for development, but anything important is re-exported
mod convention;
mod error;
mod fractional;
mod kinematics;
mod lattice;
mod orientation;
mod solver;
mod spectrometer;

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use lattice::Lattice;

#[doc(inline)]
pub use fractional::{angle, cross, dot, length, metric};

#[doc(inline)]
pub use kinematics::{
    bragg_angles, bragg_k, energy_transfer, final_k, incident_k, ki_q_angle, momentum_transfer,
    scattering_angle,
};

#[doc(inline)]
pub use convention::{A3Convention, SampleSense};

#[doc(inline)]
pub use orientation::{orientation_matrix, rotate, OrientationFrame};

#[doc(inline)]
pub use solver::{hkl, sample_angles, SampleAngles};

#[doc(inline)]
pub use spectrometer::{Angles, Position, Spectrometer};
