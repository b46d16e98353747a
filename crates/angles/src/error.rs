//! Result and Error types for tastools-angles

use tastools_utils::ErrorKind;

/// Type alias for `Result<T, angles::Error>`
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `tastools-angles` crate
///
/// Every variant names the calculation that failed. Use [Error::kind] for the
/// broad geometry/kinematic classification.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Lattice lengths must be finite and positive
    #[error("lattice constant {name} must be positive, found {value}")]
    InvalidLatticeConstant { name: &'static str, value: f64 },

    /// Lattice angles must lie strictly between 0 and pi
    #[error("lattice angle {name} must lie in (0, pi), found {value} rad")]
    InvalidLatticeAngle { name: &'static str, value: f64 },

    /// The three angles cannot close a unit cell, e.g. 90/90/10 degrees
    #[error("lattice angles do not form a closed unit cell (discriminant {discriminant})")]
    InconsistentLatticeAngles { discriminant: f64 },

    /// Inversion of a matrix failed
    #[error("{name} matrix is singular")]
    SingularMatrix { name: &'static str },

    /// A vector required to have a direction has none
    #[error("{name} has zero length")]
    ZeroLengthVector { name: &'static str },

    /// The two orientation reflexes do not span a plane
    #[error("orientation vectors are collinear, no scattering plane defined")]
    CollinearOrientation,

    /// Monochromator/analyser cannot reach k with this d-spacing
    #[error("no Bragg reflection for k = {k} 1/A with d = {d} A (sin theta = {sine})")]
    BraggAngle { k: f64, d: f64, sine: f64 },

    /// A take-off angle of zero has no corresponding wavevector
    #[error("no wavevector for take-off angle {angle} rad with d = {d} A")]
    BraggWavevector { angle: f64, d: f64 },

    /// Law of cosines fails, i.e. ki, kf and Q cannot form a triangle
    #[error("scattering triangle does not close for {quantity} (cosine = {cosine})")]
    ScatteringTriangle { quantity: &'static str, cosine: f64 },

    /// Energy transfer larger than the neutron energy available
    #[error("energy transfer {energy} meV not possible with {name} = {k} 1/A")]
    EnergyTransfer {
        name: &'static str,
        k: f64,
        energy: f64,
    },

    /// Wavevectors and d-spacings must be finite and positive
    #[error("{name} must be positive, found {value}")]
    NonPositive { name: &'static str, value: f64 },

    /// Result of a calculation came out as NAN or infinite
    #[error("{quantity} is undefined")]
    Undefined { quantity: &'static str },

    /// Failed to infer an a3 convention from a string
    #[error("unknown a3 convention \"{0}\"")]
    UnknownConvention(String),
}

impl Error {
    /// Broad classification of the failure
    ///
    /// ```rust
    /// # use tastools_angles::{scattering_angle, Error};
    /// # use tastools_utils::ErrorKind;
    /// let error = scattering_angle(1.0, 1.0, 3.0).unwrap_err();
    /// assert_eq!(error.kind(), ErrorKind::Kinematic);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidLatticeConstant { .. }
            | Error::InvalidLatticeAngle { .. }
            | Error::InconsistentLatticeAngles { .. }
            | Error::SingularMatrix { .. }
            | Error::ZeroLengthVector { .. }
            | Error::CollinearOrientation => ErrorKind::Geometry,

            Error::BraggAngle { .. }
            | Error::BraggWavevector { .. }
            | Error::ScatteringTriangle { .. }
            | Error::EnergyTransfer { .. }
            | Error::NonPositive { .. }
            | Error::Undefined { .. } => ErrorKind::Kinematic,

            Error::UnknownConvention(_) => ErrorKind::InputFormat,
        }
    }
}
