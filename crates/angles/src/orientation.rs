// crate modules
use crate::error::{Error, Result};
use crate::fractional::{cross, length, metric};

// external crates
use log::debug;
use nalgebra::{Matrix3, Rotation3, Unit, Vector3};
use serde::{Deserialize, Serialize};

/// Relative size of the lab-frame up vector below which two orientation
/// reflexes count as collinear
const COLLINEAR_TOLERANCE: f64 = 1e-10;

/// Scattering plane of a mounted crystal
///
/// Two reflexes in rlu lie in the horizontal scattering plane. The `up`
/// vector is their cross product in the crystal metric, i.e. the plane
/// normal expressed in rlu.
///
/// ```rust
/// # use tastools_angles::{Lattice, OrientationFrame};
/// # use nalgebra::Vector3;
/// let b = Lattice::cubic(5.0).unwrap().b_matrix().unwrap();
///
/// let frame = OrientationFrame::new(Vector3::x(), Vector3::y(), &b).unwrap();
/// assert!(frame.up.x.abs() < 1e-12 && frame.up.z > 0.0);
///
/// // (1,0,0) and (2,0,0) do not span a plane
/// assert!(OrientationFrame::new(Vector3::x(), 2.0 * Vector3::x(), &b).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationFrame {
    /// First orientation reflex, the reference direction for a3
    pub orient1: Vector3<f64>,
    /// Second orientation reflex
    pub orient2: Vector3<f64>,
    /// Scattering plane normal in rlu
    pub up: Vector3<f64>,
}

impl OrientationFrame {
    /// Build the frame, deriving the plane normal from the B matrix
    pub fn new(orient1: Vector3<f64>, orient2: Vector3<f64>, b: &Matrix3<f64>) -> Result<Self> {
        let g = metric(b);
        let len1 = length(&orient1, &g)?;
        let len2 = length(&orient2, &g)?;

        if len1 == 0.0 {
            return Err(Error::ZeroLengthVector { name: "orient1" });
        }
        if len2 == 0.0 {
            return Err(Error::ZeroLengthVector { name: "orient2" });
        }

        let up = cross(&orient1, &orient2, b)?;
        if length(&up, &g)? <= COLLINEAR_TOLERANCE * len1 * len2 {
            return Err(Error::CollinearOrientation);
        }

        debug!("Scattering plane normal = {up:.6} rlu");
        Ok(Self {
            orient1,
            orient2,
            up,
        })
    }

    /// Lab-frame (1/A) direction of the plane normal, normalised
    pub fn lab_up(&self, b: &Matrix3<f64>) -> Result<Unit<Vector3<f64>>> {
        Unit::try_new(b * self.up, 0.0).ok_or(Error::ZeroLengthVector { name: "up" })
    }
}

/// Rotate `vec` by `phi` radians about `axis`
///
/// Right-handed rotation, the axis does not need to be normalised.
///
/// ```rust
/// # use tastools_angles::rotate;
/// # use nalgebra::Vector3;
/// # use std::f64::consts::FRAC_PI_2;
/// let v = rotate(&Vector3::new(0.0, 0.0, 2.0), &Vector3::x(), FRAC_PI_2).unwrap();
/// assert!((v - Vector3::y()).norm() < 1e-12);
/// ```
pub fn rotate(axis: &Vector3<f64>, vec: &Vector3<f64>, phi: f64) -> Result<Vector3<f64>> {
    let axis = Unit::try_new(*axis, 0.0).ok_or(Error::ZeroLengthVector {
        name: "rotation axis",
    })?;
    Ok(Rotation3::from_axis_angle(&axis, phi) * vec)
}

/// UB matrix of the mounted crystal
///
/// The rows of U are the normalised lab directions of `orient1`, `orient2`
/// and `up`, so UB maps rlu onto the frame of the scattering plane.
pub fn orientation_matrix(b: &Matrix3<f64>, frame: &OrientationFrame) -> Result<Matrix3<f64>> {
    let unit = |v: &Vector3<f64>, name: &'static str| {
        Unit::try_new(b * v, 0.0)
            .map(|u| u.into_inner())
            .ok_or(Error::ZeroLengthVector { name })
    };

    let u = Matrix3::from_rows(&[
        unit(&frame.orient1, "orient1")?.transpose(),
        unit(&frame.orient2, "orient2")?.transpose(),
        unit(&frame.up, "up")?.transpose(),
    ]);

    let ub = u * b;
    debug!("UB matrix = {ub:.6}");
    Ok(ub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lattice;
    use std::f64::consts::TAU;

    #[test]
    fn rodrigues() {
        let axis = Vector3::new(1.0, 1.0, 1.0);
        let v = Vector3::new(1.0, 0.0, 0.0);
        // a third of a turn about the diagonal permutes the axes
        let r = rotate(&axis, &v, TAU / 3.0).unwrap();
        assert!((r - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn zero_axis() {
        assert_eq!(
            rotate(&Vector3::zeros(), &Vector3::x(), 1.0),
            Err(Error::ZeroLengthVector {
                name: "rotation axis"
            })
        );
    }

    #[test]
    fn zero_orientation() {
        let b = Lattice::cubic(5.0).unwrap().b_matrix().unwrap();
        assert_eq!(
            OrientationFrame::new(Vector3::x(), Vector3::zeros(), &b),
            Err(Error::ZeroLengthVector { name: "orient2" })
        );
    }

    #[test]
    fn antiparallel_orientation() {
        let b = Lattice::from_degrees(4.0, 5.0, 6.0, 90.0, 100.0, 90.0)
            .unwrap()
            .b_matrix()
            .unwrap();
        let o1 = Vector3::new(1.0, 1.0, 0.0);
        assert_eq!(
            OrientationFrame::new(o1, -3.0 * o1, &b),
            Err(Error::CollinearOrientation)
        );
    }

    #[test]
    fn cubic_ub() {
        let b = Lattice::cubic(5.0).unwrap().b_matrix().unwrap();
        let frame = OrientationFrame::new(Vector3::x(), Vector3::y(), &b).unwrap();
        let ub = orientation_matrix(&b, &frame).unwrap();
        assert!((ub - b).norm() < 1e-12);
    }

    #[test]
    fn ub_maps_orient1_onto_x() {
        let lattice = Lattice::from_degrees(5.0, 5.0, 5.0, 90.0, 90.0, 60.0).unwrap();
        let b = lattice.b_matrix().unwrap();
        let frame =
            OrientationFrame::new(Vector3::new(1.0, 1.0, 0.0), Vector3::new(0.0, 0.0, 1.0), &b)
                .unwrap();
        let ub = orientation_matrix(&b, &frame).unwrap();

        let q = ub * frame.orient1;
        let len = (b * frame.orient1).norm();
        assert!((q - Vector3::new(len, 0.0, 0.0)).norm() < 1e-10);
    }
}
