// crate modules
use crate::convention::{A3Convention, SampleSense};
use crate::error::{Error, Result};
use crate::fractional::{angle, cross, dot, length, metric};
use crate::kinematics::{ki_q_angle, scattering_angle};
use crate::orientation::{rotate, OrientationFrame};

// tastools modules
use tastools_utils::FloatExt;

// external crates
use log::{trace, warn};
use nalgebra::{Matrix3, Vector3};
use serde::Serialize;

/// Out-of-plane component of Q in 1/A above which a warning is logged
const OUT_OF_PLANE_WARNING: f64 = 1e-6;

/// Sample rotation and scattering angle for a given Q
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleAngles {
    /// Sample rotation in radians
    pub a3: f64,
    /// Sample scattering angle in radians, signed by the scattering sense
    pub a4: f64,
    /// Component of Q along the scattering plane normal in 1/A
    ///
    /// Non-zero values mean the requested Q can not actually be reached in
    /// the current scattering plane, and a3/a4 only refer to its in-plane
    /// part.
    pub out_of_plane: f64,
}

/// Sample angles a3 and a4 that bring `q_rlu` into the scattering condition
///
/// The a3 zero point is set by `convention` and the sign of a4 by `sense`.
///
/// ```rust
/// # use tastools_angles::{sample_angles, A3Convention, Lattice, OrientationFrame, SampleSense};
/// # use nalgebra::Vector3;
/// let b = Lattice::cubic(5.0).unwrap().b_matrix().unwrap();
/// let frame = OrientationFrame::new(Vector3::x(), Vector3::y(), &b).unwrap();
///
/// let q = Vector3::new(1.0, -1.0, 0.0);
/// let angles = sample_angles(
///     1.4836772570987262,
///     1.4,
///     &q,
///     &frame,
///     &b,
///     A3Convention::Nomad,
///     SampleSense::CounterClockwise,
/// )
/// .unwrap();
///
/// assert!((angles.a3.to_degrees() - 175.14009622305105).abs() < 1e-9);
/// assert!((angles.a4.to_degrees() - 76.02829076320897).abs() < 1e-9);
/// assert!(angles.out_of_plane.abs() < 1e-12);
/// ```
pub fn sample_angles(
    ki: f64,
    kf: f64,
    q_rlu: &Vector3<f64>,
    frame: &OrientationFrame,
    b: &Matrix3<f64>,
    convention: A3Convention,
    sense: SampleSense,
) -> Result<SampleAngles> {
    let g = metric(b);
    let q_len = length(q_rlu, &g)?;
    if q_len == 0.0 {
        return Err(Error::ZeroLengthVector { name: "Q" });
    }

    // angle between Q and the orientation reflex, signed about the plane normal
    let mut xi = angle(q_rlu, &frame.orient1, &g)?;
    if dot(&cross(&frame.orient1, q_rlu, b)?, &frame.up, &g) < 0.0 {
        xi = -xi;
    }

    let sign = sense.sign();
    let psi = sign * ki_q_angle(ki, kf, q_len)?;
    let a3 = (-psi - xi + convention.offset())
        .try_finite()
        .map_err(|_| Error::Undefined { quantity: "a3" })?;
    let a4 = sign * scattering_angle(ki, kf, q_len)?;

    let out_of_plane = (b * q_rlu).dot(&frame.lab_up(b)?.into_inner());
    trace!("xi = {:.6} deg, psi = {:.6} deg", xi.to_degrees(), psi.to_degrees());

    if out_of_plane.abs() > OUT_OF_PLANE_WARNING {
        warn!(
            "Q = {:?} lies {out_of_plane:.3e} 1/A outside the scattering plane",
            q_rlu.as_slice()
        );
    }

    Ok(SampleAngles {
        a3,
        a4,
        out_of_plane,
    })
}

/// Momentum transfer in rlu at sample rotation `a3`
///
/// Inverse of [sample_angles]. Only |Q| is needed, since the scattering
/// sense and the orientation frame fix the direction.
///
/// ```rust
/// # use tastools_angles::{hkl, sample_angles, A3Convention, Lattice};
/// # use tastools_angles::{OrientationFrame, SampleSense};
/// # use nalgebra::Vector3;
/// let b = Lattice::from_degrees(5.0, 5.0, 5.0, 90.0, 90.0, 60.0).unwrap().b_matrix().unwrap();
/// let frame = OrientationFrame::new(Vector3::x(), Vector3::new(0.0, 1.0, 1.0), &b).unwrap();
/// let (ki, kf) = (2.8375, 2.662);
///
/// let q = Vector3::new(1.0, 0.5, 0.5);
/// let (convention, sense) = (A3Convention::Takin, SampleSense::Clockwise);
/// let angles = sample_angles(ki, kf, &q, &frame, &b, convention, sense).unwrap();
///
/// let q_len = (b * q).norm();
/// let back = hkl(ki, kf, angles.a3, q_len, &frame, &b, convention, sense).unwrap();
/// assert!((back - q).norm() < 1e-9);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn hkl(
    ki: f64,
    kf: f64,
    a3: f64,
    q_len: f64,
    frame: &OrientationFrame,
    b: &Matrix3<f64>,
    convention: A3Convention,
    sense: SampleSense,
) -> Result<Vector3<f64>> {
    let psi = sense.sign() * ki_q_angle(ki, kf, q_len)?;
    let xi = -a3 + convention.offset() - psi;
    trace!("xi = {:.6} deg, psi = {:.6} deg", xi.to_degrees(), psi.to_degrees());

    let q_lab = rotate(&(b * frame.up), &(b * frame.orient1 * q_len), xi)?;
    let scale = q_len
        .try_div(q_lab.norm())
        .map_err(|_| Error::ZeroLengthVector { name: "orient1" })?;

    let b_inv = b
        .try_inverse()
        .ok_or(Error::SingularMatrix { name: "B" })?;

    Ok(b_inv * (q_lab * scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lattice;

    #[test]
    fn zero_q() {
        let b = Lattice::cubic(5.0).unwrap().b_matrix().unwrap();
        let frame = OrientationFrame::new(Vector3::x(), Vector3::y(), &b).unwrap();
        let result = sample_angles(
            1.4,
            1.4,
            &Vector3::zeros(),
            &frame,
            &b,
            A3Convention::Nomad,
            SampleSense::CounterClockwise,
        );
        assert_eq!(result, Err(Error::ZeroLengthVector { name: "Q" }));
    }

    #[test]
    fn unreachable_q() {
        let b = Lattice::cubic(5.0).unwrap().b_matrix().unwrap();
        let frame = OrientationFrame::new(Vector3::x(), Vector3::y(), &b).unwrap();

        // |Q| = 2.5 * 2pi/5 > ki + kf
        let result = sample_angles(
            1.4,
            1.4,
            &Vector3::new(2.5, 0.0, 0.0),
            &frame,
            &b,
            A3Convention::Nomad,
            SampleSense::CounterClockwise,
        );
        assert!(matches!(
            result,
            Err(Error::ScatteringTriangle {
                quantity: "psi",
                ..
            })
        ));
    }

    #[test]
    fn out_of_plane_reported() {
        let b = Lattice::cubic(5.0).unwrap().b_matrix().unwrap();
        let frame = OrientationFrame::new(Vector3::x(), Vector3::y(), &b).unwrap();

        let angles = sample_angles(
            2.0,
            2.0,
            &Vector3::new(1.0, 0.0, 0.5),
            &frame,
            &b,
            A3Convention::Sics,
            SampleSense::CounterClockwise,
        )
        .unwrap();
        assert!((angles.out_of_plane - 0.5 * b[(2, 2)]).abs() < 1e-12);
    }

    #[test]
    fn sense_mirrors_a4() {
        let b = Lattice::cubic(5.0).unwrap().b_matrix().unwrap();
        let frame = OrientationFrame::new(Vector3::x(), Vector3::y(), &b).unwrap();
        let q = Vector3::new(1.0, -1.0, 0.0);
        let ki = 1.4836772570987262;

        let solve = |sense| sample_angles(ki, 1.4, &q, &frame, &b, A3Convention::Nomad, sense);
        let ccw = solve(SampleSense::CounterClockwise).unwrap();
        let cw = solve(SampleSense::Clockwise).unwrap();

        assert_eq!(cw.a4, -ccw.a4);
        assert!((cw.a3.to_degrees() - 274.85990377694895).abs() < 1e-9);
    }
}
