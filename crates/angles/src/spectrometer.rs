//! Complete instrument state conversions
//!
//! [Spectrometer] bundles everything that stays fixed during an experiment
//! (crystal, scattering plane, monochromator and analyser d-spacings, a3
//! convention and scattering sense) so that individual points only need Q and
//! the wavevectors.

// crate modules
use crate::convention::{A3Convention, SampleSense};
use crate::error::Result;
use crate::kinematics::{
    bragg_angles, bragg_k, energy_transfer, incident_k, momentum_transfer, positive,
};
use crate::lattice::Lattice;
use crate::orientation::{orientation_matrix, OrientationFrame};
use crate::solver::{hkl, sample_angles, SampleAngles};

// external crates
use log::debug;
use nalgebra::{Matrix3, Vector3};
use rayon::prelude::*;
use serde::Serialize;

/// The six angles of a triple-axis spectrometer in radians
///
/// | Angle | Axis                                 |
/// | ----- | ------------------------------------ |
/// | a1    | monochromator rotation               |
/// | a2    | monochromator scattering, always 2 a1 |
/// | a3    | sample rotation                      |
/// | a4    | sample scattering                    |
/// | a5    | analyser rotation                    |
/// | a6    | analyser scattering, always 2 a5     |
///
/// Only the four independent angles can be set, so the Bragg doubling always
/// holds.
///
/// ```rust
/// # use tastools_angles::Angles;
/// let angles = Angles::from_degrees(40.0, 10.0, 60.0, 35.0);
/// assert_eq!(angles.a2(), 2.0 * angles.a1());
/// assert_eq!(angles.a6(), 2.0 * angles.a5());
/// assert!((angles.to_degrees()[1] - 80.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Angles {
    a1: f64,
    a2: f64,
    a3: f64,
    a4: f64,
    a5: f64,
    a6: f64,
}

impl Angles {
    /// Set of angles from the independent axes, in radians
    pub fn new(a1: f64, a3: f64, a4: f64, a5: f64) -> Self {
        Self {
            a1,
            a2: 2.0 * a1,
            a3,
            a4,
            a5,
            a6: 2.0 * a5,
        }
    }

    /// Set of angles from the independent axes, in degrees
    pub fn from_degrees(a1: f64, a3: f64, a4: f64, a5: f64) -> Self {
        Self::new(
            a1.to_radians(),
            a3.to_radians(),
            a4.to_radians(),
            a5.to_radians(),
        )
    }

    /// All six angles in radians
    pub fn as_array(&self) -> [f64; 6] {
        [self.a1, self.a2, self.a3, self.a4, self.a5, self.a6]
    }

    /// All six angles in degrees
    pub fn to_degrees(&self) -> [f64; 6] {
        self.as_array().map(f64::to_degrees)
    }

    pub fn a1(&self) -> f64 {
        self.a1
    }

    pub fn a2(&self) -> f64 {
        self.a2
    }

    pub fn a3(&self) -> f64 {
        self.a3
    }

    pub fn a4(&self) -> f64 {
        self.a4
    }

    pub fn a5(&self) -> f64 {
        self.a5
    }

    pub fn a6(&self) -> f64 {
        self.a6
    }
}

/// Point in (Q, E) space reached by a set of [Angles]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    /// Momentum transfer in rlu
    pub hkl: Vector3<f64>,
    /// Incident wavenumber in 1/A
    pub ki: f64,
    /// Final wavenumber in 1/A
    pub kf: f64,
    /// Energy transfer in meV
    pub energy: f64,
    /// Length of Q in 1/A
    pub q: f64,
}

/// Fixed configuration of a triple-axis spectrometer
///
/// ```rust
/// # use tastools_angles::{A3Convention, Lattice, SampleSense, Spectrometer};
/// # use nalgebra::Vector3;
/// let lattice = Lattice::cubic(5.0).unwrap();
/// let tas = Spectrometer::new(&lattice, Vector3::x(), Vector3::y(), 3.355, 3.355)
///     .unwrap()
///     .with_convention(A3Convention::Sics)
///     .with_sense(SampleSense::Clockwise);
///
/// let angles = tas.angles(&Vector3::new(1.0, 0.0, 0.0), 1.5, 1.5).unwrap();
/// assert!(angles.a4() < 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spectrometer {
    b: Matrix3<f64>,
    frame: OrientationFrame,
    d_mono: f64,
    d_ana: f64,
    convention: A3Convention,
    sense: SampleSense,
}

impl Spectrometer {
    /// Spectrometer with the default a3 convention and sense
    ///
    /// Fails for an invalid lattice, collinear orientation reflexes, or
    /// non-positive d-spacings.
    pub fn new(
        lattice: &Lattice,
        orient1: Vector3<f64>,
        orient2: Vector3<f64>,
        d_mono: f64,
        d_ana: f64,
    ) -> Result<Self> {
        let b = lattice.b_matrix()?;
        let frame = OrientationFrame::new(orient1, orient2, &b)?;

        Ok(Self {
            b,
            frame,
            d_mono: positive("d_mono", d_mono)?,
            d_ana: positive("d_ana", d_ana)?,
            convention: A3Convention::default(),
            sense: SampleSense::default(),
        })
    }

    /// Set the a3 zero point convention
    pub fn with_convention(mut self, convention: A3Convention) -> Self {
        self.convention = convention;
        self
    }

    /// Set the scattering sense at the sample
    pub fn with_sense(mut self, sense: SampleSense) -> Self {
        self.sense = sense;
        self
    }

    /// B matrix of the mounted crystal
    pub fn b_matrix(&self) -> &Matrix3<f64> {
        &self.b
    }

    /// Scattering plane of the mounted crystal
    pub fn frame(&self) -> &OrientationFrame {
        &self.frame
    }

    pub fn convention(&self) -> A3Convention {
        self.convention
    }

    pub fn sense(&self) -> SampleSense {
        self.sense
    }

    /// UB matrix of the mounted crystal
    pub fn orientation_matrix(&self) -> Result<Matrix3<f64>> {
        orientation_matrix(&self.b, &self.frame)
    }

    /// Monochromator angles (a1, a2) selecting `ki`
    pub fn monochromator_angles(&self, ki: f64) -> Result<(f64, f64)> {
        bragg_angles(ki, self.d_mono)
    }

    /// Analyser angles (a5, a6) selecting `kf`
    pub fn analyser_angles(&self, kf: f64) -> Result<(f64, f64)> {
        bragg_angles(kf, self.d_ana)
    }

    /// Sample angles (a3, a4) for `q_rlu`, with the out-of-plane distance
    pub fn sample_angles(&self, q_rlu: &Vector3<f64>, ki: f64, kf: f64) -> Result<SampleAngles> {
        sample_angles(
            ki,
            kf,
            q_rlu,
            &self.frame,
            &self.b,
            self.convention,
            self.sense,
        )
    }

    /// All six angles reaching `q_rlu` with the given wavenumbers
    pub fn angles(&self, q_rlu: &Vector3<f64>, ki: f64, kf: f64) -> Result<Angles> {
        let (a1, _) = self.monochromator_angles(ki)?;
        let (a5, _) = self.analyser_angles(kf)?;
        let sample = self.sample_angles(q_rlu, ki, kf)?;
        Ok(Angles::new(a1, sample.a3, sample.a4, a5))
    }

    /// All six angles reaching `q_rlu` at fixed `kf` and energy transfer
    pub fn angles_at_energy(&self, q_rlu: &Vector3<f64>, kf: f64, energy: f64) -> Result<Angles> {
        let ki = incident_k(kf, energy)?;
        debug!("ki = {ki:.6} 1/A for kf = {kf} 1/A, E = {energy} meV");
        self.angles(q_rlu, ki, kf)
    }

    /// Angles for many `(q_rlu, ki, kf)` points in parallel
    ///
    /// Results keep the order of the input, and a failure at one point has no
    /// effect on any other.
    pub fn angles_batch(&self, points: &[(Vector3<f64>, f64, f64)]) -> Vec<Result<Angles>> {
        points
            .par_iter()
            .map(|(q, ki, kf)| self.angles(q, *ki, *kf))
            .collect()
    }

    /// Point in (Q, E) space reached by the given angles
    pub fn position(&self, angles: &Angles) -> Result<Position> {
        let ki = bragg_k(angles.a1(), self.d_mono)?;
        let kf = bragg_k(angles.a5(), self.d_ana)?;
        let q = momentum_transfer(ki, kf, angles.a4())?;
        let hkl = hkl(
            ki,
            kf,
            angles.a3(),
            q,
            &self.frame,
            &self.b,
            self.convention,
            self.sense,
        )?;

        Ok(Position {
            hkl,
            ki,
            kf,
            energy: energy_transfer(ki, kf),
            q,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn cubic() -> Spectrometer {
        let lattice = Lattice::cubic(5.0).unwrap();
        Spectrometer::new(&lattice, Vector3::x(), Vector3::y(), 3.355, 3.355).unwrap()
    }

    #[test]
    fn bragg_doubling() {
        let angles = cubic()
            .angles_at_energy(&Vector3::new(1.0, -1.0, 0.0), 1.4, 0.5)
            .unwrap();
        assert_eq!(angles.a2(), 2.0 * angles.a1());
        assert_eq!(angles.a6(), 2.0 * angles.a5());
    }

    #[test]
    fn bad_d_spacing() {
        let lattice = Lattice::cubic(5.0).unwrap();
        assert_eq!(
            Spectrometer::new(&lattice, Vector3::x(), Vector3::y(), 0.0, 3.355),
            Err(Error::NonPositive {
                name: "d_mono",
                value: 0.0
            })
        );
    }

    #[test]
    fn batch_isolates_failures() {
        let tas = cubic();
        let points = [
            (Vector3::new(1.0, -1.0, 0.0), 1.4836772570987262, 1.4),
            (Vector3::new(9.0, 0.0, 0.0), 1.4, 1.4),
            (Vector3::new(1.0, 0.0, 0.0), 0.1, 1.4),
            (Vector3::new(0.0, 1.0, 0.0), 1.5, 1.5),
        ];

        let results = tas.angles_batch(&points);
        assert_eq!(results.len(), 4);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::ScatteringTriangle { .. })));
        assert!(matches!(results[2], Err(Error::BraggAngle { .. })));
        assert_eq!(
            results[3],
            tas.angles(&Vector3::new(0.0, 1.0, 0.0), 1.5, 1.5)
        );
    }

    #[test]
    fn position_energy() {
        let tas = cubic();
        let angles = tas
            .angles_at_energy(&Vector3::new(1.0, 1.0, 0.0), 1.55, -1.2)
            .unwrap();
        let position = tas.position(&angles).unwrap();

        assert!((position.energy + 1.2).abs() < 1e-9);
        assert!((position.kf - 1.55).abs() < 1e-9);
        assert!((position.hkl - Vector3::new(1.0, 1.0, 0.0)).norm() < 1e-9);
    }
}
