// crate modules
use crate::error::{Error, Result};

// tastools modules
use tastools_utils::FloatExt;

// external crates
use log::debug;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Unit cell of a crystal
///
/// Lengths are in Angstrom and angles in radians. The angles follow the usual
/// crystallographic naming:
///
/// | Angle   | Between  |
/// | ------- | -------- |
/// | `alpha` | b and c  |
/// | `beta`  | a and c  |
/// | `gamma` | a and b  |
///
/// Fields are left public for convenience, so the matrix constructors check
/// everything again before use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// Length of the a axis
    pub a: f64,
    /// Length of the b axis
    pub b: f64,
    /// Length of the c axis
    pub c: f64,
    /// Angle between b and c
    pub alpha: f64,
    /// Angle between a and c
    pub beta: f64,
    /// Angle between a and b
    pub gamma: f64,
}

impl Lattice {
    /// Create a validated lattice, angles in radians
    ///
    /// ```rust
    /// # use tastools_angles::Lattice;
    /// # use std::f64::consts::FRAC_PI_2;
    /// assert!(Lattice::new(5.0, 5.0, 5.0, FRAC_PI_2, FRAC_PI_2, FRAC_PI_2).is_ok());
    /// assert!(Lattice::new(-5.0, 5.0, 5.0, FRAC_PI_2, FRAC_PI_2, FRAC_PI_2).is_err());
    /// ```
    pub fn new(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Result<Self> {
        let lattice = Self {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
        };
        lattice.validate()?;
        Ok(lattice)
    }

    /// Create a validated lattice, angles in degrees
    pub fn from_degrees(
        a: f64,
        b: f64,
        c: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
    ) -> Result<Self> {
        Self::new(
            a,
            b,
            c,
            alpha.to_radians(),
            beta.to_radians(),
            gamma.to_radians(),
        )
    }

    /// Simple cubic cell with side length `a`
    pub fn cubic(a: f64) -> Result<Self> {
        Self::new(a, a, a, PI / 2.0, PI / 2.0, PI / 2.0)
    }

    /// Crystallographic A matrix converting fractional to lab coordinates
    ///
    /// The a axis lies along x, b in the xy-plane at `gamma` from a, and c
    /// completes the cell. Columns of the matrix are the real-space basis
    /// vectors.
    ///
    /// ```rust
    /// # use tastools_angles::Lattice;
    /// # use nalgebra::{Matrix3, Vector3};
    /// let lattice = Lattice::from_degrees(2.0, 3.0, 4.0, 90.0, 90.0, 90.0).unwrap();
    /// let a = lattice.a_matrix().unwrap();
    /// assert!((a - Matrix3::from_diagonal(&Vector3::new(2.0, 3.0, 4.0))).norm() < 1e-12);
    /// ```
    pub fn a_matrix(&self) -> Result<Matrix3<f64>> {
        self.validate()?;

        let (cos_a, cos_b, cos_g) = (self.alpha.cos(), self.beta.cos(), self.gamma.cos());
        let sin_g = self.gamma.sin();

        // squared volume of the unit cell with unit edge lengths
        let discriminant =
            1.0 - cos_a * cos_a - cos_b * cos_b - cos_g * cos_g + 2.0 * cos_a * cos_b * cos_g;
        let root = discriminant
            .try_sqrt()
            .map_err(|_| Error::InconsistentLatticeAngles { discriminant })?;

        let divide = |numerator: f64| {
            numerator
                .try_div(sin_g)
                .map_err(|_| Error::InvalidLatticeAngle {
                    name: "gamma",
                    value: self.gamma,
                })
        };

        let a = self.a * Vector3::new(1.0, 0.0, 0.0);
        let b = self.b * Vector3::new(cos_g, sin_g, 0.0);
        let c = self.c * Vector3::new(cos_b, divide(cos_a - cos_b * cos_g)?, divide(root)?);

        Ok(Matrix3::from_columns(&[a, b, c]))
    }

    /// Crystallographic B matrix converting rlu to 1/A
    ///
    /// B = 2π (A⁻¹)ᵀ, so the columns are the reciprocal basis vectors.
    ///
    /// ```rust
    /// # use tastools_angles::Lattice;
    /// # use nalgebra::Matrix3;
    /// # use std::f64::consts::TAU;
    /// let b = Lattice::cubic(5.0).unwrap().b_matrix().unwrap();
    /// assert!((b - Matrix3::identity() * (TAU / 5.0)).norm() < 1e-12);
    /// ```
    pub fn b_matrix(&self) -> Result<Matrix3<f64>> {
        let a = self.a_matrix()?;
        let a_inv = a
            .try_inverse()
            .ok_or(Error::SingularMatrix { name: "A" })?;
        let b = TAU * a_inv.transpose();
        debug!("B matrix [rlu -> 1/A] = {b:.6}");
        Ok(b)
    }

    /// Unit cell volume in cubic Angstrom
    ///
    /// ```rust
    /// # use tastools_angles::Lattice;
    /// let lattice = Lattice::from_degrees(5.0, 5.0, 5.0, 90.0, 90.0, 60.0).unwrap();
    /// assert!((lattice.volume().unwrap() - 125.0 * 3f64.sqrt() / 2.0).abs() < 1e-9);
    /// ```
    pub fn volume(&self) -> Result<f64> {
        Ok(self.a_matrix()?.determinant())
    }

    /// Check lengths and angles are individually sensible
    fn validate(&self) -> Result<()> {
        for (name, value) in [("a", self.a), ("b", self.b), ("c", self.c)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidLatticeConstant { name, value });
            }
        }

        for (name, value) in [
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("gamma", self.gamma),
        ] {
            if !(value.is_finite() && value > 0.0 && value < PI) {
                return Err(Error::InvalidLatticeAngle { name, value });
            }
        }

        Ok(())
    }
}
