//! Bragg reflection and scattering triangle relations
//!
//! Scalar relations between wavevectors, energy transfer and the scattering
//! angles. Nothing here depends on the crystal, only on |ki|, |kf| and |Q|.

// crate modules
use crate::error::{Error, Result};

// tastools modules
use tastools_utils::{FloatExt, E_TO_K2, K2_TO_E};

// external crates
use std::f64::consts::PI;

/// Bragg angle `a1` and scattering angle `a2 = 2 a1` of a crystal
///
/// For a monochromator or analyser with lattice spacing `d` in A reflecting
/// neutrons of wavenumber `k` in 1/A, from `sin(a1) = π / (d k)`.
///
/// ```rust
/// # use tastools_angles::bragg_angles;
/// let (a1, a2) = bragg_angles(1.4, 3.355).unwrap();
/// assert!((a1.to_degrees() - 41.9784).abs() < 1e-4);
/// assert_eq!(a2, 2.0 * a1);
///
/// // neutrons too slow to be reflected at all
/// assert!(bragg_angles(0.5, 3.355).is_err());
/// ```
pub fn bragg_angles(k: f64, d: f64) -> Result<(f64, f64)> {
    positive("k", k)?;
    positive("d", d)?;

    let sine = PI / (d * k);
    let a1 = sine
        .try_asin()
        .map_err(|_| Error::BraggAngle { k, d, sine })?;

    Ok((a1, 2.0 * a1))
}

/// Wavenumber reflected by a crystal set to Bragg angle `theta`
///
/// The sign of the angle only reflects the scattering sense, so the
/// wavenumber is always positive.
///
/// ```rust
/// # use tastools_angles::bragg_k;
/// let k = bragg_k(41.9784_f64.to_radians(), 3.355).unwrap();
/// assert!((k - 1.4).abs() < 1e-4);
///
/// assert!(bragg_k(0.0, 3.355).is_err());
/// ```
pub fn bragg_k(theta: f64, d: f64) -> Result<f64> {
    positive("d", d)?;

    PI.try_div(d * theta.sin().abs())
        .and_then(|k| k.try_finite())
        .map_err(|_| Error::BraggWavevector { angle: theta, d })
}

/// Angle 2θ between ki and kf closing the triangle with Q
///
/// Magnitude only, the scattering sense is applied by the caller.
///
/// ```rust
/// # use tastools_angles::scattering_angle;
/// // elastic scattering with Q = k is a 60 degree turn
/// let a4 = scattering_angle(1.0, 1.0, 1.0).unwrap();
/// assert!((a4.to_degrees() - 60.0).abs() < 1e-9);
/// ```
pub fn scattering_angle(ki: f64, kf: f64, q: f64) -> Result<f64> {
    positive("ki", ki)?;
    positive("kf", kf)?;
    non_negative("Q", q)?;

    let cosine = (ki * ki + kf * kf - q * q) / (2.0 * ki * kf);
    cosine
        .try_acos()
        .map_err(|_| Error::ScatteringTriangle {
            quantity: "a4",
            cosine,
        })
}

/// Length of Q for a given scattering angle 2θ
///
/// ```rust
/// # use tastools_angles::momentum_transfer;
/// let q = momentum_transfer(1.0, 1.0, 60_f64.to_radians()).unwrap();
/// assert!((q - 1.0).abs() < 1e-12);
/// ```
pub fn momentum_transfer(ki: f64, kf: f64, a4: f64) -> Result<f64> {
    positive("ki", ki)?;
    positive("kf", kf)?;

    (ki * ki + kf * kf - 2.0 * ki * kf * a4.cos())
        .try_sqrt()
        .map_err(|_| Error::Undefined { quantity: "Q" })
}

/// Angle ψ enclosed by ki and Q in the scattering triangle
///
/// ```rust
/// # use tastools_angles::ki_q_angle;
/// // equilateral triangle
/// let psi = ki_q_angle(1.0, 1.0, 1.0).unwrap();
/// assert!((psi.to_degrees() - 60.0).abs() < 1e-9);
/// ```
pub fn ki_q_angle(ki: f64, kf: f64, q: f64) -> Result<f64> {
    positive("ki", ki)?;
    positive("kf", kf)?;
    positive("Q", q)?;

    let cosine = (ki * ki + q * q - kf * kf) / (2.0 * ki * q);
    cosine
        .try_acos()
        .map_err(|_| Error::ScatteringTriangle {
            quantity: "psi",
            cosine,
        })
}

/// Incident wavenumber for final wavenumber `kf` and energy transfer `energy`
///
/// ```rust
/// # use tastools_angles::incident_k;
/// let ki = incident_k(1.4, 0.5).unwrap();
/// assert!((ki - 1.48367726).abs() < 1e-8);
/// ```
pub fn incident_k(kf: f64, energy: f64) -> Result<f64> {
    positive("kf", kf)?;
    wavenumber(kf * kf + E_TO_K2 * energy).ok_or(Error::EnergyTransfer {
        name: "kf",
        k: kf,
        energy,
    })
}

/// Final wavenumber for incident wavenumber `ki` and energy transfer `energy`
///
/// Fails when the neutron would have to give up more energy than it carries.
///
/// ```rust
/// # use tastools_angles::final_k;
/// assert!(final_k(1.0, 1.0).is_ok());
/// assert!(final_k(1.0, 10.0).is_err());
/// ```
pub fn final_k(ki: f64, energy: f64) -> Result<f64> {
    positive("ki", ki)?;
    wavenumber(ki * ki - E_TO_K2 * energy).ok_or(Error::EnergyTransfer {
        name: "ki",
        k: ki,
        energy,
    })
}

/// Energy transfer in meV, positive when the sample gains energy from the neutron
///
/// ```rust
/// # use tastools_angles::energy_transfer;
/// assert_eq!(energy_transfer(1.4, 1.4), 0.0);
/// assert!(energy_transfer(1.5, 1.4) > 0.0);
/// ```
pub fn energy_transfer(ki: f64, kf: f64) -> f64 {
    (ki * ki - kf * kf) * K2_TO_E
}

/// Wavenumber from k², a neutron at rest has none
fn wavenumber(k2: f64) -> Option<f64> {
    k2.try_sqrt().ok().filter(|k| *k > 0.0)
}

/// Wavenumbers and spacings are lengths of things that exist
pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::NonPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(Error::NonPositive { name, value })
    }
}
