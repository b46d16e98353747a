//! Weighted covariance of (Q, E) samples
//!
//! The covariance is first taken in the lab frame of the events and then
//! rotated into a frame aligned with Q, see [Basis]. The resolution matrix is
//! the inverse of the covariance.

// crate modules
use crate::error::{Error, Result};
use crate::events::Event;

// external crates
use log::{debug, warn};
use nalgebra::{Matrix4, Vector3, Vector4};
use serde::Serialize;

/// Fewest events accepted for a covariance
pub const MIN_EVENTS: usize = 5;

/// Smallest eigenvalue of the covariance, relative to the largest, that is
/// still considered invertible
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Orthonormal (Q para, Q perp, Q up) frame for the rotated ellipsoid
///
/// The energy axis is always kept as the fourth axis.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub enum Basis {
    /// Q para along the mean Q, with the lab y axis as the vertical
    #[default]
    AlongMean,
    /// Explicit directions in the lab frame
    ///
    /// `perp` only needs to be in the plane, any component along `para` is
    /// projected out.
    Explicit {
        para: Vector3<f64>,
        perp: Vector3<f64>,
    },
}

impl Basis {
    /// Unit (para, perp, up) vectors, right-handed
    ///
    /// ```rust
    /// # use tastools_reso::Basis;
    /// # use nalgebra::Vector3;
    /// let [para, perp, up] = Basis::AlongMean.vectors(&Vector3::new(2.0, 0.0, 0.0)).unwrap();
    /// assert_eq!(para, Vector3::x());
    /// assert_eq!(perp, -Vector3::z());
    /// assert_eq!(up, Vector3::y());
    /// ```
    pub fn vectors(&self, mean_q: &Vector3<f64>) -> Result<[Vector3<f64>; 3]> {
        match self {
            Self::AlongMean => {
                let para = normalize(mean_q, "mean Q")?;
                // lab y is the fixed vertical
                let perp = Vector3::y().cross(&para).try_normalize(0.0).ok_or(
                    Error::CollinearBasis {
                        name: "lab vertical",
                    },
                )?;
                Ok([para, perp, para.cross(&perp)])
            }
            Self::Explicit { para, perp } => {
                let para = normalize(para, "Q para")?;
                normalize(perp, "Q perp")?;
                let perp = (perp - para * perp.dot(&para))
                    .try_normalize(1e-12 * perp.norm())
                    .ok_or(Error::CollinearBasis { name: "Q perp" })?;
                Ok([para, perp, para.cross(&perp)])
            }
        }
    }

    /// 4x4 change of basis with the axes as columns
    pub fn transform(&self, mean_q: &Vector3<f64>) -> Result<Matrix4<f64>> {
        let [para, perp, up] = self.vectors(mean_q)?;
        let column = |v: Vector3<f64>| Vector4::new(v.x, v.y, v.z, 0.0);
        Ok(Matrix4::from_columns(&[
            column(para),
            column(perp),
            column(up),
            Vector4::w(),
        ]))
    }
}

/// Whether transformed events are centred on the mean
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Centering {
    /// Subtract the mean (Q, E) so events scatter around zero
    #[default]
    Mean,
    /// Keep absolute coordinates
    None,
}

/// Weighted mean and covariance of an event sample
///
/// Lab frame quantities keep the (Qx, Qy, Qz, E) ordering of the events. The
/// rotated quantities are in the (Q para, Q perp, Q up, E) frame of the
/// [Basis] used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Covariance {
    /// Mean (Q, E) in the lab frame
    pub lab_mean: Vector4<f64>,
    /// Covariance in the lab frame
    pub lab_covariance: Matrix4<f64>,
    /// Resolution matrix in the lab frame
    pub lab_resolution: Matrix4<f64>,
    /// Change of basis, columns are (Q para, Q perp, Q up, E)
    pub transform: Matrix4<f64>,
    /// Mean (Q, E) in the rotated frame
    pub mean: Vector4<f64>,
    /// Covariance in the rotated frame
    pub covariance: Matrix4<f64>,
    /// Resolution matrix in the rotated frame
    pub resolution: Matrix4<f64>,
    /// Number of events used
    pub events: usize,
    /// Sum of all weights
    pub total_weight: f64,
}

impl Covariance {
    /// Express events in the rotated frame
    ///
    /// These are the (Q para, Q perp, Q up, E) coordinates usually plotted
    /// alongside the resolution ellipses.
    pub fn transform_events(&self, events: &[Event], centering: Centering) -> Vec<Vector4<f64>> {
        let t = self.transform.transpose();
        events
            .iter()
            .map(|e| {
                let x = t * e.four_vector();
                match centering {
                    Centering::Mean => x - self.mean,
                    Centering::None => x,
                }
            })
            .collect()
    }
}

/// Weighted covariance and resolution matrix of a set of events
///
/// The covariance is the population covariance with the event weights, i.e.
/// normalised by the total weight. Fails with too few events, negative or
/// vanishing weights, or a singular covariance.
///
/// ```rust
/// # use tastools_reso::{calc_covariance, Basis, Event};
/// # use nalgebra::Vector3;
/// // points at +/- 2 sigma along each axis around Q = (1.5, 0, 0), E = 1
/// let sigma = [0.01, 0.02, 0.03, 0.1];
/// let mut events = Vec::new();
/// for axis in 0..4 {
///     for sign in [-2.0, 2.0] {
///         let mut x = [1.5, 0.0, 0.0, 1.0];
///         x[axis] += sign * sigma[axis];
///         events.push(Event::new(Vector3::new(x[0], x[1], x[2]), x[3], 1.0));
///     }
/// }
///
/// let cov = calc_covariance(&events, &Basis::AlongMean).unwrap();
/// assert!((cov.lab_covariance[(1, 1)] - 0.02_f64.powi(2)).abs() < 1e-12);
/// assert!((cov.resolution[(3, 3)] - 100.0).abs() < 1e-6);
/// ```
pub fn calc_covariance(events: &[Event], basis: &Basis) -> Result<Covariance> {
    if events.len() < MIN_EVENTS {
        return Err(Error::InsufficientEvents {
            found: events.len(),
            required: MIN_EVENTS,
        });
    }

    if let Some((index, event)) = events.iter().enumerate().find(|(_, e)| e.weight < 0.0) {
        return Err(Error::NegativeWeight {
            index,
            weight: event.weight,
        });
    }

    let total_weight: f64 = events.iter().map(|e| e.weight).sum();
    if !(total_weight.is_finite() && total_weight > 0.0) {
        return Err(Error::NonPositiveWeight {
            total: total_weight,
        });
    }

    let zero_weight = events.iter().filter(|e| e.weight == 0.0).count();
    if zero_weight > 0 {
        warn!("{zero_weight} of {} events have zero weight", events.len());
    }

    let lab_mean = events
        .iter()
        .fold(Vector4::zeros(), |acc, e| acc + e.four_vector() * e.weight)
        / total_weight;

    let lab_covariance = events.iter().fold(Matrix4::zeros(), |acc, e| {
        let d = e.four_vector() - lab_mean;
        acc + d * d.transpose() * e.weight
    }) / total_weight;
    debug!("Covariance in lab frame = {lab_covariance:.6e}");

    let lab_resolution = invert_covariance(&lab_covariance)?;

    let transform = basis.transform(&lab_mean.xyz())?;
    let t = transform.transpose();
    let mean = t * lab_mean;
    let covariance = symmetrize(t * lab_covariance * transform);
    let resolution = symmetrize(t * lab_resolution * transform);
    debug!("Resolution in (Q para, Q perp, Q up, E) frame = {resolution:.6e}");

    Ok(Covariance {
        lab_mean,
        lab_covariance,
        lab_resolution,
        transform,
        mean,
        covariance,
        resolution,
        events: events.len(),
        total_weight,
    })
}

/// Inverse of a covariance, refusing numerically singular ones
fn invert_covariance(covariance: &Matrix4<f64>) -> Result<Matrix4<f64>> {
    let eigenvalues = covariance.symmetric_eigenvalues();
    let largest = eigenvalues.max();
    if largest.is_nan() || largest <= 0.0 || eigenvalues.min() <= SINGULAR_TOLERANCE * largest {
        return Err(Error::SingularMatrix { name: "covariance" });
    }

    covariance
        .try_inverse()
        .map(symmetrize)
        .ok_or(Error::SingularMatrix { name: "covariance" })
}

fn symmetrize(m: Matrix4<f64>) -> Matrix4<f64> {
    (m + m.transpose()) * 0.5
}

fn normalize(v: &Vector3<f64>, name: &'static str) -> Result<Vector3<f64>> {
    v.try_normalize(0.0).ok_or(Error::ZeroLengthVector { name })
}
