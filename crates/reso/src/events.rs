// tastools modules
use tastools_utils::K2_TO_E;

// external crates
use nalgebra::{Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// Neutron event as recorded by a Monte-Carlo instrument simulation
///
/// The scattering position is read from the table by
/// [ColumnLayout::raw_event](crate::ColumnLayout::raw_event) but does not
/// enter the resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Incident wavevector in 1/A
    pub ki: Vector3<f64>,
    /// Final wavevector in 1/A
    pub kf: Vector3<f64>,
    /// Scattering position in the sample
    pub position: Vector3<f64>,
    /// Weight of the incident neutron
    pub wi: f64,
    /// Weight of the scattered neutron
    pub wf: f64,
}

impl RawEvent {
    /// Reduce to momentum and energy transfer
    ///
    /// ```rust
    /// # use tastools_reso::RawEvent;
    /// # use nalgebra::Vector3;
    /// let raw = RawEvent {
    ///     ki: Vector3::new(1.5, 0.0, 0.0),
    ///     kf: Vector3::new(0.0, 0.0, 1.5),
    ///     position: Vector3::zeros(),
    ///     wi: 0.5,
    ///     wf: 0.5,
    /// };
    ///
    /// let event = raw.reduce();
    /// assert_eq!(event.q, Vector3::new(1.5, 0.0, -1.5));
    /// assert_eq!(event.energy, 0.0);
    /// assert_eq!(event.weight, 0.25);
    /// ```
    pub fn reduce(&self) -> Event {
        Event {
            q: self.ki - self.kf,
            energy: K2_TO_E * (self.ki.norm_squared() - self.kf.norm_squared()),
            weight: self.wi * self.wf,
        }
    }
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        raw.reduce()
    }
}

/// Weighted (Q, E) sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Momentum transfer in 1/A
    pub q: Vector3<f64>,
    /// Energy transfer in meV
    pub energy: f64,
    /// Statistical weight
    pub weight: f64,
}

impl Event {
    pub fn new(q: Vector3<f64>, energy: f64, weight: f64) -> Self {
        Self { q, energy, weight }
    }

    /// The (Qx, Qy, Qz, E) 4-vector
    pub fn four_vector(&self) -> Vector4<f64> {
        Vector4::new(self.q.x, self.q.y, self.q.z, self.energy)
    }
}
