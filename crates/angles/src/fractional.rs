//! Vector algebra in fractional (rlu) coordinates
//!
//! Reciprocal lattice vectors are generally not orthonormal, so the plain
//! Euclidean dot and cross products of (h,k,l) triples are meaningless. All
//! products here go through the metric tensor G = BᵀB of the B matrix.

// crate modules
use crate::error::{Error, Result};

// tastools modules
use tastools_utils::FloatExt;

// external crates
use nalgebra::{Matrix3, Vector3};

/// Levi-Civita symbol ε_ijk
///
/// The covariant Levi-Civita tensor of a basis B is ε_ijk det(B), i.e. the
/// determinant of the matrix of columns (B_i, B_j, B_k).
const LEVI_CIVITA: [[[f64; 3]; 3]; 3] = [
    [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, -1.0, 0.0]],
    [[0.0, 0.0, -1.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
    [[0.0, 1.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 0.0, 0.0]],
];

/// Metric tensor G = BᵀB of a crystal B matrix
pub fn metric(b: &Matrix3<f64>) -> Matrix3<f64> {
    b.transpose() * b
}

/// Dot product in fractional coordinates, aᵀ G b
///
/// ```rust
/// # use tastools_angles::{dot, metric, Lattice};
/// # use nalgebra::Vector3;
/// let b = Lattice::cubic(2.0 * std::f64::consts::PI).unwrap().b_matrix().unwrap();
/// let g = metric(&b);
/// let x = Vector3::new(1.0, 2.0, 3.0);
/// let y = Vector3::new(4.0, 5.0, 6.0);
/// assert!((dot(&x, &y, &g) - 32.0).abs() < 1e-12);
/// ```
pub fn dot(a: &Vector3<f64>, b: &Vector3<f64>, metric: &Matrix3<f64>) -> f64 {
    a.dot(&(metric * b))
}

/// Length of a fractional vector in 1/A
pub fn length(a: &Vector3<f64>, metric: &Matrix3<f64>) -> Result<f64> {
    dot(a, a, metric)
        .try_sqrt()
        .map_err(|_| Error::Undefined { quantity: "length" })
}

/// Angle enclosed by two fractional vectors
///
/// Fails if either vector has no length.
///
/// ```rust
/// # use tastools_angles::{angle, metric, Lattice};
/// # use nalgebra::Vector3;
/// let lattice = Lattice::from_degrees(5.0, 5.0, 5.0, 90.0, 90.0, 60.0).unwrap();
/// let g = metric(&lattice.b_matrix().unwrap());
///
/// // reciprocal axes of a hexagonal cell enclose 120 degrees
/// let a_star = Vector3::new(1.0, 0.0, 0.0);
/// let b_star = Vector3::new(0.0, 1.0, 0.0);
/// let phi = angle(&a_star, &b_star, &g).unwrap();
/// assert!((phi.to_degrees() - 120.0).abs() < 1e-9);
/// ```
pub fn angle(a: &Vector3<f64>, b: &Vector3<f64>, metric: &Matrix3<f64>) -> Result<f64> {
    let len_a = nonzero_length(a, metric, "first vector")?;
    let len_b = nonzero_length(b, metric, "second vector")?;

    let cosine = dot(a, b, metric) / (len_a * len_b);
    cosine
        .try_acos()
        .map_err(|_| Error::Undefined { quantity: "angle" })
}

/// Cross product in fractional coordinates
///
/// Contracts the covariant Levi-Civita tensor of `b` with both vectors and
/// raises the index again with the inverse metric. The result is in rlu and
/// is perpendicular to both inputs in the lab frame, with the lab length
/// |B a × B b|.
///
/// ```rust
/// # use tastools_angles::{cross, dot, metric, Lattice};
/// # use nalgebra::Vector3;
/// let lattice = Lattice::from_degrees(5.0, 6.0, 7.0, 80.0, 95.0, 100.0).unwrap();
/// let b = lattice.b_matrix().unwrap();
/// let g = metric(&b);
///
/// let x = Vector3::new(1.0, 0.0, 0.0);
/// let y = Vector3::new(0.0, 1.0, 0.0);
/// let up = cross(&x, &y, &b).unwrap();
///
/// assert!(dot(&up, &x, &g).abs() < 1e-12);
/// assert!(dot(&up, &y, &g).abs() < 1e-12);
/// ```
pub fn cross(a: &Vector3<f64>, b: &Vector3<f64>, b_matrix: &Matrix3<f64>) -> Result<Vector3<f64>> {
    let volume = b_matrix.determinant();
    let metric_inv = metric(b_matrix)
        .try_inverse()
        .ok_or(Error::SingularMatrix { name: "metric" })?;

    let mut covariant = Vector3::zeros();
    for (i, plane) in LEVI_CIVITA.iter().enumerate() {
        for (j, row) in plane.iter().enumerate() {
            for (k, eps) in row.iter().enumerate() {
                covariant[i] += eps * a[j] * b[k];
            }
        }
    }

    Ok(metric_inv * covariant * volume)
}

/// Length that must be usable as a denominator
fn nonzero_length(a: &Vector3<f64>, metric: &Matrix3<f64>, name: &'static str) -> Result<f64> {
    let len = length(a, metric)?;
    if len > 0.0 {
        Ok(len)
    } else {
        Err(Error::ZeroLengthVector { name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lattice;
    use std::f64::consts::TAU;

    fn triclinic() -> Matrix3<f64> {
        Lattice::from_degrees(5.0, 6.0, 7.0, 80.0, 95.0, 100.0)
            .unwrap()
            .b_matrix()
            .unwrap()
    }

    #[test]
    fn levi_civita_determinants() {
        // ε_ijk det(B) must match det(B_i, B_j, B_k) for every index triple
        let b = triclinic();
        let volume = b.determinant();
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    let m = Matrix3::from_columns(&[b.column(i), b.column(j), b.column(k)]);
                    let expected = m.transpose().determinant();
                    assert!((LEVI_CIVITA[i][j][k] * volume - expected).abs() < 1e-10);
                }
            }
        }
    }

    #[test]
    fn cross_matches_lab_frame() {
        let b = triclinic();
        let x = Vector3::new(1.0, -2.0, 0.5);
        let y = Vector3::new(0.0, 3.0, 1.0);

        let frac = cross(&x, &y, &b).unwrap();
        let lab = (b * x).cross(&(b * y));
        assert!((b * frac - lab).norm() < 1e-10);
    }

    #[test]
    fn cubic_cross() {
        let b = Lattice::cubic(5.0).unwrap().b_matrix().unwrap();
        let up = cross(&Vector3::x(), &Vector3::y(), &b).unwrap();
        assert!((up - Vector3::new(0.0, 0.0, TAU / 5.0)).norm() < 1e-12);
    }

    #[test]
    fn parallel_vectors() {
        let g = metric(&triclinic());
        let x = Vector3::new(1.0, 1.0, 0.0);
        assert!(angle(&x, &(x * 2.0), &g).unwrap().abs() < 1e-6);
        assert!((angle(&x, &(-x), &g).unwrap() - std::f64::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn zero_length_angle() {
        let g = metric(&triclinic());
        assert_eq!(
            angle(&Vector3::zeros(), &Vector3::x(), &g),
            Err(Error::ZeroLengthVector {
                name: "first vector"
            })
        );
    }

    #[test]
    fn singular_metric() {
        let b = Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(
            cross(&Vector3::x(), &Vector3::y(), &b),
            Err(Error::SingularMatrix { name: "metric" })
        );
    }
}
