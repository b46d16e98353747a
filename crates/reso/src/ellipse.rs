//! Principal axes of resolution ellipsoids and their 2D slices

// crate modules
use crate::error::{Error, Result};

// tastools modules
use tastools_utils::SIGMA_TO_FWHM;

// external crates
use log::debug;
use nalgebra::{DMatrix, Matrix2, Matrix4, SymmetricEigen, Vector2, Vector4};
use serde::Serialize;
use std::f64::consts::{PI, TAU};

/// Two axes of the (Q para, Q perp, Q up, E) frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Projection {
    QparaE,
    QperpE,
    QupE,
    QparaQperp,
}

impl Projection {
    /// Every projection, in the conventional plotting order
    pub const ALL: [Self; 4] = [Self::QparaE, Self::QperpE, Self::QupE, Self::QparaQperp];

    /// Rows/columns of the 4x4 resolution matrix that are kept
    pub fn indices(&self) -> [usize; 2] {
        match self {
            Self::QparaE => [0, 3],
            Self::QperpE => [1, 3],
            Self::QupE => [2, 3],
            Self::QparaQperp => [0, 1],
        }
    }

    /// Axis labels with units
    pub fn labels(&self) -> [&'static str; 2] {
        const LABELS: [&str; 4] = ["Q para (1/A)", "Q perp (1/A)", "Q up (1/A)", "E (meV)"];
        self.indices().map(|i| LABELS[i])
    }

    /// 2x2 slice of a 4x4 matrix through the two axes
    ///
    /// ```rust
    /// # use tastools_reso::Projection;
    /// # use nalgebra::{Matrix2, Matrix4};
    /// let m = Matrix4::from_fn(|i, j| (10 * i + j) as f64);
    /// assert_eq!(Projection::QperpE.slice(&m), Matrix2::new(11.0, 13.0, 31.0, 33.0));
    /// ```
    pub fn slice(&self, m: &Matrix4<f64>) -> Matrix2<f64> {
        let [a, b] = self.indices();
        Matrix2::new(m[(a, a)], m[(a, b)], m[(b, a)], m[(b, b)])
    }
}

impl std::fmt::Display for Projection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::QparaE => "Q para / E",
            Self::QperpE => "Q perp / E",
            Self::QupE => "Q up / E",
            Self::QparaQperp => "Q para / Q perp",
        };
        write!(f, "{name}")
    }
}

/// 2D resolution ellipse
///
/// The principal axes are ordered from the widest to the narrowest, i.e. by
/// ascending eigenvalue of the quadric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ellipse {
    /// Full widths at half maximum along the principal axes
    pub fwhms: [f64; 2],
    /// Tilt of the first principal axis against the first coordinate axis,
    /// radians in (-π/2, π/2]
    pub angle: f64,
    /// Principal axes as columns
    pub axes: Matrix2<f64>,
}

impl Ellipse {
    /// `n` points around the FWHM contour, first and last point coincide
    ///
    /// ```rust
    /// # use tastools_reso::describe_ellipse;
    /// # use nalgebra::Matrix2;
    /// let ellipse = describe_ellipse(&Matrix2::new(1.0, 0.0, 0.0, 4.0)).unwrap();
    /// let points = ellipse.contour(128);
    /// assert_eq!(points.len(), 128);
    /// assert!((points[0] - points[127]).norm() < 1e-12);
    /// ```
    pub fn contour(&self, n: usize) -> Vec<Vector2<f64>> {
        let step = if n > 1 { TAU / (n - 1) as f64 } else { 0.0 };
        (0..n)
            .map(|i| {
                let phi = i as f64 * step;
                self.axes * Vector2::new(self.fwhms[0] * phi.cos(), self.fwhms[1] * phi.sin())
            })
            .collect()
    }
}

/// 4D resolution ellipsoid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ellipsoid {
    /// Full widths at half maximum along the principal axes, widest first
    pub fwhms: Vector4<f64>,
    /// Principal axes as columns
    pub axes: Matrix4<f64>,
}

/// Full description of a 4x4 resolution matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ellipses {
    /// Principal axes of the full ellipsoid
    pub ellipsoid: Ellipsoid,
    /// Widths of the ellipsoid along each coordinate axis
    ///
    /// Relevant for coherent elastic scattering, where only the diagonal
    /// elements of the resolution matrix matter.
    pub diagonal_fwhms: Vector4<f64>,
    /// Q para / E slice
    pub qpara_e: Ellipse,
    /// Q perp / E slice
    pub qperp_e: Ellipse,
    /// Q up / E slice
    pub qup_e: Ellipse,
    /// Q para / Q perp slice
    pub qpara_qperp: Ellipse,
}

impl Ellipses {
    /// Ellipse of a given projection
    pub fn projection(&self, projection: Projection) -> &Ellipse {
        match projection {
            Projection::QparaE => &self.qpara_e,
            Projection::QperpE => &self.qperp_e,
            Projection::QupE => &self.qup_e,
            Projection::QparaQperp => &self.qpara_qperp,
        }
    }
}

/// Principal axes of a 2x2 resolution quadric
///
/// ```rust
/// # use tastools_reso::describe_ellipse;
/// # use tastools_utils::SIGMA_TO_FWHM;
/// # use nalgebra::Matrix2;
/// // sigma = 2 along x, 1 along y
/// let ellipse = describe_ellipse(&Matrix2::new(0.25, 0.0, 0.0, 1.0)).unwrap();
/// assert!((ellipse.fwhms[0] - 2.0 * SIGMA_TO_FWHM).abs() < 1e-12);
/// assert!((ellipse.fwhms[1] - SIGMA_TO_FWHM).abs() < 1e-12);
/// assert!(ellipse.angle.abs() < 1e-12);
/// ```
pub fn describe_ellipse(quadric: &Matrix2<f64>) -> Result<Ellipse> {
    let (fwhms, axes) = principal_axes(DMatrix::from_column_slice(2, 2, quadric.as_slice()))?;
    let axes = Matrix2::from_column_slice(axes.as_slice());

    let angle = half_turn(axes[(1, 0)].atan2(axes[(0, 0)]));
    Ok(Ellipse {
        fwhms: [fwhms[0], fwhms[1]],
        angle,
        axes,
    })
}

/// Principal axes of a 4x4 resolution matrix
pub fn describe_ellipsoid(quadric: &Matrix4<f64>) -> Result<Ellipsoid> {
    let (fwhms, axes) = principal_axes(DMatrix::from_column_slice(4, 4, quadric.as_slice()))?;
    Ok(Ellipsoid {
        fwhms: Vector4::from_column_slice(&fwhms),
        axes: Matrix4::from_column_slice(axes.as_slice()),
    })
}

/// Ellipsoid, diagonal widths and the four 2D slices of a resolution matrix
///
/// Slices are cuts through the ellipsoid keeping two axes, taken by removing
/// the rows and columns of the other two.
pub fn calc_ellipses(resolution: &Matrix4<f64>) -> Result<Ellipses> {
    let ellipsoid = describe_ellipsoid(resolution)?;

    let mut diagonal_fwhms = Vector4::zeros();
    for i in 0..4 {
        diagonal_fwhms[i] = fwhm(resolution[(i, i)], "resolution diagonal")?;
    }
    debug!("Diagonal FWHMs = {:?}", diagonal_fwhms.as_slice());

    let slice = |p: Projection| describe_ellipse(&p.slice(resolution));
    Ok(Ellipses {
        ellipsoid,
        diagonal_fwhms,
        qpara_e: slice(Projection::QparaE)?,
        qperp_e: slice(Projection::QperpE)?,
        qup_e: slice(Projection::QupE)?,
        qpara_qperp: slice(Projection::QparaQperp)?,
    })
}

/// FWHMs and eigenvectors, sorted by ascending eigenvalue
fn principal_axes(quadric: DMatrix<f64>) -> Result<(Vec<f64>, DMatrix<f64>)> {
    let n = quadric.nrows();
    let symmetric = (&quadric + quadric.transpose()) * 0.5;
    let eigen = SymmetricEigen::new(symmetric);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

    let fwhms = order
        .iter()
        .map(|&i| fwhm(eigen.eigenvalues[i], "resolution"))
        .collect::<Result<Vec<f64>>>()?;

    let axes = DMatrix::from_fn(n, n, |row, col| eigen.eigenvectors[(row, order[col])]);
    Ok((fwhms, axes))
}

/// FWHM along an axis with curvature `eigenvalue`
fn fwhm(eigenvalue: f64, name: &'static str) -> Result<f64> {
    if eigenvalue.is_finite() && eigenvalue > 0.0 {
        Ok(SIGMA_TO_FWHM / eigenvalue.sqrt())
    } else {
        Err(Error::NotPositiveDefinite { name, eigenvalue })
    }
}

/// Direction angle of an axis, which has no sign, folded into (-π/2, π/2]
fn half_turn(angle: f64) -> f64 {
    if angle > PI / 2.0 {
        angle - PI
    } else if angle <= -PI / 2.0 {
        angle + PI
    } else {
        angle
    }
}
