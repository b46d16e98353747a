use crate::error::{Error, Result};

/// Rounding slack allowed at the edges of a function domain
///
/// Cosines computed from dot products of parallel vectors regularly come out
/// as `1.0000000000000002`. Arguments within this distance of a domain edge
/// are clamped onto it rather than rejected.
pub const DOMAIN_TOLERANCE: f64 = 1e-10;

/// Extends `f64` with checked versions of partial functions
///
/// The standard library happily returns `NAN` for `acos(1.5)` or
/// `sqrt(-1.0)`, which then silently propagates through any calculation.
/// These return an [Error] instead so that a failure can be reported at the
/// point it occurs.
pub trait FloatExt: Sized {
    /// Checked arc cosine
    ///
    /// ```rust
    /// # use tastools_utils::{FloatExt, Error};
    /// assert_eq!(1.0_f64.try_acos(), Ok(0.0));
    /// assert_eq!((1.0_f64 + 1e-14).try_acos(), Ok(0.0));
    ///
    /// assert_eq!(
    ///     (-3.5_f64).try_acos(),
    ///     Err(Error::OutsideDomain { value: -3.5, lower_bound: -1.0, upper_bound: 1.0 })
    /// );
    /// ```
    fn try_acos(self) -> Result<Self>;

    /// Checked arc sine
    ///
    /// ```rust
    /// # use tastools_utils::FloatExt;
    /// assert!((0.5_f64.try_asin().unwrap() - std::f64::consts::FRAC_PI_6).abs() < 1e-12);
    /// assert!(1.2_f64.try_asin().is_err());
    /// ```
    fn try_asin(self) -> Result<Self>;

    /// Checked square root, tiny negative values from rounding give zero
    ///
    /// ```rust
    /// # use tastools_utils::FloatExt;
    /// assert_eq!(4.0_f64.try_sqrt(), Ok(2.0));
    /// assert_eq!((-1e-14_f64).try_sqrt(), Ok(0.0));
    /// assert!((-1.0_f64).try_sqrt().is_err());
    /// ```
    fn try_sqrt(self) -> Result<Self>;

    /// Checked division, a zero denominator is an error
    ///
    /// ```rust
    /// # use tastools_utils::{FloatExt, Error};
    /// assert_eq!(3.0_f64.try_div(2.0), Ok(1.5));
    /// assert_eq!(3.0_f64.try_div(0.0), Err(Error::DivisionByZero { numerator: 3.0 }));
    /// ```
    fn try_div(self, denominator: Self) -> Result<Self>;

    /// Pass through finite values, anything else is an error
    ///
    /// ```rust
    /// # use tastools_utils::{FloatExt, Error};
    /// assert_eq!(2.0_f64.try_finite(), Ok(2.0));
    /// assert_eq!(f64::NAN.try_finite(), Err(Error::UndefinedValue));
    /// assert_eq!(f64::INFINITY.try_finite(), Err(Error::UndefinedValue));
    /// ```
    fn try_finite(self) -> Result<Self>;
}

impl FloatExt for f64 {
    fn try_acos(self) -> Result<f64> {
        Ok(clamp_unit(self)?.acos())
    }

    fn try_asin(self) -> Result<f64> {
        Ok(clamp_unit(self)?.asin())
    }

    fn try_sqrt(self) -> Result<f64> {
        let value = self.try_finite()?;
        if value >= 0.0 {
            Ok(value.sqrt())
        } else if value >= -DOMAIN_TOLERANCE {
            Ok(0.0)
        } else {
            Err(Error::OutsideDomain {
                value,
                lower_bound: 0.0,
                upper_bound: f64::INFINITY,
            })
        }
    }

    fn try_div(self, denominator: f64) -> Result<f64> {
        if denominator == 0.0 {
            return Err(Error::DivisionByZero { numerator: self });
        }
        (self / denominator).try_finite()
    }

    fn try_finite(self) -> Result<f64> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(Error::UndefinedValue)
        }
    }
}

/// Force a value onto [-1, 1], allowing for rounding at the edges
fn clamp_unit(value: f64) -> Result<f64> {
    let value = value.try_finite()?;
    if value.abs() <= 1.0 {
        Ok(value)
    } else if value.abs() <= 1.0 + DOMAIN_TOLERANCE {
        Ok(value.signum())
    } else {
        Err(Error::OutsideDomain {
            value,
            lower_bound: -1.0,
            upper_bound: 1.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acos_edges() {
        assert_eq!((-1.0_f64).try_acos(), Ok(std::f64::consts::PI));
        assert_eq!((-1.0_f64 - 1e-13).try_acos(), Ok(std::f64::consts::PI));
        assert!((1.0_f64 + 1e-6).try_acos().is_err());
        assert_eq!(f64::NAN.try_acos(), Err(Error::UndefinedValue));
    }

    #[test]
    fn asin_edges() {
        assert_eq!(1.0_f64.try_asin(), Ok(std::f64::consts::FRAC_PI_2));
        assert_eq!(
            (-2.0_f64).try_asin(),
            Err(Error::OutsideDomain {
                value: -2.0,
                lower_bound: -1.0,
                upper_bound: 1.0
            })
        );
    }

    #[test]
    fn sqrt_negative() {
        assert!(matches!(
            (-0.5_f64).try_sqrt(),
            Err(Error::OutsideDomain { value, .. }) if value == -0.5
        ));
    }

    #[test]
    fn division_overflow() {
        assert_eq!(f64::MAX.try_div(1e-300), Err(Error::UndefinedValue));
    }
}
