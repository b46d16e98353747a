use crate::f;

/// Extends primitives with more specific formatting options
pub trait ValueExt {
    /// Better scientific number formatting
    ///
    /// The default is not very consistent for scientific in particular, so this
    /// allows easy definition.
    ///
    /// ```rust
    /// # use tastools_utils::ValueExt;
    /// assert_eq!((-1.0_f64).sci(5, 2), "-1.00000e+00".to_string());
    /// assert_eq!(0.0123_f64.sci(3, 2), "1.230e-02".to_string());
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;

    /// Shortest sensible representation with `digits` significant figures
    ///
    /// Behaves like the C `%g` conversion: fixed notation for moderate
    /// magnitudes and scientific otherwise, with trailing zeros removed. This
    /// is what gets printed for angles and wavevectors.
    ///
    /// ```rust
    /// # use tastools_utils::ValueExt;
    /// assert_eq!(76.028290763_f64.general(6), "76.0283");
    /// assert_eq!(1.0_f64.general(6), "1");
    /// assert_eq!((-0.5_f64).general(6), "-0.5");
    /// assert_eq!(1.5e-7_f64.general(6), "1.5e-07");
    /// assert_eq!(0.0_f64.general(6), "0");
    /// ```
    fn general(&self, digits: usize) -> String;
}

impl ValueExt for f64 {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let mut num = f!("{:.precision$e}", self, precision = precision);
        // Safe to `unwrap` as `num` is guaranteed to contain `'e'`
        let exp = num.split_off(num.find('e').unwrap());
        // Make sure the exponent is signed
        let (sign, exp) = match exp.strip_prefix("e-") {
            Some(exp) => ('-', exp),
            None => ('+', &exp[1..]),
        };
        // Pad the exponent with zeros if needed and put it back on the number
        num.push_str(&f!("e{}{:0>pad$}", sign, exp, pad = exp_pad));
        num
    }

    fn general(&self, digits: usize) -> String {
        if !self.is_finite() {
            return f!("{self}");
        }
        if *self == 0.0 {
            return "0".to_string();
        }

        let digits = digits.max(1);
        let exponent = self.abs().log10().floor() as i32;

        if exponent < -4 || exponent >= digits as i32 {
            // mantissa may still carry trailing zeros, e.g. 1.50000e-07
            let num = self.sci(digits - 1, 2);
            let (mantissa, exp) = num.split_at(num.find('e').unwrap_or(num.len()));
            f!("{}{}", trim_zeros(mantissa), exp)
        } else {
            let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
            trim_zeros(&f!("{:.decimals$}", self, decimals = decimals))
        }
    }
}

/// Drop trailing zeros after a decimal point, and the point if left dangling
fn trim_zeros(number: &str) -> String {
    if number.contains('.') {
        number
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        number.to_string()
    }
}
