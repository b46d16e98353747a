//! Physical and statistical constants shared by the engines

/// Conversion factor from energy to squared wavenumber (Å⁻² meV⁻¹)
///
/// Equal to 2 m_n / ħ² in units of meV and Å. The value was calculated from
/// the CODATA neutron mass, Planck constant and elementary charge.
///
/// ```rust
/// # use tastools_utils::E_TO_K2;
/// // k² = E_TO_K2 * E for a free neutron
/// let k = (E_TO_K2 * 5.0_f64).sqrt();
/// assert!((k - 1.5534).abs() < 1e-4);
/// ```
pub const E_TO_K2: f64 = 0.482596406464;

/// Conversion factor from squared wavenumber to energy (meV Å²)
pub const K2_TO_E: f64 = 1.0 / E_TO_K2;

/// Standard deviation to half width at half maximum, √(2 ln 2)
pub const SIGMA_TO_HWHM: f64 = 1.177_410_022_515_474_6;

/// Standard deviation to full width at half maximum, 2√(2 ln 2)
pub const SIGMA_TO_FWHM: f64 = 2.0 * SIGMA_TO_HWHM;
