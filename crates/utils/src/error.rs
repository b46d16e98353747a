//! Result and Error types for the utils module

/// Type alias for `Result<T, utils::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq)]
/// The error type for `tastools_utils`
pub enum Error {
    /// Argument lies outside of the domain of the function, e.g. `acos(1.5)`
    OutsideDomain {
        value: f64,
        lower_bound: f64,
        upper_bound: f64,
    },

    /// Denominator of a division was exactly zero
    DivisionByZero { numerator: f64 },

    /// Input or result was NAN or INFINITY
    UndefinedValue,
}

/// Broad classes of failure shared by every engine
///
/// Callers that only need to show "invalid" can ignore the detail, but tests
/// and logs can still tell a broken lattice from an unreachable Q.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Degenerate or inconsistent lattice, orientation or basis
    Geometry,
    /// Requested angle, wavevector or ellipsoid is physically unreachable
    Kinematic,
    /// Malformed input data such as an event table
    InputFormat,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let name = match self {
            ErrorKind::Geometry => "geometry",
            ErrorKind::Kinematic => "kinematic",
            ErrorKind::InputFormat => "input format",
        };
        write!(f, "{name}")
    }
}

// error boilerplate
impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// implement standard error trait to use with ? operator
impl std::error::Error for Error {}
