//! Result and Error types for tastools-reso

use tastools_utils::ErrorKind;

/// Type alias for `Result<T, reso::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `tastools-reso`
pub enum Error {
    /// Underlying file I/O error
    #[error("failure in file I/O")]
    Io(#[from] std::io::Error),

    /// Failure writing a CSV table
    #[error("failed CSV operation")]
    Csv(#[from] csv::Error),

    /// A row of the event table is not a list of numbers
    #[error("line {line}: {reason}")]
    ParseError { line: usize, reason: String },

    /// A row of the event table has the wrong number of columns
    #[error("line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Column count matches neither the raw nor the reduced layout
    #[error("unable to infer event layout from {columns} columns, expected 11 or 5")]
    UnknownLayout { columns: usize },

    /// Column layout points outside of the table
    #[error("{name} column {index} outside of a {columns} column table")]
    ColumnOutOfRange {
        name: &'static str,
        index: usize,
        columns: usize,
    },

    /// Weights are probabilities and can not be negative
    #[error("event {index} has negative weight {weight}")]
    NegativeWeight { index: usize, weight: f64 },

    /// Too few events for a 4x4 covariance
    #[error("at least {required} events needed, found {found}")]
    InsufficientEvents { found: usize, required: usize },

    /// All events have zero weight
    #[error("total event weight {total} is not positive")]
    NonPositiveWeight { total: f64 },

    /// Inversion of a matrix failed
    #[error("{name} matrix is singular")]
    SingularMatrix { name: &'static str },

    /// Eigenvalue of a resolution matrix was zero or negative
    #[error("{name} matrix is not positive definite (eigenvalue {eigenvalue})")]
    NotPositiveDefinite {
        name: &'static str,
        eigenvalue: f64,
    },

    /// A basis vector has no direction
    #[error("{name} has zero length")]
    ZeroLengthVector { name: &'static str },

    /// Basis directions do not span a plane
    #[error("{name} is parallel to Q para")]
    CollinearBasis { name: &'static str },
}

impl Error {
    /// Broad classification of the failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_)
            | Error::Csv(_)
            | Error::ParseError { .. }
            | Error::ColumnCount { .. }
            | Error::UnknownLayout { .. }
            | Error::ColumnOutOfRange { .. }
            | Error::NegativeWeight { .. } => ErrorKind::InputFormat,

            Error::InsufficientEvents { .. }
            | Error::NonPositiveWeight { .. }
            | Error::SingularMatrix { .. }
            | Error::NotPositiveDefinite { .. } => ErrorKind::Kinematic,

            Error::ZeroLengthVector { .. } | Error::CollinearBasis { .. } => ErrorKind::Geometry,
        }
    }
}
