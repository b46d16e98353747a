//! Resolution ellipsoids from simulated neutron events
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod covariance;
mod ellipse;
mod error;
mod events;
mod reader;
mod writer;

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use events::{Event, RawEvent};

#[doc(inline)]
pub use reader::{parse_events, read_events, ColumnLayout};

#[doc(inline)]
pub use covariance::{calc_covariance, Basis, Centering, Covariance, MIN_EVENTS};

#[doc(inline)]
pub use ellipse::{
    calc_ellipses, describe_ellipse, describe_ellipsoid, Ellipse, Ellipses, Ellipsoid, Projection,
};

#[doc(inline)]
pub use writer::{write_events, write_events_to};
