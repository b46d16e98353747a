//! Write operations for transformed event tables

// standard library
use std::io::Write;
use std::path::Path;

// crate modules
use crate::error::Result;

// external crates
use log::info;
use nalgebra::Vector4;
use serde::Serialize;

/// One row of the exported table
#[derive(Debug, Serialize)]
struct Row {
    qpara: f64,
    qperp: f64,
    qup: f64,
    energy: f64,
}

impl From<&Vector4<f64>> for Row {
    fn from(x: &Vector4<f64>) -> Self {
        Self {
            qpara: x[0],
            qperp: x[1],
            qup: x[2],
            energy: x[3],
        }
    }
}

/// Write (Q para, Q perp, Q up, E) events to a CSV file
///
/// Events usually come from
/// [Covariance::transform_events](crate::Covariance::transform_events). The
/// file has a `qpara,qperp,qup,energy` header.
///
/// ```rust, no_run
/// # use tastools_reso::{calc_covariance, read_events, write_events, Basis, Centering};
/// let events = read_events("./data/events_raw.dat", None).unwrap();
/// let covariance = calc_covariance(&events, &Basis::AlongMean).unwrap();
///
/// let rotated = covariance.transform_events(&events, Centering::Mean);
/// write_events("./events_rotated.csv", &rotated).unwrap();
/// ```
pub fn write_events<P: AsRef<Path>>(path: P, events: &[Vector4<f64>]) -> Result<()> {
    let path = path.as_ref();
    info!("Writing {} events to {}", events.len(), path.display());
    write_events_to(csv::Writer::from_path(path)?, events)
}

/// Write (Q para, Q perp, Q up, E) events as CSV to any writer
///
/// ```rust
/// # use tastools_reso::write_events_to;
/// # use nalgebra::Vector4;
/// let mut buffer = Vec::new();
/// let events = [Vector4::new(0.5, 0.0, -1.0, 2.0)];
/// write_events_to(csv::Writer::from_writer(&mut buffer), &events).unwrap();
///
/// let text = String::from_utf8(buffer).unwrap();
/// assert_eq!(text, "qpara,qperp,qup,energy\n0.5,0.0,-1.0,2.0\n");
/// ```
pub fn write_events_to<W: Write>(
    mut writer: csv::Writer<W>,
    events: &[Vector4<f64>],
) -> Result<()> {
    for event in events {
        writer.serialize(Row::from(event))?;
    }
    writer.flush()?;
    Ok(())
}
