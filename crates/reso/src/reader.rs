//! Reading neutron event tables
//!
//! Event tables are plain text with one event per line and whitespace
//! separated columns. Everything after a `#` is a comment, and blank lines are
//! skipped.
//!
//! Two layouts are understood:
//!
//! | Layout    | Columns                                   |
//! | --------- | ----------------------------------------- |
//! | Raw       | ki (3), kf (3), position (3), wi, wf      |
//! | Reduced   | Q (3), E, w                               |
//!
//! The column offsets of either layout can be changed through
//! [ColumnLayout], or the layout inferred from the column count.

// standard library
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

// crate modules
use crate::error::{Error, Result};
use crate::events::{Event, RawEvent};

// external crates
use log::{debug, info};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// nom parser combinators
use nom::character::complete::{space0, space1};
use nom::combinator::all_consuming;
use nom::multi::separated_list1;
use nom::number::complete::double;
use nom::sequence::delimited;
use nom::IResult;

/// Column offsets of an event table
///
/// Vector quantities occupy three consecutive columns starting at the given
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnLayout {
    /// Incident and final wavevectors with separate weights
    Raw {
        ki: usize,
        kf: usize,
        position: usize,
        wi: usize,
        wf: usize,
    },
    /// Momentum and energy transfer with a combined weight
    Reduced {
        q: usize,
        energy: usize,
        weight: usize,
    },
}

impl ColumnLayout {
    /// Default layout of simulated event lists, 11 columns
    pub const RAW: Self = Self::Raw {
        ki: 0,
        kf: 3,
        position: 6,
        wi: 9,
        wf: 10,
    };

    /// Default layout of pre-reduced event lists, 5 columns
    pub const REDUCED: Self = Self::Reduced {
        q: 0,
        energy: 3,
        weight: 4,
    };

    /// Choose the default layout matching a column count
    ///
    /// ```rust
    /// # use tastools_reso::ColumnLayout;
    /// assert_eq!(ColumnLayout::infer(11).unwrap(), ColumnLayout::RAW);
    /// assert_eq!(ColumnLayout::infer(5).unwrap(), ColumnLayout::REDUCED);
    /// assert!(ColumnLayout::infer(7).is_err());
    /// ```
    pub fn infer(columns: usize) -> Result<Self> {
        match columns {
            11 => Ok(Self::RAW),
            5 => Ok(Self::REDUCED),
            _ => Err(Error::UnknownLayout { columns }),
        }
    }

    /// Minimum number of columns a row needs for this layout
    pub fn required_columns(&self) -> usize {
        self.offsets()
            .iter()
            .map(|(_, index, width)| index + width)
            .max()
            .unwrap_or(0)
    }

    /// Convert a row of numbers into an event
    ///
    /// The row must have at least [ColumnLayout::required_columns] entries.
    pub fn event(&self, row: &[f64]) -> Event {
        match *self {
            Self::Raw {
                ki,
                kf,
                position,
                wi,
                wf,
            } => simulated_event(row, [ki, kf, position, wi, wf]).into(),
            Self::Reduced { q, energy, weight } => {
                Event::new(vector(row, q), row[energy], row[weight])
            }
        }
    }

    /// Convert a row of numbers into a simulated event, `None` for the
    /// reduced layout
    ///
    /// ```rust
    /// # use tastools_reso::ColumnLayout;
    /// let row = [1.5, 0.0, 0.0, 0.0, 0.0, 1.5, 0.1, 0.2, 0.3, 0.5, 0.5];
    /// let raw = ColumnLayout::RAW.raw_event(&row).unwrap();
    /// assert_eq!(raw.position.z, 0.3);
    /// assert!(ColumnLayout::REDUCED.raw_event(&row).is_none());
    /// ```
    pub fn raw_event(&self, row: &[f64]) -> Option<RawEvent> {
        match *self {
            Self::Raw {
                ki,
                kf,
                position,
                wi,
                wf,
            } => Some(simulated_event(row, [ki, kf, position, wi, wf])),
            Self::Reduced { .. } => None,
        }
    }

    /// Name, first index and width of every field
    fn offsets(&self) -> Vec<(&'static str, usize, usize)> {
        match *self {
            Self::Raw {
                ki,
                kf,
                position,
                wi,
                wf,
            } => vec![
                ("ki", ki, 3),
                ("kf", kf, 3),
                ("position", position, 3),
                ("wi", wi, 1),
                ("wf", wf, 1),
            ],
            Self::Reduced { q, energy, weight } => {
                vec![("Q", q, 3), ("E", energy, 1), ("w", weight, 1)]
            }
        }
    }

    /// Check every field lies inside a table of `columns` columns
    fn check(&self, columns: usize) -> Result<()> {
        for (name, index, width) in self.offsets() {
            if index + width > columns {
                return Err(Error::ColumnOutOfRange {
                    name,
                    index,
                    columns,
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for ColumnLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw {
                ki,
                kf,
                position,
                wi,
                wf,
            } => write!(f, "raw (ki@{ki}, kf@{kf}, r@{position}, wi@{wi}, wf@{wf})"),
            Self::Reduced { q, energy, weight } => {
                write!(f, "reduced (Q@{q}, E@{energy}, w@{weight})")
            }
        }
    }
}

/// Read an event table from a file
///
/// With `layout` set to `None` the layout is inferred from the column count
/// of the first row.
///
/// ```rust
/// # use tastools_reso::{read_events, ColumnLayout};
/// let events = read_events("./data/events_raw.dat", None).unwrap();
/// assert_eq!(events.len(), 240);
///
/// let events = read_events("./data/events_reduced.dat", Some(ColumnLayout::REDUCED)).unwrap();
/// assert_eq!(events.len(), 240);
/// ```
pub fn read_events<P: AsRef<Path>>(path: P, layout: Option<ColumnLayout>) -> Result<Vec<Event>> {
    let path = path.as_ref();
    info!("Reading events from {}", path.display());

    let reader = BufReader::new(File::open(path)?);
    let mut rows = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        if let Some(row) = parse_line(&line?, n + 1)? {
            rows.push(row);
        }
    }

    events_from_rows(rows, layout)
}

/// Parse an event table held in memory
///
/// ```rust
/// # use tastools_reso::parse_events;
/// let text = "
/// ## Qx  Qy  Qz  E  w
/// 1.0 0.0 0.0 0.5 1.0
/// 1.1 0.0 0.0 0.4 0.5  # comment
/// ";
/// let events = parse_events(text, None).unwrap();
/// assert_eq!(events.len(), 2);
/// assert_eq!(events[1].energy, 0.4);
/// ```
pub fn parse_events(text: &str, layout: Option<ColumnLayout>) -> Result<Vec<Event>> {
    let mut rows = Vec::new();
    for (n, line) in text.lines().enumerate() {
        if let Some(row) = parse_line(line, n + 1)? {
            rows.push(row);
        }
    }
    events_from_rows(rows, layout)
}

/// Raw event from the ki, kf, position, wi and wf offsets
fn simulated_event(row: &[f64], [ki, kf, position, wi, wf]: [usize; 5]) -> RawEvent {
    RawEvent {
        ki: vector(row, ki),
        kf: vector(row, kf),
        position: vector(row, position),
        wi: row[wi],
        wf: row[wf],
    }
}

/// Three consecutive columns starting at `i`
fn vector(row: &[f64], i: usize) -> Vector3<f64> {
    Vector3::new(row[i], row[i + 1], row[i + 2])
}

/// Check the column counts and convert rows with the chosen layout
fn events_from_rows(
    rows: Vec<(usize, Vec<f64>)>,
    layout: Option<ColumnLayout>,
) -> Result<Vec<Event>> {
    let Some((_, first)) = rows.first() else {
        return Ok(Vec::new());
    };

    let columns = first.len();
    let layout = match layout {
        Some(layout) => layout,
        None => ColumnLayout::infer(columns)?,
    };
    layout.check(columns)?;
    debug!("Event layout: {layout}");

    rows.iter()
        .map(|(line, row)| {
            if row.len() != columns {
                Err(Error::ColumnCount {
                    line: *line,
                    expected: columns,
                    found: row.len(),
                })
            } else {
                Ok(layout.event(row))
            }
        })
        .collect()
}

/// Numbers on a line, or `None` for blank and comment lines
fn parse_line(line: &str, n: usize) -> Result<Option<(usize, Vec<f64>)>> {
    let content = line.split('#').next().unwrap_or_default().trim();
    if content.is_empty() {
        return Ok(None);
    }

    let (_, row) = number_row(content).map_err(|e| Error::ParseError {
        line: n,
        reason: e.to_string(),
    })?;

    if let Some(value) = row.iter().find(|v| !v.is_finite()) {
        return Err(Error::ParseError {
            line: n,
            reason: format!("non-finite value {value}"),
        });
    }

    Ok(Some((n, row)))
}

/// Whitespace separated list of floats, nothing else
fn number_row(i: &str) -> IResult<&str, Vec<f64>> {
    all_consuming(delimited(space0, separated_list1(space1, double), space0))(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_parser() {
        assert_eq!(
            number_row("1.0\t-2e-3  3").unwrap().1,
            vec![1.0, -2e-3, 3.0]
        );
        assert!(number_row("1.0 abc").is_err());
        assert!(number_row("1.0,2.0").is_err());
    }

    #[test]
    fn comments_and_blanks() {
        assert_eq!(parse_line("   ", 1).unwrap(), None);
        assert_eq!(parse_line("# header", 2).unwrap(), None);
        assert_eq!(
            parse_line("1 2 # trailing", 3).unwrap(),
            Some((3, vec![1.0, 2.0]))
        );
    }

    #[test]
    fn bad_number_names_line() {
        let text = "1 0 0 0.5 1\n1 0 0 x 1\n";
        match parse_events(text, None) {
            Err(Error::ParseError { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn inconsistent_columns() {
        let text = "1 0 0 0.5 1\n\n1 0 0 0.5\n";
        match parse_events(text, None) {
            Err(Error::ColumnCount {
                line,
                expected,
                found,
            }) => assert_eq!((line, expected, found), (3, 5, 4)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn custom_layout() {
        // weight first, then E and Q
        let layout = ColumnLayout::Reduced {
            q: 2,
            energy: 1,
            weight: 0,
        };
        assert_eq!(layout.required_columns(), 5);

        let events = parse_events("0.5 1.5 1 2 3", Some(layout)).unwrap();
        assert_eq!(events[0], Event::new(Vector3::new(1.0, 2.0, 3.0), 1.5, 0.5));
    }

    #[test]
    fn layout_outside_table() {
        let result = parse_events("1 2 3 4 5", Some(ColumnLayout::RAW));
        assert!(matches!(
            result,
            Err(Error::ColumnOutOfRange { name: "kf", .. })
        ));
    }

    #[test]
    fn non_finite() {
        assert!(matches!(
            parse_events("1 0 0 nan 1", None),
            Err(Error::ParseError { line: 1, .. })
        ));
    }

    #[test]
    fn header_comment() {
        let text = "# Qx  Qy  Qz  E  w\n1.0 0.0 0.0 0.5 1.0\n  # indented note\n";
        let events = parse_events(text, None).unwrap();
        assert_eq!(events, vec![Event::new(Vector3::x(), 0.5, 1.0)]);
    }

    #[test]
    fn position_columns() {
        let layout = ColumnLayout::RAW;
        assert_eq!(layout.required_columns(), 11);

        let row = [1.5, 0.0, 0.0, 0.0, 0.0, 1.5, -0.1, 0.2, 0.3, 0.5, 0.4];
        let raw = layout.raw_event(&row).unwrap();
        assert_eq!(raw.position, Vector3::new(-0.1, 0.2, 0.3));
        assert_eq!(layout.event(&row), raw.reduce());

        // position shifted past the end of a 9 column table
        let layout = ColumnLayout::Raw {
            ki: 0,
            kf: 3,
            position: 7,
            wi: 6,
            wf: 7,
        };
        assert!(matches!(
            layout.check(9),
            Err(Error::ColumnOutOfRange {
                name: "position",
                ..
            })
        ));
    }

    #[test]
    fn empty_table() {
        assert!(parse_events("# nothing\n\n", None).unwrap().is_empty());
    }
}
