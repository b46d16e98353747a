//! Calculations behind each subcommand
//!
//! Engine failures never stop the program. Whatever could not be computed is
//! shown as `invalid` and the reason logged at debug level.

// standard library
use std::error::Error;
use std::fmt::Display;

// crate modules
use crate::args::{vector, AnglesArgs, CrystalArgs, HklArgs, ResoArgs};

// tastools modules
use tastools_angles::{
    energy_transfer, incident_k, orientation_matrix, Angles, OrientationFrame, Position,
};
use tastools_reso::{
    calc_covariance, calc_ellipses, read_events, write_events, Centering, Covariance, Ellipses,
    Projection,
};
use tastools_utils::ValueExt;

// external crates
use log::{debug, info};
use nalgebra::{Matrix3, Matrix4};
use serde::Serialize;

type CliResult = Result<(), Box<dyn Error>>;

/// Keep the value, or log why there is none
fn valid<T, E: Display>(group: &str, result: Result<T, E>) -> Option<T> {
    result.map_err(|e| debug!("{group}: {e}")).ok()
}

fn show(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "invalid".to_string(), |v| format!("{v:.4} {unit}"))
}

fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_lines(lines: Vec<String>) {
    lines.iter().for_each(|line| println!("{line}"));
}

#[derive(Debug, Default, Serialize)]
struct AnglesReport {
    hkl: [f64; 3],
    ki: Option<f64>,
    kf: f64,
    energy: Option<f64>,
    q: Option<f64>,
    out_of_plane: Option<f64>,
    /// a1, a2 in degrees
    monochromator: Option<[f64; 2]>,
    /// a3, a4 in degrees
    sample: Option<[f64; 2]>,
    /// a5, a6 in degrees
    analyser: Option<[f64; 2]>,
}

impl AnglesReport {
    fn lines(&self) -> Vec<String> {
        let pair = |angles: Option<[f64; 2]>| {
            angles.map_or([None, None], |[a, b]| [Some(a), Some(b)])
        };
        let [a1, a2] = pair(self.monochromator);
        let [a3, a4] = pair(self.sample);
        let [a5, a6] = pair(self.analyser);

        let mut lines = vec![
            format!(
                "ki = {}, kf = {:.4} 1/A, E = {}",
                show(self.ki, "1/A"),
                self.kf,
                show(self.energy, "meV")
            ),
            format!(
                "|Q| = {}, out of plane = {}",
                show(self.q, "1/A"),
                show(self.out_of_plane, "1/A")
            ),
        ];
        let angles = [("a1", a1), ("a2", a2), ("a3", a3), ("a4", a4), ("a5", a5), ("a6", a6)];
        lines.extend(angles.map(|(name, value)| format!("{name} = {}", show(value, "deg"))));
        lines
    }
}

/// Every group of angles that can be reached, each failure on its own
fn angles_report(args: &AnglesArgs) -> AnglesReport {
    let hkl = vector(&args.hkl);
    let mut report = AnglesReport {
        hkl: hkl.into(),
        kf: args.kf,
        ..Default::default()
    };

    let ki = match args.ki {
        Some(ki) => Ok(ki),
        None => incident_k(args.kf, args.energy.unwrap_or(0.0)),
    };
    report.ki = valid("ki", ki.clone());
    report.energy = report.ki.map(|ki| energy_transfer(ki, args.kf));

    let Some(tas) = valid("spectrometer", args.instrument.spectrometer(&args.crystal)) else {
        return report;
    };
    let degrees = |(a, b): (f64, f64)| [a.to_degrees(), b.to_degrees()];
    report.q = Some((tas.b_matrix() * hkl).norm());
    report.analyser = valid("analyser", tas.analyser_angles(args.kf)).map(degrees);

    if let Ok(ki) = ki {
        report.monochromator = valid("monochromator", tas.monochromator_angles(ki)).map(degrees);
        if let Some(sample) = valid("sample", tas.sample_angles(&hkl, ki, args.kf)) {
            report.sample = Some(degrees((sample.a3, sample.a4)));
            report.out_of_plane = Some(sample.out_of_plane);
        }
    }
    report
}

pub fn angles(args: &AnglesArgs, json: bool) -> CliResult {
    let report = angles_report(args);
    if json {
        return print_json(&report);
    }
    print_lines(report.lines());
    Ok(())
}

fn position(args: &HklArgs) -> Option<Position> {
    let angles = Angles::from_degrees(args.a1, args.a3, args.a4, args.a5);
    valid("position", args.spectrometer().and_then(|tas| tas.position(&angles)))
}

fn position_lines(position: Option<&Position>) -> Vec<String> {
    let Some(p) = position else {
        return vec!["hkl = invalid".to_string()];
    };
    vec![
        format!("hkl = ({:.4}, {:.4}, {:.4})", p.hkl.x, p.hkl.y, p.hkl.z),
        format!("ki = {:.4} 1/A, kf = {:.4} 1/A, E = {:.4} meV", p.ki, p.kf, p.energy),
        format!("|Q| = {:.4} 1/A", p.q),
    ]
}

pub fn hkl(args: &HklArgs, json: bool) -> CliResult {
    let position = position(args);
    if json {
        return print_json(&position);
    }
    print_lines(position_lines(position.as_ref()));
    Ok(())
}

#[derive(Debug, Serialize)]
struct MatrixReport {
    b: Matrix3<f64>,
    b_inverse: Matrix3<f64>,
    ub: Matrix3<f64>,
}

pub fn bmatrix(args: &CrystalArgs, json: bool) -> CliResult {
    let b = valid("B matrix", args.lattice().and_then(|l| l.b_matrix()));
    let b_inverse = b.and_then(|b| b.try_inverse());
    let ub = b.and_then(|b| {
        let frame = OrientationFrame::new(vector(&args.orient1), vector(&args.orient2), &b);
        valid("UB matrix", frame.and_then(|f| orientation_matrix(&b, &f)))
    });

    if json {
        let report = match (b, b_inverse, ub) {
            (Some(b), Some(b_inverse), Some(ub)) => Some(MatrixReport { b, b_inverse, ub }),
            _ => None,
        };
        return print_json(&report);
    }

    for (name, m) in [("B", b), ("B^-1", b_inverse), ("UB", ub)] {
        match m {
            Some(m) => {
                let rows = m.row_iter().map(|r| r.iter().copied().collect());
                print_lines(matrix_lines(name, rows));
            }
            None => println!("{name} = invalid"),
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ResoReport<'a> {
    covariance: &'a Covariance,
    ellipses: Option<&'a Ellipses>,
}

fn reso_lines(covariance: Option<&Covariance>, ellipses: Option<&Ellipses>) -> Vec<String> {
    let Some(covariance) = covariance else {
        return vec!["resolution = invalid".to_string()];
    };

    let m = covariance.mean;
    let mut lines = vec![
        format!(
            "events = {}, total weight = {}",
            covariance.events,
            covariance.total_weight.general(6)
        ),
        format!(
            "mean Q = ({:.4}, {:.4}, {:.4}) 1/A, E = {:.4} meV",
            m[0], m[1], m[2], m[3]
        ),
    ];
    lines.extend(matrix_lines(
        "resolution (Q para, Q perp, Q up, E)",
        rows(&covariance.resolution),
    ));

    let Some(ellipses) = ellipses else {
        lines.push("ellipses = invalid".to_string());
        return lines;
    };

    let widths = |v: &[f64]| v.iter().map(|w| format!("{w:.4}")).collect::<Vec<_>>().join(", ");
    lines.push(format!("ellipsoid FWHMs = {}", widths(ellipses.ellipsoid.fwhms.as_slice())));
    lines.push(format!("diagonal FWHMs = {}", widths(ellipses.diagonal_fwhms.as_slice())));
    for projection in Projection::ALL {
        let [x, y] = projection.labels();
        let e = ellipses.projection(projection);
        lines.push(format!(
            "{x} vs {y}: FWHMs = {}, angle = {:.2} deg",
            widths(&e.fwhms),
            e.angle.to_degrees()
        ));
    }
    lines
}

pub fn reso(args: &ResoArgs, json: bool) -> CliResult {
    // unreadable tables are user errors, not invalid results
    let events = read_events(&args.file, args.layout.into())?;
    info!("{} events in {}", events.len(), args.file.display());

    let covariance = valid("covariance", calc_covariance(&events, &args.basis()));
    let ellipses = covariance
        .as_ref()
        .and_then(|c| valid("ellipses", calc_ellipses(&c.resolution)));

    if let (Some(path), Some(covariance)) = (&args.dump, &covariance) {
        write_events(path, &covariance.transform_events(&events, Centering::Mean))?;
    }

    match (json, &covariance) {
        (true, Some(covariance)) => print_json(&ResoReport {
            covariance,
            ellipses: ellipses.as_ref(),
        }),
        (true, None) => print_json(&covariance),
        (false, _) => {
            print_lines(reso_lines(covariance.as_ref(), ellipses.as_ref()));
            Ok(())
        }
    }
}

fn rows(m: &Matrix4<f64>) -> impl Iterator<Item = Vec<f64>> + '_ {
    m.row_iter().map(|r| r.iter().copied().collect())
}

fn matrix_lines(name: &str, rows: impl Iterator<Item = Vec<f64>>) -> Vec<String> {
    let mut lines = vec![format!("{name} =")];
    for row in rows {
        let row: Vec<String> = row.iter().map(|v| v.sci(6, 2)).collect();
        lines.push(format!("  {}", row.join("  ")));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{Cli, Command};

    use clap::Parser;
    use nalgebra::Vector3;
    use tastools_reso::{Basis, Event};

    fn angles_args(extra: &[&str]) -> AnglesArgs {
        let cli = Cli::try_parse_from(["tascalc", "angles"].iter().chain(extra).copied()).unwrap();
        let Command::Angles(args) = cli.command else {
            panic!("expected the angles command");
        };
        args
    }

    fn line<'a>(lines: &'a [String], name: &str) -> &'a str {
        lines
            .iter()
            .find(|l| l.starts_with(name))
            .map(String::as_str)
            .unwrap_or_default()
    }

    #[test]
    fn invalid_values() {
        assert_eq!(show(None, "deg"), "invalid");
        assert_eq!(show(Some(1.0 / 3.0), "deg"), "0.3333 deg");

        let failed: Result<f64, String> = Err("out of reach".to_string());
        assert_eq!(valid("test", failed), None);
    }

    #[test]
    fn unreachable_q_keeps_crystal_angles() {
        // |Q| = 3.77 1/A is more than ki + kf
        let report = angles_report(&angles_args(&["--hkl", "3", "0", "0"]));
        assert_eq!(report.sample, None);
        assert!(report.monochromator.is_some());
        assert!(report.analyser.is_some());

        let lines = report.lines();
        assert_eq!(line(&lines, "a1"), "a1 = 41.9784 deg");
        assert_eq!(line(&lines, "a5"), "a5 = 41.9784 deg");
        assert_eq!(line(&lines, "a3"), "a3 = invalid");
        assert_eq!(line(&lines, "a4"), "a4 = invalid");
        assert!(line(&lines, "|Q|").ends_with("out of plane = invalid"));
    }

    #[test]
    fn unreachable_monochromator() {
        // no Bragg reflection off d = 3.355 A below k = 0.936 1/A
        let report = angles_report(&angles_args(&["--hkl", "1", "0", "0", "--ki", "0.5"]));
        let lines = report.lines();
        assert_eq!(line(&lines, "a1"), "a1 = invalid");
        assert_eq!(line(&lines, "a2"), "a2 = invalid");
        assert!(line(&lines, "a3").ends_with("deg"));
        assert!(line(&lines, "a6").ends_with("deg"));
        assert!(line(&lines, "ki").starts_with("ki = 0.5000 1/A"));
    }

    #[test]
    fn invalid_position() {
        assert_eq!(position_lines(None), vec!["hkl = invalid"]);

        let cli = Cli::try_parse_from([
            "tascalc", "hkl", "--a1", "0", "--a3", "0", "--a4", "60", "--a5", "40",
        ])
        .unwrap();
        let Command::Hkl(args) = cli.command else {
            panic!("expected the hkl command");
        };
        assert_eq!(position(&args), None);
    }

    #[test]
    fn invalid_resolution() {
        assert_eq!(reso_lines(None, None), vec!["resolution = invalid"]);

        let mut events = Vec::new();
        for axis in 0..4 {
            for sign in [-0.1, 0.1] {
                let mut x = [1.5, 0.0, 0.0, 1.0];
                x[axis] += sign;
                events.push(Event::new(Vector3::new(x[0], x[1], x[2]), x[3], 1.0));
            }
        }
        let covariance = calc_covariance(&events, &Basis::AlongMean).unwrap();

        let lines = reso_lines(Some(&covariance), None);
        assert_eq!(lines.first().map(String::as_str), Some("events = 8, total weight = 8"));
        assert_eq!(lines.last().map(String::as_str), Some("ellipses = invalid"));

        let ellipses = calc_ellipses(&covariance.resolution).unwrap();
        let lines = reso_lines(Some(&covariance), Some(&ellipses));
        assert!(!line(&lines, "Q up (1/A) vs E (meV): FWHMs = ").is_empty());
    }

    #[test]
    fn vector_rows() {
        let m = Matrix4::from_fn(|i, j| (4 * i + j) as f64);
        let first: Vec<Vec<f64>> = rows(&m).take(1).collect();
        assert_eq!(first, vec![vec![0.0, 1.0, 2.0, 3.0]]);
    }
}
