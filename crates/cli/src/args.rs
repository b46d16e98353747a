//! Command line arguments

// standard library
use std::path::PathBuf;

// tastools modules
use tastools_angles::{A3Convention, Lattice, SampleSense, Spectrometer};
use tastools_reso::{Basis, ColumnLayout};

// external crates
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use nalgebra::Vector3;

/// Triple-axis spectrometer angle and resolution calculator
#[derive(Debug, Parser)]
#[command(name = "tascalc", version, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Spectrometer angles for a point in (Q, E)
    Angles(AnglesArgs),
    /// Point in (Q, E) reached by a set of angles
    Hkl(HklArgs),
    /// B matrix of the crystal and its inverse
    Bmatrix(CrystalArgs),
    /// Resolution ellipsoid of a simulated event list
    Reso(ResoArgs),
}

/// Crystal lattice and scattering plane
#[derive(Debug, Args)]
pub struct CrystalArgs {
    /// Lattice constants in A
    #[arg(
        long,
        num_args = 3,
        value_names = ["A", "B", "C"],
        default_values_t = [5.0, 5.0, 5.0],
    )]
    pub lattice: Vec<f64>,

    /// Lattice angles in degrees
    #[arg(
        long,
        num_args = 3,
        value_names = ["ALPHA", "BETA", "GAMMA"],
        default_values_t = [90.0, 90.0, 90.0],
    )]
    pub angles: Vec<f64>,

    /// First orientation reflex, rlu
    #[arg(
        long,
        num_args = 3,
        value_names = ["H", "K", "L"],
        allow_negative_numbers = true,
        default_values_t = [1.0, 0.0, 0.0],
    )]
    pub orient1: Vec<f64>,

    /// Second orientation reflex, rlu
    #[arg(
        long,
        num_args = 3,
        value_names = ["H", "K", "L"],
        allow_negative_numbers = true,
        default_values_t = [0.0, 1.0, 0.0],
    )]
    pub orient2: Vec<f64>,
}

impl CrystalArgs {
    pub fn lattice(&self) -> tastools_angles::Result<Lattice> {
        let [a, b, c] = triple(&self.lattice);
        let [alpha, beta, gamma] = triple(&self.angles);
        Lattice::from_degrees(a, b, c, alpha, beta, gamma)
    }
}

/// Monochromator, analyser and sample stage
#[derive(Debug, Args)]
pub struct InstrumentArgs {
    /// Monochromator d-spacing in A
    #[arg(long, default_value_t = 3.355)]
    pub d_mono: f64,

    /// Analyser d-spacing in A
    #[arg(long, default_value_t = 3.355)]
    pub d_ana: f64,

    /// Zero point of a3: takin, nomad, sics, nicos, or an offset in degrees
    #[arg(long, default_value = "nomad", allow_negative_numbers = true)]
    pub convention: A3Convention,

    /// Scatter clockwise at the sample, i.e. negative a4
    ///
    /// The hkl command takes the sense from the sign of a4 instead.
    #[arg(long)]
    pub clockwise: bool,
}

impl InstrumentArgs {
    /// Spectrometer for the given crystal
    pub fn spectrometer(&self, crystal: &CrystalArgs) -> tastools_angles::Result<Spectrometer> {
        let sense = if self.clockwise {
            SampleSense::Clockwise
        } else {
            SampleSense::CounterClockwise
        };

        Ok(Spectrometer::new(
            &crystal.lattice()?,
            vector(&crystal.orient1),
            vector(&crystal.orient2),
            self.d_mono,
            self.d_ana,
        )?
        .with_convention(self.convention)
        .with_sense(sense))
    }
}

#[derive(Debug, Args)]
pub struct AnglesArgs {
    /// Momentum transfer in rlu
    #[arg(
        long,
        num_args = 3,
        value_names = ["H", "K", "L"],
        allow_negative_numbers = true,
        required = true,
    )]
    pub hkl: Vec<f64>,

    /// Final wavenumber in 1/A
    #[arg(long, default_value_t = 1.4)]
    pub kf: f64,

    /// Energy transfer in meV [default: 0]
    #[arg(long, allow_negative_numbers = true, conflicts_with = "ki")]
    pub energy: Option<f64>,

    /// Incident wavenumber in 1/A, instead of an energy transfer
    #[arg(long)]
    pub ki: Option<f64>,

    #[command(flatten)]
    pub crystal: CrystalArgs,

    #[command(flatten)]
    pub instrument: InstrumentArgs,
}

#[derive(Debug, Args)]
pub struct HklArgs {
    /// Monochromator angle in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub a1: f64,

    /// Sample rotation in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub a3: f64,

    /// Sample scattering angle in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub a4: f64,

    /// Analyser angle in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub a5: f64,

    #[command(flatten)]
    pub crystal: CrystalArgs,

    #[command(flatten)]
    pub instrument: InstrumentArgs,
}

impl HklArgs {
    /// Spectrometer scattering in the sense given by the sign of a4
    pub fn spectrometer(&self) -> tastools_angles::Result<Spectrometer> {
        let sense = if self.instrument.clockwise {
            SampleSense::Clockwise
        } else {
            SampleSense::from_angle(self.a4)
        };
        Ok(self.instrument.spectrometer(&self.crystal)?.with_sense(sense))
    }
}

/// Column layout of an event table
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Layout {
    /// Choose from the column count
    #[default]
    Auto,
    /// ki, kf, position, wi, wf
    Raw,
    /// Q, E, w
    Reduced,
}

impl From<Layout> for Option<ColumnLayout> {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Auto => None,
            Layout::Raw => Some(ColumnLayout::RAW),
            Layout::Reduced => Some(ColumnLayout::REDUCED),
        }
    }
}

#[derive(Debug, Args)]
pub struct ResoArgs {
    /// Path to the event table
    pub file: PathBuf,

    /// Column layout of the event table
    #[arg(long, value_enum, default_value_t)]
    pub layout: Layout,

    /// Q para direction in the lab frame [default: mean Q]
    #[arg(
        long,
        num_args = 3,
        value_names = ["X", "Y", "Z"],
        allow_negative_numbers = true,
        requires = "qperp",
    )]
    pub qpara: Option<Vec<f64>>,

    /// In-plane direction for Q perp in the lab frame
    #[arg(
        long,
        num_args = 3,
        value_names = ["X", "Y", "Z"],
        allow_negative_numbers = true,
        requires = "qpara",
    )]
    pub qperp: Option<Vec<f64>>,

    /// Write the rotated and centred events to a CSV file
    #[arg(long, value_name = "PATH")]
    pub dump: Option<PathBuf>,
}

impl ResoArgs {
    pub fn basis(&self) -> Basis {
        match (&self.qpara, &self.qperp) {
            (Some(para), Some(perp)) => Basis::Explicit {
                para: vector(para),
                perp: vector(perp),
            },
            _ => Basis::AlongMean,
        }
    }
}

/// Three values of a `num_args = 3` option, the last occurrence wins
pub fn triple(values: &[f64]) -> [f64; 3] {
    let n = values.len();
    [values[n - 3], values[n - 2], values[n - 1]]
}

pub fn vector(values: &[f64]) -> Vector3<f64> {
    Vector3::from(triple(values))
}
