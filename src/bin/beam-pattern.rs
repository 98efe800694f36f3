// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Generate an antenna layout and a set of sky directions, then write the
//! array factor at each requested frequency to a text file.
//!
//! Run with something like:
//! `beam-pattern --layout circular --sky hemisphere --boresight-el-deg 90`

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use clap::{ArgEnum, Parser};
use log::{debug, info};
use thiserror::Error;

use array_beam::{
    output::{read_layout, sweep_file_name, write_beam_image, write_layout},
    ArrayLayout, BeamError, CircularLayout, LogObserver, PositionGenerator, Precision, Projection,
    RegularGrid, SectorOptions, SkyDirection, SkyPositions,
};

/// Sky directions (azimuth, elevation) \[radians\] of the scattered scenario.
/// The first four are spread over the sky; the rest step down from the
/// zenith.
const SCATTERED_DIRECTIONS: [(f64, f64); 13] = [
    (-2.8304, 1.0),
    (-0.0655, 0.75),
    (-1.9320, 1.3),
    (-2.3682, 0.8),
    (0.0, 1.5708),
    (0.0, 1.5621),
    (0.0, 1.5533),
    (0.0, 1.5446),
    (0.0, 1.5359),
    (0.0, 1.5272),
    (0.0, 1.5184),
    (0.0, 1.5097),
    (0.0, 1.5010),
];

#[derive(ArgEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum LayoutKind {
    /// A square grid centred on the origin.
    Regular,

    /// A lattice inside a circle, with random placement errors.
    Circular,

    /// Antenna positions read from a file given with --antenna-file.
    Fixed,
}

#[derive(ArgEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum SkyKind {
    /// A rectangular sector about a centre.
    Sector,

    /// Everything between the horizon and the zenith.
    Hemisphere,

    /// A small fixed list of directions.
    Scattered,
}

#[derive(Parser, Debug)]
#[clap(author, version, about)]
#[clap(allow_negative_numbers = true)]
#[clap(infer_long_args = true)]
struct Args {
    /// The kind of antenna layout.
    #[clap(long, arg_enum, default_value = "regular")]
    layout: LayoutKind,

    /// The number of antennas along each side of a regular grid.
    #[clap(long, default_value = "100")]
    per_side: usize,

    /// The distance between neighbouring antennas of a regular grid
    /// [metres].
    #[clap(long, default_value = "0.15")]
    separation_m: f64,

    /// The random-number seed of a circular layout.
    #[clap(long, default_value = "10")]
    seed: u64,

    /// The radius of a circular layout [metres].
    #[clap(long, default_value = "15")]
    radius_m: f64,

    /// The nominal east-west and north-south antenna separations of a
    /// circular layout [metres].
    #[clap(long, number_of_values = 2, default_values = &["1.4", "1.4"])]
    lattice_sep_m: Vec<f64>,

    /// The largest east-west and north-south placement errors of a circular
    /// layout [metres].
    #[clap(long, number_of_values = 2, default_values = &["0.3", "0.3"])]
    placement_err_m: Vec<f64>,

    /// The closest two antennas of a circular layout may be [metres]. The
    /// default is half the smaller lattice separation.
    #[clap(long)]
    min_separation_m: Option<f64>,

    /// A file of antenna positions for the fixed layout, one "x y" pair
    /// [metres] per line.
    #[clap(long, parse(from_os_str))]
    antenna_file: Option<PathBuf>,

    /// Rotate the layout about the vertical axis by this angle [degrees].
    #[clap(long, default_value = "0")]
    rotation_deg: f64,

    /// The kind of sky directions.
    #[clap(long, arg_enum, default_value = "sector")]
    sky: SkyKind,

    /// The centre of a sector (azimuth, elevation) [degrees]. The default is
    /// the boresight.
    #[clap(long, number_of_values = 2)]
    centre_deg: Option<Vec<f64>>,

    /// The half-widths of a sector in azimuth and elevation [degrees].
    #[clap(long, number_of_values = 2, default_values = &["30", "30"])]
    half_width_deg: Vec<f64>,

    /// The spacing between sky directions in azimuth and elevation
    /// [degrees].
    #[clap(long, number_of_values = 2, default_values = &["0.2", "0.2"])]
    spacing_deg: Vec<f64>,

    /// How sector offsets map onto the sky: none, sin, tan or sfl.
    #[clap(long, default_value = "none")]
    projection: Projection,

    /// Only keep sector directions between the horizon and the zenith.
    #[clap(long)]
    above_horizon: bool,

    /// Put the zenith before all other sky directions.
    #[clap(long)]
    prepend_zenith: bool,

    /// The direction the array is pointed at (azimuth, elevation) [degrees].
    #[clap(long, number_of_values = 2, default_values = &["0", "50"])]
    boresight_deg: Vec<f64>,

    /// The frequencies to evaluate the beam at [MHz].
    #[clap(
        short,
        long,
        multiple_values(true),
        default_values = &["70", "115", "150", "200", "240", "300", "450"]
    )]
    freqs_mhz: Vec<f64>,

    /// The float precision of beam calculations: single or double.
    #[clap(short, long, default_value = "double")]
    precision: Precision,

    /// The directory to write files into.
    #[clap(short, long, parse(from_os_str), default_value = ".")]
    output_dir: PathBuf,

    /// Beam files are named "<PREFIX>_<MHz>.dat".
    #[clap(long, default_value = "beamPattern")]
    prefix: String,

    /// Also write the antenna layout to this file (inside the output
    /// directory).
    #[clap(long)]
    layout_file: Option<String>,

    /// The number of threads to use. The default is one per core.
    #[clap(long)]
    threads: Option<usize>,

    /// The verbosity of the program. The default is to print high-level
    /// information.
    #[clap(short, long, parse(from_occurrences))]
    verbosity: u8,
}

#[derive(Error, Debug)]
enum BeamPatternError {
    #[error(transparent)]
    Beam(#[from] BeamError),

    #[error("Couldn't write '{path}': {err}")]
    Write {
        path: PathBuf,
        err: std::io::Error,
    },

    #[error("Couldn't read '{path}': {err}")]
    Read {
        path: PathBuf,
        err: std::io::Error,
    },

    #[error("The fixed layout needs an --antenna-file")]
    NoAntennaFile,

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Logger(#[from] log::SetLoggerError),
}

fn setup_logging(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        _ => builder.filter_level(log::LevelFilter::Trace),
    };
    builder.try_init()
}

fn main() {
    // Stolen from BurntSushi. We don't return Result from main because it
    // prints the debug representation of the error. The code below prints
    // the "display" or human readable representation of the error.
    if let Err(e) = try_main() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), BeamPatternError> {
    let args = Args::parse();
    setup_logging(args.verbosity)?;
    if let Some(num_threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()?;
    }
    info!("Using {} threads", rayon::current_num_threads());

    let layout = make_layout(&args)?;
    info!("Number of antennas: {}", layout.len());
    if let Some(name) = &args.layout_file {
        let path = args.output_dir.join(name);
        write_with(&path, |w| write_layout(w, layout.positions()))?;
        info!("Wrote antenna positions to {}", path.display());
    }

    let boresight = SkyDirection::from_degrees(args.boresight_deg[0], args.boresight_deg[1]);
    let directions = make_directions(&args, boresight)?;
    info!("Number of sky directions: {}", directions.len());

    let freqs_hz: Vec<f64> = args.freqs_mhz.iter().map(|f| f * 1e6).collect();
    let images = array_beam::sweep_frequencies(
        layout.positions(),
        &directions,
        boresight,
        &freqs_hz,
        args.precision,
        &mut LogObserver,
    )?;

    for image in images {
        let name = sweep_file_name(&args.prefix, image.freq_hz);
        let path = args.output_dir.join(name);
        write_with(&path, |w| write_beam_image(w, &directions, &image.beam))?;
        debug!("Wrote {}", path.display());
    }

    Ok(())
}

fn make_layout(args: &Args) -> Result<ArrayLayout, BeamPatternError> {
    let layout = match args.layout {
        LayoutKind::Fixed => {
            let path = args
                .antenna_file
                .as_deref()
                .ok_or(BeamPatternError::NoAntennaFile)?;
            let positions = File::open(path)
                .and_then(|file| read_layout(BufReader::new(file)))
                .map_err(|err| BeamPatternError::Read {
                    path: path.to_path_buf(),
                    err,
                })?;
            ArrayLayout::from_positions(positions)?
        }
        LayoutKind::Regular => {
            ArrayLayout::from_generator(&RegularGrid::new(args.per_side, args.separation_m))?
        }
        LayoutKind::Circular => {
            let mut circular = CircularLayout::new(
                args.seed,
                args.radius_m,
                args.lattice_sep_m[0],
                args.lattice_sep_m[1],
                args.placement_err_m[0],
                args.placement_err_m[1],
            );
            if let Some(min) = args.min_separation_m {
                circular = circular.with_min_separation(min);
            }
            ArrayLayout::from_generator(&circular)?
        }
    };
    if args.rotation_deg == 0.0 {
        Ok(layout)
    } else {
        Ok(layout.rotated_horizontally(args.rotation_deg.to_radians())?)
    }
}

fn make_directions(
    args: &Args,
    boresight: SkyDirection<f64>,
) -> Result<Vec<SkyDirection<f64>>, BeamError> {
    let mut directions = vec![];
    if args.prepend_zenith {
        directions.push(SkyDirection::zenith());
    }

    let spacings = (
        args.spacing_deg[0].to_radians(),
        args.spacing_deg[1].to_radians(),
    );
    let sky = match args.sky {
        SkyKind::Scattered => {
            directions.extend(
                SCATTERED_DIRECTIONS
                    .iter()
                    .map(|&(az, el)| SkyDirection::new(az, el)),
            );
            return Ok(directions);
        }
        SkyKind::Hemisphere => SkyPositions::hemisphere(spacings),
        SkyKind::Sector => {
            let centre = match &args.centre_deg {
                Some(c) => SkyDirection::from_degrees(c[0], c[1]),
                None => boresight,
            };
            SkyPositions::new(
                centre,
                (
                    args.half_width_deg[0].to_radians(),
                    args.half_width_deg[1].to_radians(),
                ),
                spacings,
            )
            .with_options(SectorOptions {
                above_horizon: args.above_horizon,
                mirror: None,
                projection: args.projection,
            })
        }
    };
    let sky = if args.sky == SkyKind::Hemisphere && args.projection != Projection::None {
        sky.with_options(SectorOptions {
            projection: args.projection,
            ..sky.options
        })
    } else {
        sky
    };

    // Count first, then fill the space after anything already in the list.
    let offset = directions.len();
    directions.resize(offset + sky.count()?, SkyDirection::default());
    let n = sky.generate(&mut directions[offset..])?;
    directions.truncate(offset + n);
    Ok(directions)
}

/// Create `path` and hand a buffered writer of it to `f`.
fn write_with<F>(path: &Path, f: F) -> Result<(), BeamPatternError>
where
    F: FnOnce(BufWriter<File>) -> std::io::Result<()>,
{
    File::create(path)
        .and_then(|file| f(BufWriter::new(file)))
        .map_err(|err| BeamPatternError::Write {
            path: path.to_path_buf(),
            err,
        })
}
