// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fixed-width text output for beam patterns and antenna layouts.
//!
//! Beam files have one line per sky sample: longitude and latitude
//! \[degrees\] in `%12.3f` columns followed by the real and imaginary parts of
//! the array factor in `%16.4e` columns. Layout files have one `%12.3f%12.3f`
//! line per antenna. Layout files can be read back with [`read_layout`].

use std::io::{self, BufRead, Write};

use crate::{array_factor::EvaluatedBeam, Position2D, SkyDirection};

/// The name of the beam file for a single frequency of a sweep, e.g.
/// `beamPattern_150.dat` for a prefix `beamPattern` and 150 MHz.
pub fn sweep_file_name(prefix: &str, freq_hz: f64) -> String {
    format!("{prefix}_{:.0}.dat", freq_hz / 1e6)
}

/// Write one line per sky sample. `directions` and `beam` must have the same
/// number of samples.
pub fn write_beam_image<W: Write>(
    mut writer: W,
    directions: &[SkyDirection<f64>],
    beam: &EvaluatedBeam,
) -> io::Result<()> {
    if directions.len() != beam.num_samples() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Got {} sky directions but {} beam samples",
                directions.len(),
                beam.num_samples()
            ),
        ));
    }

    for (i, direction) in directions.iter().enumerate() {
        let (lon, lat) = direction.to_degrees();
        // The lengths were checked above.
        let af = beam.get(i).unwrap_or_default();
        writeln!(
            writer,
            "{lon:12.3}{lat:12.3}{:>16}{:>16}",
            c_exp(af.re, 4),
            c_exp(af.im, 4)
        )?;
    }
    writer.flush()
}

/// Write one line per antenna.
pub fn write_layout<W: Write>(mut writer: W, positions: &[Position2D<f64>]) -> io::Result<()> {
    for p in positions {
        writeln!(writer, "{:12.3}{:12.3}", p.x, p.y)?;
    }
    writer.flush()
}

/// Read antenna positions, one whitespace-separated `x y` pair \[metres\] per
/// line. Blank lines and lines starting with `#` are skipped.
pub fn read_layout<R: BufRead>(reader: R) -> io::Result<Vec<Position2D<f64>>> {
    let mut positions = vec![];
    for (i_line, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let bad_line = || {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Line {} isn't an 'x y' pair: '{line}'", i_line + 1),
            )
        };
        let mut fields = line.split_whitespace();
        let (x, y) = match (fields.next(), fields.next(), fields.next()) {
            (Some(x), Some(y), None) => (x, y),
            _ => return Err(bad_line()),
        };
        let x: f64 = x.parse().map_err(|_| bad_line())?;
        let y: f64 = y.parse().map_err(|_| bad_line())?;
        positions.push(Position2D::new(x, y));
    }
    Ok(positions)
}

/// Format a number in scientific notation with `precision` decimal places
/// and an exponent of at least two digits with an explicit sign, e.g.
/// `1.2345e+00`.
fn c_exp(v: f64, precision: usize) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let s = format!("{v:.precision$e}");
    match s.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => s,
    }
}
