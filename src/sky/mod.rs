// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Sky positions at which a beam pattern is evaluated.
//!
//! Positions are laid out on a regular lattice of angular offsets `(u, v)`
//! about a centre direction. Each axis has `floor(2W / S) + 1` points, where
//! `W` is the half-width of that axis and `S` its spacing (a spacing larger
//! than the half-width is reduced to the half-width). The offsets start at
//! `-W` and go up in steps of `S`. A [`Projection`] maps the offsets onto the
//! sphere.

#[cfg(test)]
mod tests;

use std::{
    f64::consts::{FRAC_PI_2, PI},
    str::FromStr,
};

use log::debug;

use crate::{
    constants::{ANGLE_TOLERANCE, MAX_LATTICE_SITES},
    errors::check_positive,
    BeamError, PositionGenerator, SkyDirection,
};

/// How lattice offsets are turned into sky directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// No distortion; offsets are added straight onto the centre longitude
    /// and latitude.
    #[default]
    None,

    /// Offsets are direction cosines on the plane tangent to the centre
    /// (orthographic). Offsets further than 1 from the centre don't land on
    /// the sphere and are skipped.
    Sin,

    /// Offsets are coordinates on the plane tangent to the centre
    /// (gnomonic).
    Tan,

    /// Sanson-Flamsteed (sinusoidal). Longitude offsets are divided by the
    /// cosine of the latitude so that positions keep a constant on-sky
    /// separation, rather than bunching up towards the poles.
    Sfl,
}

impl std::fmt::Display for Projection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Projection::None => "none",
                Projection::Sin => "sin",
                Projection::Tan => "tan",
                Projection::Sfl => "sfl",
            }
        )
    }
}

impl FromStr for Projection {
    type Err = BeamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Projection::None),
            "sin" | "orthographic" => Ok(Projection::Sin),
            "tan" | "gnomonic" => Ok(Projection::Tan),
            "sfl" | "sinusoidal" => Ok(Projection::Sfl),
            _ => Err(BeamError::invalid(
                "projection",
                format!("'{s}' isn't one of 'none', 'sin', 'tan' or 'sfl'"),
            )),
        }
    }
}

impl TryFrom<i32> for Projection {
    type Error = BeamError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Projection::None),
            1 => Ok(Projection::Sin),
            2 => Ok(Projection::Tan),
            3 => Ok(Projection::Sfl),
            _ => Err(BeamError::invalid(
                "projection",
                format!("{value} isn't a known projection code (0 to 3)"),
            )),
        }
    }
}

/// The lattice axis to mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorAxis {
    /// Negate longitude offsets.
    Longitude,

    /// Negate latitude offsets.
    Latitude,
}

/// Extra behaviour for a sky sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectorOptions {
    /// Only keep directions between the horizon and the zenith.
    pub above_horizon: bool,

    /// Reflect the lattice offsets along one axis.
    pub mirror: Option<MirrorAxis>,

    pub projection: Projection,
}

/// A sector of sky directions about a centre.
///
/// Directions are generated with latitude offsets in the outer loop and
/// longitude offsets in the inner loop; the same parameters always give the
/// same directions in the same order. With [`Projection::None`] and no
/// options, the latitude isn't restricted, so a sector reaching past a pole
/// gives latitudes beyond 90 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyPositions {
    pub centre: SkyDirection<f64>,

    /// The half-width of the sector in longitude \[radians\].
    pub half_width_lon: f64,

    /// The half-width of the sector in latitude \[radians\].
    pub half_width_lat: f64,

    /// The spacing between longitude offsets \[radians\].
    pub spacing_lon: f64,

    /// The spacing between latitude offsets \[radians\].
    pub spacing_lat: f64,

    pub options: SectorOptions,
}

impl SkyPositions {
    /// A rectangular sector. `half_widths` and `spacings` are (longitude,
    /// latitude) pairs in radians.
    pub fn new(
        centre: SkyDirection<f64>,
        half_widths: (f64, f64),
        spacings: (f64, f64),
    ) -> SkyPositions {
        SkyPositions {
            centre,
            half_width_lon: half_widths.0,
            half_width_lat: half_widths.1,
            spacing_lon: spacings.0,
            spacing_lat: spacings.1,
            options: SectorOptions::default(),
        }
    }

    /// The whole sky above the horizon, from azimuth 0 to 360 degrees and
    /// elevation 0 to 90 degrees. `spacings` is a (longitude, latitude) pair
    /// in radians.
    pub fn hemisphere(spacings: (f64, f64)) -> SkyPositions {
        SkyPositions::new(
            SkyDirection::new(PI, FRAC_PI_2 / 2.0),
            (PI, FRAC_PI_2 / 2.0),
            spacings,
        )
        .with_options(SectorOptions {
            above_horizon: true,
            ..Default::default()
        })
    }

    pub fn with_options(self, options: SectorOptions) -> SkyPositions {
        SkyPositions { options, ..self }
    }

    /// The number of lattice points along the (longitude, latitude) axes.
    /// Options may skip some of these points.
    pub fn lattice_shape(&self) -> Result<(usize, usize), BeamError> {
        self.validate()?;
        let num_lon = axis_count(self.half_width_lon, self.spacing_lon);
        let num_lat = axis_count(self.half_width_lat, self.spacing_lat);
        // Checked before casting; tiny spacings give counts beyond any
        // integer type.
        if num_lon * num_lat > MAX_LATTICE_SITES as f64 {
            return Err(BeamError::invalid(
                "sky spacing",
                format!("{num_lon:e} x {num_lat:e} sky positions are too many"),
            ));
        }
        Ok((num_lon as usize, num_lat as usize))
    }

    fn validate(&self) -> Result<(), BeamError> {
        if !self.centre.is_finite() {
            return Err(BeamError::NonFiniteInput {
                what: "sky sector centre",
                index: 0,
            });
        }
        check_positive("longitude half-width", self.half_width_lon)?;
        check_positive("latitude half-width", self.half_width_lat)?;
        check_positive("longitude spacing", self.spacing_lon)?;
        check_positive("latitude spacing", self.spacing_lat)?;
        Ok(())
    }

    /// Visit every kept direction in order, returning how many there were.
    fn walk<F: FnMut(usize, SkyDirection<f64>)>(&self, mut f: F) -> Result<usize, BeamError> {
        let (num_lon, num_lat) = self.lattice_shape()?;
        let spacing_lon = self.spacing_lon.min(self.half_width_lon);
        let spacing_lat = self.spacing_lat.min(self.half_width_lat);
        let (sign_lon, sign_lat) = match self.options.mirror {
            None => (1.0, 1.0),
            Some(MirrorAxis::Longitude) => (-1.0, 1.0),
            Some(MirrorAxis::Latitude) => (1.0, -1.0),
        };

        let mut count = 0;
        for i_lat in 0..num_lat {
            let v = sign_lat * (-self.half_width_lat + i_lat as f64 * spacing_lat);
            for i_lon in 0..num_lon {
                let u = sign_lon * (-self.half_width_lon + i_lon as f64 * spacing_lon);
                let direction = match self.project(u, v) {
                    Some(d) => d,
                    None => continue,
                };
                let below_horizon = direction.el < -ANGLE_TOLERANCE;
                let past_zenith = direction.el > FRAC_PI_2 + ANGLE_TOLERANCE;
                if self.options.above_horizon && (below_horizon || past_zenith) {
                    continue;
                }
                f(count, direction);
                count += 1;
            }
        }
        Ok(count)
    }

    /// Map a lattice offset onto the sphere. `None` means the offset doesn't
    /// correspond to a direction.
    fn project(&self, u: f64, v: f64) -> Option<SkyDirection<f64>> {
        let SkyDirection { az: lon0, el: lat0 } = self.centre;
        match self.options.projection {
            Projection::None => Some(SkyDirection::new(lon0 + u, lat0 + v)),

            Projection::Sfl => {
                let lat = lat0 + v;
                let c_lat = lat.cos();
                let lon = if c_lat.abs() < ANGLE_TOLERANCE {
                    lon0
                } else {
                    lon0 + u / c_lat
                };
                Some(SkyDirection::new(lon, lat))
            }

            Projection::Sin | Projection::Tan => {
                let rho = u.hypot(v);
                if rho == 0.0 {
                    return Some(self.centre);
                }
                let c = if matches!(self.options.projection, Projection::Sin) {
                    if rho > 1.0 {
                        return None;
                    }
                    rho.asin()
                } else {
                    rho.atan()
                };
                let (s_c, c_c) = c.sin_cos();
                let (s_lat0, c_lat0) = lat0.sin_cos();
                let lat = (c_c * s_lat0 + v * s_c * c_lat0 / rho).clamp(-1.0, 1.0).asin();
                let lon = lon0 + (u * s_c).atan2(rho * c_c * c_lat0 - v * s_c * s_lat0);
                Some(SkyDirection::new(lon, lat))
            }
        }
    }
}

/// `floor(2W / S) + 1`, with the spacing limited to the half-width. A tiny
/// slack keeps e.g. 2 * 30 / 0.2 degrees (in radians) from rounding down to
/// 299.
fn axis_count(half_width: f64, spacing: f64) -> f64 {
    let spacing = spacing.min(half_width);
    let n = 2.0 * half_width / spacing;
    (n * (1.0 + 1e-9)).floor() + 1.0
}

impl PositionGenerator for SkyPositions {
    type Item = SkyDirection<f64>;

    fn count(&self) -> Result<usize, BeamError> {
        let n = self.walk(|_, _| ())?;
        debug!(
            "{n} sky positions about ({:.3}, {:.3}) deg with projection '{}'",
            self.centre.az.to_degrees(),
            self.centre.el.to_degrees(),
            self.options.projection
        );
        Ok(n)
    }

    fn generate(&self, out: &mut [SkyDirection<f64>]) -> Result<usize, BeamError> {
        let required = self.walk(|_, _| ())?;
        if out.len() < required {
            return Err(BeamError::BufferTooSmall {
                name: "sky position",
                required,
                got: out.len(),
            });
        }
        self.walk(|i, d| out[i] = d)
    }
}
