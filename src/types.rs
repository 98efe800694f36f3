// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Generic types.

use std::{fmt::Debug, str::FromStr};

use num_traits::{Float, FloatConst};

use crate::BeamError;

/// The float types that beam calculations can be done with. Accumulated phase
/// error over many antennas depends on this, so callers get to choose.
pub trait BeamFloat: Float + FloatConst + Default + Debug + Send + Sync + 'static {
    /// Convert from an `f64`, rounding if necessary.
    fn from_f64(v: f64) -> Self;

    /// Convert to an `f64` (exact for both supported types).
    fn as_f64(self) -> f64;
}

impl BeamFloat for f32 {
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    fn as_f64(self) -> f64 {
        f64::from(self)
    }
}

impl BeamFloat for f64 {
    fn from_f64(v: f64) -> Self {
        v
    }

    fn as_f64(self) -> f64 {
        self
    }
}

/// Which float precision should be used for a beam calculation?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// `f32`.
    Single,

    /// `f64`.
    #[default]
    Double,
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Precision::Single => "single",
                Precision::Double => "double",
            }
        )
    }
}

impl FromStr for Precision {
    type Err = BeamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "f32" | "float" => Ok(Precision::Single),
            "double" | "f64" => Ok(Precision::Double),
            _ => Err(BeamError::invalid(
                "precision",
                format!("'{s}' isn't one of 'single' or 'double'"),
            )),
        }
    }
}

/// A position in the local horizontal plane \[metres\]. `x` points east and
/// `y` points north.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position2D<F = f64> {
    pub x: F,
    pub y: F,
}

impl<F: BeamFloat> Position2D<F> {
    pub fn new(x: F, y: F) -> Position2D<F> {
        Position2D { x, y }
    }

    /// The straight-line distance between two positions.
    pub fn distance(self, other: Position2D<F>) -> F {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Convert this position to another float precision.
    pub fn cast<G: BeamFloat>(self) -> Position2D<G> {
        Position2D {
            x: G::from_f64(self.x.as_f64()),
            y: G::from_f64(self.y.as_f64()),
        }
    }
}

/// A position in the local (east, north, up) frame \[metres\].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position3D<F = f64> {
    pub x: F,
    pub y: F,
    pub z: F,
}

impl<F: BeamFloat> Position3D<F> {
    pub fn new(x: F, y: F, z: F) -> Position3D<F> {
        Position3D { x, y, z }
    }

    pub fn distance(self, other: Position3D<F>) -> F {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Drop the vertical component. The beam kernel only uses horizontal
    /// positions.
    pub fn horizontal(self) -> Position2D<F> {
        Position2D {
            x: self.x,
            y: self.y,
        }
    }
}

impl<F: BeamFloat> From<Position2D<F>> for Position3D<F> {
    fn from(p: Position2D<F>) -> Self {
        Position3D {
            x: p.x,
            y: p.y,
            z: F::zero(),
        }
    }
}

/// Generators that lay out positions in two phases. `count` says how many
/// positions will be generated, so that the caller can allocate exactly that
/// much storage, then `generate` fills the storage. Both phases walk the same
/// deterministic sequence, so they always agree.
pub trait PositionGenerator {
    type Item: Copy + Default;

    /// The number of positions that [`PositionGenerator::generate`] will
    /// write.
    fn count(&self) -> Result<usize, BeamError>;

    /// Write the positions into the start of `out`, returning how many were
    /// written. `out` must be at least as long as the result of
    /// [`PositionGenerator::count`].
    fn generate(&self, out: &mut [Self::Item]) -> Result<usize, BeamError>;

    /// Count and generate the positions into a new `Vec`.
    fn generate_vec(&self) -> Result<Vec<Self::Item>, BeamError> {
        let mut out = vec![Self::Item::default(); self.count()?];
        let n = self.generate(&mut out)?;
        out.truncate(n);
        Ok(out)
    }
}
