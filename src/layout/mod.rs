// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Antenna layouts: regular square grids and randomly perturbed circular
//! arrays.


use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    constants::{DEFAULT_MIN_SEPARATION_FRACTION, MAX_LATTICE_SITES, MAX_PLACEMENT_ATTEMPTS},
    errors::{check_non_negative, check_positive},
    rotation::{Axis, Matrix3},
    BeamError, Position2D, Position3D, PositionGenerator,
};

/// An `n` by `n` grid of antennas centred on the origin.
///
/// Antenna `i = y + x * n` sits at `(x * s - h, y * s - h)`, where `s` is the
/// separation and `h = (n - 1) * s / 2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegularGrid {
    /// The number of antennas along each side.
    pub per_side: usize,

    /// The distance between neighbouring antennas \[metres\].
    pub separation: f64,
}

impl RegularGrid {
    pub fn new(per_side: usize, separation: f64) -> RegularGrid {
        RegularGrid {
            per_side,
            separation,
        }
    }

    fn validate(&self) -> Result<usize, BeamError> {
        if self.per_side == 0 {
            return Err(BeamError::invalid(
                "antennas per side",
                "a grid needs at least one antenna",
            ));
        }
        check_positive("antenna separation", self.separation)?;
        match self.per_side.checked_mul(self.per_side) {
            Some(n) if n as u64 <= MAX_LATTICE_SITES => Ok(n),
            _ => Err(BeamError::invalid(
                "antennas per side",
                format!("{} per side is too many antennas", self.per_side),
            )),
        }
    }
}

impl PositionGenerator for RegularGrid {
    type Item = Position2D<f64>;

    fn count(&self) -> Result<usize, BeamError> {
        self.validate()
    }

    fn generate(&self, out: &mut [Position2D<f64>]) -> Result<usize, BeamError> {
        let num_antennas = self.validate()?;
        if out.len() < num_antennas {
            return Err(BeamError::BufferTooSmall {
                name: "antenna position",
                required: num_antennas,
                got: out.len(),
            });
        }

        let n = self.per_side;
        let s = self.separation;
        let half_size = (n - 1) as f64 * s / 2.0;
        for x in 0..n {
            for y in 0..n {
                out[y + x * n] = Position2D {
                    x: x as f64 * s - half_size,
                    y: y as f64 * s - half_size,
                };
            }
        }
        Ok(num_antennas)
    }
}

/// A circular aperture filled with antennas that are randomly displaced from
/// a regular lattice.
///
/// Lattice sites are at `(i * x_sep, j * y_sep)` for integers `i` and `j`;
/// every site within `radius` of the origin gets an antenna. Sites are visited
/// row by row (`j` outer, `i` inner), and each antenna is displaced by an
/// amount drawn uniformly from `[-x_err, x_err) x [-y_err, y_err)`. A
/// displaced antenna closer than the minimum separation to one already placed
/// is redrawn, up to [`MAX_PLACEMENT_ATTEMPTS`] times.
///
/// The random numbers come from a single ChaCha8 stream seeded with `seed`, so
/// the same parameters always give the same antennas, on any platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularLayout {
    /// The random-number seed. Must be non-zero.
    pub seed: u64,

    /// The radius of the aperture \[metres\].
    pub radius: f64,

    /// The nominal east-west separation of antennas \[metres\].
    pub x_sep: f64,

    /// The nominal north-south separation of antennas \[metres\].
    pub y_sep: f64,

    /// The largest east-west placement error \[metres\].
    pub x_err: f64,

    /// The largest north-south placement error \[metres\].
    pub y_err: f64,

    /// The closest any two antennas may be \[metres\]. If this isn't set, half
    /// of the smaller nominal separation is used.
    pub min_separation: Option<f64>,
}

impl CircularLayout {
    pub fn new(
        seed: u64,
        radius: f64,
        x_sep: f64,
        y_sep: f64,
        x_err: f64,
        y_err: f64,
    ) -> CircularLayout {
        CircularLayout {
            seed,
            radius,
            x_sep,
            y_sep,
            x_err,
            y_err,
            min_separation: None,
        }
    }

    pub fn with_min_separation(self, min_separation: f64) -> CircularLayout {
        CircularLayout {
            min_separation: Some(min_separation),
            ..self
        }
    }

    /// The minimum antenna separation that will be enforced \[metres\].
    pub fn get_min_separation(&self) -> f64 {
        self.min_separation
            .unwrap_or(DEFAULT_MIN_SEPARATION_FRACTION * self.x_sep.min(self.y_sep))
    }

    fn validate(&self) -> Result<(), BeamError> {
        if self.seed == 0 {
            return Err(BeamError::invalid("seed", "the seed must be positive"));
        }
        check_positive("radius", self.radius)?;
        check_positive("x separation", self.x_sep)?;
        check_positive("y separation", self.y_sep)?;
        check_non_negative("x error", self.x_err)?;
        check_non_negative("y error", self.y_err)?;
        check_non_negative("minimum separation", self.get_min_separation())?;
        Ok(())
    }

    /// Walk the lattice and place every antenna.
    fn place(&self) -> Result<Vec<Position2D<f64>>, BeamError> {
        self.validate()?;

        let half_cols = (self.radius / self.x_sep).floor();
        let half_rows = (self.radius / self.y_sep).floor();
        let num_sites = (2.0 * half_cols + 1.0) * (2.0 * half_rows + 1.0);
        if num_sites > MAX_LATTICE_SITES as f64 {
            return Err(BeamError::invalid(
                "radius",
                format!(
                    "a radius of {} m with separations of {} m and {} m needs too many lattice sites",
                    self.radius, self.x_sep, self.y_sep
                ),
            ));
        }
        let half_cols = half_cols as i64;
        let half_rows = half_rows as i64;
        let num_cols = (2 * half_cols + 1) as usize;
        let num_rows = (2 * half_rows + 1) as usize;

        let min_sep = self.get_min_separation();
        // Antennas more than this many sites apart can't possibly be too
        // close to each other. Never more than the whole lattice.
        let reach_x = ((min_sep + 2.0 * self.x_err) / self.x_sep)
            .ceil()
            .min(num_cols as f64) as i64;
        let reach_y = ((min_sep + 2.0 * self.y_err) / self.y_sep)
            .ceil()
            .min(num_rows as f64) as i64;

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut occupied: Vec<Option<Position2D<f64>>> = vec![None; num_cols * num_rows];
        let site_index =
            |i: i64, j: i64| (j + half_rows) as usize * num_cols + (i + half_cols) as usize;
        let mut positions = vec![];

        for j in -half_rows..=half_rows {
            for i in -half_cols..=half_cols {
                let nominal = Position2D::new(i as f64 * self.x_sep, j as f64 * self.y_sep);
                if nominal.x.hypot(nominal.y) > self.radius {
                    continue;
                }

                let mut placed = None;
                for _ in 0..MAX_PLACEMENT_ATTEMPTS {
                    let ex = self.x_err * (2.0 * rng.gen::<f64>() - 1.0);
                    let ey = self.y_err * (2.0 * rng.gen::<f64>() - 1.0);
                    let candidate = Position2D::new(nominal.x + ex, nominal.y + ey);

                    let mut nearby_rows = j.saturating_sub(reach_y).max(-half_rows)
                        ..=j.saturating_add(reach_y).min(half_rows);
                    let clash = nearby_rows.any(|jj| {
                        let mut nearby_cols = i.saturating_sub(reach_x).max(-half_cols)
                            ..=i.saturating_add(reach_x).min(half_cols);
                        nearby_cols.any(|ii| {
                            occupied[site_index(ii, jj)]
                                .map(|other| candidate.distance(other) < min_sep)
                                .unwrap_or(false)
                        })
                    });
                    if !clash {
                        placed = Some(candidate);
                        break;
                    }
                }

                match placed {
                    Some(p) => {
                        occupied[site_index(i, j)] = Some(p);
                        positions.push(p);
                    }
                    None => {
                        return Err(BeamError::ConstraintUnsatisfiable {
                            index: positions.len(),
                            attempts: MAX_PLACEMENT_ATTEMPTS,
                            min_separation: min_sep,
                        })
                    }
                }
            }
        }

        debug!(
            "Placed {} antennas within {} m (seed {})",
            positions.len(),
            self.radius,
            self.seed
        );
        Ok(positions)
    }
}

impl PositionGenerator for CircularLayout {
    type Item = Position2D<f64>;

    fn count(&self) -> Result<usize, BeamError> {
        self.place().map(|p| p.len())
    }

    fn generate(&self, out: &mut [Position2D<f64>]) -> Result<usize, BeamError> {
        let positions = self.place()?;
        if out.len() < positions.len() {
            return Err(BeamError::BufferTooSmall {
                name: "antenna position",
                required: positions.len(),
                got: out.len(),
            });
        }
        out[..positions.len()].copy_from_slice(&positions);
        Ok(positions.len())
    }
}

/// The positions of an array's antennas in the local horizontal plane
/// \[metres\]. There is always at least one antenna.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLayout {
    positions: Vec<Position2D<f64>>,
}

impl ArrayLayout {
    /// Run a layout generator and keep its antennas.
    pub fn from_generator<G>(generator: &G) -> Result<ArrayLayout, BeamError>
    where
        G: PositionGenerator<Item = Position2D<f64>>,
    {
        ArrayLayout::from_positions(generator.generate_vec()?)
    }

    pub fn from_positions(positions: Vec<Position2D<f64>>) -> Result<ArrayLayout, BeamError> {
        if positions.is_empty() {
            return Err(BeamError::invalid(
                "number of antennas",
                "a layout needs at least one antenna",
            ));
        }
        if let Some(index) = positions.iter().position(|p| !p.is_finite()) {
            return Err(BeamError::NonFiniteInput {
                what: "antenna positions",
                index,
            });
        }
        Ok(ArrayLayout { positions })
    }

    pub fn positions(&self) -> &[Position2D<f64>] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Rigidly rotate the layout about `axis`, giving 3D positions.
    pub fn rotated(&self, axis: Axis, angle_rad: f64) -> Result<Vec<Position3D<f64>>, BeamError> {
        crate::rotation::rotate_points(axis, angle_rad, &self.positions)
    }

    /// Rotate the layout in the horizontal plane (about the vertical axis).
    pub fn rotated_horizontally(&self, angle_rad: f64) -> Result<ArrayLayout, BeamError> {
        if !angle_rad.is_finite() {
            return Err(BeamError::NonFiniteInput {
                what: "rotation angle",
                index: 0,
            });
        }
        let positions = Matrix3::rotation_z(angle_rad)
            .transform_points(&self.positions)
            .into_iter()
            .map(Position3D::horizontal)
            .collect();
        Ok(ArrayLayout { positions })
    }
}
