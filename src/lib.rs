// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Beam patterns of phased antenna arrays.

Antenna layouts and grids of sky directions are made with generators that can
report how many values they will produce before filling a buffer. The array
factor of a layout is then evaluated for every sky direction in parallel, in
either single or double precision.
 */

pub mod array_factor;
mod constants;
pub mod direction;
pub mod errors;
mod ffi;
pub mod layout;
pub mod output;
pub mod rotation;
pub mod sky;
pub mod sweep;
pub mod types;

pub use array_factor::{
    calc_array_factor, calc_array_factor_inner, evaluate, wavenumber, BeamImage, EvaluatedBeam,
};
pub use constants::{MAX_LATTICE_SITES, MAX_PLACEMENT_ATTEMPTS};
pub use direction::{HorizCoord, SkyDirection};
pub use errors::BeamError;
pub use layout::{ArrayLayout, CircularLayout, RegularGrid};
pub use rotation::{rotate_points, Axis, Matrix3};
pub use sky::{MirrorAxis, Projection, SectorOptions, SkyPositions};
pub use sweep::{sweep_frequencies, LogObserver, SweepImage, SweepObserver};
pub use types::{BeamFloat, Position2D, Position3D, PositionGenerator, Precision};

// Re-exports.
pub use marlu::AzEl;
