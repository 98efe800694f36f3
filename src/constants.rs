// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.
 */

/// The maximum number of times a perturbed antenna position is redrawn before
/// a circular layout is declared impossible.
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 1000;

/// When a minimum antenna separation isn't given for a circular layout, this
/// fraction of the smaller nominal separation is used.
pub(crate) const DEFAULT_MIN_SEPARATION_FRACTION: f64 = 0.5;

/// Slack allowed when deciding whether a deprojected direction is above the
/// horizon or beyond a pole \[radians\].
pub(crate) const ANGLE_TOLERANCE: f64 = 1e-12;

/// The largest lattice (in number of sites) that the generators will walk.
/// Anything bigger is almost certainly a units mistake.
pub const MAX_LATTICE_SITES: u64 = 1 << 28;
