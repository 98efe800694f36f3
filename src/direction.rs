// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Directions on the sky in horizontal coordinates.

use std::f64::consts::FRAC_PI_2;

use marlu::AzEl;

use crate::BeamFloat;

/// A trait that describes a coordinate pair in a horizontal coordinate
/// system. Azimuth is measured from north through east and elevation from the
/// horizon, both in radians.
pub trait HorizCoord: Copy {
    /// Get the azimuth of this coordinate.
    fn get_az(&self) -> f64;
    /// Get the elevation of this coordinate.
    fn get_el(&self) -> f64;
    /// Get the zenith angle of this coordinate.
    fn get_za(&self) -> f64 {
        FRAC_PI_2 - self.get_el()
    }
}

impl<C: HorizCoord> HorizCoord for &C {
    fn get_az(&self) -> f64 {
        (*self).get_az()
    }

    fn get_el(&self) -> f64 {
        (*self).get_el()
    }
}

impl HorizCoord for AzEl {
    fn get_az(&self) -> f64 {
        self.az
    }

    fn get_el(&self) -> f64 {
        self.el
    }

    fn get_za(&self) -> f64 {
        self.za()
    }
}

impl<F: BeamFloat> HorizCoord for SkyDirection<F> {
    fn get_az(&self) -> f64 {
        self.az.as_f64()
    }

    fn get_el(&self) -> f64 {
        self.el.as_f64()
    }
}

/// A sky direction. The sky-position generators think of these as
/// (longitude, latitude) pairs; for the beam kernel they are (azimuth,
/// elevation). Both are in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SkyDirection<F = f64> {
    /// Azimuth (longitude) \[radians\]
    pub az: F,
    /// Elevation (latitude) \[radians\]
    pub el: F,
}

impl<F: BeamFloat> SkyDirection<F> {
    pub fn new(az: F, el: F) -> SkyDirection<F> {
        SkyDirection { az, el }
    }

    pub fn from_degrees(az_deg: f64, el_deg: f64) -> SkyDirection<F> {
        SkyDirection {
            az: F::from_f64(az_deg.to_radians()),
            el: F::from_f64(el_deg.to_radians()),
        }
    }

    /// The direction straight up.
    pub fn zenith() -> SkyDirection<F> {
        SkyDirection {
            az: F::zero(),
            el: F::FRAC_PI_2(),
        }
    }

    /// Get the (azimuth, elevation) in degrees.
    pub fn to_degrees(self) -> (f64, f64) {
        (self.az.as_f64().to_degrees(), self.el.as_f64().to_degrees())
    }

    /// The direction cosines of this direction projected onto the local
    /// horizontal plane; `l` is along east and `m` along north.
    pub fn direction_cosines(self) -> (F, F) {
        let (s_az, c_az) = self.az.sin_cos();
        let c_el = self.el.cos();
        (c_el * s_az, c_el * c_az)
    }

    pub fn is_finite(self) -> bool {
        self.az.is_finite() && self.el.is_finite()
    }

    /// Convert this direction to another float precision.
    pub fn cast<G: BeamFloat>(self) -> SkyDirection<G> {
        SkyDirection {
            az: G::from_f64(self.az.as_f64()),
            el: G::from_f64(self.el.as_f64()),
        }
    }

    /// Convert any horizontal coordinate into a [`SkyDirection`].
    pub fn from_horiz<C: HorizCoord>(c: C) -> SkyDirection<F> {
        SkyDirection {
            az: F::from_f64(c.get_az()),
            el: F::from_f64(c.get_el()),
        }
    }
}

impl From<AzEl> for SkyDirection<f64> {
    fn from(azel: AzEl) -> Self {
        SkyDirection {
            az: azel.az,
            el: azel.el,
        }
    }
}
