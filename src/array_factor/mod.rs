// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code for the geometric array factor of a phased array.
//!
//! Each sky direction and the boresight are projected onto direction cosines
//! `(l, m) = (cos(el) sin(az), cos(el) cos(az))` in the local horizontal
//! frame. The array factor for a direction is then
//!
//! `AF = sum_a exp(i k (x_a (l - l_0) + y_a (m - m_0)))`
//!
//! where `(x_a, y_a)` is the position of antenna `a`, `(l_0, m_0)` belongs to
//! the boresight and `k` is the angular wavenumber. On boresight every term is
//! 1, so the array factor is the number of antennas with no phase.


use std::f64::consts::TAU;

use marlu::constants::VEL_C;
use num_complex::Complex;
use rayon::prelude::*;

use crate::{
    direction::HorizCoord, errors::check_positive, BeamError, BeamFloat, Position2D, Precision,
    SkyDirection,
};

/// Get the angular wavenumber `2 pi f / c` \[radians per metre\] for a
/// frequency \[Hz\].
pub fn wavenumber(freq_hz: f64) -> f64 {
    TAU * freq_hz / VEL_C
}

/// Array-factor samples, one complex number per sky direction. The values are
/// stored interleaved, i.e. `[re_0, im_0, re_1, im_1, ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamImage<F> {
    data: Vec<F>,
}

impl<F: BeamFloat> BeamImage<F> {
    /// An image of `num_samples` zeros.
    pub fn zeros(num_samples: usize) -> BeamImage<F> {
        BeamImage {
            data: vec![F::zero(); 2 * num_samples],
        }
    }

    /// Wrap interleaved real and imaginary values.
    pub fn from_vec(data: Vec<F>) -> Result<BeamImage<F>, BeamError> {
        if data.len() % 2 != 0 {
            return Err(BeamError::invalid(
                "beam image",
                format!("{} values can't be interleaved complex numbers", data.len()),
            ));
        }
        Ok(BeamImage { data })
    }

    /// The number of complex samples.
    pub fn num_samples(&self) -> usize {
        self.data.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The interleaved real and imaginary values.
    pub fn as_slice(&self) -> &[F] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<F> {
        self.data
    }

    /// Get the sample for sky direction `i`.
    pub fn get(&self, i: usize) -> Option<Complex<F>> {
        let re = *self.data.get(2 * i)?;
        let im = *self.data.get(2 * i + 1)?;
        Some(Complex::new(re, im))
    }

    pub fn iter(&self) -> impl Iterator<Item = Complex<F>> + '_ {
        self.data
            .chunks_exact(2)
            .map(|pair| Complex::new(pair[0], pair[1]))
    }

    /// The amplitude of every sample.
    pub fn magnitudes(&self) -> Vec<F> {
        self.iter().map(|c| c.norm()).collect()
    }

    /// The phase of every sample \[radians\].
    pub fn phases(&self) -> Vec<F> {
        self.iter().map(|c| c.arg()).collect()
    }
}

/// The result of [`evaluate`], in whichever precision was asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluatedBeam {
    Single(BeamImage<f32>),
    Double(BeamImage<f64>),
}

impl EvaluatedBeam {
    pub fn precision(&self) -> Precision {
        match self {
            EvaluatedBeam::Single(_) => Precision::Single,
            EvaluatedBeam::Double(_) => Precision::Double,
        }
    }

    pub fn num_samples(&self) -> usize {
        match self {
            EvaluatedBeam::Single(i) => i.num_samples(),
            EvaluatedBeam::Double(i) => i.num_samples(),
        }
    }

    /// Get the sample for sky direction `i`, widened to double precision if
    /// necessary.
    pub fn get(&self, i: usize) -> Option<Complex<f64>> {
        match self {
            EvaluatedBeam::Single(image) => image
                .get(i)
                .map(|c| Complex::new(f64::from(c.re), f64::from(c.im))),
            EvaluatedBeam::Double(image) => image.get(i),
        }
    }

    /// The interleaved real and imaginary values as doubles.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            EvaluatedBeam::Single(image) => {
                image.as_slice().iter().copied().map(f64::from).collect()
            }
            EvaluatedBeam::Double(image) => image.as_slice().to_vec(),
        }
    }
}

/// Calculate the array factor for each of `directions`, given antenna
/// positions `antennas` \[metres\], a `boresight` and an angular `wavenumber` \[radians
/// per metre\]. The calculation (including accumulation) is done in the
/// precision of the inputs. Directions are handled in parallel; the number of
/// threads can be controlled by setting `RAYON_NUM_THREADS`.
///
/// # Examples
///
/// ```
/// use array_beam::{calc_array_factor, wavenumber, Position2D, SkyDirection};
///
/// let antennas = [Position2D::new(-0.075, -0.075), Position2D::new(0.075, 0.075)];
/// let boresight = SkyDirection::from_degrees(0.0, 50.0);
/// let image = calc_array_factor(&antennas, &[boresight], boresight, wavenumber(1e9)).unwrap();
/// assert!((image.get(0).unwrap().re - 2.0).abs() < 1e-12);
/// ```
pub fn calc_array_factor<F: BeamFloat>(
    antennas: &[Position2D<F>],
    directions: &[SkyDirection<F>],
    boresight: SkyDirection<F>,
    wavenumber: F,
) -> Result<BeamImage<F>, BeamError> {
    let mut image = BeamImage::zeros(directions.len());
    calc_array_factor_inner(antennas, directions, boresight, wavenumber, &mut image.data)?;
    Ok(image)
}

/// The same as [`calc_array_factor`], but the results are written into
/// `image` as interleaved real and imaginary values. `image` must have at
/// least `2 * directions.len()` elements; anything past that isn't touched.
pub fn calc_array_factor_inner<F: BeamFloat>(
    antennas: &[Position2D<F>],
    directions: &[SkyDirection<F>],
    boresight: SkyDirection<F>,
    wavenumber: F,
    image: &mut [F],
) -> Result<(), BeamError> {
    if antennas.is_empty() {
        return Err(BeamError::invalid(
            "number of antennas",
            "at least one antenna is needed",
        ));
    }
    check_positive("wavenumber", wavenumber.as_f64())?;
    if !boresight.is_finite() {
        return Err(BeamError::NonFiniteInput {
            what: "boresight",
            index: 0,
        });
    }
    if let Some(index) = antennas.iter().position(|a| !a.is_finite()) {
        return Err(BeamError::NonFiniteInput {
            what: "antenna positions",
            index,
        });
    }
    if let Some(index) = directions.iter().position(|d| !d.is_finite()) {
        return Err(BeamError::NonFiniteInput {
            what: "sky directions",
            index,
        });
    }
    let required = 2 * directions.len();
    if image.len() < required {
        return Err(BeamError::BufferTooSmall {
            name: "beam image",
            required,
            got: image.len(),
        });
    }

    let (l_0, m_0) = boresight.direction_cosines();
    image[..required]
        .par_chunks_exact_mut(2)
        .zip(directions.par_iter())
        .for_each(|(pair, direction)| {
            let (l, m) = direction.direction_cosines();
            let af = array_factor(antennas, wavenumber * (l - l_0), wavenumber * (m - m_0));
            pair[0] = af.re;
            pair[1] = af.im;
        });
    Ok(())
}

/// Sum the phase contributions of every antenna. `k_l` and `k_m` are the
/// wavenumber multiplied by the direction-cosine differences.
fn array_factor<F: BeamFloat>(antennas: &[Position2D<F>], k_l: F, k_m: F) -> Complex<F> {
    antennas
        .iter()
        .fold(Complex::new(F::zero(), F::zero()), |acc, a| {
            let (s_phase, c_phase) = (a.x * k_l + a.y * k_m).sin_cos();
            acc + Complex::new(c_phase, s_phase)
        })
}

/// Calculate the array factor with double-precision inputs, doing the work in
/// the requested `precision`. Single precision is faster, but phase errors
/// accumulate over large antenna counts.
pub fn evaluate<C: HorizCoord>(
    antennas: &[Position2D<f64>],
    directions: &[SkyDirection<f64>],
    boresight: C,
    wavenumber: f64,
    precision: Precision,
) -> Result<EvaluatedBeam, BeamError> {
    let boresight = SkyDirection::<f64>::from_horiz(boresight);
    match precision {
        Precision::Double => {
            calc_array_factor(antennas, directions, boresight, wavenumber).map(EvaluatedBeam::Double)
        }
        Precision::Single => {
            let antennas: Vec<Position2D<f32>> = antennas.iter().map(|a| a.cast()).collect();
            let directions: Vec<SkyDirection<f32>> = directions.iter().map(|d| d.cast()).collect();
            calc_array_factor(&antennas, &directions, boresight.cast(), wavenumber as f32)
                .map(EvaluatedBeam::Single)
        }
    }
}
