// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Evaluate the array factor over a list of frequencies.
//!
//! Every frequency is an independent kernel invocation; nothing is carried
//! between them. Progress is reported through a [`SweepObserver`].

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::{
    array_factor::{evaluate, wavenumber, EvaluatedBeam},
    direction::HorizCoord,
    errors::check_positive,
    BeamError, Position2D, Precision, SkyDirection,
};

/// Hooks called while a sweep runs. All of them do nothing by default.
pub trait SweepObserver {
    /// Called before the beam at `freq_hz` is evaluated. `index` counts from
    /// 0 up to `total - 1`.
    fn frequency_started(&mut self, _index: usize, _total: usize, _freq_hz: f64) {}

    /// Called after the beam at `freq_hz` was evaluated successfully.
    fn frequency_finished(
        &mut self,
        _index: usize,
        _total: usize,
        _freq_hz: f64,
        _elapsed: Duration,
    ) {
    }
}

/// An observer that ignores everything.
impl SweepObserver for () {}

/// An observer that forwards progress to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl SweepObserver for LogObserver {
    fn frequency_started(&mut self, index: usize, total: usize, freq_hz: f64) {
        debug!(
            "Evaluating beam {}/{total} at {:.3} MHz",
            index + 1,
            freq_hz / 1e6
        );
    }

    fn frequency_finished(&mut self, index: usize, total: usize, freq_hz: f64, elapsed: Duration) {
        info!(
            "Beam {}/{total} at {:.3} MHz took {:.3} s",
            index + 1,
            freq_hz / 1e6,
            elapsed.as_secs_f64()
        );
    }
}

/// The beam for a single frequency of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepImage {
    pub freq_hz: f64,
    pub beam: EvaluatedBeam,
}

/// Evaluate the array factor for every frequency in `freqs_hz` \[Hz\], in
/// order. The first failure stops the sweep.
pub fn sweep_frequencies<C: HorizCoord, O: SweepObserver + ?Sized>(
    antennas: &[Position2D<f64>],
    directions: &[SkyDirection<f64>],
    boresight: C,
    freqs_hz: &[f64],
    precision: Precision,
    observer: &mut O,
) -> Result<Vec<SweepImage>, BeamError> {
    let boresight = SkyDirection::<f64>::from_horiz(boresight);
    let total = freqs_hz.len();
    let mut images = Vec::with_capacity(total);
    for (i, &freq_hz) in freqs_hz.iter().enumerate() {
        check_positive("frequency", freq_hz)?;
        observer.frequency_started(i, total, freq_hz);
        let start = Instant::now();
        let beam = evaluate(
            antennas,
            directions,
            boresight,
            wavenumber(freq_hz),
            precision,
        )?;
        observer.frequency_finished(i, total, freq_hz, start.elapsed());
        images.push(SweepImage { freq_hz, beam });
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{PositionGenerator, RegularGrid};

    #[derive(Default)]
    struct Recorder {
        started: Vec<(usize, usize, f64)>,
        finished: Vec<f64>,
    }

    impl SweepObserver for Recorder {
        fn frequency_started(&mut self, index: usize, total: usize, freq_hz: f64) {
            self.started.push((index, total, freq_hz));
        }

        fn frequency_finished(&mut self, _: usize, _: usize, freq_hz: f64, _: Duration) {
            self.finished.push(freq_hz);
        }
    }

    #[test]
    fn one_image_per_frequency() {
        let antennas = RegularGrid::new(4, 0.15).generate_vec().unwrap();
        let boresight = SkyDirection::from_degrees(0.0, 50.0);
        let directions = [boresight, SkyDirection::from_degrees(10.0, 40.0)];
        let freqs = [70e6, 150e6, 300e6];
        let mut recorder = Recorder::default();

        let images = sweep_frequencies(
            &antennas,
            &directions,
            boresight,
            &freqs,
            Precision::Double,
            &mut recorder,
        )
        .unwrap();
        assert_eq!(images.len(), 3);
        for (image, freq) in images.iter().zip(freqs) {
            assert_eq!(image.freq_hz, freq);
            assert_eq!(image.beam.num_samples(), 2);
            assert_abs_diff_eq!(image.beam.get(0).unwrap().re, 16.0, epsilon = 1e-12);
        }
        // Off boresight, the beam gets narrower with frequency.
        let off: Vec<f64> = images
            .iter()
            .map(|i| i.beam.get(1).unwrap().norm())
            .collect();
        assert!(off[0] > off[1]);

        assert_eq!(
            recorder.started,
            vec![(0, 3, 70e6), (1, 3, 150e6), (2, 3, 300e6)]
        );
        assert_eq!(recorder.finished, freqs.to_vec());
    }

    #[test]
    fn each_frequency_matches_a_single_evaluation() {
        let antennas = RegularGrid::new(3, 1.1).generate_vec().unwrap();
        let directions = [SkyDirection::from_degrees(45.0, 30.0)];
        let boresight = SkyDirection::<f64>::zenith();
        let images = sweep_frequencies(
            &antennas,
            &directions,
            boresight,
            &[115e6, 200e6],
            Precision::Single,
            &mut LogObserver,
        )
        .unwrap();
        for image in images {
            let expected = evaluate(
                &antennas,
                &directions,
                boresight,
                wavenumber(image.freq_hz),
                Precision::Single,
            )
            .unwrap();
            assert_eq!(image.beam, expected);
        }
    }

    #[test]
    fn bad_frequency_stops_the_sweep() {
        let antennas = [Position2D::new(0.0, 0.0)];
        let directions = [SkyDirection::zenith()];
        let mut recorder = Recorder::default();
        let result = sweep_frequencies(
            &antennas,
            &directions,
            SkyDirection::<f64>::zenith(),
            &[100e6, -5.0, 200e6],
            Precision::Double,
            &mut recorder,
        );
        assert!(matches!(
            result,
            Err(BeamError::InvalidParameter {
                name: "frequency",
                ..
            })
        ));
        assert_eq!(recorder.finished, vec![100e6]);
        assert_eq!(recorder.started.len(), 1);
    }

    #[test]
    fn empty_sweep() {
        let images = sweep_frequencies(
            &[Position2D::new(0.0, 0.0)],
            &[],
            SkyDirection::<f64>::zenith(),
            &[],
            Precision::Double,
            &mut (),
        )
        .unwrap();
        assert!(images.is_empty());
    }
}
