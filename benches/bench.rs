// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Benchmarks of the layout and sky generators and of the array-factor kernel.
 */

use criterion::*;

use array_beam::*;

fn generators(c: &mut Criterion) {
    c.bench_function("regular grid 100x100", |b| {
        let grid = RegularGrid::new(100, 0.15);
        let mut positions = vec![Position2D::default(); grid.count().unwrap()];
        b.iter(|| {
            grid.generate(&mut positions).unwrap();
        })
    });

    c.bench_function("circular layout", |b| {
        let layout = CircularLayout::new(10, 15.0, 1.4, 1.4, 0.3, 0.3);
        b.iter(|| {
            layout.generate_vec().unwrap();
        })
    });

    c.bench_function("hemisphere at 0.2 degrees", |b| {
        let sky = SkyPositions::hemisphere((0.2_f64.to_radians(), 0.2_f64.to_radians()));
        let mut directions = vec![SkyDirection::default(); sky.count().unwrap()];
        b.iter(|| {
            sky.generate(&mut directions).unwrap();
        })
    });
}

fn kernel(c: &mut Criterion) {
    let antennas = RegularGrid::new(32, 0.15).generate_vec().unwrap();
    let boresight = SkyDirection::from_degrees(0.0, 50.0);
    let directions = SkyPositions::new(
        boresight,
        (30_f64.to_radians(), 30_f64.to_radians()),
        (0.5_f64.to_radians(), 0.5_f64.to_radians()),
    )
    .generate_vec()
    .unwrap();
    let k = wavenumber(150e6);

    c.bench_function("calc_array_factor double", |b| {
        let mut image = vec![0.0; 2 * directions.len()];
        b.iter(|| {
            calc_array_factor_inner(&antennas, &directions, boresight, k, &mut image).unwrap();
        })
    });

    c.bench_function("calc_array_factor single", |b| {
        let antennas: Vec<Position2D<f32>> = antennas.iter().map(|a| a.cast()).collect();
        let directions: Vec<SkyDirection<f32>> = directions.iter().map(|d| d.cast()).collect();
        let mut image = vec![0.0; 2 * directions.len()];
        b.iter(|| {
            calc_array_factor_inner(&antennas, &directions, boresight.cast(), k as f32, &mut image)
                .unwrap();
        })
    });
}

criterion_group!(benches, generators, kernel);
criterion_main!(benches);
