// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::f64::consts::FRAC_PI_2;

use approx::*;

use super::*;

fn deg(d: f64) -> f64 {
    d.to_radians()
}

/// The sector used by the regular and random beam scenarios.
fn sector(spacing_deg: f64) -> SkyPositions {
    SkyPositions::new(
        SkyDirection::from_degrees(0.0, 50.0),
        (deg(30.0), deg(30.0)),
        (deg(spacing_deg), deg(spacing_deg)),
    )
}

/// The angular distance between two directions.
fn separation(a: SkyDirection<f64>, b: SkyDirection<f64>) -> f64 {
    (a.el.sin() * b.el.sin() + a.el.cos() * b.el.cos() * (a.az - b.az).cos())
        .clamp(-1.0, 1.0)
        .acos()
}

#[test]
fn rectangular_counts() {
    // floor(2W/S) + 1 per axis.
    assert_eq!(sector(0.2).lattice_shape().unwrap(), (301, 301));
    assert_eq!(sector(0.2).count().unwrap(), 301 * 301);
    assert_eq!(sector(0.1).count().unwrap(), 601 * 601);

    let s = SkyPositions::new(SkyDirection::new(0.0, 0.5), (1.0, 0.5), (0.3, 0.2));
    assert_eq!(s.lattice_shape().unwrap(), (7, 6));
    assert_eq!(s.count().unwrap(), 42);
}

#[test]
fn spacing_is_limited_to_half_width() {
    let s = SkyPositions::new(SkyDirection::new(0.0, 0.5), (0.1, 0.1), (1.0, 0.05));
    assert_eq!(s.lattice_shape().unwrap(), (3, 5));
}

#[test]
fn count_matches_generate() {
    for spacing in [0.5, 1.0, 2.5, 7.0] {
        let s = sector(spacing);
        let n = s.count().unwrap();
        let mut buf = vec![SkyDirection::default(); n];
        assert_eq!(s.generate(&mut buf).unwrap(), n);
        assert_eq!(s.generate_vec().unwrap(), buf);
    }
}

#[test]
fn traversal_order() {
    let s = SkyPositions::new(SkyDirection::new(1.0, 0.2), (1.0, 0.1), (0.5, 0.1));
    let d = s.generate_vec().unwrap();
    assert_eq!(d.len(), 5 * 3);
    // Longitude varies fastest.
    assert_abs_diff_eq!(d[0].az, 0.0);
    assert_abs_diff_eq!(d[0].el, 0.1);
    assert_abs_diff_eq!(d[1].az, 0.5);
    assert_abs_diff_eq!(d[1].el, 0.1);
    assert_abs_diff_eq!(d[4].az, 2.0);
    assert_abs_diff_eq!(d[5].az, 0.0);
    assert_abs_diff_eq!(d[5].el, 0.2);
    assert_abs_diff_eq!(d[14].az, 2.0);
    assert_abs_diff_eq!(d[14].el, 0.3);
}

#[test]
fn centre_is_included_for_even_divisions() {
    let s = sector(0.2);
    let d = s.generate_vec().unwrap();
    let centre = d[150 * 301 + 150];
    assert_abs_diff_eq!(centre.az, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(centre.el, deg(50.0), epsilon = 1e-12);
}

#[test]
fn repeated_generation_is_identical() {
    let s = SkyPositions::hemisphere((deg(5.0), deg(5.0))).with_options(SectorOptions {
        above_horizon: true,
        mirror: Some(MirrorAxis::Latitude),
        projection: Projection::Sfl,
    });
    let a = s.generate_vec().unwrap();
    let b = s.generate_vec().unwrap();
    assert_eq!(a.len(), b.len());
    for (da, db) in a.iter().zip(b.iter()) {
        assert_eq!(da.az.to_bits(), db.az.to_bits());
        assert_eq!(da.el.to_bits(), db.el.to_bits());
    }
}

#[test]
fn hemisphere() {
    let s = SkyPositions::hemisphere((deg(10.0), deg(10.0)));
    assert_eq!(s.lattice_shape().unwrap(), (37, 10));
    let d = s.generate_vec().unwrap();
    assert_eq!(d.len(), 37 * 10);
    for dir in &d {
        assert!(dir.el >= -1e-12 && dir.el <= FRAC_PI_2 + 1e-12);
        assert!(dir.az >= -1e-12 && dir.az <= deg(360.0) + 1e-12);
    }
    // The last position is at the zenith.
    assert_abs_diff_eq!(d[d.len() - 1].el, FRAC_PI_2, epsilon = 1e-12);
}

#[test]
fn horizon_filter() {
    let centre = SkyDirection::new(0.0, 0.0);
    let s = SkyPositions::new(centre, (deg(10.0), deg(10.0)), (deg(5.0), deg(5.0)));
    assert_eq!(s.count().unwrap(), 25);

    let s = s.with_options(SectorOptions {
        above_horizon: true,
        ..Default::default()
    });
    // Only the latitudes 0, 5 and 10 degrees survive.
    assert_eq!(s.count().unwrap(), 15);
    for d in s.generate_vec().unwrap() {
        assert!(d.el > -1e-12);
    }
}

#[test]
fn mirroring() {
    let centre = SkyDirection::new(0.0, 0.0);
    let s = SkyPositions::new(centre, (1.0, 0.5), (0.3, 0.5));
    let plain = s.generate_vec().unwrap();
    let mirrored = s
        .with_options(SectorOptions {
            mirror: Some(MirrorAxis::Longitude),
            ..Default::default()
        })
        .generate_vec()
        .unwrap();
    assert_eq!(plain.len(), mirrored.len());
    assert_abs_diff_eq!(plain[0].az, -1.0);
    assert_abs_diff_eq!(mirrored[0].az, 1.0);
    for (p, m) in plain.iter().zip(mirrored.iter()) {
        assert_abs_diff_eq!(p.az, -m.az);
        assert_abs_diff_eq!(p.el, m.el);
    }

    let mirrored = s
        .with_options(SectorOptions {
            mirror: Some(MirrorAxis::Latitude),
            ..Default::default()
        })
        .generate_vec()
        .unwrap();
    assert_abs_diff_eq!(mirrored[0].el, 0.5);
}

#[test]
fn orthographic_projection() {
    let s = SkyPositions::new(SkyDirection::new(0.0, FRAC_PI_2), (1.0, 1.0), (0.5, 0.5))
        .with_options(SectorOptions {
            projection: Projection::Sin,
            ..Default::default()
        });
    // 5 x 5 lattice, minus the 12 points outside the unit circle.
    assert_eq!(s.count().unwrap(), 13);

    let s = SkyPositions::new(SkyDirection::new(0.3, deg(40.0)), (0.6, 0.6), (0.2, 0.2))
        .with_options(SectorOptions {
            projection: Projection::Sin,
            ..Default::default()
        });
    let d = s.generate_vec().unwrap();
    assert_eq!(d.len(), 49);
    // The middle of the lattice is the centre.
    assert_abs_diff_eq!(d[24].az, 0.3, epsilon = 1e-12);
    assert_abs_diff_eq!(d[24].el, deg(40.0), epsilon = 1e-12);
    // Distances from the centre are asin of the offset radius.
    let rho = 0.6_f64.hypot(0.6);
    assert_abs_diff_eq!(separation(d[0], s.centre), rho.asin(), epsilon = 1e-12);
    let rho = 0.2_f64.hypot(0.4);
    assert_abs_diff_eq!(separation(d[8 + 7], s.centre), rho.asin(), epsilon = 1e-12);
}

#[test]
fn gnomonic_projection() {
    let s = SkyPositions::new(SkyDirection::new(0.0, deg(20.0)), (2.0, 2.0), (1.0, 1.0))
        .with_options(SectorOptions {
            projection: Projection::Tan,
            ..Default::default()
        });
    let d = s.generate_vec().unwrap();
    // Nothing is dropped.
    assert_eq!(d.len(), 25);
    let rho = 2.0_f64.hypot(2.0);
    assert_abs_diff_eq!(separation(d[0], s.centre), rho.atan(), epsilon = 1e-12);
    assert_abs_diff_eq!(separation(d[13], s.centre), 1.0_f64.atan(), epsilon = 1e-12);
}

#[test]
fn sinusoidal_projection() {
    let s = SkyPositions::new(
        SkyDirection::from_degrees(0.0, 60.0),
        (deg(10.0), deg(1.0)),
        (deg(1.0), deg(1.0)),
    )
    .with_options(SectorOptions {
        projection: Projection::Sfl,
        ..Default::default()
    });
    assert_eq!(s.lattice_shape().unwrap(), (21, 3));
    let d = s.generate_vec().unwrap();
    // At 60 degrees latitude, longitude offsets are doubled.
    assert_abs_diff_eq!(d[21].el, deg(60.0), epsilon = 1e-12);
    assert_abs_diff_eq!(d[21].az, deg(-20.0), epsilon = 1e-12);
    assert_abs_diff_eq!(d[41].az, deg(20.0), epsilon = 1e-12);
}

#[test]
fn projection_parsing() {
    assert_eq!("none".parse::<Projection>().unwrap(), Projection::None);
    assert_eq!("SIN".parse::<Projection>().unwrap(), Projection::Sin);
    assert_eq!("gnomonic".parse::<Projection>().unwrap(), Projection::Tan);
    assert_eq!("sfl".parse::<Projection>().unwrap(), Projection::Sfl);
    assert!(matches!(
        "mercator".parse::<Projection>(),
        Err(BeamError::InvalidParameter { .. })
    ));

    assert_eq!(Projection::try_from(2).unwrap(), Projection::Tan);
    assert!(Projection::try_from(4).is_err());
    assert!(Projection::try_from(-1).is_err());
    for p in [Projection::None, Projection::Sin, Projection::Tan, Projection::Sfl] {
        assert_eq!(p.to_string().parse::<Projection>().unwrap(), p);
    }
}

#[test]
fn bad_params() {
    let centre = SkyDirection::new(0.0, 0.5);
    for s in [
        SkyPositions::new(centre, (0.0, 0.5), (0.1, 0.1)),
        SkyPositions::new(centre, (0.5, -0.5), (0.1, 0.1)),
        SkyPositions::new(centre, (0.5, 0.5), (0.0, 0.1)),
        SkyPositions::new(centre, (0.5, 0.5), (0.1, -0.1)),
        SkyPositions::new(centre, (0.5, 0.5), (0.1, f64::NAN)),
        SkyPositions::new(centre, (1.0, 1.0), (1e-9, 1e-9)),
    ] {
        assert!(
            matches!(s.count(), Err(BeamError::InvalidParameter { .. })),
            "{s:?}"
        );
    }

    let s = SkyPositions::new(SkyDirection::new(f64::NAN, 0.5), (0.5, 0.5), (0.1, 0.1));
    assert!(matches!(s.count(), Err(BeamError::NonFiniteInput { .. })));
}

#[test]
fn vanishing_spacing_is_rejected() {
    for s in [
        SkyPositions::new(SkyDirection::new(0.0, 0.5), (1.0, 1.0), (1e-310, 0.1)),
        SkyPositions::new(SkyDirection::new(0.0, 0.5), (1.0, 1.0), (0.1, 1e-19)),
        SkyPositions::new(SkyDirection::new(0.0, 0.5), (1.0, 1.0), (1e-19, 1e-19)),
    ] {
        assert!(matches!(
            s.lattice_shape(),
            Err(BeamError::InvalidParameter {
                name: "sky spacing",
                ..
            })
        ));
        assert!(matches!(
            s.count(),
            Err(BeamError::InvalidParameter { .. })
        ));
        let mut buf = vec![SkyDirection::default(); 4];
        assert!(matches!(
            s.generate(&mut buf),
            Err(BeamError::InvalidParameter { .. })
        ));
    }
}

#[test]
fn small_buffer() {
    let s = sector(5.0);
    let n = s.count().unwrap();
    let mut buf = vec![SkyDirection::default(); n - 1];
    assert_eq!(
        s.generate(&mut buf),
        Err(BeamError::BufferTooSmall {
            name: "sky position",
            required: n,
            got: n - 1
        })
    );
}

#[test]
fn leading_zenith_slot() {
    // Callers can put their own point first and generate into the rest.
    let s = SkyPositions::hemisphere((deg(15.0), deg(15.0)));
    let n = s.count().unwrap();
    let mut buf = vec![SkyDirection::default(); n + 1];
    buf[0] = SkyDirection::zenith();
    assert_eq!(s.generate(&mut buf[1..]).unwrap(), n);
    assert_eq!(buf[0], SkyDirection::zenith());
    assert_eq!(&buf[1..], s.generate_vec().unwrap().as_slice());
}
