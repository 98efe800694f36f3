// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rigid rotations of antenna positions.
//!
//! Rotations are active: a positive angle turns points anticlockwise when
//! looking down the rotation axis towards the origin. Rotating (1, 0, 0) by
//! 90 degrees about Z gives (0, 1, 0).

use crate::{BeamError, BeamFloat, Position2D, Position3D};

/// The axis a rotation is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A 3x3 matrix, stored row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3<F = f64>(pub [[F; 3]; 3]);

impl<F: BeamFloat> Matrix3<F> {
    pub fn identity() -> Matrix3<F> {
        let (o, i) = (F::zero(), F::one());
        Matrix3([[i, o, o], [o, i, o], [o, o, i]])
    }

    pub fn rotation_x(angle_rad: F) -> Matrix3<F> {
        let (s, c) = angle_rad.sin_cos();
        let (o, i) = (F::zero(), F::one());
        Matrix3([[i, o, o], [o, c, -s], [o, s, c]])
    }

    pub fn rotation_y(angle_rad: F) -> Matrix3<F> {
        let (s, c) = angle_rad.sin_cos();
        let (o, i) = (F::zero(), F::one());
        Matrix3([[c, o, s], [o, i, o], [-s, o, c]])
    }

    pub fn rotation_z(angle_rad: F) -> Matrix3<F> {
        let (s, c) = angle_rad.sin_cos();
        let (o, i) = (F::zero(), F::one());
        Matrix3([[c, -s, o], [s, c, o], [o, o, i]])
    }

    pub fn rotation(axis: Axis, angle_rad: F) -> Matrix3<F> {
        match axis {
            Axis::X => Matrix3::rotation_x(angle_rad),
            Axis::Y => Matrix3::rotation_y(angle_rad),
            Axis::Z => Matrix3::rotation_z(angle_rad),
        }
    }

    /// For a rotation matrix, this is also the inverse.
    pub fn transpose(&self) -> Matrix3<F> {
        let m = &self.0;
        Matrix3([
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        ])
    }

    pub fn is_identity(&self) -> bool {
        *self == Matrix3::identity()
    }

    /// Apply this matrix to a single point.
    pub fn apply(&self, p: Position3D<F>) -> Position3D<F> {
        // Skip the arithmetic so that a zero-angle rotation returns exactly
        // the input, signed zeros included.
        if self.is_identity() {
            return p;
        }
        let m = &self.0;
        Position3D {
            x: m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z,
            y: m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z,
            z: m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z,
        }
    }

    /// Rotate horizontal points, each with an implicit z of 0.
    pub fn transform_points(&self, points: &[Position2D<F>]) -> Vec<Position3D<F>> {
        points
            .iter()
            .map(|&p| self.apply(Position3D::from(p)))
            .collect()
    }

    pub fn transform_points_3d(&self, points: &[Position3D<F>]) -> Vec<Position3D<F>> {
        points.iter().map(|&p| self.apply(p)).collect()
    }
}

impl<F: BeamFloat> std::ops::Mul for Matrix3<F> {
    type Output = Matrix3<F>;

    /// `a * b` applies `b` first, then `a`.
    fn mul(self, rhs: Matrix3<F>) -> Matrix3<F> {
        let mut out = [[F::zero(); 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = (0..3).fold(F::zero(), |acc, k| acc + self.0[i][k] * rhs.0[k][j]);
            }
        }
        Matrix3(out)
    }
}

/// Rotate horizontal `points` by `angle_rad` about `axis`. An empty input
/// gives an empty output.
pub fn rotate_points<F: BeamFloat>(
    axis: Axis,
    angle_rad: F,
    points: &[Position2D<F>],
) -> Result<Vec<Position3D<F>>, BeamError> {
    if !angle_rad.is_finite() {
        return Err(BeamError::NonFiniteInput {
            what: "rotation angle",
            index: 0,
        });
    }
    Ok(Matrix3::rotation(axis, angle_rad).transform_points(points))
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_abs_diff_eq;

    use super::*;

    fn points() -> Vec<Position2D<f64>> {
        vec![
            Position2D::new(13.108, 10.024),
            Position2D::new(17.494, -13.319),
            Position2D::new(-0.0, 22.288),
            Position2D::new(-19.412, 4.5243),
            Position2D::new(0.0, 0.0),
        ]
    }

    #[test]
    fn zero_angle_is_exact() {
        let rotated = rotate_points(Axis::Z, 0.0, &points()).unwrap();
        for (r, p) in rotated.iter().zip(points()) {
            assert_eq!(r.x.to_bits(), p.x.to_bits());
            assert_eq!(r.y.to_bits(), p.y.to_bits());
            assert_eq!(r.z, 0.0);
        }
    }

    #[test]
    fn round_trip() {
        for &axis in &[Axis::X, Axis::Y, Axis::Z] {
            for i in -12..=12 {
                let angle = i as f64 * 0.3;
                let forward = Matrix3::rotation(axis, angle);
                let backward = Matrix3::rotation(axis, -angle);
                let there = forward.transform_points(&points());
                let back = backward.transform_points_3d(&there);
                for (b, p) in back.iter().zip(points()) {
                    assert_abs_diff_eq!(b.x, p.x, epsilon = 1e-12);
                    assert_abs_diff_eq!(b.y, p.y, epsilon = 1e-12);
                    assert_abs_diff_eq!(b.z, 0.0, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn distances_are_preserved() {
        let original = points();
        let rotated = rotate_points(Axis::Y, 1.234, &original).unwrap();
        for i in 0..original.len() {
            for j in 0..original.len() {
                let before = original[i].distance(original[j]);
                let after = rotated[i].distance(rotated[j]);
                assert_abs_diff_eq!(before, after, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn quarter_turns() {
        let p = [Position2D::new(1.0, 0.0)];
        let r = rotate_points(Axis::Z, FRAC_PI_2, &p).unwrap();
        assert_abs_diff_eq!(r[0].x, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(r[0].y, 1.0, epsilon = 1e-15);

        // Rotating about X moves north into up.
        let p = [Position2D::new(0.0, 2.0)];
        let r = rotate_points(Axis::X, FRAC_PI_2, &p).unwrap();
        assert_abs_diff_eq!(r[0].y, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(r[0].z, 2.0, epsilon = 1e-15);
    }

    #[test]
    fn transpose_inverts() {
        let m = Matrix3::rotation_z(0.7) * Matrix3::rotation_x(-0.2);
        let product = m * m.transpose();
        let identity = Matrix3::<f64>::identity();
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(product.0[i][j], identity.0[i][j], epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn empty_and_invalid_input() {
        let r = rotate_points::<f64>(Axis::Z, 0.5, &[]).unwrap();
        assert!(r.is_empty());

        let r = rotate_points(Axis::Z, f64::NAN, &points());
        assert!(matches!(r, Err(BeamError::NonFiniteInput { .. })));
        let r = rotate_points(Axis::X, f32::INFINITY, &[Position2D::new(1.0_f32, 1.0)]);
        assert!(r.is_err());
    }
}
