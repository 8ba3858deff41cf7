//! 2-D vector math and factory octants.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

// ---------------------------------------------------------------------------
// Vec2
// ---------------------------------------------------------------------------

/// A 2-D vector, y up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction; zero stays zero.
    #[inline]
    pub fn normalize(self) -> Vec2 {
        let len = self.length();
        if len == 0.0 {
            Vec2::ZERO
        } else {
            Vec2::new(self.x / len, self.y / len)
        }
    }

    /// Rotate counter-clockwise by `angle` radians.
    #[inline]
    pub fn rotate(self, angle: f32) -> Vec2 {
        let (sin, cos) = angle.sin_cos();
        Vec2::new(
            cos * self.x - sin * self.y,
            sin * self.x + cos * self.y,
        )
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

// ---------------------------------------------------------------------------
// Octants
// ---------------------------------------------------------------------------

/// One of the eight discretized directions a spring can leave a point at,
/// fixed at ship-factory time. Octant 0 points east (+x); octants increase
/// clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Octant(pub u8);

impl Octant {
    /// Discretize a direction vector into its nearest octant.
    pub fn from_direction(dir: Vec2) -> Octant {
        // Clockwise angle from +x, in [0, 2pi).
        let mut cw = -dir.y.atan2(dir.x);
        if cw < 0.0 {
            cw += 2.0 * PI;
        }
        let octant = (cw / (PI / 4.0)).round() as u32 % 8;
        Octant(octant as u8)
    }

    /// The octant pointing the opposite way.
    #[inline]
    pub fn opposite(self) -> Octant {
        Octant((self.0 + 4) % 8)
    }

    /// Clockwise angle from +x, in radians.
    #[inline]
    pub fn to_cw_angle(self) -> f32 {
        self.0 as f32 * (PI / 4.0)
    }
}

// ---------------------------------------------------------------------------
// Scalar helpers
// ---------------------------------------------------------------------------

/// Hermite smoothstep of `x` over `[edge0, edge1]`.
#[inline]
pub fn smooth_step(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "{a} != {b}");
    }

    #[test]
    fn vec2_arithmetic() {
        let v = Vec2::new(1.0, 2.0) + Vec2::new(3.0, -1.0);
        assert_eq!(v, Vec2::new(4.0, 1.0));
        assert_eq!(v * 2.0, Vec2::new(8.0, 2.0));
        assert_eq!(-v, Vec2::new(-4.0, -1.0));
    }

    #[test]
    fn normalize_unit_length() {
        let v = Vec2::new(3.0, 4.0).normalize();
        assert_close(v.length(), 1.0);
        assert_close(v.x, 0.6);
        assert_close(v.y, 0.8);
    }

    #[test]
    fn normalize_zero_stays_zero() {
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
    }

    #[test]
    fn rotate_quarter_turn() {
        let v = Vec2::new(1.0, 0.0).rotate(PI / 2.0);
        assert_close(v.x, 0.0);
        assert_close(v.y, 1.0);
    }

    #[test]
    fn octant_cardinal_directions() {
        assert_eq!(Octant::from_direction(Vec2::new(1.0, 0.0)), Octant(0));
        assert_eq!(Octant::from_direction(Vec2::new(0.0, -1.0)), Octant(2));
        assert_eq!(Octant::from_direction(Vec2::new(-1.0, 0.0)), Octant(4));
        assert_eq!(Octant::from_direction(Vec2::new(0.0, 1.0)), Octant(6));
    }

    #[test]
    fn octant_diagonals() {
        assert_eq!(Octant::from_direction(Vec2::new(1.0, -1.0)), Octant(1));
        assert_eq!(Octant::from_direction(Vec2::new(-1.0, 1.0)), Octant(5));
    }

    #[test]
    fn octant_opposite() {
        for o in 0..8u8 {
            assert_eq!(Octant(o).opposite().opposite(), Octant(o));
        }
        assert_eq!(Octant(1).opposite(), Octant(5));
    }

    #[test]
    fn octant_round_trips_through_cw_angle() {
        for o in 0..8u8 {
            let angle = Octant(o).to_cw_angle();
            let dir = Vec2::new(angle.cos(), -angle.sin());
            assert_eq!(Octant::from_direction(dir), Octant(o));
        }
    }

    #[test]
    fn smooth_step_edges() {
        assert_eq!(smooth_step(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smooth_step(0.0, 1.0, 2.0), 1.0);
        assert_close(smooth_step(0.0, 1.0, 0.5), 0.5);
    }
}
