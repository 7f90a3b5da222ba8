use std::ops::Mul;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ANGLE_DEG, EPSILON};

/// A vector in R⁴, one edge of an interaction geometry.
///
/// Unlike a rotation quaternion this is never normalized: its magnitude
/// carries the quantized span or payload weight it was built from.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Vector4 {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PartialEq for Vector4 {
    fn eq(&self, other: &Self) -> bool {
        (self.w - other.w).abs() < EPSILON
            && (self.x - other.x).abs() < EPSILON
            && (self.y - other.y).abs() < EPSILON
            && (self.z - other.z).abs() < EPSILON
    }
}

impl Vector4 {
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// 4D dot product.
    pub fn dot(self, other: Self) -> f64 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean norm. Always non-negative.
    pub fn magnitude(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Angle to `other` in degrees, range [0, 180].
    /// Either operand at zero magnitude yields exactly 90°.
    pub fn angle_between(self, other: Self) -> f64 {
        let m1 = self.magnitude();
        let m2 = other.magnitude();
        if m1 == 0.0 || m2 == 0.0 {
            return DEFAULT_ANGLE_DEG;
        }
        let cos_theta = (self.dot(other) / (m1 * m2)).clamp(-1.0, 1.0);
        cos_theta.acos().to_degrees()
    }
}

/// Uniform scaling.
impl Mul<f64> for Vector4 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self {
            w: self.w * rhs,
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}
