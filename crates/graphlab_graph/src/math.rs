// SPDX-License-Identifier: MIT OR Apache-2.0
//! Minimal 3D vector and ray math used for layout and picking.
//!
//! The scene is Y-up: the ground plane is XZ.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// Tolerance below which lengths and denominators are treated as zero
pub const EPSILON: f32 = 1e-6;

/// A point or direction in 3-space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component
    pub x: f32,
    /// Y component (up)
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vec3 {
    /// The origin
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// Unit X axis
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    /// Unit Y axis (up)
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    /// Unit Z axis
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    /// Create a new vector
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Dot product
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean length
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Distance to another point
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Unit vector in the same direction, or `None` for a zero vector
    pub fn try_normalize(self) -> Option<Self> {
        let len = self.length();
        (len > EPSILON).then(|| self * (1.0 / len))
    }

    /// Projection onto the ground plane (Y dropped)
    pub fn horizontal(self) -> Self {
        Self::new(self.x, 0.0, self.z)
    }

    /// Linear interpolation
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }

    /// Midpoint between two points
    pub fn midpoint(self, other: Self) -> Self {
        self.lerp(other, 0.5)
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// A pointer ray cast from the camera into the scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// Ray origin
    pub origin: Vec3,
    /// Ray direction (normalized on construction)
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; a zero direction falls back to looking down -Y
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.try_normalize().unwrap_or(-Vec3::Y),
        }
    }

    /// Point at parameter `t` along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Intersect with the horizontal plane `y = height`
    ///
    /// Returns `None` when the ray is parallel to the plane or the plane
    /// lies behind the origin.
    pub fn intersect_horizontal_plane(&self, height: f32) -> Option<Vec3> {
        if self.direction.y.abs() < EPSILON {
            return None;
        }
        let t = (height - self.origin.y) / self.direction.y;
        (t >= 0.0).then(|| self.at(t))
    }

    /// Distance along the ray to the nearest hit on a sphere
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.dot(oc) - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();
        let near = -b - sqrt_d;
        if near >= 0.0 {
            return Some(near);
        }
        let far = -b + sqrt_d;
        (far >= 0.0).then_some(far)
    }

    /// Closest approach between the ray and a segment
    ///
    /// Returns `(distance_between, distance_along_ray)`.
    pub fn distance_to_segment(&self, a: Vec3, b: Vec3) -> (f32, f32) {
        let d1 = self.direction;
        let d2 = b - a;
        let r = self.origin - a;
        let e = d2.dot(d2);
        let f = d2.dot(r);

        let c = d1.dot(r);

        let (t, s) = if e < EPSILON {
            // Degenerate segment: closest point on the ray to `a`
            ((-c).max(0.0), 0.0)
        } else {
            let b_ = d1.dot(d2);
            let denom = e - b_ * b_;
            let t = if denom > EPSILON {
                ((b_ * f - c * e) / denom).max(0.0)
            } else {
                0.0
            };
            let s = (b_ * t + f) / e;
            if s < 0.0 {
                ((-c).max(0.0), 0.0)
            } else if s > 1.0 {
                ((b_ - c).max(0.0), 1.0)
            } else {
                (t, s)
            }
        };

        let on_ray = self.at(t);
        let on_segment = a + d2 * s;
        (on_ray.distance(on_segment), t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_normalize() {
        assert!(Vec3::ZERO.try_normalize().is_none());
        let n = Vec3::new(3.0, 0.0, 4.0).try_normalize().unwrap();
        assert!(approx(n.length(), 1.0));
    }

    #[test]
    fn test_plane_intersection() {
        let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let hit = ray.intersect_horizontal_plane(2.0).unwrap();
        assert!(approx(hit.x, 8.0));
        assert!(approx(hit.y, 2.0));

        let flat = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(flat.intersect_horizontal_plane(1.0).is_none());

        let away = Ray::new(Vec3::ZERO, Vec3::Y);
        assert!(away.intersect_horizontal_plane(-1.0).is_none());
    }

    #[test]
    fn test_sphere_intersection() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
        let t = ray.intersect_sphere(Vec3::ZERO, 1.0).unwrap();
        assert!(approx(t, 9.0));
        assert!(ray.intersect_sphere(Vec3::new(5.0, 0.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn test_segment_distance() {
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y);
        let (dist, along) = ray.distance_to_segment(Vec3::new(-1.0, 0.0, 0.5), Vec3::new(1.0, 0.0, 0.5));
        assert!(approx(dist, 0.5));
        assert!(approx(along, 5.0));

        let (far, _) = ray.distance_to_segment(Vec3::new(3.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0));
        assert!(approx(far, 3.0));
    }
}
