//! Picking and selection primitives.

use glam::Vec3;

use crate::record::CoordinateSystem;

/// A world-space ray with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point, on the near plane for screen rays.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, normalizing the direction.
    ///
    /// Returns `None` for a zero-length direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.normalize_or_zero();
        if direction.length_squared() < 1e-12 {
            return None;
        }
        Some(Self { origin, direction })
    }

    /// Returns the point at distance `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a pick: which marker was hit and where.
#[derive(Debug, Clone, PartialEq)]
pub struct PickResult {
    /// `file_path` of the camera record behind the marker.
    pub camera_id: String,

    /// Whether the reference or candidate marker was hit.
    pub coordinate_system: CoordinateSystem,

    /// Distance along the ray to the hit.
    pub distance: f32,

    /// World position of the hit.
    pub world_position: Vec3,
}

/// Trait for scene objects that can be hit by a ray.
pub trait Pickable {
    /// Returns the distance along `ray` to the nearest intersection.
    fn ray_intersect(&self, ray: &Ray) -> Option<f32>;
}

/// Möller–Trumbore ray/triangle intersection, two-sided.
#[must_use]
pub fn ray_intersect_triangle(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    let eps = 1e-7;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < eps {
        return None;
    }
    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = f * edge2.dot(q);
    if t > eps { Some(t) } else { None }
}
