//! Spatial math for target selection.
//!
//! Positions are `glam` double-precision vectors. Entities that only know a
//! ground plane position (x/z) report `y = 0.0`.

pub use glam::DVec3 as Vec3;

/// Build a position from a ground plane (x/z) pair.
#[must_use]
pub const fn planar(x: f64, z: f64) -> Vec3 {
    Vec3::new(x, 0.0, z)
}

/// Unit vector from `from` towards `to`, or `None` if they coincide.
#[must_use]
pub fn direction_to(from: Vec3, to: Vec3) -> Option<Vec3> {
    (to - from).try_normalize()
}

/// Angle between two directions in degrees; zero if either is degenerate.
#[must_use]
pub fn angle_between_deg(a: Vec3, b: Vec3) -> f64 {
    if a.length_squared() * b.length_squared() <= f64::EPSILON {
        return 0.0;
    }
    a.angle_between(b).to_degrees()
}

/// Projection of a point onto a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayProjection {
    /// Signed distance along the ray from its origin.
    pub along: f64,
    /// Perpendicular distance from the ray.
    pub offset: f64,
}

/// Project `point` onto the ray starting at `origin` with unit `direction`.
#[must_use]
pub fn project_onto_ray(origin: Vec3, direction: Vec3, point: Vec3) -> RayProjection {
    let along = (point - origin).dot(direction);
    RayProjection {
        along,
        offset: point.distance(origin + direction * along),
    }
}
