//! Ray-cast picking of pose markers.
//!
//! Picking is a pure query: it reads the camera and the markers and returns
//! the nearest hit, if any.

use glam::{Vec2, Vec4};
use posediff_core::{PickResult, Pickable, Ray};

use crate::camera::ViewCamera;
use crate::marker::PoseMarker;

/// Converts a pixel position to normalized device coordinates.
///
/// Pixel `(0, 0)` is the top-left corner and maps to `(-1, 1)`. Returns
/// `None` for an empty viewport.
#[must_use]
pub fn pixel_to_ndc(pixel: Vec2, width: u32, height: u32) -> Option<Vec2> {
    if width == 0 || height == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let (w, h) = (width as f32, height as f32);
    Some(Vec2::new(pixel.x / w * 2.0 - 1.0, 1.0 - pixel.y / h * 2.0))
}

/// Casts a ray from the camera through a point in normalized device coordinates.
#[must_use]
pub fn screen_ray(ndc: Vec2, camera: &ViewCamera) -> Option<Ray> {
    let inv_view_proj = camera.view_projection_matrix().inverse();

    // glam perspective_rh uses depth [0, 1]
    let near = inv_view_proj * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
    let far = inv_view_proj * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);

    if near.w.abs() < 1e-6 || far.w.abs() < 1e-6 {
        return None;
    }

    let origin = near.truncate() / near.w;
    let target = far.truncate() / far.w;
    Ray::new(origin, target - origin)
}

/// Returns the marker nearest along the ray, with its hit distance.
pub fn nearest_hit<'a>(ray: &Ray, markers: &'a [PoseMarker]) -> Option<(&'a PoseMarker, f32)> {
    markers
        .iter()
        .filter_map(|marker| marker.ray_intersect(ray).map(|t| (marker, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Picks the marker under a pointer position given in NDC.
pub fn pick(ndc: Vec2, camera: &ViewCamera, markers: &[PoseMarker]) -> Option<PickResult> {
    let ray = screen_ray(ndc, camera)?;
    let (marker, t) = nearest_hit(&ray, markers)?;
    log::debug!(
        "picked {} marker of {} at distance {t:.3}",
        marker.coordinate_system(),
        marker.camera_id()
    );
    Some(PickResult {
        camera_id: marker.camera_id().to_string(),
        coordinate_system: marker.coordinate_system(),
        distance: t,
        world_position: ray.at(t),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::ConeGeometry;
    use glam::Vec3;
    use posediff_core::{CoordinateSystem, DQuat, DVec3, Pose};

    fn side_camera() -> ViewCamera {
        let mut camera = ViewCamera::new(1.0);
        camera.position = Vec3::new(5.0, 0.0, 0.0);
        camera.target = Vec3::ZERO;
        camera.near = 0.1;
        camera
    }

    fn marker_at(id: &str, system: CoordinateSystem, x: f64) -> PoseMarker {
        PoseMarker::new(
            id,
            system,
            Pose::new(DVec3::new(x, 0.02, 0.0), DQuat::IDENTITY),
            &ConeGeometry::new(0.1, 0.3, 8),
            Vec3::ONE,
        )
    }

    #[test]
    fn test_pixel_to_ndc() {
        assert_eq!(pixel_to_ndc(Vec2::new(0.0, 0.0), 800, 600), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(pixel_to_ndc(Vec2::new(400.0, 300.0), 800, 600), Some(Vec2::ZERO));
        assert_eq!(pixel_to_ndc(Vec2::new(800.0, 600.0), 800, 600), Some(Vec2::new(1.0, -1.0)));
        assert!(pixel_to_ndc(Vec2::ZERO, 0, 600).is_none());
    }

    #[test]
    fn test_center_ray_follows_view_direction() {
        let ray = screen_ray(Vec2::ZERO, &side_camera()).unwrap();
        assert!((ray.direction - Vec3::NEG_X).length() < 1e-4);
        assert!((ray.origin.x - 4.9).abs() < 1e-3);
    }

    #[test]
    fn test_pick_returns_nearest_marker() {
        let markers = vec![
            marker_at("far.png", CoordinateSystem::Reference, -2.0),
            marker_at("near.png", CoordinateSystem::Candidate, 0.0),
        ];
        let hit = pick(Vec2::ZERO, &side_camera(), &markers).unwrap();
        assert_eq!(hit.camera_id, "near.png");
        assert_eq!(hit.coordinate_system, CoordinateSystem::Candidate);
        assert!(hit.world_position.x > 0.0 && hit.world_position.x < 0.1);
    }

    #[test]
    fn test_pick_miss_returns_none() {
        let markers = vec![marker_at("a.png", CoordinateSystem::Reference, 0.0)];
        assert!(pick(Vec2::new(0.9, 0.9), &side_camera(), &markers).is_none());
        assert!(pick(Vec2::ZERO, &side_camera(), &[]).is_none());
    }

    #[test]
    fn test_pick_is_repeatable() {
        let markers = vec![marker_at("a.png", CoordinateSystem::Reference, 0.0)];
        let camera = side_camera();
        assert_eq!(
            pick(Vec2::ZERO, &camera, &markers),
            pick(Vec2::ZERO, &camera, &markers)
        );
    }
}
