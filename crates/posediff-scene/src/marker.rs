//! Pose markers: one cone per decomposed camera pose.
//!
//! A marker's cone has its apex behind the camera centre and its base
//! opening along the viewing direction (camera −Z), so the cone reads as the
//! direction the camera was looking.

use glam::{Mat4, Vec3};
use posediff_core::{pick::Pickable, ray_intersect_triangle, CoordinateSystem, MarkerOptions, Pose, Ray};

/// Cone mesh shared by all markers, in marker-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ConeGeometry {
    radius: f32,
    height: f32,
    radial_segments: u32,
}

impl ConeGeometry {
    /// Creates a cone; fewer than 3 segments is raised to 3.
    #[must_use]
    pub fn new(radius: f32, height: f32, radial_segments: u32) -> Self {
        Self {
            radius: radius.abs(),
            height: height.abs(),
            radial_segments: radial_segments.max(3),
        }
    }

    /// Creates the cone described by marker options.
    #[must_use]
    pub fn from_options(options: &MarkerOptions) -> Self {
        Self::new(options.radius, options.height, options.radial_segments)
    }

    /// Returns the local-space triangles: the side fan then the base cap.
    #[must_use]
    pub fn local_triangles(&self) -> Vec<[Vec3; 3]> {
        let half = self.height * 0.5;
        let apex = Vec3::new(0.0, 0.0, half);
        let base_center = Vec3::new(0.0, 0.0, -half);
        let n = self.radial_segments;

        #[allow(clippy::cast_precision_loss)]
        let ring: Vec<Vec3> = (0..n)
            .map(|i| {
                let theta = std::f32::consts::TAU * i as f32 / n as f32;
                Vec3::new(self.radius * theta.cos(), self.radius * theta.sin(), -half)
            })
            .collect();

        let mut triangles = Vec::with_capacity(2 * ring.len());
        for i in 0..ring.len() {
            let next = ring[(i + 1) % ring.len()];
            triangles.push([apex, ring[i], next]);
            triangles.push([base_center, next, ring[i]]);
        }
        triangles
    }
}

/// A rendered pose of one camera in one coordinate system.
///
/// Markers are immutable; a rebuild replaces them.
#[derive(Debug, Clone)]
pub struct PoseMarker {
    camera_id: String,
    coordinate_system: CoordinateSystem,
    pose: Pose,
    model: Mat4,
    color: Vec3,
    world_triangles: Vec<[Vec3; 3]>,
}

impl PoseMarker {
    /// Creates a marker and places the cone geometry in world space.
    pub fn new(
        camera_id: impl Into<String>,
        coordinate_system: CoordinateSystem,
        pose: Pose,
        geometry: &ConeGeometry,
        color: Vec3,
    ) -> Self {
        let model = Mat4::from_rotation_translation(
            pose.orientation.as_quat().normalize(),
            pose.position.as_vec3(),
        );
        let world_triangles = geometry
            .local_triangles()
            .into_iter()
            .map(|tri| tri.map(|v| model.transform_point3(v)))
            .collect();
        Self {
            camera_id: camera_id.into(),
            coordinate_system,
            pose,
            model,
            color,
            world_triangles,
        }
    }

    /// Returns the `file_path` of the source camera record.
    pub fn camera_id(&self) -> &str {
        &self.camera_id
    }

    /// Returns which pipeline this marker shows.
    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.coordinate_system
    }

    /// Returns the decomposed pose.
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Returns the model matrix placing the cone in the world.
    pub fn model(&self) -> Mat4 {
        self.model
    }

    /// Returns the marker color.
    pub fn color(&self) -> Vec3 {
        self.color
    }

    /// Returns the world-space position of the camera centre.
    pub fn position(&self) -> Vec3 {
        self.model.w_axis.truncate()
    }

    /// Returns the world-space triangles used for picking.
    pub fn triangles(&self) -> &[[Vec3; 3]] {
        &self.world_triangles
    }

    /// Returns the GPU instance data for this marker.
    pub fn instance(&self) -> MarkerInstance {
        MarkerInstance {
            model: self.model.to_cols_array_2d(),
            color: self.color.to_array(),
            coordinate_system: match self.coordinate_system {
                CoordinateSystem::Reference => 0,
                CoordinateSystem::Candidate => 1,
            },
        }
    }
}

impl Pickable for PoseMarker {
    fn ray_intersect(&self, ray: &Ray) -> Option<f32> {
        self.world_triangles
            .iter()
            .filter_map(|[v0, v1, v2]| ray_intersect_triangle(ray, *v0, *v1, *v2))
            .min_by(f32::total_cmp)
    }
}

/// GPU instance data for one marker.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MarkerInstance {
    /// Model matrix, column-major.
    pub model: [[f32; 4]; 4],
    /// Linear RGB color.
    pub color: [f32; 3],
    /// 0 = reference, 1 = candidate.
    pub coordinate_system: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DQuat, DVec3};

    #[test]
    fn test_cone_triangle_count() {
        let cone = ConeGeometry::new(0.1, 0.3, 8);
        assert_eq!(cone.local_triangles().len(), 16);
        assert_eq!(ConeGeometry::new(0.1, 0.3, 1).local_triangles().len(), 6);
    }

    #[test]
    fn test_cone_opens_along_negative_z() {
        let cone = ConeGeometry::new(0.1, 0.3, 8);
        let tris = cone.local_triangles();
        assert!((tris[0][0] - Vec3::new(0.0, 0.0, 0.15)).length() < 1e-6);
        assert!(tris.iter().flatten().all(|v| v.z >= -0.15 - 1e-6));
    }

    #[test]
    fn test_marker_follows_pose() {
        let pose = Pose::new(
            DVec3::new(1.0, 2.0, 3.0),
            DQuat::from_rotation_y(std::f64::consts::FRAC_PI_2),
        );
        let marker = PoseMarker::new(
            "a.png",
            CoordinateSystem::Reference,
            pose,
            &ConeGeometry::new(0.1, 0.3, 8),
            Vec3::Z,
        );
        assert_eq!(marker.position(), Vec3::new(1.0, 2.0, 3.0));
        // Local +Z apex rotates onto world +X.
        let apex = marker.triangles()[0][0];
        assert!((apex - Vec3::new(1.15, 2.0, 3.0)).length() < 1e-5);
        assert_eq!(marker.instance().coordinate_system, 0);
    }

    #[test]
    fn test_marker_instance_is_pod() {
        let marker = PoseMarker::new(
            "a.png",
            CoordinateSystem::Candidate,
            Pose::default(),
            &ConeGeometry::new(0.1, 0.3, 8),
            Vec3::X,
        );
        let instances = [marker.instance()];
        let bytes: &[u8] = bytemuck::cast_slice(&instances);
        assert_eq!(bytes.len(), std::mem::size_of::<MarkerInstance>());
        assert_eq!(bytes.len(), 80);
    }

    #[test]
    fn test_ray_through_side_hits() {
        let marker = PoseMarker::new(
            "a.png",
            CoordinateSystem::Candidate,
            Pose::new(DVec3::new(0.0, 0.02, 0.0), DQuat::IDENTITY),
            &ConeGeometry::new(0.1, 0.3, 8),
            Vec3::X,
        );
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_X).unwrap();
        let t = marker.ray_intersect(&ray).unwrap();
        assert!(t > 4.9 && t < 5.0);

        let miss = Ray::new(Vec3::new(5.0, 1.0, 0.0), Vec3::NEG_X).unwrap();
        assert!(marker.ray_intersect(&miss).is_none());
    }
}
