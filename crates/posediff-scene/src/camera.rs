//! Interactive view camera with damped orbit controls.

use glam::{Mat4, Vec2, Vec3};
use posediff_core::ViewOptions;

/// Pending orbit motion below this is dropped.
const SETTLE_EPSILON: f32 = 1e-5;

/// A perspective camera orbiting a target point.
///
/// Orbit input is accumulated by [`ViewCamera::rotate`] and applied gradually
/// by [`ViewCamera::update`], once per frame, so the view glides to rest.
#[derive(Debug, Clone)]
pub struct ViewCamera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Fraction of pending orbit applied per update; 0 applies it at once.
    pub damping_factor: f32,
    /// Orbit still to be applied (radians around up, radians toward up).
    pending_orbit: Vec2,
}

impl ViewCamera {
    /// Creates a camera at `(0, 0, 3)` looking at the origin.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_4,
            aspect_ratio,
            near: 0.01,
            far: 1000.0,
            damping_factor: 0.0,
            pending_orbit: Vec2::ZERO,
        }
    }

    /// Creates a camera from configuration.
    #[must_use]
    pub fn from_options(options: &ViewOptions) -> Self {
        Self {
            position: options.position,
            target: options.target,
            up: Vec3::Y,
            fov: options.fov_degrees.to_radians(),
            aspect_ratio: options.aspect_ratio,
            near: options.near,
            far: options.far,
            damping_factor: options.damping_factor.clamp(0.0, 1.0),
            pending_orbit: Vec2::ZERO,
        }
    }

    /// Sets the aspect ratio; ignored for a zero-height viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            #[allow(clippy::cast_precision_loss)]
            let aspect = width as f32 / height as f32;
            self.aspect_ratio = aspect;
        }
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Returns the projection matrix (depth range [0, 1]).
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Returns the camera's forward direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Returns the camera's right direction.
    ///
    /// When looking straight along `up` any axis perpendicular to the view
    /// direction is returned.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        let forward = self.forward();
        forward
            .cross(self.up)
            .try_normalize()
            .unwrap_or_else(|| forward.any_orthonormal_vector())
    }

    /// Orbits the camera around the target immediately.
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        let radius = (self.position - self.target).length();
        if radius < f32::EPSILON {
            return;
        }
        let mut theta = (self.position.x - self.target.x).atan2(self.position.z - self.target.z);
        let mut phi = ((self.position.y - self.target.y) / radius).clamp(-1.0, 1.0).acos();

        theta -= delta_x;
        phi = (phi - delta_y).clamp(0.01, std::f32::consts::PI - 0.01);

        self.position = self.target
            + Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
    }

    /// Queues orbit motion to be applied by [`ViewCamera::update`].
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        self.pending_orbit += Vec2::new(delta_x, delta_y);
    }

    /// Applies one frame of queued orbit motion.
    ///
    /// Returns `true` if the camera moved.
    pub fn update(&mut self) -> bool {
        if self.pending_orbit.length() < SETTLE_EPSILON {
            self.pending_orbit = Vec2::ZERO;
            return false;
        }
        if self.damping_factor > 0.0 {
            let step = self.pending_orbit * self.damping_factor;
            self.orbit(step.x, step.y);
            self.pending_orbit *= 1.0 - self.damping_factor;
        } else {
            self.orbit(self.pending_orbit.x, self.pending_orbit.y);
            self.pending_orbit = Vec2::ZERO;
        }
        true
    }

    /// Returns whether queued orbit motion remains.
    #[must_use]
    pub fn is_settling(&self) -> bool {
        self.pending_orbit.length() >= SETTLE_EPSILON
    }

    /// Pans the camera.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let offset = self.right() * delta_x + self.up * delta_y;
        self.position += offset;
        self.target += offset;
    }

    /// Moves toward (positive) or away from the target.
    pub fn zoom(&mut self, delta: f32) {
        let direction = self.forward();
        let distance = (self.position - self.target).length();
        let new_distance = (distance - delta).max(0.1);
        self.position = self.target - direction * new_distance;
    }

    /// Frames the given bounding box, keeping the current viewing direction.
    pub fn look_at_box(&mut self, min: Vec3, max: Vec3) {
        let center = (min + max) * 0.5;
        let size = (max - min).length().max(1.0);
        let direction = self.forward();

        self.target = center;
        self.position = center - direction * size * 1.5;
        self.pending_orbit = Vec2::ZERO;
    }

    /// Returns FOV in degrees.
    #[must_use]
    pub fn fov_degrees(&self) -> f32 {
        self.fov.to_degrees()
    }
}

impl Default for ViewCamera {
    fn default() -> Self {
        Self::from_options(&ViewOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_options() {
        let camera = ViewCamera::default();
        assert_eq!(camera.position, Vec3::new(5.0, 5.0, 5.0));
        assert!((camera.fov_degrees() - 75.0).abs() < 1e-4);
        assert!((camera.damping_factor - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut camera = ViewCamera::new(1.0);
        camera.resize(800, 400);
        assert!((camera.aspect_ratio - 2.0).abs() < 1e-6);
        camera.resize(800, 0);
        assert!((camera.aspect_ratio - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_orbit_preserves_radius() {
        let mut camera = ViewCamera::new(1.0);
        camera.position = Vec3::new(0.0, 0.0, 5.0);
        camera.orbit(0.5, 0.2);
        assert!((camera.position.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_damped_orbit_converges_to_full_motion() {
        let mut damped = ViewCamera::new(1.0);
        damped.position = Vec3::new(0.0, 0.0, 5.0);
        damped.damping_factor = 0.05;
        let mut direct = damped.clone();
        direct.damping_factor = 0.0;

        damped.rotate(0.4, 0.0);
        direct.rotate(0.4, 0.0);
        assert!(direct.update());
        assert!(!direct.is_settling());

        let mut frames = 0;
        while damped.update() {
            frames += 1;
            assert!(frames < 1000, "damped orbit never settled");
        }
        assert!(frames > 1);
        assert!((damped.position - direct.position).length() < 1e-2);
    }

    #[test]
    fn test_pan_looking_along_up_stays_finite() {
        let mut camera = ViewCamera::new(1.0);
        camera.position = Vec3::new(0.0, 5.0, 0.0);
        camera.target = Vec3::ZERO;

        let right = camera.right();
        assert!(right.is_finite());
        assert!((right.length() - 1.0).abs() < 1e-5);
        assert!(right.dot(camera.forward()).abs() < 1e-5);

        camera.pan(0.5, 0.25);
        assert!(camera.position.is_finite());
        assert!(camera.target.is_finite());
        assert!((camera.position.distance(camera.target) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_decreases_distance() {
        let mut camera = ViewCamera::new(1.0);
        camera.position = Vec3::new(0.0, 0.0, 5.0);
        camera.zoom(1.0);
        assert!((camera.position.distance(camera.target) - 4.0).abs() < 1e-5);
        camera.zoom(100.0);
        assert!((camera.position.distance(camera.target) - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_look_at_box_centers_target() {
        let mut camera = ViewCamera::new(1.0);
        camera.look_at_box(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(3.0, 2.0, 0.0));
        assert_eq!(camera.target, Vec3::new(1.0, 1.0, 0.0));
        assert!(camera.forward().dot(Vec3::NEG_Z) > 0.999);
    }
}
