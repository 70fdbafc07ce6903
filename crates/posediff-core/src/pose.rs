//! Pose decomposition and pose-to-pose differences.
//!
//! All functions here are pure. Distances are rounded to
//! [`DISTANCE_DECIMALS`] places and angles to [`ROTATION_DECIMALS`] places so
//! that what is compared in tests is what an operator sees.

use std::fmt;

use glam::{DMat3, DMat4, DQuat, DVec3, EulerRot};
use serde::{Deserialize, Serialize};

use crate::error::{PoseDiffError, Result};
use crate::record::TransformMatrix;

/// Column norms and normalized determinants below this are degenerate.
pub const DEGENERATE_EPSILON: f64 = 1e-8;

/// Decimal places kept for position distances.
pub const DISTANCE_DECIMALS: i32 = 4;

/// Decimal places kept for rotation angles (degrees).
pub const ROTATION_DECIMALS: i32 = 1;

/// A camera position and orientation; scale has been discarded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Camera centre in world space.
    pub position: DVec3,
    /// Unit quaternion, camera-to-world.
    pub orientation: DQuat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
        }
    }
}

impl Pose {
    /// Creates a pose, normalizing the orientation.
    #[must_use]
    pub fn new(position: DVec3, orientation: DQuat) -> Self {
        Self {
            position,
            orientation: orientation.normalize(),
        }
    }

    /// Builds a pose from a COLMAP image record.
    ///
    /// `qvec` is `[qw, qx, qy, qz]` and is normalized before use; `tvec` is
    /// taken as the translation column verbatim.
    pub fn from_colmap(qvec: [f64; 4], tvec: [f64; 3]) -> Result<Self> {
        if qvec.iter().chain(tvec.iter()).any(|v| !v.is_finite()) {
            return Err(PoseDiffError::MalformedPose(format!(
                "non-finite COLMAP pose: qvec {qvec:?}, tvec {tvec:?}"
            )));
        }
        let q = DQuat::from_xyzw(qvec[1], qvec[2], qvec[3], qvec[0]);
        if q.length() < DEGENERATE_EPSILON {
            return Err(PoseDiffError::MalformedPose(
                "zero-length COLMAP quaternion".to_string(),
            ));
        }
        Ok(Self::new(DVec3::from_array(tvec), q))
    }

    /// Returns the homogeneous matrix for this pose.
    #[must_use]
    pub fn to_matrix(&self) -> TransformMatrix {
        compose(self.position, self.orientation)
    }

    /// Returns the orientation as XYZ Euler angles in degrees.
    #[must_use]
    pub fn euler_degrees(&self) -> DVec3 {
        let (x, y, z) = self.orientation.to_euler(EulerRot::XYZ);
        DVec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
    }

    /// Returns the viewing direction (camera −Z) in world space.
    #[must_use]
    pub fn forward(&self) -> DVec3 {
        self.orientation * DVec3::NEG_Z
    }
}

/// Builds a row-major transform from a translation and rotation.
#[must_use]
pub fn compose(position: DVec3, orientation: DQuat) -> TransformMatrix {
    TransformMatrix::from_dmat4(&DMat4::from_rotation_translation(
        orientation.normalize(),
        position,
    ))
}

/// Decomposes a homogeneous transform into a [`Pose`].
///
/// Translation comes from the last column. The upper-left 3×3 block has each
/// column divided by its norm; a negative determinant flips the first axis so
/// the remainder is a proper rotation.
///
/// Matrices whose columns collapse (norm or normalized determinant below
/// [`DEGENERATE_EPSILON`]) are rejected as [`PoseDiffError::MalformedPose`]
/// rather than producing a zero-scale pose.
pub fn decompose(matrix: &TransformMatrix) -> Result<Pose> {
    let m = matrix.to_dmat4()?;
    let axes = [
        m.x_axis.truncate(),
        m.y_axis.truncate(),
        m.z_axis.truncate(),
    ];
    let mut scale = axes.map(DVec3::length);

    for (name, s) in ["x", "y", "z"].iter().zip(scale) {
        if s < DEGENERATE_EPSILON || !s.is_finite() {
            return Err(PoseDiffError::MalformedPose(format!(
                "degenerate scale {s:e} on {name} axis"
            )));
        }
    }

    let det = DMat3::from_cols(axes[0], axes[1], axes[2]).determinant();
    let volume = det / (scale[0] * scale[1] * scale[2]);
    if !volume.is_finite() || volume.abs() < DEGENERATE_EPSILON {
        return Err(PoseDiffError::MalformedPose(format!(
            "near-singular rotation block (det {det:e})"
        )));
    }
    if det < 0.0 {
        scale[0] = -scale[0];
    }

    let rotation = DMat3::from_cols(axes[0] / scale[0], axes[1] / scale[1], axes[2] / scale[2]);
    Ok(Pose {
        position: m.w_axis.truncate(),
        orientation: DQuat::from_mat3(&rotation).normalize(),
    })
}

/// Rounds to a fixed number of decimal places, folding `-0.0` into `0.0`.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor + 0.0
}

/// Euclidean distance between camera centres, rounded to 4 places.
#[must_use]
pub fn position_distance(a: &Pose, b: &Pose) -> f64 {
    round_to(a.position.distance(b.position), DISTANCE_DECIMALS)
}

/// Geodesic angle between two orientations in radians, unrounded.
///
/// Computed from the relative rotation as `2·atan2(|v|, |w|)`, which is
/// well conditioned near zero and symmetric in its arguments.
#[must_use]
pub fn geodesic_angle(a: &Pose, b: &Pose) -> f64 {
    let relative = a.orientation.conjugate() * b.orientation;
    2.0 * relative.xyz().length().atan2(relative.w.abs())
}

/// Rotation difference between two poses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationDelta {
    /// Absolute per-axis difference of XYZ Euler angles, degrees in [0, 180].
    pub euler_degrees: [f64; 3],
    /// Geodesic angle between the orientations, degrees.
    pub angle_degrees: f64,
}

impl RotationDelta {
    /// Returns whether the rotations agree at display precision.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.angle_degrees == 0.0 && self.euler_degrees.iter().all(|d| *d == 0.0)
    }
}

impl fmt::Display for RotationDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.euler_degrees;
        write!(f, "[{x:.1}°, {y:.1}°, {z:.1}°]")
    }
}

/// Rotation difference between two poses, rounded to 1 decimal place.
#[must_use]
pub fn rotation_difference(a: &Pose, b: &Pose) -> RotationDelta {
    let ea = a.euler_degrees();
    let eb = b.euler_degrees();
    let axis_delta = |x: f64, y: f64| {
        let wrapped = (x - y + 180.0).rem_euclid(360.0) - 180.0;
        round_to(wrapped.abs(), ROTATION_DECIMALS)
    };
    RotationDelta {
        euler_degrees: [
            axis_delta(ea.x, eb.x),
            axis_delta(ea.y, eb.y),
            axis_delta(ea.z, eb.z),
        ],
        angle_degrees: round_to(geodesic_angle(a, b).to_degrees(), ROTATION_DECIMALS),
    }
}

/// Difference between a reference and a candidate pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseDiff {
    /// Distance between camera centres.
    pub distance: f64,
    /// Orientation difference.
    pub rotation: RotationDelta,
}

impl PoseDiff {
    /// Computes the difference between two poses.
    #[must_use]
    pub fn between(a: &Pose, b: &Pose) -> Self {
        Self {
            distance: position_distance(a, b),
            rotation: rotation_difference(a, b),
        }
    }

    /// Returns whether both poses agree at display precision.
    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.distance == 0.0 && self.rotation.is_zero()
    }
}

impl fmt::Display for PoseDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "distance {:.4}, rotation {} ({:.1}° geodesic)",
            self.distance, self.rotation, self.rotation.angle_degrees
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn translated(x: f64, y: f64, z: f64) -> TransformMatrix {
        compose(DVec3::new(x, y, z), DQuat::IDENTITY)
    }

    #[test]
    fn test_identity_vs_unit_translation() {
        let a = decompose(&TransformMatrix::identity()).unwrap();
        let b = decompose(&translated(1.0, 0.0, 0.0)).unwrap();
        let diff = PoseDiff::between(&a, &b);
        assert_eq!(diff.distance, 1.0);
        assert_eq!(diff.rotation.euler_degrees, [0.0, 0.0, 0.0]);
        assert_eq!(format!("{:.4}", diff.distance), "1.0000");
        assert_eq!(diff.rotation.to_string(), "[0.0°, 0.0°, 0.0°]");
    }

    #[test]
    fn test_translation_read_from_last_column_not_last_row() {
        // A transposed reading would put the translation into the bottom row
        // and report the camera at the origin.
        let m = TransformMatrix::from_array([
            [1.0, 0.0, 0.0, 0.5],
            [0.0, 1.0, 0.0, -2.0],
            [0.0, 0.0, 1.0, 3.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let pose = decompose(&m).unwrap();
        assert_eq!(pose.position, DVec3::new(0.5, -2.0, 3.0));
    }

    #[test]
    fn test_decompose_rotation_about_z() {
        let q = DQuat::from_rotation_z(FRAC_PI_2);
        let pose = decompose(&compose(DVec3::new(1.0, 2.0, 3.0), q)).unwrap();
        assert!(pose.orientation.angle_between(q) < 1e-9);
        assert!((pose.euler_degrees().z - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_decompose_removes_scale() {
        let q = DQuat::from_rotation_y(0.3);
        let m = DMat4::from_scale_rotation_translation(DVec3::new(2.0, 0.5, 3.0), q, DVec3::X);
        let pose = decompose(&TransformMatrix::from_dmat4(&m)).unwrap();
        assert!(pose.orientation.angle_between(q) < 1e-9);
        assert!((pose.orientation.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_scale_is_malformed() {
        let m = TransformMatrix::from_array([
            [0.0, 0.0, 0.0, 1.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert!(matches!(decompose(&m), Err(PoseDiffError::MalformedPose(_))));
    }

    #[test]
    fn test_overflowing_scale_is_malformed() {
        // Column norms overflow to infinity even though every entry is finite.
        let m = TransformMatrix::from_array([
            [1e160, 0.0, 0.0, 1.0],
            [0.0, 1e160, 0.0, 2.0],
            [0.0, 0.0, 1e160, 3.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert!(matches!(decompose(&m), Err(PoseDiffError::MalformedPose(_))));

        // Finite norms whose determinant overflows.
        let m = TransformMatrix::from_array([
            [1e110, 0.0, 0.0, 0.0],
            [0.0, 1e110, 0.0, 0.0],
            [0.0, 0.0, 1e110, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert!(matches!(decompose(&m), Err(PoseDiffError::MalformedPose(_))));
    }

    #[test]
    fn test_parallel_columns_are_malformed() {
        let m = TransformMatrix::from_array([
            [1.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert!(matches!(decompose(&m), Err(PoseDiffError::MalformedPose(_))));
    }

    #[test]
    fn test_reflection_yields_unit_quaternion() {
        let m = TransformMatrix::from_array([
            [-1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let pose = decompose(&m).unwrap();
        assert!((pose.orientation.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_difference_detects_yaw() {
        let a = Pose::default();
        let b = Pose::new(DVec3::ZERO, DQuat::from_rotation_y(10f64.to_radians()));
        let delta = rotation_difference(&a, &b);
        assert_eq!(delta.euler_degrees, [0.0, 10.0, 0.0]);
        assert_eq!(delta.angle_degrees, 10.0);
        assert_eq!(rotation_difference(&b, &a), delta);
    }

    #[test]
    fn test_euler_delta_wraps_around() {
        let a = Pose::new(DVec3::ZERO, DQuat::from_rotation_x(179f64.to_radians()));
        let b = Pose::new(DVec3::ZERO, DQuat::from_rotation_x(-179f64.to_radians()));
        let delta = rotation_difference(&a, &b);
        assert!((delta.euler_degrees[0] - 2.0).abs() < 1e-9);
        assert!((delta.angle_degrees - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_colmap_normalizes_quaternion() {
        let pose = Pose::from_colmap([2.0, 0.0, 0.0, 0.0], [1.0, 2.0, 3.0]).unwrap();
        assert_eq!(pose.orientation, DQuat::IDENTITY);
        assert_eq!(pose.position, DVec3::new(1.0, 2.0, 3.0));

        let rotated = Pose::from_colmap([0.0, 0.0, 0.0, 1.0], [0.0; 3]).unwrap();
        let back = decompose(&rotated.to_matrix()).unwrap();
        assert!(geodesic_angle(&rotated, &back) < 1e-9);
        assert!(Pose::from_colmap([0.0; 4], [0.0; 3]).is_err());
    }

    #[test]
    fn test_forward_is_negative_z() {
        let pose = Pose::new(DVec3::ZERO, DQuat::from_rotation_y(FRAC_PI_2));
        assert!((pose.forward() - DVec3::NEG_X).length() < 1e-12);
    }

    #[test]
    fn test_round_to_folds_negative_zero() {
        assert_eq!(round_to(-0.00001, 4).to_string(), "0");
        assert_eq!(round_to(1.23456, 4), 1.2346);
    }
}
