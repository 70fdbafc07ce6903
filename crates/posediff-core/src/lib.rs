//! Core types for posediff.
//!
//! This crate provides the pieces shared by the scene and the engine:
//! - [`pose`] decomposition of 4×4 transforms and pose differences
//! - [`CameraRecord`] and the row-major [`TransformMatrix`] it carries
//! - Validation findings and the response envelopes of the data endpoints
//! - Configuration [`Options`] and the [`PoseDiffError`] type

// Internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod options;
pub mod pick;
pub mod pose;
pub mod record;
pub mod response;
pub mod validation;

pub use error::{PoseDiffError, Result};
pub use options::{MarkerOptions, Options, SceneOptions, ViewOptions};
pub use pick::{ray_intersect_triangle, PickResult, Pickable, Ray};
pub use pose::{
    compose, decompose, geodesic_angle, position_distance, rotation_difference, Pose, PoseDiff,
    RotationDelta,
};
pub use record::{CameraRecord, ColmapImage, CoordinateSystem, TransformMatrix, Visibility};
pub use response::{CamerasResponse, ValidationResponse};
pub use validation::{AlertLevel, FindingStatus, FindingSummary, ValidationFinding};

// Re-export glam types for convenience
pub use glam::{DQuat, DVec3, Mat4, Vec2, Vec3};
