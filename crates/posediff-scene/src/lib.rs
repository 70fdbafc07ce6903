//! Scene state for posediff.
//!
//! This crate keeps the 3D side of the reconciliation view:
//! - [`ViewCamera`] with damped orbit controls
//! - [`PoseMarker`] cones built from decomposed poses
//! - [`SceneRegistry`], rebuilt wholesale from records and visibility
//! - [`picking`] of markers from a pointer position

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

pub mod camera;
pub mod marker;
pub mod picking;
pub mod registry;

pub use camera::ViewCamera;
pub use marker::{ConeGeometry, MarkerInstance, PoseMarker};
pub use picking::{pick, pixel_to_ndc, screen_ray};
pub use registry::{RebuildSummary, SceneRegistry};
