//! posediff: reconcile two camera-pose estimates of the same capture.
//!
//! Reference poses come from structure-from-motion (COLMAP) and candidate
//! poses from a neural reconstruction (NeRF). The [`ReconciliationEngine`]
//! keeps a marker scene consistent with the loaded records and visibility
//! flags, resolves clicks to cameras and reports per-camera pose differences.
//!
//! # Quick Start
//!
//! ```no_run
//! use posediff::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let source = JsonDataSource::from_files("cameras.json", None)?;
//!     let mut engine = ReconciliationEngine::new(Options::default());
//!     engine.load_cameras(&source)?;
//!
//!     for record in engine.records() {
//!         if let Some(diff) = ReconciliationEngine::compute_diff(record) {
//!             println!("{}: {diff}", record.file_path);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The host owns the engine: it calls [`ReconciliationEngine::frame_tick`]
//! once per frame and forwards clicks to
//! [`ReconciliationEngine::handle_click`].

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod engine;
pub mod format;
pub mod report;
pub mod source;

pub use engine::{EngineState, ReconciliationEngine, Selection};
pub use format::{format_distance, format_position, format_rotation, CameraSummary};
pub use report::{ReportSnapshot, REPORT_FILE_NAME};
pub use source::{DataSource, JsonDataSource};

// Re-export core types
pub use posediff_core::{
    compose, decompose, error::{PoseDiffError, Result}, AlertLevel, CameraRecord,
    ColmapImage, CoordinateSystem, FindingStatus, FindingSummary, Options, PickResult, Pose, PoseDiff,
    RotationDelta, TransformMatrix, ValidationFinding, Visibility, DQuat, DVec3, Vec2, Vec3,
};

// Re-export scene types
pub use posediff_scene::{MarkerInstance, PoseMarker, RebuildSummary, SceneRegistry, ViewCamera};

/// Initializes logging from `RUST_LOG`; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
