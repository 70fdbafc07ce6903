//! Display strings for the camera table and the selection panel.

use posediff_core::pose::round_to;
use posediff_core::{decompose, CameraRecord, CoordinateSystem, Pose};

use crate::engine::ReconciliationEngine;

/// Placeholder shown where a transform is absent or malformed.
pub const NOT_AVAILABLE: &str = "N/A";

/// Formats a position as `[x, y, z]` with 3 decimals.
pub fn format_position(pose: &Pose) -> String {
    let [x, y, z] = pose.position.to_array().map(|v| round_to(v, 3));
    format!("[{x:.3}, {y:.3}, {z:.3}]")
}

/// Formats an orientation as XYZ Euler degrees with 1 decimal.
pub fn format_rotation(pose: &Pose) -> String {
    let [x, y, z] = pose.euler_degrees().to_array().map(|v| round_to(v, 1));
    format!("[{x:.1}°, {y:.1}°, {z:.1}°]")
}

/// Formats a distance with 4 decimals.
pub fn format_distance(distance: f64) -> String {
    format!("{:.4}", round_to(distance, 4))
}

/// One row of the camera table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraSummary {
    pub file_path: String,
    pub reference_position: String,
    pub candidate_position: String,
    pub reference_rotation: String,
    pub candidate_rotation: String,
    pub distance: String,
}

impl CameraSummary {
    /// Builds the display row for a record.
    pub fn from_record(record: &CameraRecord) -> Self {
        let pose = |system: CoordinateSystem| {
            record.transform(system).and_then(|m| decompose(m).ok())
        };
        let reference = pose(CoordinateSystem::Reference);
        let candidate = pose(CoordinateSystem::Candidate);

        Self {
            file_path: record.file_path.clone(),
            reference_position: or_na(reference.as_ref(), format_position),
            candidate_position: or_na(candidate.as_ref(), format_position),
            reference_rotation: or_na(reference.as_ref(), format_rotation),
            candidate_rotation: or_na(candidate.as_ref(), format_rotation),
            distance: ReconciliationEngine::compute_diff(record)
                .map_or_else(|| NOT_AVAILABLE.to_string(), |d| format_distance(d.distance)),
        }
    }
}

fn or_na(pose: Option<&Pose>, format: fn(&Pose) -> String) -> String {
    pose.map_or_else(|| NOT_AVAILABLE.to_string(), format)
}
