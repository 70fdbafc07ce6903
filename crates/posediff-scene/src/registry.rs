//! Scene registry holding the live pose markers.

use std::collections::HashSet;

use glam::Vec3;
use posediff_core::{decompose, CameraRecord, CoordinateSystem, MarkerOptions, Visibility};

use crate::marker::{ConeGeometry, MarkerInstance, PoseMarker};

/// Counters from one rebuild pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RebuildSummary {
    /// Markers inserted.
    pub created: usize,
    /// Markers skipped because the matrix could not be decomposed.
    pub malformed: usize,
    /// Records skipped because their `file_path` was already seen.
    pub duplicates: usize,
}

/// Registry of all pose markers in the scene.
///
/// The marker set is a function of (records, visibility): every rebuild drops
/// all markers and recreates them, so nothing stale survives a toggle.
#[derive(Debug, Clone)]
pub struct SceneRegistry {
    markers: Vec<PoseMarker>,
    geometry: ConeGeometry,
    options: MarkerOptions,
}

impl Default for SceneRegistry {
    fn default() -> Self {
        Self::new(&MarkerOptions::default())
    }
}

impl SceneRegistry {
    /// Creates an empty registry.
    pub fn new(options: &MarkerOptions) -> Self {
        Self {
            markers: Vec::new(),
            geometry: ConeGeometry::from_options(options),
            options: options.clone(),
        }
    }

    /// Replaces every marker from the given records and visibility.
    ///
    /// Records are visited in order; for each, the candidate marker is
    /// inserted before the reference marker. A transform that fails to
    /// decompose is logged and skipped without aborting the pass.
    pub fn rebuild(&mut self, records: &[CameraRecord], visibility: Visibility) -> RebuildSummary {
        self.markers.clear();
        let mut summary = RebuildSummary::default();
        let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());

        for record in records {
            if !seen.insert(record.file_path.as_str()) {
                log::warn!("duplicate camera '{}' ignored", record.file_path);
                summary.duplicates += 1;
                continue;
            }

            for system in CoordinateSystem::ALL {
                if !visibility.is_visible(system) {
                    continue;
                }
                let Some(matrix) = record.transform(system) else {
                    continue;
                };
                match decompose(matrix) {
                    Ok(pose) => {
                        log::debug!(
                            "{system} marker for {} at ({:.3}, {:.3}, {:.3})",
                            record.file_path,
                            pose.position.x,
                            pose.position.y,
                            pose.position.z
                        );
                        self.markers.push(PoseMarker::new(
                            record.file_path.clone(),
                            system,
                            pose,
                            &self.geometry,
                            self.options.color(system),
                        ));
                        summary.created += 1;
                    }
                    Err(e) => {
                        log::warn!("skipping {system} marker for {}: {e}", record.file_path);
                        summary.malformed += 1;
                    }
                }
            }
        }

        log::info!(
            "scene rebuilt: {} markers from {} cameras",
            summary.created,
            records.len()
        );
        summary
    }

    /// Removes all markers.
    pub fn clear(&mut self) {
        self.markers.clear();
    }

    /// Returns all markers in insertion order.
    pub fn markers(&self) -> &[PoseMarker] {
        &self.markers
    }

    /// Returns the marker for a camera in a coordinate system.
    pub fn get(&self, camera_id: &str, system: CoordinateSystem) -> Option<&PoseMarker> {
        self.markers
            .iter()
            .find(|m| m.coordinate_system() == system && m.camera_id() == camera_id)
    }

    /// Returns all markers of one coordinate system.
    pub fn markers_for(&self, system: CoordinateSystem) -> impl Iterator<Item = &PoseMarker> {
        self.markers
            .iter()
            .filter(move |m| m.coordinate_system() == system)
    }

    /// Returns the number of markers.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns true if there are no markers.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Returns the axis-aligned box around all marker centres.
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let mut positions = self.markers.iter().map(PoseMarker::position);
        let first = positions.next()?;
        Some(positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    /// Returns GPU instance data for all markers.
    pub fn instances(&self) -> Vec<MarkerInstance> {
        self.markers.iter().map(PoseMarker::instance).collect()
    }
}
