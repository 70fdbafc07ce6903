//! Configuration options for posediff.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::CoordinateSystem;

/// Default route prefix for camera images.
pub const DEFAULT_IMAGE_ROUTE: &str = "/api/image/";

/// Global configuration options.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Interactive view camera.
    pub view: ViewOptions,
    /// Pose marker geometry and colors.
    pub marker: MarkerOptions,
    /// Scene decorations.
    pub scene: SceneOptions,
    /// Title written into exported reports.
    pub report_title: String,
    /// URL prefix under which camera images are served.
    pub image_route: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            view: ViewOptions::default(),
            marker: MarkerOptions::default(),
            scene: SceneOptions::default(),
            report_title: "Pose validation report".to_string(),
            image_route: DEFAULT_IMAGE_ROUTE.to_string(),
        }
    }
}

impl Options {
    /// Parses options from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let options = Self::from_json_str(&text)?;
        log::info!("loaded options from {}", path.display());
        Ok(options)
    }
}

/// View camera settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Aspect ratio (width / height) until the first resize.
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Initial eye position.
    pub position: Vec3,
    /// Initial orbit target.
    pub target: Vec3,
    /// Fraction of pending orbit motion applied per frame; 0 disables damping.
    pub damping_factor: f32,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(5.0, 5.0, 5.0),
            target: Vec3::ZERO,
            damping_factor: 0.05,
        }
    }
}

/// Pose marker settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerOptions {
    /// Cone base radius.
    pub radius: f32,
    /// Cone height.
    pub height: f32,
    /// Number of segments around the cone.
    pub radial_segments: u32,
    /// Color of reference markers.
    pub reference_color: Vec3,
    /// Color of candidate markers.
    pub candidate_color: Vec3,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            radius: 0.1,
            height: 0.3,
            radial_segments: 8,
            reference_color: Vec3::new(0.0, 0.0, 1.0),
            candidate_color: Vec3::new(1.0, 0.0, 0.0),
        }
    }
}

impl MarkerOptions {
    /// Returns the marker color for a coordinate system.
    #[must_use]
    pub fn color(&self, system: CoordinateSystem) -> Vec3 {
        match system {
            CoordinateSystem::Reference => self.reference_color,
            CoordinateSystem::Candidate => self.candidate_color,
        }
    }
}

/// Scene decoration settings.
///
/// Nothing here affects markers or picking. These values are carried for the
/// renderer that draws the scene around the markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneOptions {
    /// Background color.
    pub background_color: Vec3,
    /// Length of the world axes helper.
    pub axes_size: f32,
    /// Side length of the ground grid.
    pub grid_size: f32,
    /// Number of grid divisions per side.
    pub grid_divisions: u32,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            background_color: Vec3::splat(240.0 / 255.0),
            axes_size: 5.0,
            grid_size: 10.0,
            grid_divisions: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override() {
        let options =
            Options::from_json_str(r#"{"marker": {"radius": 0.25}, "report_title": "rig A"}"#)
                .unwrap();
        assert_eq!(options.marker.radius, 0.25);
        assert_eq!(options.marker.radial_segments, 8);
        assert_eq!(options.report_title, "rig A");
        assert_eq!(options.view, ViewOptions::default());
    }

    #[test]
    fn test_colors_per_system() {
        let marker = MarkerOptions::default();
        assert_eq!(marker.color(CoordinateSystem::Candidate), Vec3::X);
        assert_eq!(marker.color(CoordinateSystem::Reference), Vec3::Z);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Options::load("/nonexistent/posediff.json").unwrap_err();
        assert!(matches!(err, crate::PoseDiffError::IoError(_)));
    }
}
