//! Camera records and the raw transform matrices they carry.
//!
//! A [`CameraRecord`] is what the data source hands over for one image: the
//! candidate (NeRF) transform and the reference (COLMAP) transform, either of
//! which may be missing.

use std::fmt;

use glam::DMat4;
use serde::{Deserialize, Serialize};

use crate::error::{PoseDiffError, Result};
use crate::pose::Pose;

/// Which pipeline produced a pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSystem {
    /// Structure-from-motion pose (COLMAP).
    Reference,
    /// Neural-reconstruction pose (NeRF).
    Candidate,
}

impl CoordinateSystem {
    /// Both systems, in the order markers are inserted for a record.
    pub const ALL: [CoordinateSystem; 2] = [CoordinateSystem::Candidate, CoordinateSystem::Reference];

    /// Returns display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            CoordinateSystem::Reference => "reference",
            CoordinateSystem::Candidate => "candidate",
        }
    }

    /// Returns the other system.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            CoordinateSystem::Reference => CoordinateSystem::Candidate,
            CoordinateSystem::Candidate => CoordinateSystem::Reference,
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-system visibility flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    /// Whether reference markers are shown.
    pub reference: bool,
    /// Whether candidate markers are shown.
    pub candidate: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            reference: true,
            candidate: true,
        }
    }
}

impl Visibility {
    /// Returns whether the given system is visible.
    #[must_use]
    pub fn is_visible(&self, system: CoordinateSystem) -> bool {
        match system {
            CoordinateSystem::Reference => self.reference,
            CoordinateSystem::Candidate => self.candidate,
        }
    }

    /// Sets the flag for the given system.
    pub fn set(&mut self, system: CoordinateSystem, visible: bool) {
        match system {
            CoordinateSystem::Reference => self.reference = visible,
            CoordinateSystem::Candidate => self.candidate = visible,
        }
    }
}

/// A 4×4 homogeneous transform as delivered by the data source.
///
/// The matrix is **row-major**: `rows()[r][c]` is row `r`, column `c`, and
/// the translation lives in the last column (`rows()[0][3]`, `rows()[1][3]`,
/// `rows()[2][3]`). This is the layout of `transforms.json` frames.
///
/// Shape and finiteness are not checked on construction so that one bad
/// matrix cannot reject the record carrying it; [`TransformMatrix::to_dmat4`]
/// validates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransformMatrix(Vec<Vec<f64>>);

impl TransformMatrix {
    /// Wraps nested rows without validation.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        Self(rows)
    }

    /// Creates a matrix from a fixed-size row-major array.
    pub fn from_array(rows: [[f64; 4]; 4]) -> Self {
        Self(rows.iter().map(|r| r.to_vec()).collect())
    }

    /// Returns the identity transform.
    pub fn identity() -> Self {
        Self::from_dmat4(&DMat4::IDENTITY)
    }

    /// Creates a row-major matrix from a glam (column-major) matrix.
    pub fn from_dmat4(matrix: &DMat4) -> Self {
        let cols = matrix.to_cols_array_2d();
        let mut rows = [[0.0; 4]; 4];
        for (c, col) in cols.iter().enumerate() {
            for (r, value) in col.iter().enumerate() {
                rows[r][c] = *value;
            }
        }
        Self::from_array(rows)
    }

    /// Returns the raw rows.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.0
    }

    /// Converts to a glam matrix, transposing from row-major storage.
    ///
    /// Fails with [`PoseDiffError::MalformedPose`] if the matrix is not 4×4
    /// or contains non-finite entries.
    pub fn to_dmat4(&self) -> Result<DMat4> {
        if self.0.len() != 4 || self.0.iter().any(|row| row.len() != 4) {
            let lengths: Vec<usize> = self.0.iter().map(Vec::len).collect();
            return Err(PoseDiffError::MalformedPose(format!(
                "expected 4x4 matrix, got {} rows with lengths {lengths:?}",
                self.0.len()
            )));
        }

        let mut cols = [[0.0; 4]; 4];
        for (r, row) in self.0.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                if !value.is_finite() {
                    return Err(PoseDiffError::MalformedPose(format!(
                        "non-finite entry {value} at row {r}, column {c}"
                    )));
                }
                cols[c][r] = value;
            }
        }
        Ok(DMat4::from_cols_array_2d(&cols))
    }
}

/// One camera as seen by both pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraRecord {
    /// Image path; unique key of the record.
    pub file_path: String,

    /// Candidate (NeRF) camera-to-world transform.
    #[serde(default)]
    pub transform_matrix: Option<TransformMatrix>,

    /// Reference (COLMAP) transform.
    #[serde(default)]
    pub colmap_transform: Option<TransformMatrix>,

    /// COLMAP image id, when the reference pipeline registered this image.
    #[serde(default)]
    pub colmap_id: Option<u32>,
}

impl CameraRecord {
    /// Creates a record with no transforms.
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            transform_matrix: None,
            colmap_transform: None,
            colmap_id: None,
        }
    }

    /// Sets the candidate transform.
    #[must_use]
    pub fn with_candidate(mut self, matrix: TransformMatrix) -> Self {
        self.transform_matrix = Some(matrix);
        self
    }

    /// Sets the reference transform.
    #[must_use]
    pub fn with_reference(mut self, matrix: TransformMatrix) -> Self {
        self.colmap_transform = Some(matrix);
        self
    }

    /// Returns the transform for the given system, if present.
    pub fn transform(&self, system: CoordinateSystem) -> Option<&TransformMatrix> {
        match system {
            CoordinateSystem::Reference => self.colmap_transform.as_ref(),
            CoordinateSystem::Candidate => self.transform_matrix.as_ref(),
        }
    }

    /// Returns whether both pipelines produced a transform.
    pub fn has_both(&self) -> bool {
        self.transform_matrix.is_some() && self.colmap_transform.is_some()
    }

    /// Sets the reference transform and id from a COLMAP image entry.
    ///
    /// Fails with [`PoseDiffError::MalformedPose`] if the quaternion is zero
    /// or any value is non-finite; the record is not modified in that case.
    pub fn with_colmap_image(mut self, image: &ColmapImage) -> Result<Self> {
        let pose = Pose::from_colmap(image.qvec, image.tvec)?;
        self.colmap_transform = Some(pose.to_matrix());
        self.colmap_id = Some(image.image_id);
        Ok(self)
    }
}

/// One registered image from a COLMAP sparse model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColmapImage {
    pub image_id: u32,
    /// Image file name, matched against the record's file name.
    pub name: String,
    /// Rotation quaternion `[qw, qx, qy, qz]`, not necessarily normalized.
    pub qvec: [f64; 4],
    /// Translation `[tx, ty, tz]`.
    pub tvec: [f64; 3],
}
