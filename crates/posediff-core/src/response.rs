//! Response envelopes returned by the camera and validation endpoints.
//!
//! Both endpoints answer `{"status": "success", ...}` with a payload or
//! `{"status": "error", "message": ...}`.

use serde::{Deserialize, Serialize};

use crate::error::{PoseDiffError, Result};
use crate::record::CameraRecord;
use crate::validation::ValidationFinding;

/// Response of the camera listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CamerasResponse {
    /// Cameras were loaded.
    Success {
        /// One record per image.
        data: Vec<CameraRecord>,
    },
    /// The server could not produce cameras.
    Error {
        /// Reason given by the server.
        message: String,
    },
}

impl CamerasResponse {
    /// Parses a response body.
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Converts an error envelope into [`PoseDiffError::FetchFailure`].
    pub fn into_result(self) -> Result<Vec<CameraRecord>> {
        match self {
            CamerasResponse::Success { data } => Ok(data),
            CamerasResponse::Error { message } => Err(PoseDiffError::FetchFailure(message)),
        }
    }
}

/// Response of the validation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ValidationResponse {
    /// Validation ran.
    Success {
        /// All findings, flattened across categories.
        results: Vec<ValidationFinding>,
    },
    /// Validation could not run.
    Error {
        /// Reason given by the server.
        message: String,
    },
}

impl ValidationResponse {
    /// Parses a response body.
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Converts an error envelope into [`PoseDiffError::FetchFailure`].
    pub fn into_result(self) -> Result<Vec<ValidationFinding>> {
        match self {
            ValidationResponse::Success { results } => Ok(results),
            ValidationResponse::Error { message } => Err(PoseDiffError::FetchFailure(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cameras_success() {
        let body = r#"{"status": "success", "data": [{"file_path": "a.png", "transform_matrix": null, "colmap_id": 7, "colmap_transform": null}]}"#;
        let records = CamerasResponse::from_json(body).unwrap().into_result().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].colmap_id, Some(7));
    }

    #[test]
    fn test_cameras_error_is_fetch_failure() {
        let body = r#"{"status": "error", "message": "transforms.json not found"}"#;
        let err = CamerasResponse::from_json(body).unwrap().into_result().unwrap_err();
        match err {
            PoseDiffError::FetchFailure(msg) => assert_eq!(msg, "transforms.json not found"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validation_success() {
        let body = r#"{"status": "success", "results": [{"title": "ok", "message": "", "status": "success"}]}"#;
        let results = ValidationResponse::from_json(body).unwrap().into_result().unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_garbage_body_is_json_error() {
        assert!(matches!(
            ValidationResponse::from_json("<html>"),
            Err(PoseDiffError::JsonError(_))
        ));
    }
}
