//! Data sources for camera records and validation findings.
//!
//! Fetching is the caller's business; a [`DataSource`] hands the engine
//! completed results only.

use std::path::Path;

use posediff_core::{
    CameraRecord, CamerasResponse, ColmapImage, Options, PoseDiffError, Result, ValidationFinding,
    ValidationResponse,
};

pub use posediff_core::options::DEFAULT_IMAGE_ROUTE;

/// Supplies camera records and validation findings to the engine.
pub trait DataSource {
    /// Fetches all camera records.
    fn fetch_cameras(&self) -> Result<Vec<CameraRecord>>;

    /// Fetches the validator's findings.
    fn fetch_validation_results(&self) -> Result<Vec<ValidationFinding>>;

    /// Returns the URL of the image behind a camera record.
    fn image_url_for(&self, file_path: &str) -> String {
        format!("{DEFAULT_IMAGE_ROUTE}{file_path}")
    }
}

/// A data source over the JSON bodies of the two data endpoints.
#[derive(Debug, Clone)]
pub struct JsonDataSource {
    cameras: String,
    validation: Option<String>,
    image_route: String,
    colmap_images: Vec<ColmapImage>,
}

impl JsonDataSource {
    /// Creates a source from a cameras body and an optional validation body.
    pub fn new(cameras: impl Into<String>, validation: Option<String>) -> Self {
        Self {
            cameras: cameras.into(),
            validation,
            image_route: DEFAULT_IMAGE_ROUTE.to_string(),
            colmap_images: Vec::new(),
        }
    }

    /// Takes the image route from configuration.
    #[must_use]
    pub fn with_options(self, options: &Options) -> Self {
        self.with_image_route(options.image_route.clone())
    }

    /// Supplies COLMAP images used as reference poses for records that
    /// carry none, matched by file name.
    #[must_use]
    pub fn with_colmap_images(mut self, images: Vec<ColmapImage>) -> Self {
        self.colmap_images = images;
        self
    }

    fn attach_colmap(&self, record: CameraRecord) -> CameraRecord {
        if record.colmap_transform.is_some() {
            return record;
        }
        let file_name = Path::new(&record.file_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(record.file_path.as_str());
        let Some(image) = self.colmap_images.iter().find(|i| i.name == file_name) else {
            return record;
        };
        match record.clone().with_colmap_image(image) {
            Ok(paired) => paired,
            Err(e) => {
                log::warn!("COLMAP image {} ignored: {e}", image.name);
                record
            }
        }
    }

    /// Reads the bodies from files.
    pub fn from_files(cameras: impl AsRef<Path>, validation: Option<&Path>) -> Result<Self> {
        let cameras = std::fs::read_to_string(cameras)?;
        let validation = validation.map(std::fs::read_to_string).transpose()?;
        Ok(Self::new(cameras, validation))
    }

    /// Sets the image route prefix.
    #[must_use]
    pub fn with_image_route(mut self, route: impl Into<String>) -> Self {
        self.image_route = route.into();
        self
    }
}

impl DataSource for JsonDataSource {
    fn fetch_cameras(&self) -> Result<Vec<CameraRecord>> {
        let records = CamerasResponse::from_json(&self.cameras)?.into_result()?;
        Ok(records.into_iter().map(|r| self.attach_colmap(r)).collect())
    }

    fn fetch_validation_results(&self) -> Result<Vec<ValidationFinding>> {
        let body = self
            .validation
            .as_deref()
            .ok_or_else(|| PoseDiffError::FetchFailure("no validation results".into()))?;
        ValidationResponse::from_json(body)?.into_result()
    }

    fn image_url_for(&self, file_path: &str) -> String {
        format!("{}{file_path}", self.image_route)
    }
}
