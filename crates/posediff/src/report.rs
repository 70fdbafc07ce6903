//! Report snapshot for export.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use posediff_core::{FindingSummary, Result, ValidationFinding};

/// File name offered when the report is downloaded.
pub const REPORT_FILE_NAME: &str = "nerf_validation_report.json";

/// Point-in-time view of the loaded data, ready to serialize.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSnapshot {
    pub title: String,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub timestamp: String,
    pub results: Vec<ValidationFinding>,
    pub camera_count: usize,
    pub summary: FindingSummary,
}

impl ReportSnapshot {
    /// Builds a snapshot stamped with the given time.
    pub fn new(
        title: impl Into<String>,
        at: DateTime<Utc>,
        camera_count: usize,
        results: Vec<ValidationFinding>,
    ) -> Self {
        let summary = FindingSummary::from_findings(&results);
        Self {
            title: title.into(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            results,
            camera_count,
            summary,
        }
    }

    /// Serializes the snapshot as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
