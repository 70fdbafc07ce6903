//! Validation findings reported by the data validator.

use serde::{Deserialize, Serialize};

/// Outcome of a single validation check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FindingStatus {
    /// The check passed.
    Success,
    /// The check found something suspicious.
    Warning,
    /// The check failed.
    Error,
    /// Any status string the validator may add later.
    Other(String),
}

impl From<String> for FindingStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "success" => FindingStatus::Success,
            "warning" => FindingStatus::Warning,
            "error" => FindingStatus::Error,
            _ => FindingStatus::Other(value),
        }
    }
}

impl From<FindingStatus> for String {
    fn from(value: FindingStatus) -> Self {
        match value {
            FindingStatus::Success => "success".to_string(),
            FindingStatus::Warning => "warning".to_string(),
            FindingStatus::Error => "error".to_string(),
            FindingStatus::Other(s) => s,
        }
    }
}

/// Alert style used to present a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertLevel {
    /// Green.
    Success,
    /// Amber.
    Warning,
    /// Red.
    Danger,
    /// Neutral, for unknown statuses.
    #[default]
    Info,
}

impl AlertLevel {
    /// Returns the CSS class a web front end would use.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            AlertLevel::Success => "alert-success",
            AlertLevel::Warning => "alert-warning",
            AlertLevel::Danger => "alert-danger",
            AlertLevel::Info => "alert-info",
        }
    }
}

impl FindingStatus {
    /// Maps the status onto an alert style.
    #[must_use]
    pub fn alert_level(&self) -> AlertLevel {
        match self {
            FindingStatus::Success => AlertLevel::Success,
            FindingStatus::Warning => AlertLevel::Warning,
            FindingStatus::Error => AlertLevel::Danger,
            FindingStatus::Other(_) => AlertLevel::Info,
        }
    }
}

/// One finding from the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFinding {
    /// Short heading.
    #[serde(default)]
    pub title: String,
    /// Human-readable description.
    #[serde(default)]
    pub message: String,
    /// Check outcome.
    pub status: FindingStatus,
    /// Free-form payload (counts, paths, measured values).
    #[serde(default)]
    pub details: serde_json::Value,
}

/// Count of findings per status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FindingSummary {
    pub success: usize,
    pub warning: usize,
    pub error: usize,
    pub other: usize,
}

impl FindingSummary {
    /// Tallies a list of findings.
    pub fn from_findings(findings: &[ValidationFinding]) -> Self {
        findings
            .iter()
            .fold(Self::default(), |mut acc, finding| {
                match finding.status {
                    FindingStatus::Success => acc.success += 1,
                    FindingStatus::Warning => acc.warning += 1,
                    FindingStatus::Error => acc.error += 1,
                    FindingStatus::Other(_) => acc.other += 1,
                }
                acc
            })
    }

    /// Returns whether any finding failed.
    pub fn has_errors(&self) -> bool {
        self.error > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_unknown_strings() {
        let finding: ValidationFinding =
            serde_json::from_str(r#"{"title": "t", "message": "m", "status": "pending"}"#).unwrap();
        assert_eq!(finding.status, FindingStatus::Other("pending".to_string()));
        assert_eq!(finding.status.alert_level(), AlertLevel::Info);
        assert!(finding.details.is_null());

        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn test_alert_classes() {
        assert_eq!(FindingStatus::Success.alert_level().css_class(), "alert-success");
        assert_eq!(FindingStatus::Warning.alert_level().css_class(), "alert-warning");
        assert_eq!(FindingStatus::Error.alert_level().css_class(), "alert-danger");
    }

    #[test]
    fn test_summary_counts() {
        let findings: Vec<ValidationFinding> = serde_json::from_str(
            r#"[
                {"title": "count", "message": "ok", "status": "success", "details": {"nerf_cameras": 3}},
                {"title": "dark", "message": "low brightness", "status": "warning"},
                {"title": "missing", "message": "no file", "status": "error"},
                {"status": "error"}
            ]"#,
        )
        .unwrap();
        let summary = FindingSummary::from_findings(&findings);
        assert_eq!(summary.success, 1);
        assert_eq!(summary.warning, 1);
        assert_eq!(summary.error, 2);
        assert!(summary.has_errors());
        assert_eq!(findings[0].details["nerf_cameras"], 3);
    }
}
