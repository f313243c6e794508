//! REST API types for client integration.
//!
//! The upload response carries the converted device records directly, in
//! the shape the device-management API consumes.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::convert::pipeline::ConvertReport;
use crate::models::{Device, ValidationFailure};

/// Response sent to the client after workbook upload and conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready", "warning", "error"
    pub status: String,

    /// Converted devices with their linked auto-events
    pub devices: Vec<Device>,

    /// Metadata about the conversion
    pub metadata: ResponseMetadata,
}

/// Metadata about the conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// Total number of devices
    pub total_devices: usize,

    /// Conversion timestamp, RFC 3339
    pub converted_at: String,

    /// Workbook info
    pub workbook: WorkbookMetadata,

    /// Validation stats
    pub validation: ValidationStats,
}

/// Workbook metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbookMetadata {
    pub mapping_fields: usize,
    pub device_rows: usize,
    pub event_rows: usize,
    pub completed_columns: Vec<String>,
}

/// Validation statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationStats {
    pub valid: usize,
    pub invalid: usize,
    pub failures: Vec<ValidationFailure>,
}

/// Convert a ConvertReport to an UploadResponse.
impl From<ConvertReport> for UploadResponse {
    fn from(report: ConvertReport) -> Self {
        let total = report.devices.len();
        let invalid = report.validation_errors.len();

        UploadResponse {
            job_id: Uuid::new_v4().to_string(),
            status: if invalid == 0 { "ready" } else { "warning" }.to_string(),
            devices: report.devices,
            metadata: ResponseMetadata {
                total_devices: total,
                converted_at: Utc::now().to_rfc3339(),
                workbook: WorkbookMetadata {
                    mapping_fields: report.info.mapping_fields,
                    device_rows: report.info.device_rows,
                    event_rows: report.info.event_rows,
                    completed_columns: report.info.completed_columns,
                },
                validation: ValidationStats {
                    valid: total,
                    invalid,
                    failures: report.validation_errors,
                },
            },
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "devices": [],
        "metadata": {
            "totalDevices": 0,
            "validation": { "valid": 0, "invalid": 0, "failures": [] }
        }
    })
}
