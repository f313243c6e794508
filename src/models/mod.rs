//! Domain models for the Devload conversion pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`Device`] - Complete device record with nested auto-events
//! - [`AutoEvent`] - Scheduled read event attached to a device
//! - [`ValidationFailure`] - A recoverable per-row validation failure
//! - [`ConversionResult`] - Devices plus accumulated validation failures

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Protocol-specific key/value pairs for one protocol (e.g. Modbus unit id,
/// baud rate), assembled from spreadsheet columns that match no device field.
pub type ProtocolProperties = HashMap<String, String>;

// =============================================================================
// Auto Event
// =============================================================================

/// A scheduled auto-event: how often a device resource is read and whether
/// only changed values are reported.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AutoEvent {
    /// Read interval, a duration literal such as "10s" or "500ms".
    pub interval: String,
    /// Report only when the value changed since the last read.
    #[serde(default)]
    pub on_change: bool,
    /// Device resource the event reads.
    pub source_name: String,
}

// =============================================================================
// Device
// =============================================================================

/// A complete device record in device-management format.
///
/// This is the final output format, with protocol properties and auto-events
/// attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Device name (unique within a run).
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    /// Administrative state: "LOCKED" or "UNLOCKED".
    pub admin_state: String,
    /// Free-form labels.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub labels: Vec<String>,
    /// Physical or logical location.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub location: String,
    /// Device profile this device instantiates.
    pub profile_name: String,
    /// Device service that owns this device.
    pub service_name: String,
    /// Protocol the device speaks (seeds the `protocols` key).
    pub protocol_name: String,
    /// Protocol properties keyed by protocol name.
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub protocols: HashMap<String, ProtocolProperties>,
    /// Auto-events attached to this device.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub auto_events: Vec<AutoEvent>,
}

impl Device {
    /// Create an empty device pre-seeded with the protocol name.
    pub fn new(protocol_name: &str) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            admin_state: String::new(),
            labels: Vec::new(),
            location: String::new(),
            profile_name: String::new(),
            service_name: String::new(),
            protocol_name: protocol_name.to_string(),
            protocols: HashMap::new(),
            auto_events: Vec::new(),
        }
    }

    /// Attach an auto-event to the device.
    pub fn add_auto_event(&mut self, event: AutoEvent) {
        self.auto_events.push(event);
    }
}

// =============================================================================
// Validation Failure
// =============================================================================

/// A recoverable validation failure for one data row.
///
/// The offending record is excluded from the result's devices; conversion
/// continues with subsequent rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailure {
    /// Sheet the row came from.
    pub sheet: String,
    /// 1-based spreadsheet row number (header is row 1).
    pub row: usize,
    /// Validation messages for the row.
    pub errors: Vec<String>,
}

impl ValidationFailure {
    /// Create a failure for one row.
    pub fn new(sheet: &str, row: usize, errors: Vec<String>) -> Self {
        Self {
            sheet: sheet.to_string(),
            row,
            errors,
        }
    }
}

// =============================================================================
// Conversion Result
// =============================================================================

/// Output of a conversion run: admitted devices plus every validation
/// failure collected along the way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    /// Devices that bound and validated successfully, in row order.
    pub devices: Vec<Device>,
    /// Per-row validation failures, in encounter order.
    #[serde(default)]
    pub validation_errors: Vec<ValidationFailure>,
}

impl ConversionResult {
    /// True when every row converted cleanly.
    pub fn is_clean(&self) -> bool {
        self.validation_errors.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
