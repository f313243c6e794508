//! JSON Schema validation for device and auto-event records.
//!
//! Bound records are checked against JSON Schema Draft 7 before they are
//! admitted to the result; a failing row is recorded and excluded, never
//! fatal. The schemas are embedded at compile time from the `schemas/`
//! directory:
//! - `device.json`: name shape, adminState enum, required profile/service
//! - `autoevent.json`: interval duration pattern, required source
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use devload::validation::{is_valid_device_value, validate_auto_event_value};
//!
//! let device = json!({
//!     "name": "Pump1",
//!     "adminState": "UNLOCKED",
//!     "profileName": "modbus-pump",
//!     "serviceName": "device-modbus"
//! });
//! assert!(is_valid_device_value(&device));
//!
//! let event = json!({ "interval": "10s", "sourceName": "Temperature" });
//! assert!(validate_auto_event_value(&event).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::models::{AutoEvent, Device};

static DEVICE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/device.json"))
        .expect("Invalid embedded schema")
});

static AUTO_EVENT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/autoevent.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` when valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate_record(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator =
        jsonschema::draft7::new(schema).map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Simpler variant: just true/false.
pub fn is_valid_record(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate a bound device record.
pub fn validate_device(device: &Device) -> Result<(), Vec<String>> {
    let value =
        serde_json::to_value(device).map_err(|e| vec![format!("Serialization failed: {}", e)])?;
    validate_device_value(&value)
}

/// Validate a pre-serialized device record.
pub fn validate_device_value(data: &Value) -> Result<(), Vec<String>> {
    validate_record(&DEVICE_SCHEMA, data)
}

/// Quick check against the device schema.
pub fn is_valid_device_value(data: &Value) -> bool {
    is_valid_record(&DEVICE_SCHEMA, data)
}

/// Validate a bound auto-event record.
pub fn validate_auto_event(event: &AutoEvent) -> Result<(), Vec<String>> {
    let value =
        serde_json::to_value(event).map_err(|e| vec![format!("Serialization failed: {}", e)])?;
    validate_auto_event_value(&value)
}

/// Validate a pre-serialized auto-event record.
pub fn validate_auto_event_value(data: &Value) -> Result<(), Vec<String>> {
    validate_record(&AUTO_EVENT_SCHEMA, data)
}

/// Quick check against the auto-event schema.
pub fn is_valid_auto_event_value(data: &Value) -> bool {
    is_valid_record(&AUTO_EVENT_SCHEMA, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_device() {
        let device = json!({
            "name": "Pump1",
            "adminState": "UNLOCKED",
            "profileName": "modbus-pump",
            "serviceName": "device-modbus"
        });
        assert!(is_valid_device_value(&device));
    }

    #[test]
    fn test_invalid_admin_state() {
        let device = json!({
            "name": "Pump1",
            "adminState": "OPEN",
            "profileName": "modbus-pump",
            "serviceName": "device-modbus"
        });
        assert!(!is_valid_device_value(&device));
    }

    #[test]
    fn test_device_name_shape() {
        let device = json!({
            "name": "bad name",
            "adminState": "UNLOCKED",
            "profileName": "modbus-pump",
            "serviceName": "device-modbus"
        });
        assert!(!is_valid_device_value(&device));
    }

    #[test]
    fn test_missing_fields_reported() {
        let result = validate_device_value(&json!({ "name": "Pump1" }));
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(!errors.is_empty());
        println!("Errors: {:?}", errors);
    }

    #[test]
    fn test_valid_auto_event() {
        let event = json!({
            "interval": "10s",
            "onChange": false,
            "sourceName": "Temperature"
        });
        assert!(is_valid_auto_event_value(&event));
    }

    #[test]
    fn test_interval_pattern() {
        for interval in ["500ms", "10s", "5m", "1h"] {
            let event = json!({ "interval": interval, "sourceName": "Temperature" });
            assert!(is_valid_auto_event_value(&event), "{interval} must pass");
        }
        for interval in ["10", "10x", "s", ""] {
            let event = json!({ "interval": interval, "sourceName": "Temperature" });
            assert!(!is_valid_auto_event_value(&event), "{interval} must fail");
        }
    }

    #[test]
    fn test_typed_device_wrapper() {
        let mut device = Device::new("modbus-rtu");
        device.name = "Sensor7".to_string();
        device.admin_state = "UNLOCKED".to_string();
        device.profile_name = "modbus-sensor".to_string();
        device.service_name = "device-modbus".to_string();
        assert!(validate_device(&device).is_ok());

        device.admin_state = String::new();
        assert!(validate_device(&device).is_err());
    }

    #[test]
    fn test_typed_auto_event_wrapper() {
        let event = AutoEvent {
            interval: "30s".to_string(),
            on_change: true,
            source_name: "Pressure".to_string(),
        };
        assert!(validate_auto_event(&event).is_ok());
        assert!(validate_auto_event(&AutoEvent::default()).is_err());
    }

    #[test]
    fn test_ad_hoc_schema() {
        let schema = json!({
            "type": "object",
            "required": ["name"],
            "properties": { "name": { "type": "string" } }
        });
        assert!(validate_record(&schema, &json!({ "name": "test" })).is_ok());
        assert!(validate_record(&schema, &json!({ "age": 42 })).is_err());
    }
}
