//! Mapping-table interpretation.
//!
//! The mapping sheet declares, per target field, where the field's data
//! lives and which default to use when its column is missing from the data
//! sheet. [`interpret`] turns the sheet's rows into the lookup table the
//! column completer works from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{MappingError, MappingResult};

/// Header cell naming the target object field.
pub const OBJECT_COLUMN: &str = "Object";
/// Header cell naming the field's dotted location path.
pub const PATH_COLUMN: &str = "Path";
/// Header cell naming the field's default value.
pub const DEFAULT_VALUE_COLUMN: &str = "Default Value";

/// Path prefix classifying a mapping entry as auto-event data.
const AUTO_EVENT_PATH_PREFIX: &str = "autoevents";

// =============================================================================
// Field Mapping
// =============================================================================

/// One entry of the mapping sheet.
///
/// The object-field name is the key of the surrounding
/// `HashMap<String, FieldMapping>`, built once per conversion run and
/// immutable afterward.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    /// Default cell value, possibly empty. A non-empty default makes the
    /// field eligible for column completion.
    pub default_value: String,
    /// Dotted location hint, e.g. "AutoEvents.Interval" or
    /// "Protocols.modbus-rtu.UnitID". Classifies which data sheet the
    /// field belongs to.
    pub path: String,
}

impl FieldMapping {
    /// Create a mapping entry.
    pub fn new(default_value: &str, path: &str) -> Self {
        Self {
            default_value: default_value.to_string(),
            path: path.to_string(),
        }
    }
}

// =============================================================================
// Path Classification
// =============================================================================

/// True when the path places a field on the auto-event sheet
/// (prefix "autoevents", case-insensitive). Everything else, plain fields
/// and protocol-nested paths alike, belongs to the device sheet.
pub fn is_auto_event_path(path: &str) -> bool {
    match path.get(..AUTO_EVENT_PATH_PREFIX.len()) {
        Some(prefix) => prefix.eq_ignore_ascii_case(AUTO_EVENT_PATH_PREFIX),
        None => false,
    }
}

// =============================================================================
// Interpretation
// =============================================================================

/// Interpret the mapping sheet's rows into the field-mapping table.
///
/// Row 0 is the header; the "Object", "Path" and "Default Value" columns are
/// located by exact text match and may appear in any order. A named column
/// that is absent falls back to index 0 rather than failing, so a malformed
/// header degrades to keys/values drawn from the first column. Data rows are
/// right-padded to header width (sheet readers drop trailing blank cells).
/// Nothing is trimmed or validated; duplicate object names overwrite.
pub fn interpret(rows: &[Vec<String>]) -> MappingResult<HashMap<String, FieldMapping>> {
    let header = rows
        .first()
        .filter(|cells| !cells.is_empty())
        .ok_or(MappingError::MissingHeader)?;

    let object_idx = find_column(header, OBJECT_COLUMN);
    let path_idx = find_column(header, PATH_COLUMN);
    let default_idx = find_column(header, DEFAULT_VALUE_COLUMN);

    let width = header.len();
    let mut mapping = HashMap::new();
    for row in &rows[1..] {
        let mut cells = row.clone();
        if cells.len() < width {
            cells.resize(width, String::new());
        }
        mapping.insert(
            cells[object_idx].clone(),
            FieldMapping::new(&cells[default_idx], &cells[path_idx]),
        );
    }
    Ok(mapping)
}

fn find_column(header: &[String], name: &str) -> usize {
    header.iter().position(|cell| cell == name).unwrap_or(0)
}

// =============================================================================
// Example
// =============================================================================

/// A representative mapping table for a Modbus device workbook. The CLI
/// `mapping` command prints it when no workbook is given; tests drive the
/// pipeline with it.
pub fn example_mapping() -> HashMap<String, FieldMapping> {
    HashMap::from([
        ("Name".to_string(), FieldMapping::new("", "Name")),
        ("Description".to_string(), FieldMapping::new("", "Description")),
        (
            "AdminState".to_string(),
            FieldMapping::new("UNLOCKED", "AdminState"),
        ),
        ("Labels".to_string(), FieldMapping::new("", "Labels")),
        ("Location".to_string(), FieldMapping::new("", "Location")),
        (
            "ProfileName".to_string(),
            FieldMapping::new("", "ProfileName"),
        ),
        (
            "ServiceName".to_string(),
            FieldMapping::new("device-modbus", "ServiceName"),
        ),
        (
            "UnitID".to_string(),
            FieldMapping::new("1", "Protocols.modbus-rtu.UnitID"),
        ),
        (
            "Interval".to_string(),
            FieldMapping::new("10s", "AutoEvents.Interval"),
        ),
        (
            "OnChange".to_string(),
            FieldMapping::new("false", "AutoEvents.OnChange"),
        ),
        (
            "SourceName".to_string(),
            FieldMapping::new("", "AutoEvents.SourceName"),
        ),
    ])
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_interpret_basic() {
        let rows = vec![
            strings(&["Object", "Default Value", "Path"]),
            strings(&["AdminState", "UNLOCKED", "AdminState"]),
            strings(&["Interval", "10s", "AutoEvents.Interval"]),
        ];
        let mapping = interpret(&rows).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping["AdminState"].default_value, "UNLOCKED");
        assert_eq!(mapping["Interval"].path, "AutoEvents.Interval");
    }

    #[test]
    fn test_interpret_any_column_order() {
        let rows = vec![
            strings(&["Path", "Object", "Default Value"]),
            strings(&["ServiceName", "ServiceName", "device-modbus"]),
        ];
        let mapping = interpret(&rows).unwrap();
        assert_eq!(mapping["ServiceName"].default_value, "device-modbus");
        assert_eq!(mapping["ServiceName"].path, "ServiceName");
    }

    #[test]
    fn test_interpret_ignores_extra_columns() {
        let rows = vec![
            strings(&["Notes", "Object", "Path", "Default Value", "Owner"]),
            strings(&["ignore me", "Name", "Name", "", "ops"]),
        ];
        let mapping = interpret(&rows).unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping["Name"].path, "Name");
        assert_eq!(mapping["Name"].default_value, "");
    }

    #[test]
    fn test_interpret_pads_short_rows() {
        // A reader that drops trailing blank cells hands back just ["Name"].
        let rows = vec![
            strings(&["Object", "Path", "Default Value"]),
            strings(&["Name"]),
        ];
        let mapping = interpret(&rows).unwrap();
        assert_eq!(mapping["Name"].path, "");
        assert_eq!(mapping["Name"].default_value, "");
    }

    #[test]
    fn test_interpret_duplicate_object_overwrites() {
        let rows = vec![
            strings(&["Object", "Path", "Default Value"]),
            strings(&["AdminState", "AdminState", "LOCKED"]),
            strings(&["AdminState", "AdminState", "UNLOCKED"]),
        ];
        let mapping = interpret(&rows).unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping["AdminState"].default_value, "UNLOCKED");
    }

    #[test]
    fn test_interpret_no_rows() {
        assert!(matches!(interpret(&[]), Err(MappingError::MissingHeader)));
    }

    #[test]
    fn test_interpret_values_not_trimmed() {
        let rows = vec![
            strings(&["Object", "Path", "Default Value"]),
            strings(&[" Name ", "Name", " 10s "]),
        ];
        let mapping = interpret(&rows).unwrap();
        assert_eq!(mapping[" Name "].default_value, " 10s ");
    }

    #[test]
    fn test_interpret_header_without_named_columns() {
        // No exact matches: every index falls back to 0. The first column
        // serves as key, path and default alike (degraded, but no crash).
        let rows = vec![
            strings(&["Field", "Where"]),
            strings(&["Name", "Name"]),
        ];
        let mapping = interpret(&rows).unwrap();
        assert_eq!(mapping["Name"].path, "Name");
        assert_eq!(mapping["Name"].default_value, "Name");
    }

    #[test]
    fn test_is_auto_event_path() {
        assert!(is_auto_event_path("AutoEvents.Interval"));
        assert!(is_auto_event_path("autoevents.OnChange"));
        assert!(is_auto_event_path("AUTOEVENTS"));
        assert!(!is_auto_event_path("Name"));
        assert!(!is_auto_event_path("Protocols.modbus-rtu.UnitID"));
        assert!(!is_auto_event_path(""));
        assert!(!is_auto_event_path("auto"));
    }

    #[test]
    fn test_example_mapping_classification() {
        let mapping = example_mapping();
        assert!(is_auto_event_path(&mapping["Interval"].path));
        assert!(is_auto_event_path(&mapping["SourceName"].path));
        assert!(!is_auto_event_path(&mapping["UnitID"].path));
        assert!(!is_auto_event_path(&mapping["Name"].path));
    }
}
