//! Conversion pipeline: one workbook in, devices plus validation failures out.
//!
//! The driver reads the mapping sheet once, then runs two phases over the
//! data sheets. Phase 1 completes and binds the device sheet; phase 2 does
//! the same for the auto-event sheet and links each event into its named
//! parent devices. Structural problems (missing sheet, unreadable file, bad
//! boolean in strict mode) abort the run with one error; validation
//! failures accumulate per row and never abort.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::logs::{log_info, log_stage, log_success, log_warning, LogLevel};
use crate::error::{ConvertError, ConvertResult};
use crate::mapping::{self, FieldMapping};
use crate::models::{AutoEvent, ConversionResult, Device, ValidationFailure};
use crate::validation;
use crate::workbook::{TableSource, Workbook};

use super::binder::{bind_auto_event, bind_device};
use super::completer::complete_columns;
use super::linker::attach_auto_events;
use super::registry::MODBUS_RTU;

/// Default device sheet name.
pub const DEVICE_SHEET: &str = "Devices";
/// Default mapping sheet name.
pub const MAPPING_SHEET: &str = "MappingTable";
/// Default auto-event sheet name.
pub const AUTO_EVENT_SHEET: &str = "AutoEvents";

/// Column count of a fully populated auto-event sheet: the parent reference
/// plus the three event fields. Completion runs only when the header
/// deviates from this width.
const AUTO_EVENT_HEADER_WIDTH: usize = 4;

// =============================================================================
// Options
// =============================================================================

/// Sheet names the converter reads from the workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetNames {
    pub devices: String,
    pub mapping: String,
    pub auto_events: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            devices: DEVICE_SHEET.to_string(),
            mapping: MAPPING_SHEET.to_string(),
            auto_events: AUTO_EVENT_SHEET.to_string(),
        }
    }
}

/// Options for a conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertOptions {
    /// Sheet names to read.
    pub sheets: SheetNames,
    /// Protocol name new devices are seeded with and unmatched device
    /// columns nest under.
    pub protocol_name: String,
    /// Abort the whole conversion on the first bind error. When false, a
    /// row that fails to bind is recorded like a validation failure and
    /// the run continues.
    pub strict_bind: bool,
    /// Admit every bound record without schema validation.
    pub skip_validation: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            sheets: SheetNames::default(),
            protocol_name: MODBUS_RTU.to_string(),
            strict_bind: true,
            skip_validation: false,
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// Counters and column additions observed during a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbookInfo {
    /// Entries interpreted from the mapping sheet.
    pub mapping_fields: usize,
    /// Data rows on the device sheet (header excluded).
    pub device_rows: usize,
    /// Data rows on the auto-event sheet (header excluded).
    pub event_rows: usize,
    /// Columns synthesized from mapping defaults, both sheets.
    pub completed_columns: Vec<String>,
}

/// Everything a conversion run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertReport {
    /// Converted devices, row order, linked auto-events included.
    pub devices: Vec<Device>,
    /// Rows that bound but did not validate (and, in lenient mode, rows
    /// that did not bind).
    pub validation_errors: Vec<ValidationFailure>,
    /// Run metadata.
    pub info: WorkbookInfo,
}

impl ConvertReport {
    /// True when every row converted cleanly.
    pub fn is_clean(&self) -> bool {
        self.validation_errors.is_empty()
    }
}

// =============================================================================
// Entry Points
// =============================================================================

/// Convert an XLSX file on disk.
pub fn convert_file(
    path: impl AsRef<Path>,
    options: &ConvertOptions,
) -> ConvertResult<ConvertReport> {
    let path = path.as_ref();
    log_info(format!("📖 Reading workbook {}", path.display()));
    let mut workbook = Workbook::open(path)?;
    convert_workbook(&mut workbook, options)
}

/// Convert an XLSX workbook already in memory (uploads).
pub fn convert_bytes(bytes: &[u8], options: &ConvertOptions) -> ConvertResult<ConvertReport> {
    let mut workbook = Workbook::from_bytes(bytes)?;
    convert_workbook(&mut workbook, options)
}

/// Convert a loaded workbook: interpret the mapping sheet, run both phases
/// with the JSON Schema validators, log a summary.
pub fn convert_workbook(
    workbook: &mut Workbook,
    options: &ConvertOptions,
) -> ConvertResult<ConvertReport> {
    let mapping_rows = workbook.rows(&options.sheets.mapping)?;
    let mapping = mapping::interpret(&mapping_rows)?;
    log_stage(
        "mapping",
        LogLevel::Info,
        format!("📋 Interpreted {} field mappings", mapping.len()),
    );

    let report = convert_sheets_with(
        workbook,
        &mapping,
        options,
        validation::validate_device,
        validation::validate_auto_event,
    )?;

    if report.is_clean() {
        log_success(format!(
            "✨ Conversion complete: {} devices",
            report.devices.len()
        ));
    } else {
        log_warning(format!(
            "Conversion finished with {} invalid rows, {} devices kept",
            report.validation_errors.len(),
            report.devices.len()
        ));
    }
    Ok(report)
}

/// Core orchestration with the default JSON Schema validators, returning
/// just the records and failures.
pub fn convert_sheets<S>(
    source: &mut S,
    mapping: &HashMap<String, FieldMapping>,
    options: &ConvertOptions,
) -> ConvertResult<ConversionResult>
where
    S: TableSource + ?Sized,
{
    let report = convert_sheets_with(
        source,
        mapping,
        options,
        validation::validate_device,
        validation::validate_auto_event,
    )?;
    Ok(ConversionResult {
        devices: report.devices,
        validation_errors: report.validation_errors,
    })
}

/// Core orchestration with injected validators. A validator returns the
/// row's error messages; a non-empty list excludes the record and is
/// recorded, an empty one admits it.
pub fn convert_sheets_with<S, DV, EV>(
    source: &mut S,
    mapping: &HashMap<String, FieldMapping>,
    options: &ConvertOptions,
    device_validator: DV,
    event_validator: EV,
) -> ConvertResult<ConvertReport>
where
    S: TableSource + ?Sized,
    DV: Fn(&Device) -> Result<(), Vec<String>>,
    EV: Fn(&AutoEvent) -> Result<(), Vec<String>>,
{
    let mut completed_columns = Vec::new();
    let mut validation_errors = Vec::new();

    // Phase 1: devices.
    let sheet = options.sheets.devices.as_str();
    let mut header = sheet_header(source, sheet)?;
    if header.len() != mapping.len() {
        let added = complete_columns(source, sheet, &mut header, mapping, |path| {
            !mapping::is_auto_event_path(path)
        })?;
        if !added.is_empty() {
            log_stage(
                "devices",
                LogLevel::Info,
                format!("🔧 Added columns from defaults: {}", added.join(", ")),
            );
        }
        completed_columns.extend(added);
    }

    let rows = source.rows(sheet)?;
    let device_rows = rows.len().saturating_sub(1);
    let mut devices = Vec::new();
    for (index, row) in rows.iter().enumerate().skip(1) {
        // 1-based spreadsheet row, the header is row 1
        let row_number = index + 1;
        let device = match bind_device(row, &header, &options.protocol_name) {
            Ok(device) => device,
            Err(err) => {
                if options.strict_bind {
                    return Err(ConvertError::Bind {
                        sheet: sheet.to_string(),
                        row: row_number,
                        source: err,
                    });
                }
                validation_errors.push(ValidationFailure::new(
                    sheet,
                    row_number,
                    vec![err.to_string()],
                ));
                continue;
            }
        };
        if !options.skip_validation {
            if let Err(errors) = device_validator(&device) {
                validation_errors.push(ValidationFailure::new(sheet, row_number, errors));
                continue;
            }
        }
        devices.push(device);
    }

    // Phase 2: auto-events, linked into the devices above.
    let sheet = options.sheets.auto_events.as_str();
    let mut header = sheet_header(source, sheet)?;
    if header.len() != AUTO_EVENT_HEADER_WIDTH {
        let added = complete_columns(
            source,
            sheet,
            &mut header,
            mapping,
            mapping::is_auto_event_path,
        )?;
        if !added.is_empty() {
            log_stage(
                "autoevents",
                LogLevel::Info,
                format!("🔧 Added columns from defaults: {}", added.join(", ")),
            );
        }
        completed_columns.extend(added);
    }

    let rows = source.rows(sheet)?;
    let event_rows = rows.len().saturating_sub(1);
    for (index, row) in rows.iter().enumerate().skip(1) {
        let row_number = index + 1;
        let (event, parent_names) = match bind_auto_event(row, &header) {
            Ok(bound) => bound,
            Err(err) => {
                if options.strict_bind {
                    return Err(ConvertError::Bind {
                        sheet: sheet.to_string(),
                        row: row_number,
                        source: err,
                    });
                }
                validation_errors.push(ValidationFailure::new(
                    sheet,
                    row_number,
                    vec![err.to_string()],
                ));
                continue;
            }
        };
        if !options.skip_validation {
            if let Err(errors) = event_validator(&event) {
                validation_errors.push(ValidationFailure::new(sheet, row_number, errors));
                continue;
            }
        }
        // blank reference cells are not parent names
        let parents: Vec<String> = parent_names
            .into_iter()
            .filter(|name| !name.is_empty())
            .collect();
        for name in attach_auto_events(&mut devices, &event, &parents) {
            log_stage(
                "autoevents",
                LogLevel::Warning,
                format!("Row {row_number}: no device named '{name}'"),
            );
        }
    }

    Ok(ConvertReport {
        devices,
        validation_errors,
        info: WorkbookInfo {
            mapping_fields: mapping.len(),
            device_rows,
            event_rows,
            completed_columns,
        },
    })
}

/// First row of a data sheet. A sheet with no rows at all cannot be bound.
fn sheet_header<S>(source: &S, sheet: &str) -> ConvertResult<Vec<String>>
where
    S: TableSource + ?Sized,
{
    let rows = source.rows(sheet)?;
    rows.into_iter()
        .next()
        .ok_or_else(|| ConvertError::EmptySheet(sheet.to_string()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn mapping_sheet() -> Vec<Vec<String>> {
        vec![
            cells(&["Object", "Path", "Default Value"]),
            cells(&["Name", "Name", ""]),
            cells(&["Description", "Description", ""]),
            cells(&["AdminState", "AdminState", "UNLOCKED"]),
            cells(&["Labels", "Labels", ""]),
            cells(&["Location", "Location", ""]),
            cells(&["ProfileName", "ProfileName", ""]),
            cells(&["ServiceName", "ServiceName", "device-modbus"]),
            cells(&["UnitID", "Protocols.modbus-rtu.UnitID", "1"]),
            cells(&["Interval", "AutoEvents.Interval", "10s"]),
            cells(&["OnChange", "AutoEvents.OnChange", "false"]),
            cells(&["SourceName", "AutoEvents.SourceName", ""]),
        ]
    }

    fn sample_workbook() -> Workbook {
        let mut workbook = Workbook::new();
        workbook.add_sheet("MappingTable", mapping_sheet());
        workbook.add_sheet(
            "Devices",
            vec![
                cells(&[
                    "Name",
                    "Description",
                    "Labels",
                    "Location",
                    "ProfileName",
                    "ServiceName",
                    "UnitID",
                ]),
                cells(&[
                    "Pump1",
                    "main loop pump",
                    "hvac,floor-3",
                    "basement",
                    "modbus-pump",
                    "device-modbus",
                    "3",
                ]),
                cells(&[
                    "Pump2",
                    "backup pump",
                    "hvac",
                    "basement",
                    "modbus-pump",
                    "device-modbus",
                    "4",
                ]),
            ],
        );
        workbook.add_sheet(
            "AutoEvents",
            vec![
                cells(&["Name", "OnChange", "SourceName"]),
                cells(&["Pump1", "true", "Temperature"]),
                cells(&["Pump2", "false", "Pressure"]),
                cells(&["Pump1", "false", "Pressure"]),
            ],
        );
        workbook
    }

    #[test]
    fn test_full_conversion() {
        let mut workbook = sample_workbook();
        let report = convert_workbook(&mut workbook, &ConvertOptions::default()).unwrap();

        assert!(report.is_clean(), "failures: {:?}", report.validation_errors);
        assert_eq!(report.devices.len(), 2);

        let pump1 = &report.devices[0];
        assert_eq!(pump1.name, "Pump1");
        assert_eq!(pump1.labels, vec!["hvac", "floor-3"]);
        // synthesized from the mapping default
        assert_eq!(pump1.admin_state, "UNLOCKED");
        assert_eq!(pump1.protocols[MODBUS_RTU]["UnitID"], "3");

        assert_eq!(pump1.auto_events.len(), 2);
        assert_eq!(pump1.auto_events[0].source_name, "Temperature");
        assert!(pump1.auto_events[0].on_change);
        assert_eq!(pump1.auto_events[1].source_name, "Pressure");
        assert_eq!(report.devices[1].auto_events.len(), 1);

        assert_eq!(report.info.mapping_fields, 11);
        assert_eq!(report.info.device_rows, 2);
        assert_eq!(report.info.event_rows, 3);
        assert!(report.info.completed_columns.contains(&"AdminState".to_string()));
        assert!(report.info.completed_columns.contains(&"Interval".to_string()));
    }

    #[test]
    fn test_event_interval_completed_from_default() {
        let mut workbook = sample_workbook();
        let report = convert_workbook(&mut workbook, &ConvertOptions::default()).unwrap();
        for device in &report.devices {
            for event in &device.auto_events {
                assert_eq!(event.interval, "10s");
            }
        }
    }

    #[test]
    fn test_convert_sheets_with_example_mapping() {
        let mut workbook = Workbook::new();
        workbook.add_sheet(
            "Devices",
            vec![
                cells(&["Name", "ProfileName", "ServiceName"]),
                cells(&["Pump1", "modbus-pump", "device-modbus"]),
            ],
        );
        workbook.add_sheet(
            "AutoEvents",
            vec![
                cells(&["Name", "Interval", "OnChange", "SourceName"]),
                cells(&["Pump1", "10s", "false", "Temperature"]),
            ],
        );

        let mapping = mapping::example_mapping();
        let result = convert_sheets(&mut workbook, &mapping, &ConvertOptions::default()).unwrap();

        assert!(result.is_clean());
        assert_eq!(result.devices.len(), 1);
        let pump = &result.devices[0];
        // completed from the example defaults
        assert_eq!(pump.admin_state, "UNLOCKED");
        assert_eq!(pump.protocols[MODBUS_RTU]["UnitID"], "1");
        assert_eq!(pump.auto_events.len(), 1);
        assert_eq!(pump.auto_events[0].source_name, "Temperature");
    }

    #[test]
    fn test_invalid_row_excluded_but_run_continues() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("MappingTable", mapping_sheet());
        workbook.add_sheet(
            "Devices",
            vec![
                cells(&["Name", "ProfileName", "ServiceName"]),
                cells(&["Pump1", "modbus-pump", "device-modbus"]),
                cells(&["", "modbus-pump", "device-modbus"]),
                cells(&["Pump3", "modbus-pump", "device-modbus"]),
            ],
        );
        workbook.add_sheet(
            "AutoEvents",
            vec![cells(&["Name", "Interval", "OnChange", "SourceName"])],
        );

        let report = convert_workbook(&mut workbook, &ConvertOptions::default()).unwrap();

        assert_eq!(report.devices.len(), 2);
        assert_eq!(report.devices[0].name, "Pump1");
        assert_eq!(report.devices[1].name, "Pump3");
        assert_eq!(report.validation_errors.len(), 1);
        let failure = &report.validation_errors[0];
        assert_eq!(failure.sheet, "Devices");
        assert_eq!(failure.row, 3);
        assert!(!failure.errors.is_empty());
    }

    #[test]
    fn test_strict_bind_aborts_on_bad_boolean() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("MappingTable", mapping_sheet());
        workbook.add_sheet(
            "Devices",
            vec![
                cells(&["Name", "ProfileName", "ServiceName"]),
                cells(&["Pump1", "modbus-pump", "device-modbus"]),
            ],
        );
        workbook.add_sheet(
            "AutoEvents",
            vec![
                cells(&["Name", "Interval", "OnChange", "SourceName"]),
                cells(&["Pump1", "10s", "maybe", "Temperature"]),
            ],
        );

        let err = convert_workbook(&mut workbook, &ConvertOptions::default()).unwrap_err();
        match err {
            ConvertError::Bind { sheet, row, source } => {
                assert_eq!(sheet, "AutoEvents");
                assert_eq!(row, 2);
                assert!(source.to_string().contains("OnChange"));
            }
            other => panic!("expected bind error, got {other:?}"),
        }
    }

    #[test]
    fn test_lenient_bind_collects_and_continues() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("MappingTable", mapping_sheet());
        workbook.add_sheet(
            "Devices",
            vec![
                cells(&["Name", "ProfileName", "ServiceName"]),
                cells(&["Pump1", "modbus-pump", "device-modbus"]),
            ],
        );
        workbook.add_sheet(
            "AutoEvents",
            vec![
                cells(&["Name", "Interval", "OnChange", "SourceName"]),
                cells(&["Pump1", "10s", "maybe", "Temperature"]),
                cells(&["Pump1", "30s", "true", "Pressure"]),
            ],
        );

        let options = ConvertOptions {
            strict_bind: false,
            ..ConvertOptions::default()
        };
        let report = convert_workbook(&mut workbook, &options).unwrap();

        assert_eq!(report.validation_errors.len(), 1);
        assert_eq!(report.validation_errors[0].sheet, "AutoEvents");
        assert_eq!(report.validation_errors[0].row, 2);
        assert_eq!(report.devices[0].auto_events.len(), 1);
        assert_eq!(report.devices[0].auto_events[0].source_name, "Pressure");
    }

    #[test]
    fn test_skip_validation_admits_invalid_rows() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("MappingTable", mapping_sheet());
        workbook.add_sheet(
            "Devices",
            vec![
                cells(&["Name", "ProfileName", "ServiceName"]),
                cells(&["", "", ""]),
            ],
        );
        workbook.add_sheet(
            "AutoEvents",
            vec![cells(&["Name", "Interval", "OnChange", "SourceName"])],
        );

        let options = ConvertOptions {
            skip_validation: true,
            ..ConvertOptions::default()
        };
        let report = convert_workbook(&mut workbook, &options).unwrap();

        assert_eq!(report.devices.len(), 1);
        assert!(report.is_clean());
    }

    #[test]
    fn test_complete_event_header_skips_completion() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("MappingTable", mapping_sheet());
        workbook.add_sheet(
            "Devices",
            vec![
                cells(&["Name", "ProfileName", "ServiceName"]),
                cells(&["Pump1", "modbus-pump", "device-modbus"]),
            ],
        );
        workbook.add_sheet(
            "AutoEvents",
            vec![
                cells(&["Name", "Interval", "OnChange", "SourceName"]),
                cells(&["Pump1", "5s", "false", "Temperature"]),
            ],
        );

        let report = convert_workbook(&mut workbook, &ConvertOptions::default()).unwrap();

        // width already 4: the "10s" mapping default must not overwrite
        assert_eq!(report.devices[0].auto_events[0].interval, "5s");
        assert!(!report.info.completed_columns.contains(&"Interval".to_string()));
    }

    #[test]
    fn test_missing_sheet_is_fatal() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("MappingTable", mapping_sheet());
        workbook.add_sheet(
            "Devices",
            vec![
                cells(&["Name", "ProfileName", "ServiceName"]),
                cells(&["Pump1", "modbus-pump", "device-modbus"]),
            ],
        );

        let err = convert_workbook(&mut workbook, &ConvertOptions::default()).unwrap_err();
        match err {
            ConvertError::Table(TableError::SheetMissing(name)) => {
                assert_eq!(name, "AutoEvents")
            }
            other => panic!("expected missing sheet, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_device_sheet_is_fatal() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("MappingTable", mapping_sheet());
        workbook.add_sheet("Devices", Vec::new());

        let err = convert_workbook(&mut workbook, &ConvertOptions::default()).unwrap_err();
        match err {
            ConvertError::EmptySheet(name) => assert_eq!(name, "Devices"),
            other => panic!("expected empty sheet, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_parent_is_dropped_without_failure() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("MappingTable", mapping_sheet());
        workbook.add_sheet(
            "Devices",
            vec![
                cells(&["Name", "ProfileName", "ServiceName"]),
                cells(&["Pump1", "modbus-pump", "device-modbus"]),
            ],
        );
        workbook.add_sheet(
            "AutoEvents",
            vec![
                cells(&["Name", "Interval", "OnChange", "SourceName"]),
                cells(&["Ghost", "10s", "false", "Temperature"]),
            ],
        );

        let report = convert_workbook(&mut workbook, &ConvertOptions::default()).unwrap();

        assert!(report.is_clean());
        assert!(report.devices[0].auto_events.is_empty());
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ConvertOptions = serde_json::from_str(r#"{"strictBind": false}"#).unwrap();
        assert!(!options.strict_bind);
        assert!(!options.skip_validation);
        assert_eq!(options.protocol_name, MODBUS_RTU);
        assert_eq!(options.sheets, SheetNames::default());
    }
}
