//! Row binding: one spreadsheet row into one typed record.
//!
//! Cells are matched positionally against the header, the header name is
//! resolved through the record's field registry, and the cell is converted
//! according to the field's kind. Rows longer than the header lose their
//! trailing cells; rows shorter than the header leave the remaining fields
//! at their defaults, which is equivalent to padding the row with empty
//! strings for every registered scalar.
//!
//! Columns the registry does not know are not an error. On the device sheet
//! they carry protocol properties (UnitID, BaudRate, ...) and are collected
//! into the device's nested protocols map. On the auto-event sheet they
//! carry parent device names and are handed back to the caller for linking.

use once_cell::sync::Lazy;

use crate::error::{BindError, BindResult};
use crate::models::{AutoEvent, Device, ProtocolProperties};

use super::registry::{
    auto_event_registry, device_registry, wrap_protocol_properties, FieldRegistry, Setter,
};

static DEVICE_FIELDS: Lazy<FieldRegistry<Device>> = Lazy::new(device_registry);
static AUTO_EVENT_FIELDS: Lazy<FieldRegistry<AutoEvent>> = Lazy::new(auto_event_registry);

// =============================================================================
// Cell Conversion
// =============================================================================

/// Split a list-valued cell on commas. An empty cell is one empty element.
fn split_list(cell: &str) -> Vec<String> {
    cell.split(',').map(str::to_string).collect()
}

/// Parse a boolean cell. Only "true"/"false" are accepted, ASCII
/// case-insensitively, ignoring surrounding whitespace.
fn parse_bool(column: &str, cell: &str) -> BindResult<bool> {
    let value = cell.trim();
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(BindError::InvalidBoolean {
            column: column.to_string(),
            value: cell.to_string(),
        })
    }
}

// =============================================================================
// Binding
// =============================================================================

/// Bind registered columns into `record`, returning unmatched
/// (column, cell) pairs in column order.
fn bind_into<T>(
    record: &mut T,
    row: &[String],
    header: &[String],
    registry: &FieldRegistry<T>,
) -> BindResult<Vec<(String, String)>> {
    let mut unmatched = Vec::new();
    for (index, cell) in row.iter().take(header.len()).enumerate() {
        let column = &header[index];
        match registry.get(column) {
            Some(Setter::Scalar(set)) => set(record, cell.clone()),
            Some(Setter::List(set)) => set(record, split_list(cell)),
            Some(Setter::Bool(set)) => set(record, parse_bool(column, cell)?),
            None => unmatched.push((column.clone(), cell.clone())),
        }
    }
    Ok(unmatched)
}

/// Bind one device-sheet row into a Device seeded with `protocol_name`.
///
/// Unmatched columns become protocol properties nested under the protocol
/// name; an unrecognized protocol name drops them (empty protocols map).
pub fn bind_device(row: &[String], header: &[String], protocol_name: &str) -> BindResult<Device> {
    let mut device = Device::new(protocol_name);
    let unmatched = bind_into(&mut device, row, header, &DEVICE_FIELDS)?;
    if !unmatched.is_empty() {
        let properties: ProtocolProperties = unmatched.into_iter().collect();
        device.protocols = wrap_protocol_properties(protocol_name, properties);
    }
    Ok(device)
}

/// Bind one auto-event-sheet row. Returns the event together with the
/// unmatched cell values in column order: the candidate parent device
/// names consumed by the linker.
pub fn bind_auto_event(row: &[String], header: &[String]) -> BindResult<(AutoEvent, Vec<String>)> {
    let mut event = AutoEvent::default();
    let unmatched = bind_into(&mut event, row, header, &AUTO_EVENT_FIELDS)?;
    let parent_names = unmatched.into_iter().map(|(_, value)| value).collect();
    Ok((event, parent_names))
}

// =============================================================================
// Tests
// =============================================================================
