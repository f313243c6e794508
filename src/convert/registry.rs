//! Field registries: which spreadsheet columns map onto which record fields.
//!
//! Column headers are matched against a per-record-type registry declared at
//! compile time: a table from column name to a typed setter tagged with the
//! field's value kind. Headers can be reordered or carry unknown names
//! without any runtime reflection; unknown columns are the binder's business
//! (protocol properties for devices, parent references for auto-events).
//!
//! Structured fields (`protocols`, `autoEvents`, the seeded `protocolName`)
//! are deliberately not registered: they are assembled by the binder and the
//! linker, never bound from a single cell.

use std::collections::HashMap;

use crate::models::{AutoEvent, Device, ProtocolProperties};

// =============================================================================
// Field Kinds & Setters
// =============================================================================

/// Value kind of a registered field, driving cell conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Raw cell text, unmodified.
    Scalar,
    /// Cell split on commas into ordered elements.
    List,
    /// Strict boolean literal ("true"/"false").
    Bool,
}

/// Typed setter for one registered column. The variant doubles as the
/// field's kind tag.
pub enum Setter<T> {
    Scalar(fn(&mut T, String)),
    List(fn(&mut T, Vec<String>)),
    Bool(fn(&mut T, bool)),
}

impl<T> Setter<T> {
    /// The value kind this setter accepts.
    pub fn kind(&self) -> FieldKind {
        match self {
            Setter::Scalar(_) => FieldKind::Scalar,
            Setter::List(_) => FieldKind::List,
            Setter::Bool(_) => FieldKind::Bool,
        }
    }
}

// =============================================================================
// Field Registry
// =============================================================================

/// Column-name to setter table for one record type.
pub struct FieldRegistry<T> {
    fields: HashMap<&'static str, Setter<T>>,
}

impl<T> FieldRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Register a scalar field.
    pub fn scalar(mut self, column: &'static str, set: fn(&mut T, String)) -> Self {
        self.fields.insert(column, Setter::Scalar(set));
        self
    }

    /// Register a list field.
    pub fn list(mut self, column: &'static str, set: fn(&mut T, Vec<String>)) -> Self {
        self.fields.insert(column, Setter::List(set));
        self
    }

    /// Register a boolean field.
    pub fn boolean(mut self, column: &'static str, set: fn(&mut T, bool)) -> Self {
        self.fields.insert(column, Setter::Bool(set));
        self
    }

    /// Look up the setter for a column name.
    pub fn get(&self, column: &str) -> Option<&Setter<T>> {
        self.fields.get(column)
    }

    /// Whether the column maps onto a record field.
    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Number of registered fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<T> Default for FieldRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Record Registries
// =============================================================================

/// Registry for the device sheet.
pub fn device_registry() -> FieldRegistry<Device> {
    FieldRegistry::<Device>::new()
        .scalar("Name", |d, v| d.name = v)
        .scalar("Description", |d, v| d.description = v)
        .scalar("AdminState", |d, v| d.admin_state = v)
        .list("Labels", |d, v| d.labels = v)
        .scalar("Location", |d, v| d.location = v)
        .scalar("ProfileName", |d, v| d.profile_name = v)
        .scalar("ServiceName", |d, v| d.service_name = v)
}

/// Registry for the auto-event sheet.
pub fn auto_event_registry() -> FieldRegistry<AutoEvent> {
    FieldRegistry::<AutoEvent>::new()
        .scalar("Interval", |e, v| e.interval = v)
        .boolean("OnChange", |e, v| e.on_change = v)
        .scalar("SourceName", |e, v| e.source_name = v)
}

// =============================================================================
// Protocol Registry
// =============================================================================

/// Protocol identifier for Modbus over serial.
pub const MODBUS_RTU: &str = "modbus-rtu";

/// Protocol identifiers the converter knows how to nest properties under.
pub const RECOGNIZED_PROTOCOLS: &[&str] = &[MODBUS_RTU];

/// Nest accumulated protocol properties under the protocol name.
///
/// An unrecognized protocol yields an empty map; the properties are
/// dropped, not an error.
pub fn wrap_protocol_properties(
    protocol_name: &str,
    properties: ProtocolProperties,
) -> HashMap<String, ProtocolProperties> {
    if RECOGNIZED_PROTOCOLS.contains(&protocol_name) {
        HashMap::from([(protocol_name.to_string(), properties)])
    } else {
        HashMap::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
