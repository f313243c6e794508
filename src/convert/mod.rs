//! Conversion module.
//!
//! This module turns workbook sheets into device records:
//! - Registry: column-to-field tables per record type
//! - Completer: synthesize mapped columns from defaults
//! - Binder: one row into one typed record
//! - Linker: attach auto-events to their parent devices
//! - Pipeline: the two-phase driver and its options

pub mod binder;
pub mod completer;
pub mod linker;
pub mod pipeline;
pub mod registry;

pub use binder::{bind_auto_event, bind_device};
pub use completer::complete_columns;
pub use linker::attach_auto_events;
pub use pipeline::*;
pub use registry::{auto_event_registry, device_registry, FieldKind, FieldRegistry, MODBUS_RTU};
