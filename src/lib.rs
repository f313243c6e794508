//! # Devload - XLSX device workbook conversion
//!
//! Devload converts spreadsheet-based device descriptions (XLSX workbooks)
//! into structured device records for a device-management API. A workbook
//! carries three sheets: the devices, their scheduled auto-events, and a
//! mapping table declaring where each field lives and which default to use
//! when its column is missing.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  XLSX File  │────▶│  Workbook   │────▶│   Convert   │────▶│ Device JSON │
//! │ (3 sheets)  │     │ (calamine)  │     │ (bind+link) │     │ (validated) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use devload::{convert_file, ConvertOptions};
//!
//! let report = convert_file("devices.xlsx", &ConvertOptions::default()).unwrap();
//! println!("Converted {} devices", report.devices.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (Device, AutoEvent)
//! - [`workbook`] - XLSX loading and the tabular-source interface
//! - [`mapping`] - Mapping-table interpretation
//! - [`convert`] - Column completion, row binding, linking, pipeline
//! - [`validation`] - JSON Schema validation
//! - [`client`] - Device-management API client
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Spreadsheet access
pub mod workbook;

// Mapping & conversion
pub mod convert;
pub mod mapping;

// Validation
pub mod validation;

// Device-management API client
pub mod client;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    BindError,
    ClientError,
    ConvertError,
    MappingError,
    ServerError,
    TableError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    AutoEvent,
    ConversionResult,
    Device,
    ProtocolProperties,
    ValidationFailure,
};

// =============================================================================
// Re-exports - Workbook
// =============================================================================

pub use workbook::{
    column_index,
    column_letter,
    TableSource,
    Workbook,
};

// =============================================================================
// Re-exports - Mapping
// =============================================================================

pub use mapping::{
    example_mapping,
    interpret,
    is_auto_event_path,
    FieldMapping,
};

// =============================================================================
// Re-exports - Conversion
// =============================================================================

pub use convert::{
    attach_auto_events,
    bind_auto_event,
    bind_device,
    complete_columns,
    convert_bytes,
    convert_file,
    convert_sheets,
    convert_sheets_with,
    convert_workbook,
    ConvertOptions,
    ConvertReport,
    SheetNames,
    WorkbookInfo,
    MODBUS_RTU,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    is_valid_auto_event_value,
    is_valid_device_value,
    is_valid_record,
    validate_auto_event,
    validate_auto_event_value,
    validate_device,
    validate_device_value,
    validate_record,
};

// =============================================================================
// Re-exports - Client
// =============================================================================

pub use client::DeviceApiClient;

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{
    error_response,
    ResponseMetadata,
    UploadResponse,
    ValidationStats,
    WorkbookMetadata,
};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
