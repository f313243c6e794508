//! Error types for the Devload conversion pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`TableError`] - workbook read/write errors
//! - [`MappingError`] - mapping-table interpretation errors
//! - [`BindError`] - row-to-record binding errors
//! - [`ConvertError`] - top-level conversion errors
//! - [`ClientError`] - device-API client errors
//! - [`ServerError`] - HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Validation failures are not represented here: they are recoverable,
//! collected per row into [`crate::models::ValidationFailure`] and returned
//! alongside the converted records.

use thiserror::Error;

// =============================================================================
// Table Errors
// =============================================================================

/// Errors reading from or writing to a tabular source.
#[derive(Debug, Error)]
pub enum TableError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Underlying workbook format error.
    #[error("Invalid workbook: {0}")]
    WorkbookError(String),

    /// Requested sheet does not exist.
    #[error("Sheet not found: {0}")]
    SheetMissing(String),

    /// Column coordinate outside the sheet's writable range.
    #[error("Column {column} is out of range for sheet '{sheet}'")]
    ColumnOutOfRange { sheet: String, column: String },
}

// =============================================================================
// Mapping Errors
// =============================================================================

/// Errors interpreting the mapping sheet.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Mapping sheet has no header row.
    #[error("Mapping sheet has no header row")]
    MissingHeader,
}

// =============================================================================
// Bind Errors
// =============================================================================

/// Errors converting a row cell into a record field.
#[derive(Debug, Error)]
pub enum BindError {
    /// Cell text is not a boolean literal.
    #[error("Column '{column}': '{value}' is not a boolean (expected true/false)")]
    InvalidBoolean { column: String, value: String },
}

// =============================================================================
// Conversion Errors (top-level)
// =============================================================================

/// Top-level conversion errors.
///
/// This is the main error type returned by [`crate::convert::convert_file`].
/// It wraps all lower-level errors and adds sheet/row context where the
/// failure is row-local.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Workbook read/write error.
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Mapping interpretation error.
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Row binding failed in strict mode.
    #[error("Sheet '{sheet}' row {row}: {source}")]
    Bind {
        sheet: String,
        row: usize,
        source: BindError,
    },

    /// A data sheet exists but has no header row.
    #[error("Sheet '{0}' has no header row")]
    EmptySheet(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Client Errors
// =============================================================================

/// Errors from the device-API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing configuration variable.
    #[error("Missing {0} environment variable")]
    MissingConfig(&'static str),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// API rejected the request.
    #[error("Device API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Conversion error.
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;

/// Result type for mapping operations.
pub type MappingResult<T> = Result<T, MappingError>;

/// Result type for binding operations.
pub type BindResult<T> = Result<T, BindError>;

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // TableError -> ConvertError
        let table_err = TableError::SheetMissing("Devices".into());
        let convert_err: ConvertError = table_err.into();
        assert!(convert_err.to_string().contains("Devices"));

        // MappingError -> ConvertError
        let mapping_err = MappingError::MissingHeader;
        let convert_err: ConvertError = mapping_err.into();
        assert!(convert_err.to_string().contains("header"));
    }

    #[test]
    fn test_bind_error_context() {
        let err = ConvertError::Bind {
            sheet: "AutoEvents".into(),
            row: 3,
            source: BindError::InvalidBoolean {
                column: "OnChange".into(),
                value: "yes".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("AutoEvents"));
        assert!(msg.contains("row 3"));
        assert!(msg.contains("OnChange"));
        assert!(msg.contains("yes"));
    }

    #[test]
    fn test_client_error_format() {
        let err = ClientError::ApiError {
            status: 409,
            message: "device name already exists".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("409"));
        assert!(msg.contains("already exists"));
    }
}
