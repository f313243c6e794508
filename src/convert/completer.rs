//! Column completion: synthesize mapped columns absent from a data sheet.
//!
//! A workbook author may leave out any column whose mapping entry declares a
//! default. Before binding, the completer appends those columns to the sheet
//! so every row carries the declared default, and the header reflects the
//! final column set. Completion mutates the table source and the in-memory
//! header together; running it on an already-complete header is a no-op.

use std::collections::HashMap;

use crate::error::TableResult;
use crate::mapping::FieldMapping;
use crate::workbook::{column_letter, TableSource};

/// Append a column for every mapping entry that is relevant to `sheet`
/// (per the `relevant` path predicate), carries a non-empty default, and is
/// not already present in `header`. Each synthesized column gets the object
/// field as its header cell and the default value in every data row.
/// Returns the names of the columns that were added.
///
/// `header` must be the sheet's current header row; it is extended in step
/// with the table so successive additions land after one another.
pub fn complete_columns<S>(
    source: &mut S,
    sheet: &str,
    header: &mut Vec<String>,
    mapping: &HashMap<String, FieldMapping>,
    relevant: impl Fn(&str) -> bool,
) -> TableResult<Vec<String>>
where
    S: TableSource + ?Sized,
{
    let row_count = source.rows(sheet)?.len();
    let mut added = Vec::new();

    for (object_field, entry) in mapping {
        if !relevant(&entry.path) || entry.default_value.is_empty() {
            continue;
        }
        if header.iter().any(|column| column == object_field) {
            continue;
        }

        let letter = column_letter(header.len() + 1);
        source.insert_column(sheet, &letter)?;

        let mut values = Vec::with_capacity(row_count);
        values.push(object_field.clone());
        values.resize(row_count, entry.default_value.clone());
        source.set_column(sheet, &letter, &values)?;

        header.push(object_field.clone());
        added.push(object_field.clone());
    }

    Ok(added)
}

// =============================================================================
// Tests
// =============================================================================
