//! Tabular source abstraction and the XLSX-backed in-memory workbook.
//!
//! The conversion pipeline never touches the spreadsheet file directly: it
//! works against [`TableSource`], a small capability interface (read the rows
//! of a named sheet, insert a column, fill a column). [`Workbook`] is the
//! concrete implementation: sheets are loaded eagerly through `calamine`,
//! the file handle is released as soon as loading finishes, and all column
//! mutation happens in memory on the loaded copy.
//!
//! Column coordinates use spreadsheet letters ("A", "B", ..., "AA"), 1-based,
//! converted by [`column_letter`] / [`column_index`].

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use calamine::{Data, Reader, Xlsx};

use crate::error::{TableError, TableResult};

// =============================================================================
// Table Source
// =============================================================================

/// Capability interface over a tabular file.
///
/// Rows are ordered sequences of cell strings; cells hold literal text only
/// (no formulas or styling). Implementations may normalize what the
/// underlying format omits or pads; see [`Workbook`] for the XLSX rules.
pub trait TableSource {
    /// Names of all sheets, in file order.
    fn sheet_names(&self) -> Vec<String>;

    /// All rows of the named sheet, header first.
    fn rows(&self, sheet: &str) -> TableResult<Vec<Vec<String>>>;

    /// Insert an empty column before the given letter position, shifting
    /// existing cells right. Inserting one past the current width appends.
    fn insert_column(&mut self, sheet: &str, column: &str) -> TableResult<()>;

    /// Overwrite the cells of an existing column, top to bottom. Fewer
    /// values than rows leaves the remaining rows untouched.
    fn set_column(&mut self, sheet: &str, column: &str, values: &[String]) -> TableResult<()>;
}

// =============================================================================
// Column Letters
// =============================================================================

/// Convert a 1-based column position to its spreadsheet letter
/// (1 = "A", 26 = "Z", 27 = "AA").
pub fn column_letter(mut position: usize) -> String {
    let mut letters = Vec::new();
    while position > 0 {
        let rem = (position - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        position = (position - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Convert a spreadsheet column letter back to its 1-based position.
/// Returns `None` for anything that is not pure ASCII letters.
pub fn column_index(column: &str) -> Option<usize> {
    if column.is_empty() {
        return None;
    }
    let mut position = 0usize;
    for c in column.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let c = c.to_ascii_uppercase();
        position = position * 26 + (c as usize - 'A' as usize + 1);
    }
    Some(position)
}

// =============================================================================
// Workbook
// =============================================================================

#[derive(Debug)]
struct NamedSheet {
    name: String,
    rows: Vec<Vec<String>>,
}

/// In-memory workbook: named sheets of cell strings.
///
/// Loaded from XLSX via [`Workbook::open`] / [`Workbook::from_bytes`], or
/// assembled directly with [`Workbook::add_sheet`] (tests, callers with
/// pre-parsed data). XLSX loading normalizes cells to text, drops rows with
/// no non-empty cell, and truncates trailing empty cells per row (the same
/// shape a streaming spreadsheet reader hands out, which the mapping
/// interpreter's row padding accounts for). Sheets added via `add_sheet` are
/// stored verbatim.
#[derive(Debug)]
pub struct Workbook {
    sheets: Vec<NamedSheet>,
}

impl Workbook {
    /// Create an empty workbook.
    pub fn new() -> Self {
        Self { sheets: Vec::new() }
    }

    /// Add a sheet with the given rows, stored verbatim. An existing sheet
    /// with the same name is replaced.
    pub fn add_sheet(&mut self, name: &str, rows: Vec<Vec<String>>) {
        if let Some(sheet) = self.sheets.iter_mut().find(|s| s.name == name) {
            sheet.rows = rows;
            return;
        }
        self.sheets.push(NamedSheet {
            name: name.to_string(),
            rows,
        });
    }

    /// Load a workbook from an XLSX file.
    pub fn open<P: AsRef<Path>>(path: P) -> TableResult<Self> {
        let file = File::open(path.as_ref())?;
        let mut workbook = Xlsx::new(BufReader::new(file))
            .map_err(|e| TableError::WorkbookError(e.to_string()))?;
        Ok(Self {
            sheets: load_sheets(&mut workbook)?,
        })
    }

    /// Load a workbook from XLSX bytes (e.g. an HTTP upload).
    pub fn from_bytes(bytes: &[u8]) -> TableResult<Self> {
        let mut workbook = Xlsx::new(Cursor::new(bytes))
            .map_err(|e| TableError::WorkbookError(e.to_string()))?;
        Ok(Self {
            sheets: load_sheets(&mut workbook)?,
        })
    }

    fn sheet(&self, name: &str) -> TableResult<&NamedSheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| TableError::SheetMissing(name.to_string()))
    }

    fn sheet_mut(&mut self, name: &str) -> TableResult<&mut NamedSheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| TableError::SheetMissing(name.to_string()))
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl TableSource for Workbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn rows(&self, sheet: &str) -> TableResult<Vec<Vec<String>>> {
        Ok(self.sheet(sheet)?.rows.clone())
    }

    fn insert_column(&mut self, sheet: &str, column: &str) -> TableResult<()> {
        let position = column_index(column).ok_or_else(|| TableError::ColumnOutOfRange {
            sheet: sheet.to_string(),
            column: column.to_string(),
        })?;
        let named = self.sheet_mut(sheet)?;
        let width = named.rows.iter().map(Vec::len).max().unwrap_or(0);
        let index = position - 1;
        if index > width {
            return Err(TableError::ColumnOutOfRange {
                sheet: sheet.to_string(),
                column: column.to_string(),
            });
        }
        for row in &mut named.rows {
            if row.len() < index {
                row.resize(index, String::new());
            }
            row.insert(index, String::new());
        }
        Ok(())
    }

    fn set_column(&mut self, sheet: &str, column: &str, values: &[String]) -> TableResult<()> {
        let position = column_index(column).ok_or_else(|| TableError::ColumnOutOfRange {
            sheet: sheet.to_string(),
            column: column.to_string(),
        })?;
        let named = self.sheet_mut(sheet)?;
        let width = named.rows.iter().map(Vec::len).max().unwrap_or(0);
        let index = position - 1;
        if index >= width {
            return Err(TableError::ColumnOutOfRange {
                sheet: sheet.to_string(),
                column: column.to_string(),
            });
        }
        for (row, value) in named.rows.iter_mut().zip(values) {
            if row.len() <= index {
                row.resize(index + 1, String::new());
            }
            row[index] = value.clone();
        }
        Ok(())
    }
}

// =============================================================================
// XLSX Loading
// =============================================================================

fn load_sheets<R: Read + Seek>(workbook: &mut Xlsx<R>) -> TableResult<Vec<NamedSheet>> {
    let mut sheets = Vec::new();
    let names: Vec<String> = workbook.sheet_names().to_vec();
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| TableError::WorkbookError(e.to_string()))?;
        let mut rows: Vec<Vec<String>> = Vec::new();
        for row in range.rows() {
            let mut cells: Vec<String> = row.iter().map(cell_text).collect();
            while cells.last().is_some_and(|c| c.is_empty()) {
                cells.pop();
            }
            if cells.is_empty() {
                continue;
            }
            rows.push(cells);
        }
        sheets.push(NamedSheet { name, rows });
    }
    Ok(sheets)
}

/// Render one cell as literal text. Integral floats lose the trailing ".0"
/// Excel would otherwise leak into values like unit ids.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                n.to_string()
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Data::Error(e) => format!("#{e:?}"),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

// =============================================================================
// Tests
// =============================================================================
