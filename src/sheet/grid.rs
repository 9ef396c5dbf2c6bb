use crate::error::{Result, TapeSieveError};
use std::collections::BTreeSet;

/// Spreadsheet-style column selector ("A", "B", ... "Z", "AA", ...).
///
/// Config files and the CLI hand these around as opaque strings; parsing
/// happens once, up front, so later sheet access is by plain index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    index: usize,
    label: String,
}

impl ColumnRef {
    pub fn parse(token: &str) -> Result<Self> {
        let trimmed = token.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(TapeSieveError::InvalidColumn {
                token: token.to_string(),
            });
        }

        let mut index: usize = 0;
        for c in trimmed.chars() {
            let digit = (c.to_ascii_uppercase() as usize) - ('A' as usize) + 1;
            index = index * 26 + digit;
        }

        Ok(Self {
            index: index - 1,
            label: trimmed.to_uppercase(),
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

/// A grid of string cells addressable by (column, row).
///
/// Rows may be ragged; cells beyond a row's width read as empty. Hidden
/// columns are tracked as a flag on the grid: the CSV loader never sets it,
/// but loaders for richer formats can, and the extractor refuses to read a
/// column marked hidden.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    rows: Vec<Vec<String>>,
    hidden: BTreeSet<usize>,
}

impl Sheet {
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows,
            hidden: BTreeSet::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn has_column(&self, column: &ColumnRef) -> bool {
        column.index() < self.column_count()
    }

    pub fn is_hidden(&self, column: &ColumnRef) -> bool {
        self.hidden.contains(&column.index())
    }

    pub fn hide_column(&mut self, index: usize) {
        self.hidden.insert(index);
    }

    pub fn cell(&self, column: &ColumnRef, row: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column.index()))
            .map(String::as_str)
    }

    /// All cells of a column, top to bottom. Rows too short to reach the
    /// column contribute an empty value rather than being skipped.
    pub fn column_values(&self, column: &ColumnRef) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.get(column.index()).cloned().unwrap_or_default())
            .collect()
    }
}
