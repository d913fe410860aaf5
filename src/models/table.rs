//! Dynamic-column table.
//!
//! Listing payloads do not share a fixed field set, even across pages
//! of one source, so the output relations cannot be static structs.
//! `Table` accumulates rows of string cells, registering columns in
//! first-seen order; rows missing a column serialize as empty cells.

use std::collections::HashMap;

use crate::error::Result;

/// A flat relation with a dynamic column set.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<HashMap<String, String>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row. Unseen column names are registered in the order
    /// they appear within the row.
    pub fn push_row(&mut self, cells: Vec<(String, String)>) {
        let mut row = HashMap::with_capacity(cells.len());
        for (column, value) in cells {
            if !self.columns.contains(&column) {
                self.columns.push(column.clone());
            }
            row.insert(column, value);
        }
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Look up one cell; `None` when the row lacks the column.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(column)).map(String::as_str)
    }

    /// All values of one column, empty string where a row lacks it.
    pub fn column_values(&self, column: &str) -> Vec<&str> {
        self.rows
            .iter()
            .map(|r| r.get(column).map(String::as_str).unwrap_or(""))
            .collect()
    }

    /// Encode as CSV with a header row and no index column.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            let record: Vec<&str> = self
                .columns
                .iter()
                .map(|c| row.get(c).map(String::as_str).unwrap_or(""))
                .collect();
            writer.write_record(&record)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| crate::error::AppError::storage(e))?;
        String::from_utf8(bytes).map_err(|e| crate::error::AppError::storage(e))
    }

    /// Decode a table previously produced by [`Table::to_csv`].
    pub fn from_csv(data: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(data.as_bytes());
        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut table = Self {
            columns: columns.clone(),
            rows: Vec::new(),
        };
        for record in reader.records() {
            let record = record?;
            let row: HashMap<String, String> = columns
                .iter()
                .cloned()
                .zip(record.iter().map(|v| v.to_string()))
                .collect();
            table.rows.push(row);
        }
        Ok(table)
    }
}
