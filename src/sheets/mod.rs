//! Row-oriented persistence backed by a spreadsheet.
//!
//! Each table is a worksheet whose first row holds the column headers.
//! [`RowStore`] is the seam the studio talks to; [`SheetsClient`] implements
//! it over the Google Sheets v4 REST API.

pub mod client;
pub mod error;

use std::collections::HashMap;

pub use client::SheetsClient;
pub use error::SheetsError;

/// One data row, keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row(HashMap<String, String>);

impl Row {
    /// Zips a header row with a data row. Missing trailing cells read as empty.
    pub fn from_cells(header: &[String], cells: &[String]) -> Self {
        Self(
            header
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), cells.get(i).cloned().unwrap_or_default()))
                .collect(),
        )
    }

    /// Cell under `column`, or `""` when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.0.get(column).map(String::as_str).unwrap_or("")
    }
}

/// Table-level operations on the spreadsheet.
///
/// `row_index` is the zero-based position among data rows, so the header
/// row is never addressed.
#[allow(async_fn_in_trait)]
pub trait RowStore {
    async fn read_all(&self, table: &str) -> Result<Vec<Row>, SheetsError>;

    async fn append_row(&self, table: &str, cells: &[String]) -> Result<(), SheetsError>;

    async fn update_cell(
        &self,
        table: &str,
        row_index: usize,
        column: &str,
        value: &str,
    ) -> Result<(), SheetsError>;
}
