use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ImportError;

/// Rows of named columns as exported by the registration system or the
/// planning spreadsheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Resolved positions of the columns a mapper reads.
pub(crate) struct ColumnIndex {
    positions: HashMap<&'static str, usize>,
    width: usize,
}

impl FeedTable {
    /// Fails on the first required column that is absent. Optional columns
    /// that are absent read as empty cells.
    pub(crate) fn index(
        &self,
        required: &[&'static str],
        optional: &[&'static str],
    ) -> Result<ColumnIndex, ImportError> {
        let find = |name: &str| self.columns.iter().position(|column| column.trim() == name);
        let mut positions = HashMap::with_capacity(required.len() + optional.len());
        for &name in required {
            let position = find(name).ok_or(ImportError::MissingColumn(name))?;
            positions.insert(name, position);
        }
        for &name in optional {
            if let Some(position) = find(name) {
                positions.insert(name, position);
            }
        }
        Ok(ColumnIndex {
            positions,
            width: self.columns.len(),
        })
    }

    /// Data rows with their 1-based row number, skipping rows where every
    /// cell is blank.
    pub(crate) fn data_rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|cell| !cell.trim().is_empty()))
            .map(|(index, cells)| (index + 1, cells.as_slice()))
    }
}

impl ColumnIndex {
    pub(crate) fn row<'a>(
        &'a self,
        number: usize,
        cells: &'a [String],
    ) -> Result<Row<'a>, ImportError> {
        if cells.len() < self.width {
            return Err(ImportError::ShortRow {
                row: number,
                expected: self.width,
                found: cells.len(),
            });
        }
        Ok(Row {
            number,
            cells,
            index: self,
        })
    }
}

pub(crate) struct Row<'a> {
    number: usize,
    cells: &'a [String],
    index: &'a ColumnIndex,
}

impl<'a> Row<'a> {
    #[must_use]
    pub const fn number(&self) -> usize {
        self.number
    }

    /// Trimmed cell content, empty for absent optional columns.
    #[must_use]
    pub fn get(&self, column: &'static str) -> &'a str {
        self.index
            .positions
            .get(column)
            .and_then(|&position| self.cells.get(position))
            .map_or("", |cell| cell.trim())
    }

    /// An empty cell yields `default`, or an error when there is none.
    pub fn parse_number(
        &self,
        column: &'static str,
        default: Option<i32>,
    ) -> Result<i32, ImportError> {
        let value = self.get(column);
        if let (true, Some(default)) = (value.is_empty(), default) {
            return Ok(default);
        }
        value.parse().map_err(|_| ImportError::InvalidNumber {
            row: self.number,
            column,
            value: value.to_owned(),
        })
    }

    /// Comma separated list cell.
    #[must_use]
    pub fn list(&self, column: &'static str) -> Vec<String> {
        self.get(column)
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect()
    }
}
