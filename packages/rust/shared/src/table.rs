//! In-memory tabular data shared by all pipelines.
//!
//! A [`Table`] is an ordered list of column names plus rows of
//! [`serde_json::Value`] cells. Every row carries exactly one cell per column
//! and column names are unique, so rows convert to records without losing
//! cells.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{DataFetchError, Result};

/// A rectangular table with dynamic columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given column names.
    ///
    /// Repeated names get a numeric suffix in order of appearance:
    /// `["%", "Foreign", "%"]` becomes `["%", "Foreign", "%.1"]`.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: unique_names(columns.into_iter().map(Into::into)),
            rows: Vec::new(),
        }
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows, each aligned to [`Table::columns`].
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate over the values of one column. Empty if the column is unknown.
    pub fn column_values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Value> + use<'a> {
        let idx = self.column_index(name);
        self.rows
            .iter()
            .filter_map(move |row| idx.and_then(|i| row.get(i)))
    }

    /// Append a row. Fails if the cell count differs from the column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(DataFetchError::validation(format!(
                "row has {} cells, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Add a column holding the same value in every existing row.
    pub fn add_constant_column(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.column_index(&name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = value.clone();
                }
            }
            None => {
                self.columns.push(name);
                for row in &mut self.rows {
                    row.push(value.clone());
                }
            }
        }
    }

    /// Concatenate `other` below `self`.
    ///
    /// Columns are unioned by name in first-seen order; cells missing on
    /// either side become `null`.
    pub fn append(&mut self, other: Table) {
        let mut mapping = Vec::with_capacity(other.columns.len());
        for col in &other.columns {
            let idx = match self.column_index(col) {
                Some(idx) => idx,
                None => {
                    self.columns.push(col.clone());
                    for row in &mut self.rows {
                        row.push(Value::Null);
                    }
                    self.columns.len() - 1
                }
            };
            mapping.push(idx);
        }

        let width = self.columns.len();
        for row in other.rows {
            let mut aligned = vec![Value::Null; width];
            for (cell, &idx) in row.into_iter().zip(&mapping) {
                aligned[idx] = cell;
            }
            self.rows.push(aligned);
        }
    }

    /// Convert rows into JSON objects keyed by column name.
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect::<Map<String, Value>>()
            })
            .collect()
    }

    /// Serialize as a JSON array of records.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_records())
            .map_err(|e| DataFetchError::Export(format!("JSON serialization failed: {e}")))
    }

    /// Write the table as CSV (header row first) to any writer.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.columns)
            .map_err(|e| DataFetchError::Export(e.to_string()))?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(render_cell))
                .map_err(|e| DataFetchError::Export(e.to_string()))?;
        }
        wtr.flush()
            .map_err(|e| DataFetchError::Export(format!("CSV flush failed: {e}")))
    }

    /// Render the table as a CSV string.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| DataFetchError::Export(e.to_string()))
    }

    /// Write the table as CSV to `path`, replacing any existing file.
    pub fn save_csv(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path).map_err(|e| DataFetchError::io(path, e))?;
        self.write_csv(file)?;
        tracing::debug!(path = %path.display(), rows = self.len(), "wrote CSV");
        Ok(())
    }
}

/// Rename duplicates to `name.1`, `name.2`, ... skipping names already taken.
fn unique_names(names: impl Iterator<Item = String>) -> Vec<String> {
    let names: Vec<String> = names.collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());
    let mut repeats: HashMap<String, usize> = HashMap::new();
    let mut unique = Vec::with_capacity(names.len());

    for name in names {
        if taken.insert(name.clone()) {
            unique.push(name);
            continue;
        }
        let count = repeats.entry(name.clone()).or_insert(0);
        let renamed = loop {
            *count += 1;
            let candidate = format!("{name}.{count}");
            if !taken.contains(&candidate) {
                break candidate;
            }
        };
        tracing::debug!(column = %name, renamed = %renamed, "renamed duplicate column");
        taken.insert(renamed.clone());
        unique.push(renamed);
    }
    unique
}

/// Text form of a cell in delimited output.
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
