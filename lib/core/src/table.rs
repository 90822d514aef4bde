//! Record table
//!
//! A column-oriented, in-memory table of candidate/job-application rows.
//! Every pipeline stage appends derived columns to the same table, so row
//! order is fixed once the table is built and every column has the same
//! number of rows.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Typed cell storage for a single column. Every cell may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    Int64(Vec<Option<i64>>),
    Float64(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Utf8(Vec<Option<String>>),
}

impl ColumnData {
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Boolean(v) => v.len(),
            ColumnData::Utf8(v) => v.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric columns are the ones a classifier can consume directly.
    /// Booleans count as numeric.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnData::Int64(_) | ColumnData::Float64(_) | ColumnData::Boolean(_)
        )
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnData::Int64(_) => "int64",
            ColumnData::Float64(_) => "float64",
            ColumnData::Boolean(_) => "bool",
            ColumnData::Utf8(_) => "utf8",
        }
    }

    #[inline]
    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Int64(v) => v[row].is_none(),
            ColumnData::Float64(v) => v[row].map_or(true, f64::is_nan),
            ColumnData::Boolean(v) => v[row].is_none(),
            ColumnData::Utf8(v) => v[row].is_none(),
        }
    }

    pub fn null_count(&self) -> usize {
        (0..self.len()).filter(|&row| self.is_missing(row)).count()
    }

    /// Text content of a cell. Non-text columns never carry text.
    #[inline]
    pub fn text_at(&self, row: usize) -> Option<&str> {
        match self {
            ColumnData::Utf8(v) => v[row].as_deref(),
            _ => None,
        }
    }

    /// String form of a cell, used for category labels
    pub fn render_at(&self, row: usize) -> Option<String> {
        if self.is_missing(row) {
            return None;
        }
        match self {
            ColumnData::Int64(v) => v[row].map(|x| x.to_string()),
            ColumnData::Float64(v) => v[row].map(|x| format!("{:?}", x)),
            ColumnData::Boolean(v) => v[row].map(|x| if x { "True" } else { "False" }.to_string()),
            ColumnData::Utf8(v) => v[row].clone(),
        }
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn int64(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        Self::new(name, ColumnData::Int64(values))
    }

    pub fn float64(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::new(name, ColumnData::Float64(values))
    }

    pub fn boolean(name: impl Into<String>, values: Vec<Option<bool>>) -> Self {
        Self::new(name, ColumnData::Boolean(values))
    }

    pub fn utf8<S: Into<String>>(name: impl Into<String>, values: Vec<Option<S>>) -> Self {
        Self::new(
            name,
            ColumnData::Utf8(values.into_iter().map(|v| v.map(Into::into)).collect()),
        )
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        self.data.is_numeric()
    }

    /// Per-row text view; missing cells and non-text columns give `None`
    pub fn text_values(&self) -> Vec<Option<&str>> {
        (0..self.len()).map(|row| self.data.text_at(row)).collect()
    }

    /// Per-row string form; missing cells give `None`
    pub fn rendered_values(&self) -> Vec<Option<String>> {
        (0..self.len()).map(|row| self.data.render_at(row)).collect()
    }
}

/// Ordered collection of equally long named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    columns: Vec<Column>,
    n_rows: usize,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, rejecting duplicate names and ragged columns
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut table = Self::new();
        for column in columns {
            table.add_column(column)?;
        }
        Ok(table)
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    #[inline]
    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Look up a column that must exist
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.get(name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Append a column at the end of the table
    pub fn add_column(&mut self, column: Column) -> Result<()> {
        if self.has_column(column.name()) {
            return Err(Error::DuplicateColumn(column.name().to_string()));
        }
        if self.columns.is_empty() {
            self.n_rows = column.len();
        } else if column.len() != self.n_rows {
            return Err(Error::LengthMismatch {
                column: column.name().to_string(),
                expected: self.n_rows,
                actual: column.len(),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn add_columns(&mut self, columns: impl IntoIterator<Item = Column>) -> Result<()> {
        for column in columns {
            self.add_column(column)?;
        }
        Ok(())
    }

    pub fn drop_column(&mut self, name: &str) -> Result<Column> {
        let pos = self
            .position(name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))?;
        Ok(self.columns.remove(pos))
    }

    /// Drop several columns. Nothing is removed unless all of them exist.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        if let Some(missing) = names.iter().find(|n| !self.has_column(n.as_ref())) {
            return Err(Error::MissingColumn(missing.as_ref().to_string()));
        }
        for name in names {
            // Tolerate the same name listed twice
            if self.has_column(name.as_ref()) {
                self.drop_column(name.as_ref())?;
            }
        }
        Ok(())
    }

    /// New table holding clones of the named columns, in the given order
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<RecordTable> {
        let columns = names
            .iter()
            .map(|n| self.column(n.as_ref()).cloned())
            .collect::<Result<Vec<_>>>()?;
        let mut table = RecordTable::from_columns(columns)?;
        if table.columns.is_empty() {
            table.n_rows = self.n_rows;
        }
        Ok(table)
    }
}
