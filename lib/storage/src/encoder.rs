//! One-hot encoding of categorical columns
//!
//! Encoders are fitted once on the training snapshot, persisted, and
//! replayed read-only on new data. Missing cells seen at fit time form their
//! own trailing category. A value that was not seen at fit time encodes to an
//! all-zero row.

use crate::store::EncoderStore;
use chrono::{DateTime, Utc};
use featx_core::{Column, ColumnData, RecordTable, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use tracing::info;

/// Label of the missing-value category of a text column
pub const MISSING_TEXT_LABEL: &str = "None";

/// Label of the missing-value category of a numeric or boolean column
pub const MISSING_VALUE_LABEL: &str = "nan";

/// A fitted one-hot encoder for a single source column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OneHotEncoder {
    column: String,
    prefix: String,
    categories: Vec<String>,
    /// Label of the missing category, when missing cells were seen at fit
    missing_label: Option<String>,
    fitted_at: DateTime<Utc>,
}

impl OneHotEncoder {
    /// Learn the sorted set of values of `column`, plus a missing category
    /// when any cell is missing
    pub fn fit(table: &RecordTable, column: &str, prefix: &str) -> Result<Self> {
        let source = table.column(column)?;
        let values = source.rendered_values();
        let missing_label = values.iter().any(Option::is_none).then(|| {
            match source.data() {
                ColumnData::Utf8(_) => MISSING_TEXT_LABEL,
                _ => MISSING_VALUE_LABEL,
            }
            .to_string()
        });
        let categories: BTreeSet<String> = values.into_iter().flatten().collect();

        Ok(Self {
            column: column.to_string(),
            prefix: prefix.to_string(),
            categories: categories.into_iter().collect(),
            missing_label,
            fitted_at: Utc::now(),
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Observed non-missing categories, sorted
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn missing_label(&self) -> Option<&str> {
        self.missing_label.as_deref()
    }

    /// Number of indicator columns
    pub fn width(&self) -> usize {
        self.categories.len() + usize::from(self.missing_label.is_some())
    }

    pub fn fitted_at(&self) -> DateTime<Utc> {
        self.fitted_at
    }

    /// Output column names, `<prefix>_<category>`, missing category last
    pub fn output_columns(&self) -> Vec<String> {
        self.categories
            .iter()
            .chain(self.missing_label.iter())
            .map(|c| format!("{}_{}", self.prefix, c))
            .collect()
    }

    /// Indicator matrix in row-major order, one row per table row
    pub fn indicator_rows(&self, table: &RecordTable) -> Result<Vec<Vec<f64>>> {
        let index: HashMap<&str, usize> = self
            .categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();
        let missing_slot = self.missing_label.as_ref().map(|_| self.categories.len());

        let values = table.column(&self.column)?.rendered_values();
        Ok(values
            .iter()
            .map(|value| {
                let mut row = vec![0.0; self.width()];
                let slot = match value {
                    Some(v) => index.get(v.as_str()).copied(),
                    None => missing_slot,
                };
                if let Some(i) = slot {
                    row[i] = 1.0;
                }
                row
            })
            .collect())
    }

    /// One `Float64` indicator column per fitted category
    pub fn transform(&self, table: &RecordTable) -> Result<Vec<Column>> {
        let rows = self.indicator_rows(table)?;
        Ok(self
            .output_columns()
            .into_iter()
            .enumerate()
            .map(|(j, name)| Column::float64(name, rows.iter().map(|row| Some(row[j])).collect()))
            .collect())
    }
}

/// Which column to encode and how to prefix its indicator columns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncoderSpec {
    pub column: String,
    pub prefix: String,
}

impl EncoderSpec {
    pub fn new(column: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            prefix: prefix.into(),
        }
    }
}

/// Default encoded columns: academic level and hiring type
pub fn default_encoder_specs() -> Vec<EncoderSpec> {
    vec![
        EncoderSpec::new("nivel_academico", "nivel_acad"),
        EncoderSpec::new("tipo_contratacao", "tipo_contr"),
    ]
}

/// Fits, persists and replays the encoders for a set of columns
#[derive(Debug, Clone)]
pub struct CategoricalEncoderManager {
    specs: Vec<EncoderSpec>,
}

impl CategoricalEncoderManager {
    pub fn new(specs: Vec<EncoderSpec>) -> Self {
        Self { specs }
    }

    pub fn specs(&self) -> &[EncoderSpec] {
        &self.specs
    }

    /// Fit every encoder on `table` and append its indicator columns
    pub fn fit_transform(&self, table: &mut RecordTable) -> Result<Vec<OneHotEncoder>> {
        let mut encoders = Vec::with_capacity(self.specs.len());
        for spec in &self.specs {
            let encoder = OneHotEncoder::fit(table, &spec.column, &spec.prefix)?;
            let columns = encoder.transform(table)?;
            table.add_columns(columns)?;
            info!(
                "[OK] One-hot for {} created ({} categories)",
                spec.column,
                encoder.width()
            );
            encoders.push(encoder);
        }
        Ok(encoders)
    }

    /// Save fitted encoders, returning the artifact paths
    pub fn persist(&self, encoders: &[OneHotEncoder], store: &EncoderStore) -> Result<Vec<PathBuf>> {
        encoders.iter().map(|e| store.save(e)).collect()
    }

    /// Load every encoder from `store` and apply it without refitting
    pub fn replay(&self, table: &mut RecordTable, store: &EncoderStore) -> Result<()> {
        info!("[Inference] Loading saved encoders...");
        let encoders = self
            .specs
            .iter()
            .map(|spec| store.load(&spec.column))
            .collect::<Result<Vec<_>>>()?;

        for encoder in &encoders {
            info!("[Inference] Applying {} transformation...", encoder.column());
            let columns = encoder.transform(table)?;
            table.add_columns(columns)?;
        }
        Ok(())
    }
}
