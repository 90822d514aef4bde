//! Column pruning and column validity checks
//!
//! The denylists are plain configuration data: identifier and administrative
//! columns that never become features, and raw free-text columns that are
//! only inputs to derived features.

use crate::error::Result;
use crate::table::RecordTable;
use ahash::AHashMap;
use tracing::info;

/// Missing ratio above which a column is not worth deriving features from
pub const MAX_MISSING_RATIO: f64 = 0.5;

/// Share of non-missing rows a single value may cover before the column is
/// considered constant
pub const MAX_DOMINANT_RATIO: f64 = 0.9;

/// Drops denylisted columns and keeps the numeric predictors
#[derive(Debug, Clone)]
pub struct ColumnFilter {
    identifier_columns: Vec<String>,
    raw_columns: Vec<String>,
    target_column: String,
}

impl ColumnFilter {
    pub fn new(
        identifier_columns: Vec<String>,
        raw_columns: Vec<String>,
        target_column: impl Into<String>,
    ) -> Self {
        Self {
            identifier_columns,
            raw_columns,
            target_column: target_column.into(),
        }
    }

    pub fn identifier_columns(&self) -> &[String] {
        &self.identifier_columns
    }

    pub fn raw_columns(&self) -> &[String] {
        &self.raw_columns
    }

    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    /// Drop only the raw free-text/administrative columns
    pub fn drop_raw_columns(&self, table: &mut RecordTable) -> Result<()> {
        table.drop_columns(&self.raw_columns)
    }

    /// Drop both denylists, then keep numeric columns other than the target.
    ///
    /// Every denylisted column must be present in the table.
    pub fn baseline_features(&self, table: &RecordTable) -> Result<RecordTable> {
        let mut pruned = table.clone();
        let merged: Vec<&String> = self
            .identifier_columns
            .iter()
            .chain(self.raw_columns.iter())
            .collect();
        pruned.drop_columns(&merged)?;

        let features: Vec<String> = pruned
            .columns()
            .iter()
            .filter(|c| c.name() != self.target_column && c.is_numeric())
            .map(|c| c.name().to_string())
            .collect();

        pruned.select(&features)
    }
}

/// Outcome of [`column_validity`]
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValidity {
    Usable,
    Absent,
    TooManyMissing { ratio: f64 },
    DominantValue { value: String, ratio: f64 },
}

impl ColumnValidity {
    #[inline]
    pub fn is_usable(&self) -> bool {
        matches!(self, ColumnValidity::Usable)
    }
}

/// Decide whether a column carries enough signal for feature creation.
///
/// A column is rejected when more than half of its cells are missing, or
/// when one value covers more than 90% of the non-missing cells.
pub fn column_validity(table: &RecordTable, name: &str) -> ColumnValidity {
    let Some(column) = table.get(name) else {
        return ColumnValidity::Absent;
    };

    let n_rows = column.len();
    if n_rows == 0 {
        return ColumnValidity::Usable;
    }

    let missing = column.data().null_count() as f64 / n_rows as f64;
    if missing > MAX_MISSING_RATIO {
        info!(
            "[SKIP] Column \"{}\" is {:.0}% missing, feature not created",
            name,
            missing * 100.0
        );
        return ColumnValidity::TooManyMissing { ratio: missing };
    }

    let mut counts: AHashMap<String, usize> = AHashMap::new();
    for value in column.rendered_values().into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }
    let present: usize = counts.values().sum();

    // Ties resolve to the lexicographically smallest value
    let top = counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)));

    if let Some((value, count)) = top {
        let ratio = count as f64 / present as f64;
        if ratio > MAX_DOMINANT_RATIO {
            info!(
                "[SKIP] Column \"{}\" has dominant value ({}) in {:.0}% of rows, feature not created",
                name,
                value,
                ratio * 100.0
            );
            return ColumnValidity::DominantValue { value, ratio };
        }
    }

    ColumnValidity::Usable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::table::Column;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn sample_table() -> RecordTable {
        RecordTable::from_columns(vec![
            Column::utf8("codigo", vec![Some("a1"), Some("a2"), Some("a3")]),
            Column::utf8("titulo", vec![Some("Dev"), Some("QA"), None]),
            Column::int64("idade", vec![Some(30), Some(25), Some(40)]),
            Column::float64("titulo_nchar", vec![Some(3.0), Some(2.0), Some(0.0)]),
            Column::boolean("ativo", vec![Some(true), Some(false), None]),
            Column::int64("target", vec![Some(1), Some(0), Some(1)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_baseline_features_keeps_numeric_predictors() {
        let filter = ColumnFilter::new(strings(&["codigo"]), strings(&["titulo"]), "target");
        let features = filter.baseline_features(&sample_table()).unwrap();
        assert_eq!(features.column_names(), vec!["idade", "titulo_nchar", "ativo"]);
        assert_eq!(features.n_rows(), 3);
    }

    #[test]
    fn test_baseline_features_keeps_boolean_flags() {
        let table = RecordTable::from_columns(vec![
            Column::boolean("pcd", vec![Some(true), Some(false)]),
            Column::int64("target", vec![Some(1), Some(0)]),
        ])
        .unwrap();
        let filter = ColumnFilter::new(vec![], vec![], "target");
        let features = filter.baseline_features(&table).unwrap();
        assert_eq!(features.column_names(), vec!["pcd"]);
    }

    #[test]
    fn test_baseline_features_fails_on_absent_column() {
        let filter = ColumnFilter::new(strings(&["codigo", "cliente"]), vec![], "target");
        let result = filter.baseline_features(&sample_table());
        assert!(matches!(result, Err(Error::MissingColumn(ref name)) if name == "cliente"));
    }

    #[test]
    fn test_drop_raw_columns() {
        let filter = ColumnFilter::new(vec![], strings(&["titulo"]), "target");
        let mut table = sample_table();
        filter.drop_raw_columns(&mut table).unwrap();
        assert!(!table.has_column("titulo"));
        assert!(table.has_column("codigo"));
    }

    #[test]
    fn test_validity_absent_column() {
        assert_eq!(column_validity(&sample_table(), "nope"), ColumnValidity::Absent);
    }

    #[test]
    fn test_validity_too_many_missing() {
        let table = RecordTable::from_columns(vec![Column::utf8(
            "comentario",
            vec![Some("ok"), None, None],
        )])
        .unwrap();
        assert!(matches!(
            column_validity(&table, "comentario"),
            ColumnValidity::TooManyMissing { ratio } if ratio > 0.6
        ));
    }

    #[test]
    fn test_validity_dominant_value() {
        let mut values = vec![Some("CLT"); 19];
        values.push(Some("PJ"));
        let table = RecordTable::from_columns(vec![Column::utf8("tipo", values)]).unwrap();
        match column_validity(&table, "tipo") {
            ColumnValidity::DominantValue { value, ratio } => {
                assert_eq!(value, "CLT");
                assert!((ratio - 0.95).abs() < 1e-9);
            }
            other => panic!("unexpected validity: {:?}", other),
        }
    }

    #[test]
    fn test_validity_usable() {
        assert!(column_validity(&sample_table(), "idade").is_usable());
    }
}
