//! Text statistics and keyword counters
//!
//! All counters treat a missing cell, or a column that does not hold text,
//! as "no text" and return 0.

use crate::error::Result;
use crate::table::{Column, RecordTable};
use tracing::info;

pub const NCHAR_SUFFIX: &str = "nchar";
pub const NWORDS_SUFFIX: &str = "nwords";
pub const NCURSOS_SUFFIX: &str = "ncursos";

/// Literal token matched by [`count_courses`]
pub const COURSE_TOKEN: &str = "curso";

/// Character count of a text value
#[inline]
pub fn text_length(text: Option<&str>) -> i64 {
    text.map_or(0, |t| t.chars().count() as i64)
}

/// Number of whitespace-delimited tokens
#[inline]
pub fn word_count(text: Option<&str>) -> i64 {
    text.map_or(0, |t| t.split_whitespace().count() as i64)
}

/// Number of keywords found anywhere in the text, case-insensitively.
///
/// This is a substring test, so "java" also matches inside "javascript".
/// Each keyword contributes at most once.
pub fn count_keywords<S: AsRef<str>>(text: Option<&str>, keywords: &[S]) -> i64 {
    let Some(text) = text else {
        return 0;
    };
    let lowered = text.to_lowercase();
    keywords
        .iter()
        .filter(|k| lowered.contains(&k.as_ref().to_lowercase()))
        .count() as i64
}

/// Number of tokens that are exactly the word "curso"
pub fn count_courses(text: Option<&str>) -> i64 {
    let Some(text) = text else {
        return 0;
    };
    text.to_lowercase()
        .split_whitespace()
        .filter(|word| *word == COURSE_TOKEN)
        .count() as i64
}

/// Name of a column derived from `field`
#[inline]
pub fn derived_name(field: &str, suffix: &str) -> String {
    format!("{}_{}", field, suffix)
}

fn derive_int_column<F>(table: &RecordTable, field: &str, suffix: &str, f: F) -> Result<Column>
where
    F: Fn(Option<&str>) -> i64,
{
    let source = table.column(field)?;
    let values = source.text_values().into_iter().map(|t| Some(f(t))).collect();
    Ok(Column::int64(derived_name(field, suffix), values))
}

/// Appends `<field>_nchar` and `<field>_nwords`
pub struct TextStatistics;

impl TextStatistics {
    pub fn apply(table: &mut RecordTable, field: &str) -> Result<()> {
        info!("[{}] Creating length and word count features...", field);
        let nchar = derive_int_column(table, field, NCHAR_SUFFIX, text_length)?;
        let nwords = derive_int_column(table, field, NWORDS_SUFFIX, word_count)?;
        table.add_columns([nchar, nwords])
    }
}

/// A configured keyword counter over one text column
#[derive(Debug, Clone)]
pub struct KeywordCounter {
    pub field: String,
    pub keywords: Vec<String>,
    pub suffix: String,
}

impl KeywordCounter {
    pub fn new(field: impl Into<String>, keywords: Vec<String>, suffix: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            keywords,
            suffix: suffix.into(),
        }
    }

    pub fn output_column(&self) -> String {
        derived_name(&self.field, &self.suffix)
    }

    pub fn apply(&self, table: &mut RecordTable) -> Result<()> {
        info!("[{}] Counting {} keywords...", self.field, self.keywords.len());
        let column = derive_int_column(table, &self.field, &self.suffix, |t| {
            count_keywords(t, &self.keywords)
        })?;
        table.add_column(column)
    }
}

/// Appends `<field>_ncursos`
pub struct CourseCounter;

impl CourseCounter {
    pub fn apply(table: &mut RecordTable, field: &str) -> Result<()> {
        info!("[{}] Counting course mentions...", field);
        let column = derive_int_column(table, field, NCURSOS_SUFFIX, count_courses)?;
        table.add_column(column)
    }
}
