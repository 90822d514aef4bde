//! # featx Core
//!
//! Core library for the featx feature-engineering pipeline.
//!
//! This crate provides the data structures and the plain text features:
//!
//! - [`RecordTable`] - Column-oriented table of application records
//! - [`Vector`] - Dense embedding vector with cosine similarity
//! - [`ColumnFilter`] - Denylist pruning and numeric feature selection
//! - [`TextStatistics`] - Character and word counts per text field
//! - [`KeywordCounter`] - Case-insensitive keyword counts
//!
//! ## Example
//!
//! ```rust
//! use featx_core::{Column, RecordTable, TextStatistics};
//!
//! let mut table = RecordTable::from_columns(vec![
//!     Column::utf8("comentario", vec![Some("candidato com experiência"), None]),
//! ]).unwrap();
//!
//! TextStatistics::apply(&mut table, "comentario").unwrap();
//! assert!(table.has_column("comentario_nchar"));
//! assert!(table.has_column("comentario_nwords"));
//! ```

pub mod error;
pub mod filter;
pub mod table;
pub mod text;
pub mod vector;

pub use error::{Error, Result};
pub use filter::{column_validity, ColumnFilter, ColumnValidity};
pub use table::{Column, ColumnData, RecordTable};
pub use text::{
    count_courses, count_keywords, derived_name, text_length, word_count, CourseCounter,
    KeywordCounter, TextStatistics,
};
pub use vector::Vector;
