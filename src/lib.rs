//! # featx
//!
//! Feature engineering for recruiting data: turns a table of job
//! applications into a numeric feature matrix for a hiring classifier.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! featx run --config config.yaml
//! featx transform --input new.parquet --output scored.parquet --encoders data/processed/encoders
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use featx::prelude::*;
//! use std::sync::Arc;
//!
//! let table = RecordTable::from_columns(vec![
//!     Column::utf8("titulo", vec![Some("Engenheiro")]),
//!     Column::utf8("titulo_vaga", vec![Some("Engenheiro de Software")]),
//!     Column::utf8("nivel_academico", vec![Some("Superior Completo")]),
//!     Column::utf8("tipo_contratacao", vec![Some("CLT")]),
//! ]).unwrap();
//!
//! let pipeline = FeaturePipeline::new(FeatureConfig::default(), Arc::new(HashEmbedder::default())).unwrap();
//! let (features, encoders) = pipeline.fit_features(table).unwrap();
//!
//! assert_eq!(encoders.len(), 2);
//! assert!(features.has_column("nivel_acad_Superior Completo"));
//! assert!(features.has_column("sim_titulo_vs_vaga"));
//! ```
//!
//! ## Crate Structure
//!
//! - `featx-core` - Record table, column filtering, text statistics
//! - `featx-similarity` - Embedding providers, embedding statistics, title similarity
//! - `featx-storage` - One-hot encoders, encoder artifacts, parquet I/O

pub mod config;
pub mod pipeline;

pub use config::{EmbeddingConfig, FeatureConfig, KeywordFeatureConfig, PipelineConfig};
pub use pipeline::{FeaturePipeline, RunSummary};

pub use featx_core::{Column, ColumnData, ColumnFilter, ColumnValidity, Error, RecordTable, Result};
pub use featx_similarity::{EmbeddingProvider, HashEmbedder, SimilarityConfig};
pub use featx_storage::{EncoderSpec, EncoderStore, OneHotEncoder};

#[cfg(feature = "fastembed-embeddings")]
pub use featx_similarity::FastEmbedProvider;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Column, ColumnData, EmbeddingProvider, EncoderStore, Error, FeatureConfig,
        FeaturePipeline, HashEmbedder, PipelineConfig, RecordTable, Result,
    };
}
