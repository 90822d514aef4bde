//! # featx Similarity
//!
//! Text embeddings and title similarity for the featx pipeline.
//!
//! ## Features
//!
//! - **Embedding providers**: a small trait over the sentence-embedding model,
//!   with a local ONNX implementation (`fastembed-embeddings` feature) and a
//!   deterministic hashing implementation for tests and dry runs
//! - **Embedding statistics**: each text's embedding reduced to mean, std,
//!   min and max
//! - **Title similarity**: token-sort fuzzy ratio plus row-wise cosine
//!   similarity between two text columns
//!
//! ## Example
//!
//! ```rust
//! use featx_core::{Column, RecordTable};
//! use featx_similarity::{EmbeddingGenerator, HashEmbedder, SimilarityConfig, SimilarityScorer};
//! use std::sync::Arc;
//!
//! let mut table = RecordTable::from_columns(vec![
//!     Column::utf8("titulo", vec![Some("Engenheiro")]),
//!     Column::utf8("titulo_vaga", vec![Some("Engenheiro de Software")]),
//! ]).unwrap();
//!
//! let generator = EmbeddingGenerator::new(Arc::new(HashEmbedder::default()), 128).unwrap();
//! let scorer = SimilarityScorer::new(generator, SimilarityConfig::default()).unwrap();
//! scorer.apply(&mut table).unwrap();
//!
//! assert!(table.has_column("titulo_sim_ratio"));
//! assert!(table.has_column("sim_titulo_vs_vaga"));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Provider   │────>│  Generator  │────>│ Embedding   │
//! │ (model)     │     │ (batches)   │     │ statistics  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                     ┌─────────────┐
//!                     │   Scorer    │
//!                     │ (titles)    │
//!                     └─────────────┘
//! ```

pub mod distance;
pub mod embedder;
pub mod scorer;

#[cfg(feature = "fastembed-embeddings")]
pub mod onnx;

pub use distance::{lexical_similarity, pairwise_cosine, token_sort_ratio};
pub use embedder::{
    EmbeddingError, EmbeddingGenerator, EmbeddingProvider, EmbeddingStats, HashEmbedder,
    DEFAULT_EMBEDDING_BATCH_SIZE, DEFAULT_HASH_DIM, DEFAULT_MODEL, EMB_SUFFIXES,
};
pub use scorer::{SimilarityConfig, SimilarityScorer};

#[cfg(feature = "fastembed-embeddings")]
pub use onnx::FastEmbedProvider;
