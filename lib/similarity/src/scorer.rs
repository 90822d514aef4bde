//! Title similarity scoring
//!
//! Compares the candidate's submitted title with the job title, row by row,
//! and appends a lexical and a semantic similarity column.

use crate::distance::{lexical_similarity, pairwise_cosine};
use crate::embedder::EmbeddingGenerator;
use featx_core::{Column, Error, RecordTable, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Which columns to compare and where to put the scores
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityConfig {
    #[serde(default = "default_left")]
    pub left: String,

    #[serde(default = "default_right")]
    pub right: String,

    /// Rows embedded per step; bounds peak memory, not concurrency
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_ratio_column")]
    pub ratio_column: String,

    #[serde(default = "default_semantic_column")]
    pub semantic_column: String,
}

fn default_left() -> String {
    "titulo".to_string()
}

fn default_right() -> String {
    "titulo_vaga".to_string()
}

fn default_batch_size() -> usize {
    1000
}

fn default_ratio_column() -> String {
    "titulo_sim_ratio".to_string()
}

fn default_semantic_column() -> String {
    "sim_titulo_vs_vaga".to_string()
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            left: default_left(),
            right: default_right(),
            batch_size: default_batch_size(),
            ratio_column: default_ratio_column(),
            semantic_column: default_semantic_column(),
        }
    }
}

/// Appends lexical and semantic similarity between two text columns
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    generator: EmbeddingGenerator,
    config: SimilarityConfig,
}

impl SimilarityScorer {
    pub fn new(generator: EmbeddingGenerator, config: SimilarityConfig) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(Error::InvalidConfig(
                "similarity batch_size must be at least 1".to_string(),
            ));
        }
        Ok(Self { generator, config })
    }

    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    /// Lexical similarity for every row
    pub fn lexical_scores(left: &[Option<&str>], right: &[Option<&str>]) -> Vec<f32> {
        left.iter()
            .zip(right.iter())
            .map(|(a, b)| lexical_similarity(*a, *b))
            .collect()
    }

    /// Semantic similarity for every row, embedding `batch_size` rows at a time.
    ///
    /// Batches are processed sequentially and concatenated in row order.
    pub fn semantic_scores(&self, left: &[Option<&str>], right: &[Option<&str>]) -> Result<Vec<f32>> {
        let mut similarities = Vec::with_capacity(left.len());
        let n_batches = left.len().div_ceil(self.config.batch_size);

        for (i, (l, r)) in left
            .chunks(self.config.batch_size)
            .zip(right.chunks(self.config.batch_size))
            .enumerate()
        {
            debug!("[Embeddings] Processing batch {}/{}", i + 1, n_batches);
            let emb_left = self.generator.encode(l)?;
            let emb_right = self.generator.encode(r)?;
            similarities.extend(pairwise_cosine(&emb_left, &emb_right));
        }

        Ok(similarities)
    }

    /// Append both similarity columns.
    ///
    /// Returns `false` and leaves the table untouched when either source
    /// column is absent.
    pub fn apply(&self, table: &mut RecordTable) -> Result<bool> {
        let (left_name, right_name) = (&self.config.left, &self.config.right);
        if !table.has_column(left_name) || !table.has_column(right_name) {
            info!(
                "[Similarity] Columns '{}' and '{}' not both present, skipping",
                left_name, right_name
            );
            return Ok(false);
        }

        let left = table.column(left_name)?.text_values();
        let right = table.column(right_name)?.text_values();

        info!("[String Similarity] Scoring {} rows...", left.len());
        let ratio = Self::lexical_scores(&left, &right);

        info!("[Embeddings] Generating title embeddings...");
        let semantic = self.semantic_scores(&left, &right)?;

        let columns = [
            Column::float64(
                self.config.ratio_column.clone(),
                ratio.into_iter().map(|s| Some(s as f64)).collect(),
            ),
            Column::float64(
                self.config.semantic_column.clone(),
                semantic.into_iter().map(|s| Some(s as f64)).collect(),
            ),
        ];
        table.add_columns(columns)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashEmbedder;
    use featx_core::ColumnData;
    use std::sync::Arc;

    fn scorer(batch_size: usize) -> SimilarityScorer {
        let generator = EmbeddingGenerator::new(Arc::new(HashEmbedder::new(128)), 32).unwrap();
        let config = SimilarityConfig {
            batch_size,
            ..SimilarityConfig::default()
        };
        SimilarityScorer::new(generator, config).unwrap()
    }

    fn titles() -> RecordTable {
        RecordTable::from_columns(vec![
            Column::utf8(
                "titulo",
                vec![Some("Engenheiro"), None, Some("Analista de Dados"), Some("Dev Java")],
            ),
            Column::utf8(
                "titulo_vaga",
                vec![
                    Some("Engenheiro de Software"),
                    Some("Gerente de Projetos"),
                    Some("Cientista de Dados"),
                    Some("Desenvolvedor Java Sênior"),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_apply_appends_scores() {
        let mut table = titles();
        assert!(scorer(1000).apply(&mut table).unwrap());

        let ColumnData::Float64(ratio) = table.column("titulo_sim_ratio").unwrap().data() else {
            panic!("ratio column must be float64");
        };
        assert_eq!(ratio.len(), 4);
        assert_eq!(ratio[1], Some(0.0));
        assert!(ratio.iter().flatten().all(|r| (0.0..=1.0).contains(r)));

        let ColumnData::Float64(semantic) = table.column("sim_titulo_vs_vaga").unwrap().data()
        else {
            panic!("semantic column must be float64");
        };
        assert!(semantic
            .iter()
            .flatten()
            .all(|s| (-1.0 - 1e-6..=1.0 + 1e-6).contains(s)));
    }

    #[test]
    fn test_missing_source_column_is_noop() {
        let mut table = RecordTable::from_columns(vec![Column::utf8(
            "titulo",
            vec![Some("Engenheiro")],
        )])
        .unwrap();
        let before = table.clone();
        assert!(!scorer(10).apply(&mut table).unwrap());
        assert_eq!(table, before);
    }

    #[test]
    fn test_batching_does_not_change_scores() {
        let table = titles();
        let left = table.column("titulo").unwrap().text_values();
        let right = table.column("titulo_vaga").unwrap().text_values();

        let unbatched = scorer(1000).semantic_scores(&left, &right).unwrap();
        for batch_size in [1, 2, 3] {
            let batched = scorer(batch_size).semantic_scores(&left, &right).unwrap();
            assert_eq!(batched, unbatched, "batch_size {}", batch_size);
        }
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let generator = EmbeddingGenerator::new(Arc::new(HashEmbedder::default()), 8).unwrap();
        let config = SimilarityConfig {
            batch_size: 0,
            ..SimilarityConfig::default()
        };
        assert!(matches!(
            SimilarityScorer::new(generator, config),
            Err(Error::InvalidConfig(_))
        ));
    }
}
