//! Feature pipeline driver
//!
//! Fit mode reads the modelling snapshot, derives every feature, persists
//! the fitted encoders and writes the feature table. Inference mode replays
//! the persisted encoders on new rows and derives the same features.

use crate::config::{FeatureConfig, PipelineConfig, FEATURE_DATASET, SOURCE_DATASET};
use anyhow::Context;
use featx_core::{
    column_validity, ColumnFilter, ColumnValidity, CourseCounter, KeywordCounter, RecordTable,
    Result, TextStatistics,
};
use featx_similarity::{EmbeddingGenerator, EmbeddingProvider, SimilarityScorer};
use featx_storage::{read_parquet, write_parquet, CategoricalEncoderManager, EncoderStore, OneHotEncoder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// What a fit run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rows: usize,
    pub columns: usize,
    pub encoder_paths: Vec<PathBuf>,
    pub output: PathBuf,
}

pub struct FeaturePipeline {
    config: FeatureConfig,
    filter: ColumnFilter,
    encoders: CategoricalEncoderManager,
    keyword_counters: Vec<KeywordCounter>,
    generator: EmbeddingGenerator,
    scorer: SimilarityScorer,
}

impl FeaturePipeline {
    pub fn new(config: FeatureConfig, provider: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let generator = EmbeddingGenerator::new(provider, config.embedding.batch_size)?;
        let scorer = SimilarityScorer::new(generator.clone(), config.similarity.clone())?;
        let filter = ColumnFilter::new(
            config.identifier_columns.clone(),
            config.raw_columns.clone(),
            config.target_column.clone(),
        );
        let encoders = CategoricalEncoderManager::new(config.categorical.clone());
        let keyword_counters = config
            .keyword_features
            .iter()
            .map(|k| KeywordCounter::new(k.column.clone(), k.keywords.clone(), k.suffix.clone()))
            .collect();

        Ok(Self {
            config,
            filter,
            encoders,
            keyword_counters,
            generator,
            scorer,
        })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn filter(&self) -> &ColumnFilter {
        &self.filter
    }

    /// Fit the categorical encoders and derive every feature.
    ///
    /// Returns the enriched table and the fitted encoders. Raw columns are
    /// kept so callers can inspect them before dropping.
    pub fn fit_features(&self, mut table: RecordTable) -> Result<(RecordTable, Vec<OneHotEncoder>)> {
        info!("[Encoders] Fitting {} one-hot encoders", self.encoders.specs().len());
        let encoders = self.encoders.fit_transform(&mut table)?;
        self.derive_features(&mut table)?;
        Ok((table, encoders))
    }

    /// Apply persisted encoders and derive the same features on new rows.
    ///
    /// No column is dropped.
    pub fn transform_new_data(&self, mut table: RecordTable, store: &EncoderStore) -> Result<RecordTable> {
        info!(
            "[Inference] Transforming {} rows with encoders from {}",
            table.n_rows(),
            store.dir().display()
        );
        self.encoders.replay(&mut table, store)?;
        self.derive_features(&mut table)?;
        Ok(table)
    }

    /// Numeric predictor matrix without identifiers, raw text or target
    pub fn baseline_features(&self, table: &RecordTable) -> Result<RecordTable> {
        self.filter.baseline_features(table)
    }

    fn derive_features(&self, table: &mut RecordTable) -> Result<()> {
        for field in &self.config.text_fields {
            let validity = column_validity(table, field);
            match validity {
                ColumnValidity::Absent => {
                    debug!("[{}] Column not present, no text features", field);
                    continue;
                }
                ref v if !v.is_usable() && self.config.gate_text_features => continue,
                _ => {}
            }

            TextStatistics::apply(table, field)?;
            self.generator.apply(table, field)?;
        }

        for counter in &self.keyword_counters {
            if table.has_column(&counter.field) {
                counter.apply(table)?;
            }
        }

        for field in &self.config.course_count_fields {
            if table.has_column(field) {
                CourseCounter::apply(table, field)?;
            }
        }

        self.scorer.apply(table)?;
        Ok(())
    }

    /// Fit run over the configured datasets: read, derive, persist encoders,
    /// drop raw columns, write.
    pub fn run(&self, config: &PipelineConfig) -> anyhow::Result<RunSummary> {
        let source = config.path(SOURCE_DATASET)?;
        let output = config.path(FEATURE_DATASET)?;
        self.run_paths(source, output)
    }

    pub fn run_paths(&self, source: &Path, output: &Path) -> anyhow::Result<RunSummary> {
        info!("Reading {}", source.display());
        let table = read_parquet(source)
            .with_context(|| format!("failed to read {}", source.display()))?;

        let (mut table, encoders) = self.fit_features(table)?;

        let store = EncoderStore::beside_dataset(source);
        let encoder_paths = self
            .encoders
            .persist(&encoders, &store)
            .with_context(|| format!("failed to save encoders to {}", store.dir().display()))?;

        self.filter.drop_raw_columns(&mut table)?;

        write_parquet(&table, output)
            .with_context(|| format!("failed to write {}", output.display()))?;
        info!(
            "[OK] Feature dataset saved to {} ({} rows, {} columns)",
            output.display(),
            table.n_rows(),
            table.n_cols()
        );

        Ok(RunSummary {
            rows: table.n_rows(),
            columns: table.n_cols(),
            encoder_paths,
            output: output.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featx_core::{Column, ColumnData};
    use featx_similarity::HashEmbedder;

    fn pipeline(config: FeatureConfig) -> FeaturePipeline {
        FeaturePipeline::new(config, Arc::new(HashEmbedder::new(32))).unwrap()
    }

    fn small_config() -> FeatureConfig {
        FeatureConfig {
            identifier_columns: vec!["codigo".to_string()],
            raw_columns: vec![
                "titulo".to_string(),
                "titulo_vaga".to_string(),
                "comentario".to_string(),
            ],
            text_fields: vec!["comentario".to_string(), "demais_observacoes".to_string()],
            ..FeatureConfig::default()
        }
    }

    fn applications() -> RecordTable {
        RecordTable::from_columns(vec![
            Column::int64("codigo", vec![Some(1), Some(2), Some(3)]),
            Column::utf8("titulo", vec![Some("Engenheiro"), Some("Analista"), None]),
            Column::utf8(
                "titulo_vaga",
                vec![Some("Engenheiro de Software"), Some("Analista SAP"), Some("Gerente")],
            ),
            Column::utf8(
                "comentario",
                vec![Some("bom perfil"), None, Some("fez curso de Python")],
            ),
            Column::utf8("nivel_academico", vec![Some("Superior Completo"), Some("Mestrado"), None]),
            Column::utf8("tipo_contratacao", vec![Some("CLT"), Some("PJ"), Some("CLT")]),
            Column::int64("target", vec![Some(1), Some(0), Some(0)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_fit_features_derives_every_group() {
        let (table, encoders) = pipeline(small_config()).fit_features(applications()).unwrap();

        assert_eq!(encoders.len(), 2);
        for name in [
            "nivel_acad_Mestrado",
            "tipo_contr_PJ",
            "comentario_nchar",
            "comentario_nwords",
            "comentario_emb_mean",
            "comentario_emb_max",
            "titulo_sim_ratio",
            "sim_titulo_vs_vaga",
        ] {
            assert!(table.has_column(name), "missing {}", name);
        }
        // absent text field is skipped
        assert!(!table.has_column("demais_observacoes_nchar"));
        assert!(table.has_column("titulo"));
    }

    #[test]
    fn test_gating_skips_mostly_missing_field() {
        let mut table = applications();
        table
            .add_column(Column::utf8("demais_observacoes", vec![None, None, Some("ok")]))
            .unwrap();

        let advisory = pipeline(small_config());
        let (out, _) = advisory.fit_features(table.clone()).unwrap();
        assert!(out.has_column("demais_observacoes_nchar"));

        let gated = pipeline(FeatureConfig {
            gate_text_features: true,
            ..small_config()
        });
        let (out, _) = gated.fit_features(table).unwrap();
        assert!(!out.has_column("demais_observacoes_nchar"));
        assert!(out.has_column("comentario_nchar"));
    }

    #[test]
    fn test_keyword_and_course_counters() {
        let config = FeatureConfig {
            keyword_features: vec![crate::config::KeywordFeatureConfig {
                column: "comentario".to_string(),
                keywords: vec!["python".to_string(), "perfil".to_string()],
                suffix: "nkeywords".to_string(),
            }],
            course_count_fields: vec!["comentario".to_string()],
            ..small_config()
        };
        let (table, _) = pipeline(config).fit_features(applications()).unwrap();

        assert_eq!(
            table.column("comentario_nkeywords").unwrap().data(),
            &ColumnData::Int64(vec![Some(1), Some(0), Some(1)])
        );
        assert_eq!(
            table.column("comentario_ncursos").unwrap().data(),
            &ColumnData::Int64(vec![Some(0), Some(0), Some(1)])
        );
    }

    #[test]
    fn test_transform_new_data_matches_fit_columns() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = EncoderStore::new(temp_dir.path());
        let pipeline = pipeline(small_config());

        let (fitted, encoders) = pipeline.fit_features(applications()).unwrap();
        pipeline.encoders.persist(&encoders, &store).unwrap();

        let transformed = pipeline.transform_new_data(applications(), &store).unwrap();
        assert_eq!(transformed.column_names(), fitted.column_names());
    }

    #[test]
    fn test_baseline_features_keeps_numeric_predictors() {
        let pipeline = pipeline(small_config());
        let (mut table, _) = pipeline.fit_features(applications()).unwrap();
        table
            .add_column(Column::utf8("nivel_academico_raw", vec![Some("x"), Some("y"), Some("z")]))
            .unwrap();

        let baseline = pipeline.baseline_features(&table).unwrap();
        let names = baseline.column_names();
        assert!(!names.contains(&"codigo"));
        assert!(!names.contains(&"target"));
        assert!(!names.contains(&"nivel_academico_raw"));
        assert!(names.contains(&"comentario_nchar"));
        assert!(names.contains(&"sim_titulo_vs_vaga"));
    }
}
