//! Pipeline configuration
//!
//! Loaded from a YAML file (`config.yaml` by default). Only `paths` is
//! required; every feature setting defaults to the recruiting dataset
//! layout the pipeline was built for.

use anyhow::{bail, Context, Result};
use featx_similarity::{SimilarityConfig, DEFAULT_EMBEDDING_BATCH_SIZE, DEFAULT_MODEL};
use featx_storage::{default_encoder_specs, EncoderSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Logical name of the source dataset in `paths`
pub const SOURCE_DATASET: &str = "dataset_modelagem";

/// Logical name of the feature dataset in `paths`
pub const FEATURE_DATASET: &str = "dataset_features";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Logical dataset names mapped to file paths
    pub paths: BTreeMap<String, PathBuf>,

    #[serde(default)]
    pub features: FeatureConfig,
}

impl PipelineConfig {
    /// Read and validate a YAML config file, resolving relative paths
    /// against `base_dir`
    pub fn load<P: AsRef<Path>>(path: P, base_dir: &Path) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config = Self::from_yaml_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        config.resolve_paths(base_dir);
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.features.validate()?;
        Ok(config)
    }

    /// Make every configured path absolute
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        for path in self.paths.values_mut() {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        }
    }

    /// Look up a path that must be configured
    pub fn path(&self, name: &str) -> Result<&Path> {
        self.paths
            .get(name)
            .map(PathBuf::as_path)
            .with_context(|| format!("missing '{}' in config paths", name))
    }
}

/// Settings of the embedding model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_embedding_batch_size")]
    pub batch_size: usize,

    /// Where downloaded model files are kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_embedding_batch_size() -> usize {
    DEFAULT_EMBEDDING_BATCH_SIZE
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            batch_size: default_embedding_batch_size(),
            cache_dir: None,
        }
    }
}

/// A keyword counter over one text column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordFeatureConfig {
    pub column: String,
    pub keywords: Vec<String>,
    #[serde(default = "default_keyword_suffix")]
    pub suffix: String,
}

fn default_keyword_suffix() -> String {
    "nkeywords".to_string()
}

/// What features to derive and which columns to drop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureConfig {
    #[serde(default = "default_target_column")]
    pub target_column: String,

    /// Identifier and administrative columns, never features
    #[serde(default = "default_identifier_columns")]
    pub identifier_columns: Vec<String>,

    /// Raw free-text and administrative columns dropped after derivation
    #[serde(default = "default_raw_columns")]
    pub raw_columns: Vec<String>,

    /// Columns that get length, word count and embedding features
    #[serde(default = "default_text_fields")]
    pub text_fields: Vec<String>,

    #[serde(default = "default_encoder_specs")]
    pub categorical: Vec<EncoderSpec>,

    #[serde(default)]
    pub keyword_features: Vec<KeywordFeatureConfig>,

    /// Columns that get a `<field>_ncursos` count
    #[serde(default)]
    pub course_count_fields: Vec<String>,

    /// Skip text fields that are mostly missing or nearly constant
    #[serde(default)]
    pub gate_text_features: bool,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub similarity: SimilarityConfig,
}

fn default_target_column() -> String {
    "target".to_string()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn default_identifier_columns() -> Vec<String> {
    strings(&[
        "analista_responsavel",
        "cidade",
        "cliente",
        "cod_vaga",
        "codigo",
        "data_candidatura",
        "data_final",
        "data_inicial",
        "data_requicisao",
        "empresa_divisao",
        "estado",
        "limite_esperado_para_contratacao",
        "local_trabalho",
        "nome",
        "recrutador",
        "regiao",
        "requisitante",
        "situacao_candidado",
        "solicitante_cliente",
        "ultima_atualizacao",
    ])
}

fn default_raw_columns() -> Vec<String> {
    strings(&[
        "titulo",
        "comentario",
        "titulo_vaga",
        "prazo_contratacao",
        "prioridade_vaga",
        "nivel profissional",
        "nivel_ingles",
        "nivel_espanhol",
        "areas_atuacao",
        "principais_atividades",
        "competencia_tecnicas_e_comportamentais",
        "demais_observacoes",
        "equipamentos_necessarios",
        "habilidades_comportamentais_necessarias",
        "valor_venda",
        "valor_compra_1",
    ])
}

fn default_text_fields() -> Vec<String> {
    strings(&[
        "principais_atividades",
        "competencia_tecnicas_e_comportamentais",
        "demais_observacoes",
        "comentario",
    ])
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            target_column: default_target_column(),
            identifier_columns: default_identifier_columns(),
            raw_columns: default_raw_columns(),
            text_fields: default_text_fields(),
            categorical: default_encoder_specs(),
            keyword_features: Vec::new(),
            course_count_fields: Vec::new(),
            gate_text_features: false,
            embedding: EmbeddingConfig::default(),
            similarity: SimilarityConfig::default(),
        }
    }
}

impl FeatureConfig {
    pub fn validate(&self) -> Result<()> {
        if self.embedding.batch_size == 0 {
            bail!("features.embedding.batch_size must be at least 1");
        }
        if self.similarity.batch_size == 0 {
            bail!("features.similarity.batch_size must be at least 1");
        }
        for spec in &self.categorical {
            if spec.column.is_empty() || spec.prefix.is_empty() {
                bail!("categorical entries need both a column and a prefix");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
paths:
  dataset_modelagem: data/processed/dataset_modelagem.parquet
  dataset_features: data/processed/dataset_features.parquet
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = PipelineConfig::from_yaml_str(MINIMAL).unwrap();
        assert_eq!(config.features, FeatureConfig::default());
        assert_eq!(config.features.identifier_columns.len(), 20);
        assert_eq!(config.features.raw_columns.len(), 16);
        assert_eq!(config.features.similarity.batch_size, 1000);
        assert_eq!(config.features.embedding.batch_size, 128);
    }

    #[test]
    fn test_paths_resolved_against_base_dir() {
        let mut config = PipelineConfig::from_yaml_str(MINIMAL).unwrap();
        config.resolve_paths(Path::new("/srv/datathon"));
        assert_eq!(
            config.path(SOURCE_DATASET).unwrap(),
            Path::new("/srv/datathon/data/processed/dataset_modelagem.parquet")
        );
    }

    #[test]
    fn test_absolute_paths_untouched() {
        let mut config = PipelineConfig::from_yaml_str(
            "paths:\n  dataset_features: /tmp/out.parquet\n",
        )
        .unwrap();
        config.resolve_paths(Path::new("/srv"));
        assert_eq!(config.path(FEATURE_DATASET).unwrap(), Path::new("/tmp/out.parquet"));
        assert!(config.path(SOURCE_DATASET).is_err());
    }

    #[test]
    fn test_feature_overrides() {
        let yaml = r#"
paths: {}
features:
  text_fields: [comentario]
  raw_columns: [titulo, titulo_vaga, comentario]
  categorical:
    - column: nivel_academico
      prefix: nivel_acad
  keyword_features:
    - column: comentario
      keywords: [python, sql]
  gate_text_features: true
  similarity:
    batch_size: 10
"#;
        let config = PipelineConfig::from_yaml_str(yaml).unwrap();
        let features = &config.features;
        assert_eq!(features.text_fields, vec!["comentario"]);
        assert_eq!(features.categorical.len(), 1);
        assert_eq!(features.keyword_features[0].suffix, "nkeywords");
        assert!(features.gate_text_features);
        assert_eq!(features.similarity.batch_size, 10);
        assert_eq!(features.similarity.left, "titulo");
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let yaml = "paths: {}\nfeatures:\n  similarity:\n    batch_size: 0\n";
        assert!(PipelineConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = PipelineConfig::load(temp_dir.path().join(DEFAULT_CONFIG_FILE), temp_dir.path());
        assert!(result.is_err());
    }
}
