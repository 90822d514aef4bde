//! FastEmbed ONNX Integration
//!
//! Local sentence embeddings through the `fastembed` crate. The model is
//! downloaded into the cache directory on first use and loaded once per
//! provider, which dominates pipeline startup time.

use crate::embedder::{EmbeddingError, EmbeddingProvider};
#[cfg(test)]
use crate::embedder::DEFAULT_MODEL;
use featx_core::Vector;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::path::PathBuf;
use tracing::info;

/// FastEmbed-based local embedding provider
pub struct FastEmbedProvider {
    model: TextEmbedding,
    model_name: String,
    dimension: usize,
}

impl FastEmbedProvider {
    /// Load a model by name
    pub fn new(
        model_name: &str,
        cache_dir: Option<PathBuf>,
        show_download_progress: bool,
    ) -> Result<Self, EmbeddingError> {
        let (embedding_model, dimension) = Self::resolve_model(model_name)?;
        info!("[Init] Loading embedding model {}...", model_name);

        let mut options =
            InitOptions::new(embedding_model).with_show_download_progress(show_download_progress);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }

        let model = TextEmbedding::try_new(options).map_err(|e| {
            EmbeddingError::ModelLoadFailed(format!("Failed to load fastembed model: {}", e))
        })?;

        Ok(Self {
            model,
            model_name: model_name.to_string(),
            dimension,
        })
    }

    /// Map a model name to the fastembed enum and its output dimension
    fn resolve_model(name: &str) -> Result<(EmbeddingModel, usize), EmbeddingError> {
        match name.to_lowercase().as_str() {
            "paraphrase-multilingual-minilm-l12"
            | "paraphrase-multilingual-minilm-l12-v2"
            | "paraphrase-minilm-l12" => Ok((EmbeddingModel::ParaphraseMLMiniLML12V2, 384)),
            "paraphrase-mpnet" => Ok((EmbeddingModel::ParaphraseMLMpnetBaseV2, 768)),
            "multilingual-e5-small" | "e5-small" => Ok((EmbeddingModel::MultilingualE5Small, 384)),
            "multilingual-e5-base" | "e5-base" => Ok((EmbeddingModel::MultilingualE5Base, 768)),
            "all-minilm-l6-v2" | "minilm" => Ok((EmbeddingModel::AllMiniLML6V2, 384)),
            _ => Err(EmbeddingError::ConfigError(format!(
                "Unknown fastembed model: {}. Supported: paraphrase-multilingual-minilm-l12, \
                 paraphrase-mpnet, multilingual-e5-small, multilingual-e5-base, all-minilm-l6-v2",
                name
            ))),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl EmbeddingProvider for FastEmbedProvider {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self
            .model
            .embed(texts.to_vec(), Some(texts.len()))
            .map_err(|e| EmbeddingError::InferenceFailed(format!("Batch embedding failed: {}", e)))?;

        Ok(embeddings
            .into_iter()
            .map(|e| Vector::new(e).normalized().into_inner())
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn provider_id(&self) -> &str {
        "fastembed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_model_rejected() {
        let result = FastEmbedProvider::resolve_model("not-a-model");
        assert!(matches!(result, Err(EmbeddingError::ConfigError(_))));
    }

    #[test]
    fn test_default_model_resolves() {
        let (_, dim) = FastEmbedProvider::resolve_model(DEFAULT_MODEL).unwrap();
        assert_eq!(dim, 384);
    }
}
