//! Sentence embeddings and their per-row summary statistics
//!
//! The embedding model is an explicit dependency: callers build an
//! [`EmbeddingProvider`] once and hand it to the [`EmbeddingGenerator`].

use featx_core::{derived_name, Column, Error, RecordTable, Result, Vector};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, info};

/// Default number of texts sent to the model per call
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 128;

/// Multilingual paraphrase model used for Portuguese job and candidate text
pub const DEFAULT_MODEL: &str = "paraphrase-multilingual-minilm-l12";

/// Default dimension for [`HashEmbedder`], matching MiniLM
pub const DEFAULT_HASH_DIM: usize = 384;

/// Suffixes of the aggregated columns, in output order
pub const EMB_SUFFIXES: [&str; 4] = ["emb_mean", "emb_std", "emb_min", "emb_max"];

/// Errors raised by embedding providers
#[derive(thiserror::Error, Debug)]
pub enum EmbeddingError {
    #[error("Model load failed: {0}")]
    ModelLoadFailed(String),

    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<EmbeddingError> for Error {
    fn from(e: EmbeddingError) -> Self {
        Error::Embedding(e.to_string())
    }
}

/// Turns text into fixed-dimension vectors.
///
/// Implementations must accept the empty string.
pub trait EmbeddingProvider: Send + Sync {
    fn embed_batch(&self, texts: &[&str]) -> std::result::Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Output dimensionality
    fn dimension(&self) -> usize;

    /// Provider identifier for logging
    fn provider_id(&self) -> &str;
}

/// Deterministic offline embedder.
///
/// Hashes lower-cased words and character trigrams into a fixed number of
/// buckets. Texts sharing vocabulary land close together, which is enough
/// for tests and for dry runs without the ONNX model.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    fn bucket<T: Hash + ?Sized>(&self, value: &T) -> usize {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        (hasher.finish() as usize) % self.dim
    }

    /// Embed a single text
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        let normalized = text.to_lowercase();

        // Sentence marker so that the empty string still has a direction
        vector[self.bucket("<s>")] += 1.0;

        let padded: Vec<char> = format!("  {}  ", normalized).chars().collect();
        for window in padded.windows(3) {
            let trigram: String = window.iter().collect();
            if trigram.trim().is_empty() {
                continue;
            }
            vector[self.bucket(&trigram)] += 1.0;
        }

        for word in normalized.split_whitespace() {
            vector[self.bucket(word)] += 2.0; // Words contribute more
        }

        Vector::new(vector).normalized().into_inner()
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIM)
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> std::result::Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn provider_id(&self) -> &str {
        "hash"
    }
}

/// Four scalar summaries of one embedding vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbeddingStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl EmbeddingStats {
    /// Mean, population standard deviation, min and max across dimensions
    pub fn from_vector(vector: &Vector) -> Self {
        let values = vector.as_slice();
        if values.is_empty() {
            return Self {
                mean: 0.0,
                std: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }

        let n = values.len() as f64;
        let mean = values.iter().map(|&x| x as f64).sum::<f64>() / n;
        let variance = values
            .iter()
            .map(|&x| {
                let d = x as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        let min = values.iter().copied().fold(f32::INFINITY, f32::min) as f64;
        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max) as f64;

        // Rounding in the f64 sum must not push the mean outside [min, max]
        let mean = if mean < min {
            min
        } else if mean > max {
            max
        } else {
            mean
        };

        Self {
            mean,
            std: variance.sqrt(),
            min,
            max,
        }
    }

    #[inline]
    pub fn as_array(&self) -> [f64; 4] {
        [self.mean, self.std, self.min, self.max]
    }
}

/// Batch encoder on top of an [`EmbeddingProvider`]
#[derive(Clone)]
pub struct EmbeddingGenerator {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl std::fmt::Debug for EmbeddingGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingGenerator")
            .field("provider", &self.provider.provider_id())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl EmbeddingGenerator {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::InvalidConfig(
                "embedding batch_size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            provider,
            batch_size,
        })
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Encode texts into unit vectors, one per input, in input order.
    ///
    /// Missing texts are encoded as the empty string.
    pub fn encode(&self, texts: &[Option<&str>]) -> Result<Vec<Vector>> {
        let texts: Vec<&str> = texts.iter().map(|t| t.unwrap_or("")).collect();
        let mut vectors = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.batch_size) {
            let embeddings = self.provider.embed_batch(chunk)?;
            if embeddings.len() != chunk.len() {
                return Err(Error::Embedding(format!(
                    "provider '{}' returned {} embeddings for {} texts",
                    self.provider.provider_id(),
                    embeddings.len(),
                    chunk.len()
                )));
            }
            vectors.extend(embeddings.into_iter().map(|e| Vector::new(e).normalized()));
        }

        Ok(vectors)
    }

    /// Summary statistics of each text's embedding
    pub fn aggregate(&self, texts: &[Option<&str>]) -> Result<Vec<EmbeddingStats>> {
        info!("[Embeddings] Generating embeddings for {} texts...", texts.len());
        let vectors = self.encode(texts)?;
        debug!("[Embeddings] Done, aggregating {} vectors", vectors.len());
        Ok(vectors.iter().map(EmbeddingStats::from_vector).collect())
    }

    /// Append `<field>_emb_mean`, `_emb_std`, `_emb_min` and `_emb_max`
    pub fn apply(&self, table: &mut RecordTable, field: &str) -> Result<()> {
        info!("[{}] Creating aggregated embeddings...", field);
        let texts = table.column(field)?.text_values();
        let stats = self.aggregate(&texts)?;

        let columns: Vec<Column> = EMB_SUFFIXES
            .iter()
            .enumerate()
            .map(|(i, suffix)| {
                let values = stats.iter().map(|s| Some(s.as_array()[i])).collect();
                Column::float64(derived_name(field, suffix), values)
            })
            .collect();
        table.add_columns(columns)?;

        info!("[{}] Aggregated embedding features added", field);
        Ok(())
    }
}
