use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use featx::{EmbeddingConfig, EmbeddingProvider, FeatureConfig, FeaturePipeline, PipelineConfig};
use featx::config::DEFAULT_CONFIG_FILE;
use featx_similarity::HashEmbedder;
use featx_storage::{read_parquet, write_parquet, EncoderStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Feature engineering for recruiting data
#[derive(Parser, Debug)]
#[command(name = "featx")]
#[command(about = "Builds the feature dataset for the hiring model", long_about = None)]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit encoders on the modelling dataset and write the feature dataset
    Run {
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        #[arg(long, value_enum, default_value_t = EmbedderKind::default())]
        embedder: EmbedderKind,
    },
    /// Apply saved encoders and derive features on new rows
    Transform {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Directory holding the fitted encoders
        #[arg(long)]
        encoders: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = EmbedderKind::default())]
        embedder: EmbedderKind,
    },
    /// Keep only the numeric predictors of a feature dataset
    Select {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum EmbedderKind {
    /// Sentence-transformer model run locally through ONNX
    Fastembed,
    /// Deterministic hashing embedder, no model download
    Hash,
}

impl Default for EmbedderKind {
    fn default() -> Self {
        if cfg!(feature = "fastembed-embeddings") {
            EmbedderKind::Fastembed
        } else {
            EmbedderKind::Hash
        }
    }
}

impl std::fmt::Display for EmbedderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbedderKind::Fastembed => write!(f, "fastembed"),
            EmbedderKind::Hash => write!(f, "hash"),
        }
    }
}

#[cfg(feature = "fastembed-embeddings")]
fn fastembed_provider(config: &EmbeddingConfig) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    let provider = featx::FastEmbedProvider::new(&config.model, config.cache_dir.clone(), true)
        .with_context(|| format!("failed to load embedding model '{}'", config.model))?;
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "fastembed-embeddings"))]
fn fastembed_provider(_config: &EmbeddingConfig) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    anyhow::bail!("featx was built without the 'fastembed-embeddings' feature, use --embedder hash")
}

fn build_provider(kind: EmbedderKind, config: &EmbeddingConfig) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    let provider = match kind {
        EmbedderKind::Fastembed => fastembed_provider(config)?,
        EmbedderKind::Hash => Arc::new(HashEmbedder::default()),
    };
    info!(
        "Embedding provider: {} (dim {})",
        provider.provider_id(),
        provider.dimension()
    );
    Ok(provider)
}

fn current_dir() -> anyhow::Result<PathBuf> {
    std::env::current_dir().context("failed to resolve working directory")
}

fn feature_config(path: Option<&Path>) -> anyhow::Result<FeatureConfig> {
    match path {
        Some(path) => Ok(PipelineConfig::load(path, &current_dir()?)?.features),
        None => Ok(FeatureConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting featx v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Run { config, embedder } => {
            let config = PipelineConfig::load(&config, &current_dir()?)?;
            let provider = build_provider(embedder, &config.features.embedding)?;
            let pipeline = FeaturePipeline::new(config.features.clone(), provider)?;

            let summary = pipeline.run(&config)?;
            info!(
                "Done: {} rows, {} columns, {} encoders saved",
                summary.rows,
                summary.columns,
                summary.encoder_paths.len()
            );
        }
        Command::Transform {
            input,
            output,
            encoders,
            config,
            embedder,
        } => {
            let features = feature_config(config.as_deref())?;
            let provider = build_provider(embedder, &features.embedding)?;
            let pipeline = FeaturePipeline::new(features, provider)?;

            let table = read_parquet(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let table = pipeline.transform_new_data(table, &EncoderStore::new(&encoders))?;
            write_parquet(&table, &output)
                .with_context(|| format!("failed to write {}", output.display()))?;
        }
        Command::Select {
            input,
            output,
            config,
        } => {
            let features = feature_config(config.as_deref())?;
            let filter = featx::ColumnFilter::new(
                features.identifier_columns,
                features.raw_columns,
                features.target_column,
            );

            let table = read_parquet(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let baseline = filter.baseline_features(&table)?;
            info!("Selected {} numeric features", baseline.n_cols());
            write_parquet(&baseline, &output)
                .with_context(|| format!("failed to write {}", output.display()))?;
        }
    }

    Ok(())
}
