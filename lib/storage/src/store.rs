// Encoder artifact persistence
use crate::encoder::OneHotEncoder;
use atomicwrites::{AtomicFile, OverwriteBehavior};
use featx_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Bumped whenever the encoder layout changes
pub const ARTIFACT_VERSION: u32 = 2;

pub const ARTIFACT_EXTENSION: &str = "bin";

#[derive(Debug, Serialize, Deserialize)]
struct EncoderArtifact {
    version: u32,
    encoder: OneHotEncoder,
}

/// Directory of fitted encoders, one file per source column
#[derive(Debug, Clone)]
pub struct EncoderStore {
    dir: PathBuf,
}

impl EncoderStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// `encoders/` next to the source dataset
    pub fn beside_dataset<P: AsRef<Path>>(dataset: P) -> Self {
        let parent = dataset
            .as_ref()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::new(parent.join("encoders"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<column>_encoder.bin`
    pub fn path_for(&self, column: &str) -> PathBuf {
        self.dir
            .join(format!("{}_encoder.{}", column, ARTIFACT_EXTENSION))
    }

    /// Write an encoder, replacing any previous artifact atomically
    pub fn save(&self, encoder: &OneHotEncoder) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(encoder.column());

        let artifact = EncoderArtifact {
            version: ARTIFACT_VERSION,
            encoder: encoder.clone(),
        };
        let data = bincode::serialize(&artifact)
            .map_err(|e| Error::Serialization(e.to_string()))?;

        AtomicFile::new(&path, OverwriteBehavior::AllowOverwrite)
            .write(|f| f.write_all(&data))
            .map_err(|e| Error::Storage(e.to_string()))?;

        info!("[OK] Encoder {} saved to {}", encoder.column(), path.display());
        Ok(path)
    }

    /// Read the encoder fitted for `column`
    pub fn load(&self, column: &str) -> Result<OneHotEncoder> {
        let path = self.path_for(column);
        if !path.exists() {
            return Err(Error::EncoderNotFound(path.display().to_string()));
        }

        let data = fs::read(&path)?;
        let artifact: EncoderArtifact = bincode::deserialize(&data)
            .map_err(|e| Error::Serialization(e.to_string()))?;

        if artifact.version != ARTIFACT_VERSION {
            return Err(Error::Serialization(format!(
                "{}: unsupported encoder artifact version {}",
                path.display(),
                artifact.version
            )));
        }
        if artifact.encoder.column() != column {
            return Err(Error::Serialization(format!(
                "{}: artifact holds encoder for '{}'",
                path.display(),
                artifact.encoder.column()
            )));
        }

        Ok(artifact.encoder)
    }
}
