// artifact_loader.rs - Startup loading of the optional scaler and model artifacts

use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::artifact::{ModelArtifact, ScalerArtifact};
use crate::errors::{EstimatorError, EstimatorResult};

/// A JSON artifact document that can be checked after decoding
pub trait ArtifactDocument: DeserializeOwned {
    const LABEL: &'static str;

    fn validate(&self) -> EstimatorResult<()>;
}

impl ArtifactDocument for ModelArtifact {
    const LABEL: &'static str = "model";

    fn validate(&self) -> EstimatorResult<()> {
        ModelArtifact::validate(self)
    }
}

impl ArtifactDocument for ScalerArtifact {
    const LABEL: &'static str = "scaler";

    fn validate(&self) -> EstimatorResult<()> {
        ScalerArtifact::validate(self)
    }
}

/// An artifact together with where it came from
#[derive(Debug, Clone)]
pub struct LoadedArtifact<T> {
    pub artifact: T,
    pub source: PathBuf,
    pub sha256: String,
}

/// Hex-encoded SHA-256 of the artifact bytes
pub fn fingerprint(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Read, decode and validate a single artifact file.
pub fn read_artifact<T: ArtifactDocument>(path: &Path) -> EstimatorResult<LoadedArtifact<T>> {
    let bytes = fs::read(path)
        .map_err(|e| EstimatorError::io(format!("read {}", path.display()), e))?;
    let artifact: T = serde_json::from_slice(&bytes)
        .map_err(|e| EstimatorError::serialization(format!("decode {}", path.display()), e))?;
    artifact.validate()?;

    Ok(LoadedArtifact {
        artifact,
        source: path.to_path_buf(),
        sha256: fingerprint(&bytes),
    })
}

/// Try each candidate in order and keep the first one that loads.
///
/// Missing, unreadable, undecodable or structurally invalid files are logged
/// and skipped; when nothing loads the artifact is simply absent.
pub fn load_first<T: ArtifactDocument>(dir: &Path, candidates: &[String]) -> Option<LoadedArtifact<T>> {
    for name in candidates {
        let path = dir.join(name);
        if !path.exists() {
            debug!(message = "Artifact candidate not present", kind = T::LABEL, path = %path.display());
            continue;
        }

        match read_artifact::<T>(&path) {
            Ok(loaded) => {
                info!(
                    message = "Loaded artifact",
                    kind = T::LABEL,
                    path = %loaded.source.display(),
                    sha256 = %loaded.sha256
                );
                return Some(loaded);
            }
            Err(e) => {
                warn!(
                    message = "Failed to load artifact candidate",
                    kind = T::LABEL,
                    path = %path.display(),
                    error = %e
                );
            }
        }
    }

    warn!(message = "No usable artifact found", kind = T::LABEL, dir = %dir.display());
    None
}

pub fn load_model(dir: &Path, candidates: &[String]) -> Option<LoadedArtifact<ModelArtifact>> {
    load_first(dir, candidates)
}

pub fn load_scaler(dir: &Path, candidates: &[String]) -> Option<LoadedArtifact<ScalerArtifact>> {
    load_first(dir, candidates)
}
