//! Artifact loading: the trained model and its ordered feature list.
//!
//! Both files live in one model directory and are loaded once at process
//! start. Any failure here is fatal for the prediction path.
//!
//! # Integrity
//!
//! An optional `manifest.json` binds each artifact to its SHA-256 digest
//! (written by the `hash_artifacts` binary). When the manifest is present
//! every bound file must match; `require_manifest` makes its absence an
//! error too.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::adapters::gbdt::GbdtClassifier;
use crate::domain::{FeatureSchema, SchemaMismatchError};
use crate::ports::{BinaryClassifier, ClassifierArtifact};

pub const MODEL_FILE: &str = "diabetes_model.json";
pub const FEATURES_FILE: &str = "feature_names.json";
pub const MANIFEST_FILE: &str = "manifest.json";

const MANIFEST_VERSION: u32 = 1;

/// Model or feature-list file missing or unusable.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("Artifact not found: {path:?}")]
    NotFound { path: PathBuf },

    #[error("Failed to read artifact {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Artifact {path:?} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Artifact {path:?} failed integrity check (expected sha256 {expected}, got {actual})")]
    IntegrityMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Manifest required but not found at {path:?}")]
    ManifestRequired { path: PathBuf },

    #[error("Feature list {path:?} does not match the feature assembler: {source}")]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaMismatchError,
    },
}

impl ArtifactLoadError {
    /// File the failure refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path }
            | Self::Unreadable { path, .. }
            | Self::Corrupt { path, .. }
            | Self::IntegrityMismatch { path, .. }
            | Self::ManifestRequired { path }
            | Self::Schema { path, .. } => path,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::ManifestRequired { .. })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Fail when `manifest.json` is absent.
    pub require_manifest: bool,
}

/// Digest manifest for the model directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub version: u32,
    #[serde(default)]
    pub created_at: Option<i64>,
    /// File name -> lowercase hex SHA-256
    pub files: BTreeMap<String, String>,
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, ArtifactLoadError> {
    fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ArtifactLoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ArtifactLoadError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Hash both artifacts in `dir` into a fresh manifest.
///
/// # Errors
/// Fails if either artifact cannot be read.
pub fn build_manifest(dir: &Path, created_at: i64) -> Result<ArtifactManifest, ArtifactLoadError> {
    let mut files = BTreeMap::new();
    for name in [MODEL_FILE, FEATURES_FILE] {
        let bytes = read_artifact(&dir.join(name))?;
        files.insert(name.to_string(), sha256_hex(&bytes));
    }
    Ok(ArtifactManifest {
        version: MANIFEST_VERSION,
        created_at: Some(created_at),
        files,
    })
}

/// Hash the artifacts in `dir` and write `manifest.json` next to them.
///
/// # Errors
/// `ArtifactLoad` if an artifact cannot be read, `Serialization` or `Io` if
/// the manifest cannot be encoded or written.
pub fn write_manifest(dir: &Path, created_at: i64) -> crate::Result<ArtifactManifest> {
    let manifest = build_manifest(dir, created_at)?;
    let bytes = serde_json::to_vec_pretty(&manifest)?;
    fs::write(dir.join(MANIFEST_FILE), bytes)?;
    Ok(manifest)
}

fn verify_manifest(
    dir: &Path,
    artifacts: &[(&str, &[u8])],
    options: LoadOptions,
) -> Result<(), ArtifactLoadError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let content = match read_artifact(&manifest_path) {
        Ok(bytes) => bytes,
        Err(ArtifactLoadError::NotFound { .. }) if !options.require_manifest => {
            tracing::debug!("No {MANIFEST_FILE} in {:?}, skipping integrity check", dir);
            return Ok(());
        }
        Err(ArtifactLoadError::NotFound { path }) => {
            return Err(ArtifactLoadError::ManifestRequired { path });
        }
        Err(e) => return Err(e),
    };

    let manifest: ArtifactManifest =
        serde_json::from_slice(&content).map_err(|e| ArtifactLoadError::Corrupt {
            path: manifest_path.clone(),
            reason: e.to_string(),
        })?;
    if manifest.version != MANIFEST_VERSION {
        return Err(ArtifactLoadError::Corrupt {
            path: manifest_path,
            reason: format!("unsupported manifest version {}", manifest.version),
        });
    }

    for (name, bytes) in artifacts {
        let expected = manifest
            .files
            .get(*name)
            .ok_or_else(|| ArtifactLoadError::Corrupt {
                path: manifest_path.clone(),
                reason: format!("manifest does not bind {name}"),
            })?;
        let actual = sha256_hex(bytes);
        if !expected.eq_ignore_ascii_case(&actual) {
            return Err(ArtifactLoadError::IntegrityMismatch {
                path: dir.join(name),
                expected: expected.clone(),
                actual,
            });
        }
    }

    tracing::info!("Artifact digests verified against {MANIFEST_FILE}");
    Ok(())
}

/// Load the classifier and its feature list from `dir`.
///
/// # Errors
/// Returns `ArtifactLoadError` naming the offending file: missing, unreadable,
/// malformed, failing the manifest, or disagreeing with the assembler.
pub fn load_artifacts(
    dir: &Path,
    options: LoadOptions,
) -> Result<ClassifierArtifact<GbdtClassifier>, ArtifactLoadError> {
    if !dir.is_dir() {
        return Err(ArtifactLoadError::NotFound {
            path: dir.to_path_buf(),
        });
    }

    let model_path = dir.join(MODEL_FILE);
    let features_path = dir.join(FEATURES_FILE);

    let model_bytes = read_artifact(&model_path)?;
    let features_bytes = read_artifact(&features_path)?;

    verify_manifest(
        dir,
        &[
            (MODEL_FILE, model_bytes.as_slice()),
            (FEATURES_FILE, features_bytes.as_slice()),
        ],
        options,
    )?;

    let model_json = std::str::from_utf8(&model_bytes).map_err(|e| ArtifactLoadError::Corrupt {
        path: model_path.clone(),
        reason: e.to_string(),
    })?;
    let classifier =
        GbdtClassifier::from_json(model_json).map_err(|reason| ArtifactLoadError::Corrupt {
            path: model_path.clone(),
            reason,
        })?;

    let names: Vec<String> =
        serde_json::from_slice(&features_bytes).map_err(|e| ArtifactLoadError::Corrupt {
            path: features_path.clone(),
            reason: e.to_string(),
        })?;
    let schema = FeatureSchema::new(names).map_err(|source| ArtifactLoadError::Schema {
        path: features_path.clone(),
        source,
    })?;

    let metadata = classifier.metadata().cloned().unwrap_or_default();
    let fingerprint = sha256_hex(&model_bytes);
    let n_trees = classifier.n_trees();
    let n_features = classifier.n_features();

    let artifact = ClassifierArtifact::new(classifier, schema)
        .map_err(|source| ArtifactLoadError::Schema {
            path: features_path,
            source,
        })?
        .with_metadata(metadata)
        .with_fingerprint(fingerprint);

    tracing::info!(
        "Loaded model from {:?} (trees={}, n_features={}, sha256={})",
        dir,
        n_trees,
        n_features,
        artifact.fingerprint().unwrap_or_default()
    );

    Ok(artifact)
}
