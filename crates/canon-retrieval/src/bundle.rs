//! Pre-retrieved evidence bundles, one JSON file per claim.

use std::fs;
use std::path::{Path, PathBuf};

use canon_core::errors::{CanonResult, RetrievalError};
use canon_core::models::{compare_claim_ids, Claim, EvidencePassage};
use canon_core::traits::{IClaimSource, IEvidenceStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const BUNDLE_EXTENSION: &str = "json";

/// `{claim_id, claim_text, character, book_name, evidence: [...]}`.
/// Extra fields such as retrieval statistics are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    #[serde(flatten)]
    pub claim: Claim,
    #[serde(default)]
    pub evidence: Vec<EvidencePassage>,
}

impl EvidenceBundle {
    pub fn from_file(path: &Path) -> Result<Self, RetrievalError> {
        let content = fs::read_to_string(path).map_err(|e| RetrievalError::BundleParse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| RetrievalError::BundleParse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Reads bundles from `<dir>/<claim_id>.json`.
#[derive(Debug, Clone)]
pub struct FileEvidenceStore {
    dir: PathBuf,
}

impl FileEvidenceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn bundle_path(&self, claim_id: &str) -> PathBuf {
        self.dir.join(format!("{claim_id}.{BUNDLE_EXTENSION}"))
    }

    pub fn load(&self, claim_id: &str) -> Result<EvidenceBundle, RetrievalError> {
        let path = self.bundle_path(claim_id);
        if !path.is_file() {
            return Err(RetrievalError::BundleNotFound {
                claim_id: claim_id.to_string(),
            });
        }
        EvidenceBundle::from_file(&path)
    }

    /// Every readable bundle in the directory, sorted by claim id.
    /// Unreadable bundles are skipped with a warning.
    pub fn bundles(&self) -> Result<Vec<EvidenceBundle>, RetrievalError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| RetrievalError::BundleParse {
            path: self.dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut bundles = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(BUNDLE_EXTENSION) {
                continue;
            }
            match EvidenceBundle::from_file(&path) {
                Ok(bundle) => bundles.push(bundle),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable bundle"),
            }
        }
        bundles.sort_by(|a, b| compare_claim_ids(&a.claim.claim_id, &b.claim.claim_id));
        debug!(dir = %self.dir.display(), bundles = bundles.len(), "loaded evidence bundles");
        Ok(bundles)
    }
}

impl IEvidenceStore for FileEvidenceStore {
    fn retrieve(&self, claim: &Claim) -> CanonResult<Vec<EvidencePassage>> {
        Ok(self.load(&claim.claim_id)?.evidence)
    }
}

impl IClaimSource for FileEvidenceStore {
    fn claims(&self) -> CanonResult<Vec<Claim>> {
        Ok(self.bundles()?.into_iter().map(|b| b.claim).collect())
    }
}
