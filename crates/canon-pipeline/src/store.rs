//! File-backed verdict store.

use std::fs;
use std::path::{Path, PathBuf};

use canon_core::errors::{CanonResult, StoreError};
use canon_core::models::VerdictRecord;
use canon_core::traits::IVerdictStore;
use tracing::warn;

const RECORD_EXTENSION: &str = "json";

/// Writes `<dir>/<claim_id>.json`, pretty-printed, via a temp file and rename
/// so a reader never sees a partial record.
#[derive(Debug, Clone)]
pub struct FsVerdictStore {
    dir: PathBuf,
}

impl FsVerdictStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for `claim_id`. Ids that could escape the
    /// directory are rejected.
    pub fn record_path(&self, claim_id: &str) -> Result<PathBuf, StoreError> {
        let trimmed = claim_id.trim();
        let invalid = trimmed.is_empty()
            || trimmed != claim_id
            || claim_id.starts_with('.')
            || claim_id.contains(['/', '\\', '\0'])
            || claim_id.contains("..");
        if invalid {
            return Err(StoreError::InvalidClaimId {
                claim_id: claim_id.to_string(),
            });
        }
        Ok(self.dir.join(format!("{claim_id}.{RECORD_EXTENSION}")))
    }

    fn temp_path(&self, claim_id: &str) -> PathBuf {
        self.dir.join(format!(".{claim_id}.{RECORD_EXTENSION}.tmp"))
    }
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

impl IVerdictStore for FsVerdictStore {
    fn exists(&self, claim_id: &str) -> CanonResult<bool> {
        Ok(self.record_path(claim_id)?.is_file())
    }

    fn save(&self, record: &VerdictRecord) -> CanonResult<()> {
        let path = self.record_path(&record.claim_id)?;
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;

        let json = serde_json::to_string_pretty(record).map_err(|e| StoreError::Serialization {
            reason: e.to_string(),
        })?;
        let tmp = self.temp_path(&record.claim_id);
        fs::write(&tmp, json).map_err(|e| io_error(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            io_error(&path, e)
        })?;
        Ok(())
    }

    fn load(&self, claim_id: &str) -> CanonResult<VerdictRecord> {
        let path = self.record_path(claim_id)?;
        if !path.is_file() {
            return Err(StoreError::NotFound {
                claim_id: claim_id.to_string(),
            }
            .into());
        }
        let content = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
        let record = serde_json::from_str(&content).map_err(|e| StoreError::Serialization {
            reason: format!("{}: {e}", path.display()),
        })?;
        Ok(record)
    }

    /// Records that fail to parse are skipped with a warning. A missing
    /// directory holds no records.
    fn list(&self) -> CanonResult<Vec<VerdictRecord>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.dir).map_err(|e| io_error(&self.dir, e))?;
        let mut records = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let is_record = path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXTENSION)
                && !entry.file_name().to_string_lossy().starts_with('.');
            if !is_record {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|c| serde_json::from_str::<VerdictRecord>(&c).map_err(|e| e.to_string()));
            match parsed {
                Ok(record) => records.push(record),
                Err(reason) => warn!(path = %path.display(), %reason, "skipping unreadable record"),
            }
        }
        Ok(records)
    }
}
