// Token persistence
//
// A token store is a dumb key-value slot for one serialized TokenBundle.
// Failures here are never fatal: the session logs them and carries on as
// if the cache were empty.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::token::TokenBundle;

/// On-disk record layout version.
const RECORD_VERSION: u32 = 1;

/// Non-fatal token cache failure.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("token cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize token cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable storage for the session's token.
///
/// `load` returns `Ok(None)` on first run and for unreadable records; an
/// `Err` is reserved for failures of the backing medium itself.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<TokenBundle>, CacheError>;
    fn save(&self, token: &TokenBundle) -> Result<(), CacheError>;
    fn clear(&self) -> Result<(), CacheError>;
}

// ── File store ───────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct CacheRecord {
    version: u32,
    token: TokenBundle,
}

/// JSON file holding a single token record.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<TokenBundle>, CacheError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no token cache yet");
                return Ok(None);
            }
            Err(e) => return Err(self.io_err(e)),
        };

        match serde_json::from_slice::<CacheRecord>(&raw) {
            Ok(record) if record.version == RECORD_VERSION => Ok(Some(record.token)),
            Ok(record) => {
                warn!(
                    path = %self.path.display(),
                    version = record.version,
                    "unsupported token cache version, ignoring"
                );
                Ok(None)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "token cache is unreadable, ignoring");
                Ok(None)
            }
        }
    }

    fn save(&self, token: &TokenBundle) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }

        let record = CacheRecord {
            version: RECORD_VERSION,
            token: token.clone(),
        };
        let json = serde_json::to_vec_pretty(&record)?;

        // Write-then-rename so a crash never leaves a half-written record.
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json).map_err(|e| self.io_err(e))?;
        restrict_permissions(&tmp);
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;

        debug!(path = %self.path.display(), "token cached");
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "token cache cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
        warn!(path = %path.display(), error = %e, "could not restrict token cache permissions");
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

// ── Memory store ─────────────────────────────────────────────────────

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<TokenBundle>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded store, as if a previous run had cached `token`.
    pub fn with_token(token: TokenBundle) -> Self {
        Self {
            slot: Mutex::new(Some(token)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<TokenBundle>, CacheError> {
        Ok(self.slot.lock().expect("token slot poisoned").clone())
    }

    fn save(&self, token: &TokenBundle) -> Result<(), CacheError> {
        *self.slot.lock().expect("token slot poisoned") = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        *self.slot.lock().expect("token slot poisoned") = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bundle() -> TokenBundle {
        let mut b = TokenBundle::new("grower@example.com", "tok-123");
        b.refresh_token = Some("ref-456".into());
        b
    }

    #[test]
    fn missing_file_is_absent_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_from_fresh_instance_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("token.json");
        let saved = bundle();

        FileTokenStore::new(&path).save(&saved).unwrap();
        let loaded = FileTokenStore::new(&path).load().unwrap();

        assert_eq!(loaded, Some(saved));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn corrupt_file_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, b"\x80not json at all").unwrap();

        assert!(FileTokenStore::new(&path).load().unwrap().is_none());
    }

    #[test]
    fn unknown_record_version_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let record = serde_json::json!({ "version": 99, "token": bundle() });
        std::fs::write(&path, record.to_string()).unwrap();

        assert!(FileTokenStore::new(&path).load().unwrap().is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));
        store.save(&bundle()).unwrap();

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn unreadable_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be.
        let store = FileTokenStore::new(dir.path());
        assert!(matches!(store.load(), Err(CacheError::Io { .. })));
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryTokenStore::new();
        assert!(store.load().unwrap().is_none());

        let saved = bundle();
        store.save(&saved).unwrap();
        assert_eq!(store.load().unwrap(), Some(saved));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
