//! Draft storage backends

use super::{Draft, DraftKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Default filename of the draft file
pub const DRAFTS_FILE_NAME: &str = "drafts.json";

#[derive(Debug, Error)]
pub enum DraftStoreError {
    #[error("draft I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("draft serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("draft store lock poisoned")]
    Poisoned,
}

/// Persistence backend for drafts. One draft per key; `put` replaces.
pub trait DraftStore: Send + Sync {
    fn get(&self, key: &DraftKey) -> Result<Option<Draft>, DraftStoreError>;

    fn put(&self, draft: Draft) -> Result<(), DraftStoreError>;

    /// Remove a draft, returning whether one existed
    fn remove(&self, key: &DraftKey) -> Result<bool, DraftStoreError>;

    /// All drafts, most recent first
    fn list(&self) -> Result<Vec<Draft>, DraftStoreError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DraftFile {
    drafts: BTreeMap<String, Draft>,
}

impl DraftFile {
    fn get(&self, key: &DraftKey) -> Option<Draft> {
        self.drafts.get(&key.to_string()).cloned()
    }

    fn put(&mut self, draft: Draft) {
        self.drafts.insert(draft.key().to_string(), draft);
    }

    fn contains(&self, key: &DraftKey) -> bool {
        self.drafts.contains_key(&key.to_string())
    }

    fn remove(&mut self, key: &DraftKey) -> bool {
        self.drafts.remove(&key.to_string()).is_some()
    }

    fn list(&self) -> Vec<Draft> {
        let mut drafts: Vec<Draft> = self.drafts.values().cloned().collect();
        drafts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        drafts
    }
}

fn lock(file: &Mutex<DraftFile>) -> Result<MutexGuard<'_, DraftFile>, DraftStoreError> {
    file.lock().map_err(|_| DraftStoreError::Poisoned)
}

/// Drafts persisted as a single JSON file.
///
/// Changes are written to disk before they become visible, so a failed
/// write leaves the store as it was.
pub struct JsonDraftStore {
    path: PathBuf,
    file: Mutex<DraftFile>,
}

impl JsonDraftStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DraftStoreError> {
        let path = path.into();
        let file = load_draft_file(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    fn write(&self, file: &DraftFile) -> Result<(), DraftStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl DraftStore for JsonDraftStore {
    fn get(&self, key: &DraftKey) -> Result<Option<Draft>, DraftStoreError> {
        Ok(lock(&self.file)?.get(key))
    }

    fn put(&self, draft: Draft) -> Result<(), DraftStoreError> {
        let mut file = lock(&self.file)?;
        let mut updated = file.clone();
        updated.put(draft);
        self.write(&updated)?;
        *file = updated;
        Ok(())
    }

    fn remove(&self, key: &DraftKey) -> Result<bool, DraftStoreError> {
        let mut file = lock(&self.file)?;
        if !file.contains(key) {
            return Ok(false);
        }
        let mut updated = file.clone();
        updated.remove(key);
        self.write(&updated)?;
        *file = updated;
        Ok(true)
    }

    fn list(&self) -> Result<Vec<Draft>, DraftStoreError> {
        Ok(lock(&self.file)?.list())
    }
}

/// In-memory drafts, used when no file can be opened and in tests
#[derive(Default)]
pub struct MemoryDraftStore {
    file: Mutex<DraftFile>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for MemoryDraftStore {
    fn get(&self, key: &DraftKey) -> Result<Option<Draft>, DraftStoreError> {
        Ok(lock(&self.file)?.get(key))
    }

    fn put(&self, draft: Draft) -> Result<(), DraftStoreError> {
        lock(&self.file)?.put(draft);
        Ok(())
    }

    fn remove(&self, key: &DraftKey) -> Result<bool, DraftStoreError> {
        Ok(lock(&self.file)?.remove(key))
    }

    fn list(&self) -> Result<Vec<Draft>, DraftStoreError> {
        Ok(lock(&self.file)?.list())
    }
}

/// Load the draft file. One that does not parse is moved aside first, so
/// the next write cannot destroy it.
fn load_draft_file(path: &Path) -> Result<DraftFile, DraftStoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Ok(DraftFile::default())
        }
        Err(error) => return Err(DraftStoreError::Io(error)),
    };

    match serde_json::from_str::<DraftFile>(&content) {
        Ok(file) => Ok(file),
        Err(error) => {
            let backup = corrupt_backup_path(path);
            fs::rename(path, &backup)?;
            tracing::warn!(
                "Failed to parse draft file at {}: {}; moved it to {}",
                path.display(),
                error,
                backup.display()
            );
            Ok(DraftFile::default())
        }
    }
}

fn corrupt_backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".corrupt");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{EntityType, FieldMap, FieldValue, Operation};
    use tempfile::tempdir;

    fn draft_for(target: &str, label: &str) -> Draft {
        let mut payload = FieldMap::new();
        payload.insert("label".to_string(), FieldValue::Text(label.to_string()));
        Draft::new(
            EntityType::Category,
            Operation::Update,
            Some(target.to_string()),
            payload,
            None,
        )
    }

    fn draft(label: &str) -> Draft {
        draft_for("cat-1", label)
    }

    mod memory {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_put_get_remove() {
            let store = MemoryDraftStore::new();
            let saved = draft("Cleaning");
            let key = saved.key();
            assert!(store.get(&key).unwrap().is_none());

            store.put(saved.clone()).unwrap();
            assert_eq!(store.get(&key).unwrap(), Some(saved));
            assert!(store.remove(&key).unwrap());
            assert!(!store.remove(&key).unwrap());
            assert!(store.get(&key).unwrap().is_none());
        }

        #[test]
        fn test_last_write_wins() {
            let store = MemoryDraftStore::new();
            store.put(draft("First")).unwrap();
            let second = draft("Second");
            store.put(second.clone()).unwrap();
            assert_eq!(store.list().unwrap(), vec![second.clone()]);
            assert_eq!(store.get(&second.key()).unwrap(), Some(second));
        }
    }

    mod json {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_missing_file_is_empty() {
            let dir = tempdir().unwrap();
            let store = JsonDraftStore::open(dir.path().join(DRAFTS_FILE_NAME)).unwrap();
            assert!(store.list().unwrap().is_empty());
        }

        #[test]
        fn test_persists_across_reopen() {
            let dir = tempdir().unwrap();
            let path = dir.path().join("nested").join(DRAFTS_FILE_NAME);
            let saved = draft("Cleaning");
            {
                let store = JsonDraftStore::open(&path).unwrap();
                store.put(saved.clone()).unwrap();
            }
            let reopened = JsonDraftStore::open(&path).unwrap();
            assert_eq!(reopened.get(&saved.key()).unwrap(), Some(saved));
        }

        #[test]
        fn test_corrupt_file_is_moved_aside() {
            let dir = tempdir().unwrap();
            let path = dir.path().join(DRAFTS_FILE_NAME);
            fs::write(&path, "not json").unwrap();

            let store = JsonDraftStore::open(&path).unwrap();
            assert!(store.list().unwrap().is_empty());
            store.put(draft("Cleaning")).unwrap();

            let backup = dir.path().join("drafts.json.corrupt");
            assert_eq!(fs::read_to_string(backup).unwrap(), "not json");
        }

        #[test]
        fn test_failed_write_changes_nothing() {
            let dir = tempdir().unwrap();
            let parent = dir.path().join("drafts");
            let store = JsonDraftStore::open(parent.join(DRAFTS_FILE_NAME)).unwrap();
            let kept = draft_for("cat-1", "Cleaning");
            store.put(kept.clone()).unwrap();

            // The draft directory turns into a plain file
            fs::remove_dir_all(&parent).unwrap();
            fs::write(&parent, "").unwrap();

            let lost = draft_for("cat-2", "Plumbing");
            assert!(store.put(lost.clone()).is_err());
            assert_eq!(store.get(&lost.key()).unwrap(), None);

            assert!(store.remove(&kept.key()).is_err());
            assert_eq!(store.get(&kept.key()).unwrap(), Some(kept));
            assert_eq!(store.list().unwrap().len(), 1);
        }
    }
}
