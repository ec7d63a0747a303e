use crate::domain_port::{KeyValueStore, StoreError};
use crate::logger::*;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Key-value store persisted as a single JSON object on disk.
///
/// The file is read on first access and rewritten on every mutation through
/// a temp file plus rename, so a crash never leaves a half-written store.
pub struct JsonFileStore {
    path: PathBuf,
    cache: Mutex<Option<BTreeMap<String, String>>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Corrupted(format!("{}: {}", self.path.display(), e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_file(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|e| StoreError::Corrupted(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), entries = entries.len(), "store flushed");
        Ok(())
    }

    async fn with_entries<R>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> (R, bool),
    ) -> Result<R, StoreError> {
        let mut guard = self.cache.lock().await;
        if guard.is_none() {
            *guard = Some(self.read_file().await?);
        }
        let entries = guard.get_or_insert_with(BTreeMap::new);
        // mutate a copy so a failed write leaves the cache as on disk
        let mut next = entries.clone();
        let (result, dirty) = f(&mut next);
        if dirty {
            self.write_file(&next).await?;
            *entries = next;
        }
        Ok(result)
    }
}

#[async_trait::async_trait]
impl KeyValueStore for JsonFileStore {
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_entries(|entries| (entries.get(key).cloned(), false))
            .await
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.with_entries(|entries| {
            let changed = entries.get(key).map(String::as_str) != Some(value);
            if changed {
                entries.insert(key.to_string(), value.to_string());
            }
            ((), changed)
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.with_entries(|entries| ((), entries.remove(key).is_some()))
            .await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.with_entries(|entries| {
            let had_entries = !entries.is_empty();
            entries.clear();
            ((), had_entries)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("secure.json");

        let store = JsonFileStore::new(&path);
        store.save("access_token", "a1").await.unwrap();
        store.save("uuid", "u1").await.unwrap();
        store.remove("access_token").await.unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.load("access_token").await.unwrap(), None);
        assert_eq!(reopened.load("uuid").await.unwrap().as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load("anything").await.unwrap(), None);
        store.remove("anything").await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn garbage_file_is_reported_as_corrupted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let store = JsonFileStore::new(&path);
        let err = store.load("isLoggedIn").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupted(_)));
    }

    #[tokio::test]
    async fn failed_flush_leaves_cache_matching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secure.json");
        let store = JsonFileStore::new(&path);
        store.save("refresh_token", "r1").await.unwrap();

        // a directory where the temp file goes makes the next write fail
        tokio::fs::create_dir(path.with_extension("tmp")).await.unwrap();

        assert!(matches!(
            store.remove("refresh_token").await,
            Err(StoreError::Io(_))
        ));
        assert!(store.clear().await.is_err());
        assert!(store.save("access_token", "a1").await.is_err());

        assert_eq!(store.load("refresh_token").await.unwrap().as_deref(), Some("r1"));
        assert_eq!(store.load("access_token").await.unwrap(), None);
        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.load("refresh_token").await.unwrap().as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn clear_empties_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let store = JsonFileStore::new(&path);
        store.save("isLoggedIn", "true").await.unwrap();
        store.clear().await.unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.load("isLoggedIn").await.unwrap(), None);
    }
}
