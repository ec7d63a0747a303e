use crate::domain_port::{KeyValueStore, StoreError};
use dashmap::DashMap;

/// Process-local store. Used for tests and for the `memory` storage backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        for (k, v) in entries {
            store.entries.insert(k.into(), v.into());
        }
        store
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_load_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.load("k").await.unwrap(), None);

        store.save("k", "v1").await.unwrap();
        store.save("k", "v2").await.unwrap();
        assert_eq!(store.load("k").await.unwrap().as_deref(), Some("v2"));

        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert!(!store.contains("k"));
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let store = MemoryStore::with_entries([("a", "1"), ("b", "2")]);
        store.clear().await.unwrap();
        assert_eq!(store.load("a").await.unwrap(), None);
        assert_eq!(store.load("b").await.unwrap(), None);
    }
}
