/// String key-value persistence. The secure store (tokens, install uuid,
/// saved password) and the plain preference store share this shape.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage is corrupted: {0}")]
    Corrupted(String),
}
