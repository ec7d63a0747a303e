use crate::domain_port::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedCredentials {
    pub username: String,
    pub password: Option<String>,
}

/// Local session flags and remembered credentials.
#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    async fn is_logged_in(&self) -> Result<bool, StoreError>;
    async fn was_logged_in(&self) -> Result<bool, StoreError>;
    async fn is_verified(&self) -> Result<bool, StoreError>;

    /// Logging in also records that the user has been logged in before.
    async fn set_logged_in(&self, logged_in: bool) -> Result<(), StoreError>;
    async fn set_verified(&self, verified: bool) -> Result<(), StoreError>;

    async fn remember_credentials(&self, username: &str, password: &str)
    -> Result<(), StoreError>;
    async fn saved_credentials(&self) -> Result<Option<SavedCredentials>, StoreError>;
    async fn forget_credentials(&self) -> Result<(), StoreError>;

    /// Clears the plain store and the resettable secure keys.
    async fn clear_all_storage(&self) -> Result<(), StoreError>;
}
