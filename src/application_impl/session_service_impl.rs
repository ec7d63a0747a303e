use crate::application_port::*;
use crate::domain_model::storage_key;
use crate::domain_port::{KeyValueStore, StoreError};
use crate::logger::*;
use futures_util::future::try_join_all;
use std::sync::Arc;

pub struct StoreSessionService {
    secure_store: Arc<dyn KeyValueStore>,
    prefs: Arc<dyn KeyValueStore>,
}

impl StoreSessionService {
    pub fn new(secure_store: Arc<dyn KeyValueStore>, prefs: Arc<dyn KeyValueStore>) -> Self {
        Self {
            secure_store,
            prefs,
        }
    }

    async fn flag(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.prefs.load(key).await?.as_deref() == Some("true"))
    }

    async fn set_flag(&self, key: &str, value: bool) -> Result<(), StoreError> {
        self.prefs
            .save(key, if value { "true" } else { "false" })
            .await
    }
}

#[async_trait::async_trait]
impl SessionService for StoreSessionService {
    async fn is_logged_in(&self) -> Result<bool, StoreError> {
        self.flag(storage_key::IS_LOGGED_IN).await
    }

    async fn was_logged_in(&self) -> Result<bool, StoreError> {
        self.flag(storage_key::WAS_LOGGED_IN).await
    }

    async fn is_verified(&self) -> Result<bool, StoreError> {
        self.flag(storage_key::IS_VERIFIED).await
    }

    async fn set_logged_in(&self, logged_in: bool) -> Result<(), StoreError> {
        self.set_flag(storage_key::IS_LOGGED_IN, logged_in).await?;
        if logged_in {
            self.set_flag(storage_key::WAS_LOGGED_IN, true).await?;
        }
        Ok(())
    }

    async fn set_verified(&self, verified: bool) -> Result<(), StoreError> {
        self.set_flag(storage_key::IS_VERIFIED, verified).await
    }

    async fn remember_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(), StoreError> {
        self.prefs.save(storage_key::SAVED_USERNAME, username).await?;
        self.secure_store
            .save(storage_key::SAVED_PASSWORD, password)
            .await
    }

    async fn saved_credentials(&self) -> Result<Option<SavedCredentials>, StoreError> {
        let Some(username) = self.prefs.load(storage_key::SAVED_USERNAME).await? else {
            return Ok(None);
        };
        let password = self.secure_store.load(storage_key::SAVED_PASSWORD).await?;
        Ok(Some(SavedCredentials { username, password }))
    }

    async fn forget_credentials(&self) -> Result<(), StoreError> {
        self.prefs.remove(storage_key::SAVED_USERNAME).await?;
        self.secure_store.remove(storage_key::SAVED_PASSWORD).await
    }

    async fn clear_all_storage(&self) -> Result<(), StoreError> {
        self.prefs.clear().await?;
        try_join_all(
            storage_key::RESETTABLE_SECURE_KEYS
                .iter()
                .map(|key| self.secure_store.remove(key)),
        )
        .await?;
        info!("local storage cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::MemoryStore;

    fn service() -> (StoreSessionService, Arc<MemoryStore>, Arc<MemoryStore>) {
        let secure = Arc::new(MemoryStore::new());
        let prefs = Arc::new(MemoryStore::new());
        (
            StoreSessionService::new(secure.clone(), prefs.clone()),
            secure,
            prefs,
        )
    }

    #[tokio::test]
    async fn login_sets_both_flags_and_logout_keeps_history() {
        let (session, _, _) = service();
        assert!(!session.is_logged_in().await.unwrap());

        session.set_logged_in(true).await.unwrap();
        assert!(session.is_logged_in().await.unwrap());
        assert!(session.was_logged_in().await.unwrap());

        session.set_logged_in(false).await.unwrap();
        assert!(!session.is_logged_in().await.unwrap());
        assert!(session.was_logged_in().await.unwrap());
    }

    #[tokio::test]
    async fn credentials_are_split_across_stores() {
        let (session, secure, prefs) = service();
        session.remember_credentials("sam", "hunter2").await.unwrap();

        assert!(prefs.contains(storage_key::SAVED_USERNAME));
        assert!(!prefs.contains(storage_key::SAVED_PASSWORD));
        assert!(secure.contains(storage_key::SAVED_PASSWORD));
        assert_eq!(
            session.saved_credentials().await.unwrap(),
            Some(SavedCredentials {
                username: "sam".into(),
                password: Some("hunter2".into()),
            })
        );

        session.forget_credentials().await.unwrap();
        assert_eq!(session.saved_credentials().await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_all_storage_keeps_tokens() {
        let (session, secure, prefs) = service();
        secure.save(storage_key::INSTALL_UUID, "u").await.unwrap();
        secure.save(storage_key::ACCESS_TOKEN, "a").await.unwrap();
        session.remember_credentials("sam", "pw").await.unwrap();
        session.set_verified(true).await.unwrap();

        session.clear_all_storage().await.unwrap();

        assert!(!secure.contains(storage_key::INSTALL_UUID));
        assert!(!secure.contains(storage_key::SAVED_PASSWORD));
        assert!(secure.contains(storage_key::ACCESS_TOKEN));
        assert!(!prefs.contains(storage_key::SAVED_USERNAME));
        assert!(!session.is_verified().await.unwrap());
    }
}
