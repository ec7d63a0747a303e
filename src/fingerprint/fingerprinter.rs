use crate::domain_model::storage_key;
use crate::domain_port::{DeviceInfoError, DeviceInfoProvider, KeyValueStore, StoreError};
use crate::fingerprint::compute_fingerprint;
use crate::logger::*;
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    #[error("device info: {0}")]
    DeviceInfo(#[from] DeviceInfoError),
    #[error("install uuid: {0}")]
    Store(#[from] StoreError),
}

/// Computes the `application-id` header value.
///
/// The digest is recomputed on every call. Only the install uuid is
/// cached, after it has been read from or written to the secure store once.
pub struct Fingerprinter {
    device: Arc<dyn DeviceInfoProvider>,
    secure_store: Arc<dyn KeyValueStore>,
    install_uuid: OnceCell<String>,
}

impl Fingerprinter {
    pub fn new(device: Arc<dyn DeviceInfoProvider>, secure_store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            device,
            secure_store,
            install_uuid: OnceCell::new(),
        }
    }

    /// Reads the persisted install uuid, generating and saving one on first
    /// use. Concurrent first callers share a single initialization.
    pub async fn install_uuid(&self) -> Result<&str, FingerprintError> {
        let uuid = self
            .install_uuid
            .get_or_try_init(|| self.load_or_create_uuid())
            .await?;
        Ok(uuid.as_str())
    }

    async fn load_or_create_uuid(&self) -> Result<String, FingerprintError> {
        if let Some(existing) = self.secure_store.load(storage_key::INSTALL_UUID).await? {
            return Ok(existing);
        }
        let created = uuid::Uuid::new_v4().to_string();
        self.secure_store
            .save(storage_key::INSTALL_UUID, &created)
            .await?;
        info!("generated new install uuid");
        Ok(created)
    }

    pub async fn fingerprint(&self) -> Result<String, FingerprintError> {
        let uuid = self.install_uuid().await?;
        let attributes = self.device.attributes().await?;
        Ok(compute_fingerprint(&attributes, uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::DeviceAttributes;
    use crate::infra_device::StaticDeviceInfo;
    use crate::infra_memory::MemoryStore;

    struct BrokenDevice;

    #[async_trait::async_trait]
    impl DeviceInfoProvider for BrokenDevice {
        async fn attributes(&self) -> Result<DeviceAttributes, DeviceInfoError> {
            Err(DeviceInfoError::Unavailable("dimensions".into()))
        }
    }

    fn fingerprinter(store: Arc<MemoryStore>) -> Fingerprinter {
        Fingerprinter::new(Arc::new(StaticDeviceInfo::default()), store)
    }

    #[tokio::test]
    async fn uuid_is_created_once_and_persisted() {
        let store = Arc::new(MemoryStore::new());
        let first = fingerprinter(store.clone());
        let uuid = first.install_uuid().await.unwrap().to_string();
        assert_eq!(
            store.load(storage_key::INSTALL_UUID).await.unwrap().as_deref(),
            Some(uuid.as_str())
        );

        let second = fingerprinter(store.clone());
        assert_eq!(second.install_uuid().await.unwrap(), uuid);
        assert_eq!(first.fingerprint().await.unwrap(), second.fingerprint().await.unwrap());
    }

    #[tokio::test]
    async fn existing_uuid_is_used() {
        let store = Arc::new(MemoryStore::with_entries([(storage_key::INSTALL_UUID, "fixed")]));
        let fp = fingerprinter(store).fingerprint().await.unwrap();
        assert_eq!(fp, compute_fingerprint(&DeviceAttributes::default(), "fixed"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_first_use_agrees_on_uuid() {
        let fp = Arc::new(fingerprinter(Arc::new(MemoryStore::new())));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let fp = fp.clone();
                tokio::spawn(async move { fp.install_uuid().await.unwrap().to_string() })
            })
            .collect();
        let uuids = futures_util::future::join_all(handles).await;
        let first = uuids[0].as_ref().unwrap();
        assert!(uuids.iter().all(|u| u.as_ref().unwrap() == first));
    }

    #[tokio::test]
    async fn device_failure_surfaces_as_error() {
        let fp = Fingerprinter::new(Arc::new(BrokenDevice), Arc::new(MemoryStore::new()));
        assert!(matches!(
            fp.fingerprint().await,
            Err(FingerprintError::DeviceInfo(_))
        ));
    }
}
