use crate::domain_model::DeviceAttributes;

/// Source of the device attributes hashed into the fingerprint. Queried on
/// every request, so display or OS changes show up immediately.
#[async_trait::async_trait]
pub trait DeviceInfoProvider: Send + Sync {
    async fn attributes(&self) -> Result<DeviceAttributes, DeviceInfoError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceInfoError {
    #[error("device attribute unavailable: {0}")]
    Unavailable(String),
}
