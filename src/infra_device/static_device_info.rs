use crate::domain_model::DeviceAttributes;
use crate::domain_port::{DeviceInfoError, DeviceInfoProvider};

/// Fixed attributes, typically from the `[device.attributes]` settings table.
#[derive(Debug, Clone, Default)]
pub struct StaticDeviceInfo {
    attributes: DeviceAttributes,
}

impl StaticDeviceInfo {
    pub fn new(attributes: DeviceAttributes) -> Self {
        Self { attributes }
    }
}

#[async_trait::async_trait]
impl DeviceInfoProvider for StaticDeviceInfo {
    async fn attributes(&self) -> Result<DeviceAttributes, DeviceInfoError> {
        Ok(self.attributes.clone())
    }
}
