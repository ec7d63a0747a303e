use crate::domain_model::{DeviceAttributes, DeviceType};
use crate::domain_port::{DeviceInfoError, DeviceInfoProvider};
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::PathBuf;

const OS_RELEASE_PATH: &str = "/proc/sys/kernel/osrelease";

/// Attributes of the machine the client runs on.
///
/// Desktop hosts expose far less than a phone; everything unknown stays
/// `None` and hashes as `"0"`.
#[derive(Debug, Clone, Default)]
pub struct HostDeviceInfo {
    install_marker: Option<PathBuf>,
}

impl HostDeviceInfo {
    /// `install_marker` is an empty file written on first use and never
    /// touched again; its timestamp stands in for the installation time.
    pub fn new(install_marker: Option<PathBuf>) -> Self {
        Self { install_marker }
    }

    async fn installation_time(&self) -> Option<DateTime<Utc>> {
        let path = self.install_marker.as_ref()?;
        let meta = match tokio::fs::metadata(path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await.ok()?;
                }
                tokio::fs::write(path, b"").await.ok()?;
                tokio::fs::metadata(path).await.ok()?
            }
            Err(_) => return None,
        };
        Some(DateTime::<Utc>::from(meta.modified().ok()?))
    }
}

async fn os_release() -> Option<String> {
    if !cfg!(target_os = "linux") {
        return None;
    }
    let raw = tokio::fs::read_to_string(OS_RELEASE_PATH).await.ok()?;
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn host_name() -> Option<String> {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok())
        .filter(|name| !name.is_empty())
}

#[async_trait::async_trait]
impl DeviceInfoProvider for HostDeviceInfo {
    async fn attributes(&self) -> Result<DeviceAttributes, DeviceInfoError> {
        Ok(DeviceAttributes {
            device_name: host_name(),
            device_type: Some(DeviceType::Desktop),
            os_name: Some(std::env::consts::OS.to_string()),
            os_version: os_release().await,
            supported_cpu_architectures: Some(vec![std::env::consts::ARCH.to_string()]),
            installation_time: self.installation_time().await,
            is_device: Some(true),
            debug_mode: Some(cfg!(debug_assertions)),
            ..DeviceAttributes::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_platform_constants() {
        let attrs = HostDeviceInfo::new(None).attributes().await.unwrap();
        assert_eq!(attrs.os_name.as_deref(), Some(std::env::consts::OS));
        assert_eq!(
            attrs.supported_cpu_architectures,
            Some(vec![std::env::consts::ARCH.to_string()])
        );
        assert_eq!(attrs.installation_time, None);
    }

    #[tokio::test]
    async fn install_marker_is_created_once() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("state").join(".installed");
        let info = HostDeviceInfo::new(Some(marker.clone()));

        let first = info.attributes().await.unwrap().installation_time;
        let second = info.attributes().await.unwrap().installation_time;
        assert!(first.is_some());
        assert_eq!(first, second);
        assert!(marker.exists());
    }
}
