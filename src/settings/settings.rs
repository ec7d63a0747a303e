use crate::domain_model::DeviceAttributes;
use anyhow::{Result, anyhow};
use config::{Config, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub api: Api,
    pub device: Device,
    pub log: Log,
    pub storage: Storage,
}

#[derive(Debug, Deserialize)]
pub struct Api {
    pub base_url: String,
    pub static_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_refresh_timeout_secs")]
    pub refresh_timeout_secs: u64,
}

impl Api {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_refresh_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Deserialize)]
pub struct Device {
    pub backend: String, // "host" or "static"
    #[serde(default)]
    pub attributes: DeviceAttributes,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
    pub backend: String, // "memory" or "file"
    #[serde(default)]
    pub secure_path: Option<PathBuf>,
    #[serde(default)]
    pub prefs_path: Option<PathBuf>,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(
            &path,
            r#"
[api]
base_url = "http://localhost:8001/api/v1"
static_base_url = "http://localhost:8001/static"

[device]
backend = "static"

[device.attributes]
os_name = "Android"
os_version = "14.1"
window_width = 411.5

[log]
filter = "debug"

[storage]
backend = "memory"
"#,
        )
        .unwrap();

        let settings = parse_settings(path.to_str()).unwrap();
        assert_eq!(settings.api.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.api.refresh_timeout(), Duration::from_secs(15));
        assert_eq!(settings.device.attributes.os_name.as_deref(), Some("Android"));
        assert_eq!(settings.device.attributes.window_width, Some(411.5));
        assert_eq!(settings.device.attributes.model_id, None);
        assert_eq!(settings.storage.secure_path, None);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_settings(Some("does/not/exist.toml")).is_err());
    }
}
