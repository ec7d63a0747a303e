use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Unknown,
    Phone,
    Tablet,
    Desktop,
    Tv,
}

// Rendered by numeric code, matching what mobile device APIs report.
impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            DeviceType::Unknown => 0,
            DeviceType::Phone => 1,
            DeviceType::Tablet => 2,
            DeviceType::Desktop => 3,
            DeviceType::Tv => 4,
        };
        write!(f, "{}", code)
    }
}

/// Device and OS attributes that feed the fingerprint.
///
/// Every field is optional: platforms differ in what they expose and a
/// missing value is part of the fingerprint as much as a present one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceAttributes {
    pub device_name: Option<String>,
    pub device_type: Option<DeviceType>,
    pub device_year_class: Option<u32>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub manufacturer: Option<String>,
    pub brand: Option<String>,
    pub model_id: Option<String>,
    pub design_name: Option<String>,
    pub model_name: Option<String>,
    pub total_memory: Option<u64>,
    pub supported_cpu_architectures: Option<Vec<String>>,
    pub installation_time: Option<DateTime<Utc>>,
    pub product_name: Option<String>,
    pub platform_api_level: Option<u32>,
    pub os_build_fingerprint: Option<String>,
    pub is_device: Option<bool>,
    pub debug_mode: Option<bool>,
    pub status_bar_height: Option<f64>,
    pub system_fonts: Option<Vec<String>>,
    pub window_width: Option<f64>,
    pub window_height: Option<f64>,
    pub pixel_ratio: Option<f64>,
}
