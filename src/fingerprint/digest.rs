use crate::domain_model::DeviceAttributes;
use sha2::{Digest, Sha512};
use std::fmt::Display;

const ABSENT: &str = "0";

fn value<T: Display>(v: &Option<T>) -> String {
    v.as_ref().map_or_else(|| ABSENT.to_string(), T::to_string)
}

fn list(v: &Option<Vec<String>>) -> String {
    v.as_ref().map_or_else(|| ABSENT.to_string(), |items| items.join(","))
}

/// `"18.1.2"` → `"18"`. Missing or empty versions become `"0"`.
pub fn major_version(version: Option<&str>) -> String {
    version
        .and_then(|v| v.split('.').next())
        .map(str::trim)
        .filter(|major| !major.is_empty())
        .unwrap_or(ABSENT)
        .to_string()
}

/// The attribute values in hashing order, normalized to strings.
pub fn normalized_parts(attrs: &DeviceAttributes) -> Vec<String> {
    vec![
        value(&attrs.device_name),
        value(&attrs.device_type),
        value(&attrs.device_year_class),
        value(&attrs.os_name),
        major_version(attrs.os_version.as_deref()),
        value(&attrs.manufacturer),
        value(&attrs.brand),
        value(&attrs.model_id),
        value(&attrs.design_name),
        value(&attrs.model_name),
        value(&attrs.total_memory),
        list(&attrs.supported_cpu_architectures),
        value(&attrs.installation_time.map(|t| t.timestamp_millis())),
        value(&attrs.product_name),
        value(&attrs.platform_api_level),
        value(&attrs.os_build_fingerprint),
        value(&attrs.is_device),
        value(&attrs.debug_mode),
        value(&attrs.status_bar_height),
        list(&attrs.system_fonts),
        value(&attrs.window_width),
        value(&attrs.window_height),
        value(&attrs.pixel_ratio),
    ]
}

/// SHA-512 over the normalized attributes followed by the install uuid, no
/// separators, as lowercase hex.
pub fn compute_fingerprint(attrs: &DeviceAttributes, uuid: &str) -> String {
    let mut hasher = Sha512::new();
    for part in normalized_parts(attrs) {
        hasher.update(part.as_bytes());
    }
    hasher.update(uuid.as_bytes());
    hex::encode(hasher.finalize())
}
