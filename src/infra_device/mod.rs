mod host_device_info;
mod static_device_info;

pub use host_device_info::*;
pub use static_device_info::*;
