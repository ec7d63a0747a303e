mod device_info;
mod key_value_store;

pub use device_info::*;
pub use key_value_store::*;
