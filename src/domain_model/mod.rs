mod auth;
mod device;
mod token;
mod user;

pub mod storage_key;

pub use auth::*;
pub use device::*;
pub use token::*;
pub use user::*;
