//! Outbound API client: fingerprint header, bearer auth, and transparent
//! refresh-and-replay on 401.

mod client;
mod error;
mod refresh;
mod request;

pub use client::*;
pub use error::*;
pub use refresh::*;
pub use request::*;
