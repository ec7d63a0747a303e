//! Device fingerprint sent as the `application-id` header. It identifies a
//! device for anti-abuse purposes and is not a credential.

mod digest;
mod fingerprinter;

pub use digest::*;
pub use fingerprinter::*;
