mod auth_service_impl;
mod session_service_impl;
mod terms_service_impl;
mod user_service_impl;

pub use auth_service_impl::*;
pub use session_service_impl::*;
pub use terms_service_impl::*;
pub use user_service_impl::*;
