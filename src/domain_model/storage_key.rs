//! Keys shared with the rest of the app's storage.

// secure store
pub const ACCESS_TOKEN: &str = "access_token";
pub const REFRESH_TOKEN: &str = "refresh_token";
pub const INSTALL_UUID: &str = "uuid";
pub const SAVED_PASSWORD: &str = "savedPassword";

// plain store
pub const IS_LOGGED_IN: &str = "isLoggedIn";
pub const WAS_LOGGED_IN: &str = "wasLoggedIn";
pub const IS_VERIFIED: &str = "isVerified";
pub const SAVED_USERNAME: &str = "savedUsername";

/// Secure keys wiped by a full storage reset. Tokens are owned by the
/// session and removed on logout instead.
pub const RESETTABLE_SECURE_KEYS: [&str; 2] = [INSTALL_UUID, SAVED_PASSWORD];
