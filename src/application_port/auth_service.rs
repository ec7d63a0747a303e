use crate::api::ClientError;
use crate::domain_model::{LoginOutcome, SecurityToken, TwoFactorMethod};
use crate::domain_port::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid or expired verification code")]
    InvalidCode,
    #[error("api error: {0}")]
    Api(#[from] ClientError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Tokens returned directly are persisted. A 2FA challenge is handed
    /// back for [`verify_2fa`](Self::verify_2fa).
    async fn login(&self, ident: &str, password: &str) -> Result<LoginOutcome, AuthError>;

    async fn verify_2fa(
        &self,
        security_token: &SecurityToken,
        code: &str,
        methods: &[TwoFactorMethod],
    ) -> Result<(), AuthError>;

    /// Local credentials are dropped even when the server call fails.
    async fn logout(&self) -> Result<(), AuthError>;

    async fn forgot_password(&self, ident: &str) -> Result<(), AuthError>;
}
