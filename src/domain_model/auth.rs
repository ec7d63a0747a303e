use crate::domain_model::{SecurityToken, TokenPair};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TwoFactorMethod {
    Email,
    Totp,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub ident: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyCodeRequest {
    pub code: String,
    pub is_totp: bool,
}

impl VerifyCodeRequest {
    pub fn new(code: impl Into<String>, methods: &[TwoFactorMethod]) -> Self {
        Self {
            code: code.into(),
            is_totp: methods.contains(&TwoFactorMethod::Totp),
        }
    }
}

/// Second factor demanded by the backend before tokens are issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoFactorChallenge {
    pub security_token: SecurityToken,
    #[serde(default)]
    pub methods: Vec<TwoFactorMethod>,
}

/// `/auth/login` answers with either tokens or a 2FA challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoginOutcome {
    Authenticated(TokenPair),
    TwoFactorRequired(TwoFactorChallenge),
}
