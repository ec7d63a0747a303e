use crate::api::{ApiClient, ApiRequest, ClientError};
use crate::application_port::*;
use crate::domain_model::*;
use crate::logger::*;
use reqwest::StatusCode;
use std::sync::Arc;

pub struct HttpAuthService {
    client: ApiClient,
    session: Arc<dyn SessionService>,
}

impl HttpAuthService {
    pub fn new(client: ApiClient, session: Arc<dyn SessionService>) -> Self {
        Self { client, session }
    }

    async fn start_session(&self, tokens: &TokenPair) -> Result<(), AuthError> {
        self.client.store_credentials(tokens).await?;
        self.session.set_logged_in(true).await?;
        Ok(())
    }
}

fn rejected(error: &ClientError) -> bool {
    matches!(
        error.status(),
        Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
    )
}

#[async_trait::async_trait]
impl AuthService for HttpAuthService {
    async fn login(&self, ident: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let request = ApiRequest::post("/auth/login")
            .skip_auth()
            .json(&LoginRequest {
                ident: ident.to_string(),
                password: password.to_string(),
            })?;
        let outcome: LoginOutcome = match self.client.send_json(request).await {
            Ok(outcome) => outcome,
            Err(e) if rejected(&e) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };
        match &outcome {
            LoginOutcome::Authenticated(tokens) => {
                self.start_session(tokens).await?;
                info!("logged in");
            }
            LoginOutcome::TwoFactorRequired(challenge) => {
                info!(methods = ?challenge.methods, "second factor required");
            }
        }
        Ok(outcome)
    }

    async fn verify_2fa(
        &self,
        security_token: &SecurityToken,
        code: &str,
        methods: &[TwoFactorMethod],
    ) -> Result<(), AuthError> {
        let request = ApiRequest::post("/auth/verify-code-2fa")
            .bearer(security_token.as_str())?
            .json(&VerifyCodeRequest::new(code, methods))?;
        let tokens: TokenPair = match self.client.send_json(request).await {
            Ok(tokens) => tokens,
            Err(e) if rejected(&e) => return Err(AuthError::InvalidCode),
            Err(e) => return Err(e.into()),
        };
        self.start_session(&tokens).await?;
        info!("second factor verified");
        Ok(())
    }

    async fn logout(&self) -> Result<(), AuthError> {
        let remote = self
            .client
            .send_empty(ApiRequest::delete("/auth/logout"))
            .await;
        self.client.clear_credentials().await?;
        self.session.set_logged_in(false).await?;
        match remote {
            Ok(()) => {
                info!("logged out");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "server logout failed, local session cleared anyway");
                Err(e.into())
            }
        }
    }

    async fn forgot_password(&self, ident: &str) -> Result<(), AuthError> {
        let request = ApiRequest::post("/auth/forgot-password")
            .skip_auth()
            .query("ident", ident);
        self.client.send_empty(request).await?;
        Ok(())
    }
}
