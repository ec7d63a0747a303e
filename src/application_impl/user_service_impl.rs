use crate::api::{ApiClient, ApiRequest, ClientError};
use crate::application_port::*;
use crate::domain_model::*;
use crate::logger::*;
use reqwest::StatusCode;
use serde::Serialize;
use std::sync::Arc;

pub struct HttpUserService {
    client: ApiClient,
    session: Arc<dyn SessionService>,
}

impl HttpUserService {
    pub fn new(client: ApiClient, session: Arc<dyn SessionService>) -> Self {
        Self { client, session }
    }
}

#[derive(Serialize)]
struct UsernameBody<'a> {
    username: &'a str,
}

#[derive(Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct PasswordBody<'a> {
    password: &'a str,
}

fn password_rejected(error: ClientError) -> UserError {
    match error.status() {
        Some(StatusCode::BAD_REQUEST | StatusCode::FORBIDDEN) => UserError::WrongPassword,
        _ => error.into(),
    }
}

#[async_trait::async_trait]
impl UserService for HttpUserService {
    async fn me(&self) -> Result<UserProfile, UserError> {
        Ok(self.client.send_json(ApiRequest::get("/user/me")).await?)
    }

    async fn register(&self, input: RegisterInput) -> Result<(), UserError> {
        let request = ApiRequest::post("/user/register").skip_auth().json(&input)?;
        self.client.send_empty(request).await?;
        info!(username = %input.username, "registered");
        Ok(())
    }

    async fn update_profile(&self, update: ProfileUpdate) -> Result<(), UserError> {
        let request = ApiRequest::put("/user/me").json(&update)?;
        self.client.send_empty(request).await?;
        Ok(())
    }

    async fn change_username(&self, username: &str) -> Result<(), UserError> {
        let request = ApiRequest::put("/user/me/username").json(&UsernameBody { username })?;
        self.client.send_empty(request).await?;
        Ok(())
    }

    async fn change_email(&self, email: &str) -> Result<(), UserError> {
        let request = ApiRequest::put("/user/me/email").json(&EmailBody { email })?;
        self.client.send_empty(request).await?;
        Ok(())
    }

    async fn change_password(&self, input: ChangePasswordInput) -> Result<(), UserError> {
        let request = ApiRequest::post("/user/me/change_password").json(&input)?;
        self.client
            .send_empty(request)
            .await
            .map_err(password_rejected)?;
        self.session.forget_credentials().await?;
        info!("password changed");
        Ok(())
    }

    async fn change_address(&self, address: Address) -> Result<(), UserError> {
        let request = ApiRequest::put("/user/me/address").json(&address)?;
        self.client.send_empty(request).await?;
        Ok(())
    }

    async fn delete_account(&self, password: &str) -> Result<(), UserError> {
        let request = ApiRequest::patch("/user/me").json(&PasswordBody { password })?;
        self.client
            .send_empty(request)
            .await
            .map_err(password_rejected)?;
        self.client.clear_credentials().await?;
        self.session.set_logged_in(false).await?;
        self.session.forget_credentials().await?;
        warn!("account deleted");
        Ok(())
    }
}
