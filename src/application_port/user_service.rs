use crate::api::ClientError;
use crate::domain_model::{Address, ChangePasswordInput, ProfileUpdate, RegisterInput, UserProfile};
use crate::domain_port::StoreError;
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("password is incorrect")]
    WrongPassword,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("api error: {0}")]
    Api(ClientError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<ClientError> for UserError {
    fn from(error: ClientError) -> Self {
        match &error {
            ClientError::Status {
                status: StatusCode::CONFLICT,
                detail,
            } => UserError::Conflict(detail.clone().unwrap_or_else(|| "already exists".into())),
            _ => UserError::Api(error),
        }
    }
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn me(&self) -> Result<UserProfile, UserError>;
    async fn register(&self, input: RegisterInput) -> Result<(), UserError>;
    async fn update_profile(&self, update: ProfileUpdate) -> Result<(), UserError>;
    async fn change_username(&self, username: &str) -> Result<(), UserError>;
    async fn change_email(&self, email: &str) -> Result<(), UserError>;
    async fn change_password(&self, input: ChangePasswordInput) -> Result<(), UserError>;
    async fn change_address(&self, address: Address) -> Result<(), UserError>;
    /// Deletes the account and the local session.
    async fn delete_account(&self, password: &str) -> Result<(), UserError>;
}
