use crate::domain_model::Language;
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum TermsError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("terms unavailable: {0}")]
    Status(StatusCode),
}

#[async_trait::async_trait]
pub trait TermsService: Send + Sync {
    /// Terms and conditions as markdown.
    async fn terms(&self, language: Language) -> Result<String, TermsError>;
}
