use crate::application_port::*;
use crate::domain_model::Language;
use crate::logger::*;
use reqwest::Url;
use std::time::Duration;

/// Fetches static documents. The static host needs neither fingerprint nor
/// auth, so this bypasses [`ApiClient`](crate::api::ApiClient).
pub struct HttpTermsService {
    http: reqwest::Client,
    static_base_url: String,
}

impl HttpTermsService {
    pub fn new(static_base_url: impl Into<String>, timeout: Duration) -> Result<Self, TermsError> {
        let static_base_url = static_base_url.into().trim_end_matches('/').to_string();
        Url::parse(&static_base_url)
            .map_err(|e| TermsError::InvalidUrl(format!("{}: {}", static_base_url, e)))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            static_base_url,
        })
    }
}

#[async_trait::async_trait]
impl TermsService for HttpTermsService {
    async fn terms(&self, language: Language) -> Result<String, TermsError> {
        let raw = format!("{}{}", self.static_base_url, language.terms_path());
        let url = Url::parse(&raw).map_err(|e| TermsError::InvalidUrl(format!("{}: {}", raw, e)))?;
        debug!(%url, "fetching terms");
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(TermsError::Status(response.status()));
        }
        Ok(response.text().await?)
    }
}
