use crate::api::{ApiRequest, ClientError, RefreshCoordinator, RefreshError};
use crate::domain_model::{AccessToken, TokenPair, storage_key};
use crate::domain_port::KeyValueStore;
use crate::fingerprint::Fingerprinter;
use crate::logger::*;
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

pub const APPLICATION_ID_HEADER: &str = "application-id";
pub const REFRESH_TOKEN_PATH: &str = "/auth/refresh-token";

#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// e.g. `https://theactivitymaster.de/api/v1`; request paths are appended.
    pub base_url: String,
    pub request_timeout: Duration,
    pub refresh_timeout: Duration,
}

impl ApiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(30),
            refresh_timeout: Duration::from_secs(15),
        }
    }
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    refresh_timeout: Duration,
    secure_store: Arc<dyn KeyValueStore>,
    fingerprinter: Arc<Fingerprinter>,
    refresh: RefreshCoordinator,
}

/// HTTP client for the backend API.
///
/// Every request carries the device fingerprint. Requests that are not
/// `skip_auth` carry the stored access token, and on a 401 they are replayed
/// once after a single-flight token refresh.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    pub fn new(
        config: ApiClientConfig,
        secure_store: Arc<dyn KeyValueStore>,
        fingerprinter: Arc<Fingerprinter>,
    ) -> Result<Self, ClientError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                refresh_timeout: config.refresh_timeout,
                secure_store,
                fingerprinter,
                refresh: RefreshCoordinator::new(),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    /// Sends `request`, returning the response only for 2xx statuses.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn send(&self, mut request: ApiRequest) -> Result<Response, ClientError> {
        let sent_with = if request.skip_auth {
            None
        } else {
            self.access_token().await?
        };
        let response = self.dispatch(&request, sent_with.as_ref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED || request.skip_auth || request.retried {
            return check_status(response).await;
        }

        request.retried = true;
        let unauthorized = status_error(response).await;
        debug!("access token rejected");

        let fresh = match self
            .inner
            .refresh
            .refreshed_token(sent_with.as_ref(), move || self.refresh_credentials())
            .await
        {
            Ok(token) => token,
            Err(RefreshError::MissingRefreshToken) => return Err(unauthorized),
            Err(e) => return Err(e.into()),
        };

        debug!("replaying with refreshed token");
        let response = self.dispatch(&request, Some(&fresh)).await?;
        check_status(response).await
    }

    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub async fn send_empty(&self, request: ApiRequest) -> Result<(), ClientError> {
        self.send(request).await?;
        Ok(())
    }

    pub async fn access_token(&self) -> Result<Option<AccessToken>, ClientError> {
        let token = self
            .inner
            .secure_store
            .load(storage_key::ACCESS_TOKEN)
            .await?;
        Ok(token.map(AccessToken))
    }

    pub async fn store_credentials(&self, tokens: &TokenPair) -> Result<(), ClientError> {
        self.persist(tokens).await?;
        self.inner.refresh.reset();
        Ok(())
    }

    /// Removes both tokens. Missing keys are fine.
    pub async fn clear_credentials(&self) -> Result<(), ClientError> {
        self.inner.refresh.reset();
        let store = &self.inner.secure_store;
        store.remove(storage_key::ACCESS_TOKEN).await?;
        store.remove(storage_key::REFRESH_TOKEN).await?;
        Ok(())
    }

    async fn persist(&self, tokens: &TokenPair) -> Result<(), ClientError> {
        let store = &self.inner.secure_store;
        store
            .save(storage_key::ACCESS_TOKEN, tokens.access_token.as_str())
            .await?;
        store
            .save(storage_key::REFRESH_TOKEN, tokens.refresh_token.as_str())
            .await?;
        Ok(())
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        let raw = format!("{}{}", self.inner.base_url, path);
        Url::parse(&raw).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<Response, ClientError> {
        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), self.url(&request.path)?)
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        match self.inner.fingerprinter.fingerprint().await {
            Ok(fingerprint) => builder = builder.header(APPLICATION_ID_HEADER, fingerprint),
            Err(e) => warn!(error = %e, "fingerprint unavailable, sending without application-id"),
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        Ok(builder.send().await?)
    }

    #[instrument(skip(self))]
    async fn refresh_credentials(&self) -> Result<AccessToken, RefreshError> {
        let timeout = self.inner.refresh_timeout;
        let outcome = match tokio::time::timeout(timeout, self.request_new_tokens()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(RefreshError::Timeout(timeout)),
        };
        match outcome {
            Ok(tokens) => {
                self.persist(&tokens)
                    .await
                    .map_err(|e| RefreshError::Store(e.to_string()))?;
                info!("access token refreshed");
                Ok(tokens.access_token)
            }
            Err(RefreshError::MissingRefreshToken) => {
                debug!("no refresh token stored, not refreshing");
                Err(RefreshError::MissingRefreshToken)
            }
            Err(e @ RefreshError::Store(_)) => {
                error!(error = %e, "cannot read refresh token, keeping credentials");
                Err(e)
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed, clearing credentials");
                if let Err(clear) = self.clear_credentials().await {
                    error!(error = %clear, "failed to clear credentials");
                }
                Err(e)
            }
        }
    }

    async fn request_new_tokens(&self) -> Result<TokenPair, RefreshError> {
        let refresh_token = self
            .inner
            .secure_store
            .load(storage_key::REFRESH_TOKEN)
            .await?
            .ok_or(RefreshError::MissingRefreshToken)?;
        let request = ApiRequest::post(REFRESH_TOKEN_PATH)
            .bearer(&refresh_token)
            .map_err(|e| RefreshError::InvalidResponse(e.to_string()))?;
        let response = self
            .dispatch(&request, None)
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let detail = read_detail(response).await;
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }
        response
            .json::<TokenPair>()
            .await
            .map_err(|e| RefreshError::InvalidResponse(e.to_string()))
    }
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(status_error(response).await)
    }
}

async fn status_error(response: Response) -> ClientError {
    let status = response.status();
    let detail = read_detail(response).await;
    ClientError::Status { status, detail }
}

/// FastAPI-style `{"detail": ...}` bodies, falling back to the raw text.
async fn read_detail(response: Response) -> Option<String> {
    let text = response.text().await.ok()?;
    if text.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(serde_json::Value::Object(mut body)) => match body.remove("detail") {
            Some(serde_json::Value::String(detail)) => Some(detail),
            Some(other) => Some(other.to_string()),
            None => Some(text),
        },
        _ => Some(text),
    }
}
