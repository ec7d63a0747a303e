use crate::domain_port::StoreError;
use reqwest::StatusCode;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("token refresh failed: {0}")]
    Refresh(#[from] RefreshError),
    #[error("credential store: {0}")]
    Store(#[from] StoreError),
    #[error("cannot encode request body: {0}")]
    Encode(String),
    #[error("cannot decode response body: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Refresh(RefreshError::Rejected { status, .. }) => {
                StatusCode::from_u16(*status).ok()
            }
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

/// Outcome shared by every caller waiting on one refresh, hence `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    #[error("no refresh token stored")]
    MissingRefreshToken,
    #[error("refresh rejected with status {status}")]
    Rejected { status: u16, detail: Option<String> },
    #[error("refresh transport error: {0}")]
    Transport(String),
    #[error("refresh timed out after {0:?}")]
    Timeout(Duration),
    #[error("refresh abandoned before completion")]
    Abandoned,
    #[error("credential store: {0}")]
    Store(String),
    #[error("invalid refresh response: {0}")]
    InvalidResponse(String),
}

impl From<StoreError> for RefreshError {
    fn from(error: StoreError) -> Self {
        RefreshError::Store(error.to_string())
    }
}
