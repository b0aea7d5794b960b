//! Failure taxonomy of the data-access layer and the planner form.

use reqwest::StatusCode;
use shared::error::{ApiError, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid api base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Http failure during request for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to decode response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Http failure response for {url}: {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("invalid form: {0}")]
    InvalidForm(String),
    #[error("unknown form field '{0}'")]
    UnknownField(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn to_api_error(&self) -> ApiError {
        let kind = match self {
            ClientError::Transport { .. } => ErrorKind::Transport,
            ClientError::Status { .. } => ErrorKind::Http,
            ClientError::Decode { .. } => ErrorKind::Decode,
            ClientError::InvalidBaseUrl { .. }
            | ClientError::InvalidForm(_)
            | ClientError::UnknownField(_) => ErrorKind::Validation,
        };
        let mut api_error = ApiError::new(kind, self.to_string());
        if let Some(status) = self.status() {
            api_error = api_error.with_status(status.as_u16());
        }
        match self {
            ClientError::Transport { url, .. }
            | ClientError::Decode { url, .. }
            | ClientError::Status { url, .. }
            | ClientError::InvalidBaseUrl { url, .. } => api_error.with_url(url.clone()),
            _ => api_error,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
