use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use shared::{domain::InvestmentId, protocol::Investment};
use tracing::debug;
use url::Url;

pub mod config;
pub mod error;
pub mod form;
pub mod planner;

pub use config::{load_settings, Settings};
pub use error::{ClientError, Result};
pub use form::{FormField, InvestmentForm, StartDate};
pub use planner::{ActionOutcome, InvestmentPlanner, PlannerEvent, PlannerState};

const LIST_PATH: &str = "get-all-investments";
const GET_BY_ID_PATH: &str = "get-Investment-by-id";
const CREATE_PATH: &str = "create-investment";
const UPDATE_PATH: &str = "update-investment";
const DELETE_PATH: &str = "delete-Investment";

/// The five backend operations the planner depends on.
#[async_trait]
pub trait InvestmentApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Investment>>;
    async fn get_by_id(&self, id: InvestmentId) -> Result<Investment>;
    /// Resolves with whatever body the backend returned.
    async fn create(&self, investment: &Investment) -> Result<Value>;
    async fn update(&self, investment: &Investment) -> Result<Value>;
    /// `None` when the backend answers with an empty body.
    async fn delete_by_id(&self, id: InvestmentId) -> Result<Option<Value>>;
}

/// reqwest-backed [`InvestmentApi`] over a fixed base url.
#[derive(Debug, Clone)]
pub struct InvestmentClient {
    http: Client,
    base_url: Url,
}

impl InvestmentClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_http_client(Client::new(), base_url)
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.api_url)
    }

    pub fn with_http_client(http: Client, base_url: &str) -> Result<Self> {
        let mut parsed = Url::parse(base_url.trim()).map_err(|source| {
            ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                source,
            }
        })?;
        // Endpoint paths are joined relative to the base, which needs a
        // trailing slash to keep any path prefix.
        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }
        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|source| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                source,
            })
    }

    fn endpoint_with_id(&self, path: &str, id: InvestmentId) -> Result<Url> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut().append_pair("id", &id.to_string());
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status {
            url: url.to_string(),
            status,
            body,
        })
    }

    async fn read_optional_body(response: Response, url: &Url) -> Result<Option<Value>> {
        let text = response
            .text()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        // Non-JSON bodies are handed back verbatim.
        Ok(Some(
            serde_json::from_str(&text).unwrap_or(Value::String(text)),
        ))
    }
}

#[async_trait]
impl InvestmentApi for InvestmentClient {
    async fn list(&self) -> Result<Vec<Investment>> {
        let url = self.endpoint(LIST_PATH)?;
        debug!(method = "GET", %url, "investment request");
        self.send(self.http.get(url.clone()), &url)
            .await?
            .json()
            .await
            .map_err(|source| ClientError::Decode {
                url: url.to_string(),
                source,
            })
    }

    async fn get_by_id(&self, id: InvestmentId) -> Result<Investment> {
        let url = self.endpoint_with_id(GET_BY_ID_PATH, id)?;
        debug!(method = "GET", %url, "investment request");
        self.send(self.http.get(url.clone()), &url)
            .await?
            .json()
            .await
            .map_err(|source| ClientError::Decode {
                url: url.to_string(),
                source,
            })
    }

    async fn create(&self, investment: &Investment) -> Result<Value> {
        let url = self.endpoint(CREATE_PATH)?;
        debug!(method = "POST", %url, "investment request");
        let response = self
            .send(self.http.post(url.clone()).json(investment), &url)
            .await?;
        Ok(Self::read_optional_body(response, &url)
            .await?
            .unwrap_or(Value::Null))
    }

    async fn update(&self, investment: &Investment) -> Result<Value> {
        let url = self.endpoint(UPDATE_PATH)?;
        debug!(method = "PUT", %url, "investment request");
        let response = self
            .send(self.http.put(url.clone()).json(investment), &url)
            .await?;
        Ok(Self::read_optional_body(response, &url)
            .await?
            .unwrap_or(Value::Null))
    }

    async fn delete_by_id(&self, id: InvestmentId) -> Result<Option<Value>> {
        let url = self.endpoint_with_id(DELETE_PATH, id)?;
        debug!(method = "DELETE", %url, "investment request");
        let response = self.send(self.http.delete(url.clone()), &url).await?;
        Self::read_optional_body(response, &url).await
    }
}

#[cfg(test)]
#[path = "tests/mock_backend.rs"]
mod mock_backend;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
