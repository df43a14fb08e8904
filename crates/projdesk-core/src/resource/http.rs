//! JSON REST provider
//!
//! Speaks the simple-rest convention:
//! - `GET    {base}/{resource}/{id}`
//! - `PATCH  {base}/{resource}/{id}`
//! - `GET    {base}/{resource}?_start=&_end=` with the total in `x-total-count`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::{ListPage, Pagination, ResourceProvider};
use crate::config::ApiConfig;
use crate::error::{Error, Result};

/// Header carrying the total record count of a list response
const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP resource provider
#[derive(Clone)]
pub struct HttpProvider {
    http_client: HttpClient,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("base_url", &self.base_url)
            .field("token", &self.token.is_some())
            .finish()
    }
}

/// Builder for creating an HttpProvider
#[derive(Default)]
pub struct HttpProviderBuilder {
    base_url: Option<String>,
    token: Option<String>,
    timeout_secs: Option<u64>,
}

impl HttpProviderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the bearer token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Build the HttpProvider
    pub fn build(self) -> Result<HttpProvider> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::ConfigError("API base URL is required".to_string()))?;

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(
                self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .build()
            .map_err(Error::NetworkError)?;

        Ok(HttpProvider {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: self.token,
        })
    }
}

impl HttpProvider {
    pub fn builder() -> HttpProviderBuilder {
        HttpProviderBuilder::new()
    }

    /// Create a provider from the `[api]` configuration section
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let mut builder = Self::builder()
            .base_url(config.resolved_base_url())
            .timeout_secs(config.timeout_secs);
        let token = config
            .resolved_token()
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        if let Some(token) = token {
            builder = builder.token(token);
        }
        builder.build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn record_url(&self, resource: &str, id: i64) -> String {
        format!("{}/{}/{}", self.base_url, resource, id)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        request.send().await.map_err(Error::NetworkError)
    }

    /// Map a non-success response to an error
    async fn check(&self, response: Response, resource: &str, id: Option<i64>) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body, status);
        debug!(status = status.as_u16(), %message, "Request failed");

        Err(match (status.as_u16(), id) {
            (404, Some(id)) => Error::RecordNotFound {
                resource: resource.to_string(),
                id,
            },
            (401 | 403, _) => Error::Unauthorized(message),
            (400 | 422, _) => Error::Rejected(message),
            (code, _) => Error::Api {
                status: code,
                message,
            },
        })
    }
}

#[async_trait]
impl ResourceProvider for HttpProvider {
    async fn get_one(&self, resource: &str, id: i64) -> Result<Value> {
        let url = self.record_url(resource, id);
        debug!(%url, "Fetching record");

        let response = self.send(self.http_client.get(&url)).await?;
        let response = self.check(response, resource, Some(id)).await?;
        Ok(response.json().await?)
    }

    async fn update(&self, resource: &str, id: i64, patch: Value) -> Result<Value> {
        let url = self.record_url(resource, id);
        debug!(%url, "Updating record");

        let response = self.send(self.http_client.patch(&url).json(&patch)).await?;
        let response = self.check(response, resource, Some(id)).await?;
        Ok(response.json().await?)
    }

    async fn get_list(&self, resource: &str, pagination: Pagination) -> Result<ListPage> {
        let url = format!("{}/{}", self.base_url, resource);
        let (start, end) = pagination.range();
        debug!(%url, start, end, "Listing records");

        let request = self
            .http_client
            .get(&url)
            .query(&[("_start", start), ("_end", end)]);
        let response = self.send(request).await?;
        let response = self.check(response, resource, None).await?;

        let header_total = response
            .headers()
            .get(TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<usize>().ok());

        let body: Value = response.json().await?;
        let (items, body_total) = match body {
            Value::Array(items) => (items, None),
            Value::Object(mut object) => {
                let total = object
                    .get("total")
                    .and_then(Value::as_u64)
                    .map(|t| t as usize);
                let items = match object.remove("data") {
                    Some(Value::Array(items)) => items,
                    _ => {
                        return Err(Error::Api {
                            status: 200,
                            message: "list response has no data array".to_string(),
                        });
                    }
                };
                (items, total)
            }
            _ => {
                return Err(Error::Api {
                    status: 200,
                    message: "list response is not an array".to_string(),
                });
            }
        };

        let total = header_total.or(body_total).unwrap_or(items.len());
        Ok(ListPage { items, total })
    }
}

/// Pull a human-readable message out of an error body
///
/// Understands `{"message": ...}` and `{"detail": ...}` bodies, where
/// `detail` may be a string or a list of `{"msg": ...}` entries.
fn error_message(body: &str, status: StatusCode) -> String {
    let fallback = || {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            trimmed.to_string()
        }
    };

    let Ok(Value::Object(object)) = serde_json::from_str::<Value>(body) else {
        return fallback();
    };

    if let Some(Value::String(message)) = object.get("message") {
        return message.clone();
    }
    match object.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Array(entries)) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|e| e.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                fallback()
            } else {
                messages.join("; ")
            }
        }
        _ => fallback(),
    }
}
