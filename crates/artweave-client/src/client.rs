// JSON-over-HTTP request client for the ArtWeave API.
//
// One attempt per call. The whole exchange (send + body read) runs under a
// timeout; when it fires the in-flight future is dropped, which cancels the
// request, and the caller gets `ApiError::Timeout`.

use std::time::Duration;

use artweave_core::config::{ApiConfig, DEFAULT_TIMEOUT_MS};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ApiError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(DEFAULT_TIMEOUT_MS);

// ---------------------------------------------------------------------------
// RequestOptions
// ---------------------------------------------------------------------------

/// Method, headers, query and body for a single request. Defaults to a bare
/// `GET`.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// Merged over the default `Content-Type: application/json`; entries here
    /// win.
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    /// `POST` with `body` serialized as JSON.
    pub fn post_json<B: Serialize>(body: &B) -> Result<Self, ApiError> {
        Ok(Self {
            method: Method::POST,
            body: Some(serde_json::to_string(body)?),
            ..Self::default()
        })
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// Request client bound to an (optional) API base URL.
///
/// A client without a base URL can be built freely; every request on it fails
/// with [`ApiError::MissingBaseUrl`] before touching the network.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Option<String>,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url
                .map(|u| u.trim().trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
            timeout,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.base_url.clone(), config.timeout())
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue a request using the client's configured timeout.
    pub async fn request<T>(&self, path: &str, options: RequestOptions) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Default,
    {
        self.request_with_timeout(path, options, self.timeout).await
    }

    /// Issue a request against `base_url + path`.
    ///
    /// - no base URL: [`ApiError::MissingBaseUrl`], nothing is sent
    /// - `timeout` elapses: request cancelled, [`ApiError::Timeout`]
    /// - non-2xx: [`ApiError::Http`] carrying the status and body text
    /// - 204: `T::default()`, body not parsed
    /// - otherwise the body is decoded as JSON into `T`
    pub async fn request_with_timeout<T>(
        &self,
        path: &str,
        options: RequestOptions,
        timeout: Duration,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Default,
    {
        let Some(base) = self.base_url.as_deref() else {
            warn!(path, "request rejected: API base URL not configured");
            return Err(ApiError::MissingBaseUrl);
        };
        let url = format!("{base}{path}");
        let method = options.method.clone();
        debug!(%method, %url, ?timeout, "sending API request");

        let (status, body) = match tokio::time::timeout(timeout, self.exchange(&url, options)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                warn!(%method, %url, error = %e, "API request failed");
                return Err(e);
            }
            Err(_elapsed) => {
                warn!(%method, %url, ?timeout, "API request timed out");
                return Err(ApiError::Timeout(timeout));
            }
        };

        debug!(%method, %url, status = status.as_u16(), bytes = body.len(), "API response");
        decode_body(status, body).inspect_err(|e| {
            warn!(%method, %url, status = status.as_u16(), error = %e, "API request failed");
        })
    }

    /// Send the request and read the full body as text.
    async fn exchange(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<(StatusCode, String), ApiError> {
        let mut builder = self
            .http
            .request(options.method, url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .headers(options.headers);
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(body) = options.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

/// Classify a completed response.
pub(crate) fn decode_body<T>(status: StatusCode, body: String) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if !status.is_success() {
        return Err(ApiError::http(status.as_u16(), body));
    }
    if status == StatusCode::NO_CONTENT {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(&body)?)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
