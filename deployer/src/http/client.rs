//! HTTP client implementation

use std::time::Duration;

use reqwest::{
    header::{self, HeaderValue},
    Client, RequestBuilder, StatusCode,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::errors::{DeployError, ValidationError};

/// HTTP client for the platform REST API and deploy hooks
pub struct HttpClient {
    client: Client,
    base_url: Url,
    authorization: Option<HeaderValue>,
}

/// Status and raw body of a completed request.
///
/// Callers decide which status counts as success.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Error message reported by the API, falling back to the raw body
    pub fn error_message(&self) -> String {
        #[derive(serde::Deserialize)]
        struct ErrorBody {
            message: Option<String>,
        }

        match serde_json::from_str::<ErrorBody>(&self.body) {
            Ok(ErrorBody {
                message: Some(message),
            }) => message,
            _ => self.body.trim().to_string(),
        }
    }
}

impl HttpClient {
    /// Create a new HTTP client without credentials
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DeployError> {
        let base_url = Url::parse(base_url.trim())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ValidationError::InvalidApiBaseUrl(base_url.to_string()))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("render-deployer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            authorization: None,
        })
    }

    /// Create a new HTTP client that sends `api_key` as a bearer token
    pub fn with_api_key(
        base_url: &str,
        timeout: Duration,
        api_key: &SecretString,
    ) -> Result<Self, DeployError> {
        let mut authorization =
            HeaderValue::try_from(format!("Bearer {}", api_key.expose_secret()))
                .map_err(|_| ValidationError::InvalidApiKey)?;
        authorization.set_sensitive(true);

        let mut client = Self::new(base_url, timeout)?;
        client.authorization = Some(authorization);
        Ok(client)
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL extended with `segments`, each percent-encoded as a single path segment
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // checked in `new`: the base URL can carry a path
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(header::ACCEPT, "application/json");
        match &self.authorization {
            Some(value) => request.header(header::AUTHORIZATION, value.clone()),
            None => request,
        }
    }

    /// Make an authenticated GET request to an API endpoint
    pub async fn get(&self, segments: &[&str]) -> Result<ApiResponse, reqwest::Error> {
        let url = self.endpoint(segments);
        debug!("GET {}", url);

        let request = self.authorize(self.client.get(url));
        Self::send(request, "GET").await
    }

    /// Make an authenticated POST request with a JSON body to an API endpoint
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<ApiResponse, reqwest::Error> {
        let url = self.endpoint(segments);
        debug!("POST {}", url);

        let request = self.authorize(self.client.post(url)).json(body);
        Self::send(request, "POST").await
    }

    /// Make an unauthenticated GET request to an absolute URL
    pub async fn get_url(&self, url: &Url) -> Result<ApiResponse, reqwest::Error> {
        debug!("GET {}", redact_query(url));

        let request = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json");
        Self::send(request, "GET").await
    }

    /// Errors come back without their URL, which may carry a hook secret
    async fn send(request: RequestBuilder, method: &str) -> Result<ApiResponse, reqwest::Error> {
        let response = request.send().await.map_err(|e| {
            let e = e.without_url();
            error!("HTTP {} failed: {}", method, e);
            e
        })?;

        let status = response.status();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        if !status.is_success() {
            error!("HTTP {} failed: {} - {}", method, status, body);
        }

        Ok(ApiResponse { status, body })
    }
}

/// Drop the query string so hook secrets stay out of the logs
fn redact_query(url: &Url) -> &str {
    let raw = url.as_str();
    raw.split_once('?').map_or(raw, |(base, _)| base)
}
