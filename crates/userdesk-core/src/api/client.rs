//! API client for the remote users collection.
//!
//! `ApiClient` issues the five CRUD requests as JSON over HTTP and maps
//! non-2xx responses onto `ApiError`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{ApiError, UserApi};
use crate::models::{CreatePayload, UpdatePayload, UserRecord};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Collection path below the base URL.
const USERS_PATH: &str = "users";

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay for rate limiting, doubled after each retry.
const INITIAL_BACKOFF: Duration = Duration::from_millis(1000);

/// API client for the users collection.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    initial_backoff: Duration,
}

impl ApiClient {
    /// Create a client for `base_url` with the default timeout
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            initial_backoff: INITIAL_BACKOFF,
        })
    }

    /// Replace the first 429 backoff delay. Later delays still double.
    pub fn with_rate_limit_backoff(mut self, initial: Duration) -> Self {
        self.initial_backoff = initial;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/users` or `{base}/users/{id}`, with the id encoded as one segment.
    fn endpoint(&self, id: Option<&str>) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().push(USERS_PATH);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(Some(response))
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Ok(None)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send a request, backing off and retrying on 429.
    /// `build` is called once per attempt since a RequestBuilder is consumed by send.
    async fn send(
        &self,
        method: &Method,
        url: &Url,
        build: impl Fn(RequestBuilder) -> RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            debug!(method = %method, url = %url, "Sending request");
            let request = build(self.client.request(method.clone(), url.clone()));
            let response = request.send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(
                        url = %url,
                        retry = retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "Rate limited, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn parse_json<T: DeserializeOwned>(url: &Url, response: reqwest::Response) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(url = %url, error = %e, "Failed to parse JSON response");
            ApiError::InvalidResponse(format!("{}: {}", e, ApiError::truncate_body(&text)))
        })
    }
}

#[async_trait]
impl UserApi for ApiClient {
    async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        let url = self.endpoint(None)?;
        let response = self.send(&Method::GET, &url, |req| req).await?;
        let users: Vec<UserRecord> = Self::parse_json(&url, response).await?;
        debug!(count = users.len(), "Fetched user list");
        Ok(users)
    }

    async fn get_user(&self, id: &str) -> Result<UserRecord, ApiError> {
        let url = self.endpoint(Some(id))?;
        let response = self.send(&Method::GET, &url, |req| req).await?;
        Self::parse_json(&url, response).await
    }

    async fn create_user(&self, payload: &CreatePayload) -> Result<UserRecord, ApiError> {
        let url = self.endpoint(None)?;
        let response = self.send(&Method::POST, &url, |req| req.json(payload)).await?;
        let user: UserRecord = Self::parse_json(&url, response).await?;
        debug!(id = %user.id, "Created user");
        Ok(user)
    }

    async fn update_user(&self, payload: &UpdatePayload) -> Result<UserRecord, ApiError> {
        let url = self.endpoint(Some(payload.id()))?;
        let response = self
            .send(&Method::PUT, &url, |req| req.json(payload.user()))
            .await?;
        Self::parse_json(&url, response).await
    }

    async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(Some(id))?;
        match self.send(&Method::DELETE, &url, |req| req).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!(id = id, "User already absent, treating delete as done");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
