// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rate-limit aware GET primitive for the Strava API.
//!
//! Handles:
//! - Bearer authentication with a caller-supplied token
//! - Retry with a fixed per-endpoint-class delay on 429
//! - Classification of every other failure (no retry)
//! - Optional memoization of successful payloads

use crate::error::FetchError;
use crate::services::cache::{CacheKey, ResponseCache};
use futures_util::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default Strava API base URL.
pub const STRAVA_API_URL: &str = "https://www.strava.com/api/v3";

const RATE_LIMIT_STATUS: u16 = 429;
const OK_STATUS: u16 = 200;

/// Strava bearer token. Passed explicitly into every call, never stored globally.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Endpoint class, which selects the delay between rate-limited attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointClass {
    /// Profile, stats and activity listing.
    Standard,
    /// Per-activity streams; more rate-limit sensitive upstream.
    Stream,
}

/// A single GET against the API, relative to the transport's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub class: EndpointClass,
}

impl ApiRequest {
    pub fn standard(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            class: EndpointClass::Standard,
        }
    }

    pub fn stream(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            class: EndpointClass::Stream,
        }
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Query value for `key`, if present.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Issues one HTTP GET. Implementations must not retry.
pub trait HttpTransport: Send + Sync {
    fn get<'a>(
        &'a self,
        token: &'a AccessToken,
        request: &'a ApiRequest,
    ) -> BoxFuture<'a, Result<RawResponse, FetchError>>;
}

/// Production transport backed by reqwest.
#[derive(Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(STRAVA_API_URL)
    }
}

impl HttpTransport for ReqwestTransport {
    fn get<'a>(
        &'a self,
        token: &'a AccessToken,
        request: &'a ApiRequest,
    ) -> BoxFuture<'a, Result<RawResponse, FetchError>> {
        Box::pin(async move {
            let url = format!("{}{}", self.base_url, request.path);
            let transport_error = |e: reqwest::Error| FetchError::Transport {
                endpoint: request.path.clone(),
                reason: e.to_string(),
            };

            let response = self
                .http
                .get(&url)
                .bearer_auth(token.as_str())
                .query(&request.query)
                .send()
                .await
                .map_err(transport_error)?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(transport_error)?;
            Ok(RawResponse { status, body })
        })
    }
}

/// Retry budget and delays for rate-limited responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub standard_delay: Duration,
    pub stream_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            standard_delay: Duration::from_secs(10),
            stream_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Same budget, no waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            standard_delay: Duration::ZERO,
            stream_delay: Duration::ZERO,
        }
    }

    pub fn delay_for(&self, class: EndpointClass) -> Duration {
        match class {
            EndpointClass::Standard => self.standard_delay,
            EndpointClass::Stream => self.stream_delay,
        }
    }
}

/// Retrying fetcher shared by every retrieval operation.
#[derive(Clone)]
pub struct RateLimitedFetcher {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
    cache: Option<ResponseCache>,
}

impl RateLimitedFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            cache: None,
        }
    }

    /// Memoize successful payloads in `cache`.
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Issue `request` and return its decoded JSON body.
    ///
    /// An empty 200 body decodes to `Value::Null`.
    pub async fn fetch(
        &self,
        token: &AccessToken,
        request: &ApiRequest,
    ) -> Result<Value, FetchError> {
        let key = self
            .cache
            .as_ref()
            .map(|_| CacheKey::new(token.as_str(), &request.path, &request.query));

        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(payload) = cache.get(key) {
                tracing::debug!(endpoint = %request.path, "Serving cached Strava payload");
                return Ok(payload);
            }
        }

        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let response = self.transport.get(token, request).await?;

            match response.status {
                OK_STATUS => {
                    let payload = decode_body(&request.path, &response.body)?;
                    if let (Some(cache), Some(key)) = (&self.cache, key) {
                        cache.insert(key, payload.clone());
                    }
                    return Ok(payload);
                }
                RATE_LIMIT_STATUS => {
                    if attempt >= max_attempts {
                        tracing::warn!(
                            endpoint = %request.path,
                            attempts = attempt,
                            "Strava rate limit hit (429), retry budget exhausted"
                        );
                        return Err(FetchError::RateLimitExceeded {
                            endpoint: request.path.clone(),
                            attempts: attempt,
                        });
                    }

                    let delay = self.policy.delay_for(request.class);
                    tracing::warn!(
                        endpoint = %request.path,
                        attempt,
                        max_attempts,
                        delay_secs = delay.as_secs(),
                        "Strava rate limit hit (429), retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                status => {
                    tracing::warn!(endpoint = %request.path, status, "Strava request failed");
                    return Err(FetchError::Upstream {
                        endpoint: request.path.clone(),
                        status,
                        body: response.body,
                    });
                }
            }
        }
    }
}

fn decode_body(endpoint: &str, body: &str) -> Result<Value, FetchError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| FetchError::InvalidPayload {
        endpoint: endpoint.to_string(),
        reason: format!("JSON parse error: {}", e),
    })
}

/// Decode a fetched payload into `T`, tagging failures with the endpoint.
pub fn decode_payload<T: serde::de::DeserializeOwned>(
    endpoint: &str,
    payload: Value,
) -> Result<T, FetchError> {
    serde_json::from_value(payload).map_err(|e| FetchError::InvalidPayload {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

/// `null`, `{}` and `[]` carry no data.
pub fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_matches_strava_limits() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(
            policy.delay_for(EndpointClass::Standard),
            Duration::from_secs(10)
        );
        assert_eq!(
            policy.delay_for(EndpointClass::Stream),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("secret-value");
        assert!(!format!("{:?}", token).contains("secret-value"));
    }

    #[test]
    fn test_decode_body_empty_is_null() {
        assert_eq!(decode_body("/athlete", "").unwrap(), Value::Null);
        assert_eq!(decode_body("/athlete", "  \n").unwrap(), Value::Null);
    }

    #[test]
    fn test_decode_body_rejects_garbage() {
        let err = decode_body("/athlete", "<html>").unwrap_err();
        assert!(matches!(err, FetchError::InvalidPayload { .. }));
        assert_eq!(err.endpoint(), "/athlete");
    }

    #[test]
    fn test_is_empty_payload() {
        assert!(is_empty_payload(&Value::Null));
        assert!(is_empty_payload(&serde_json::json!({})));
        assert!(is_empty_payload(&serde_json::json!([])));
        assert!(!is_empty_payload(&serde_json::json!({"id": 1})));
    }

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::stream("/activities/7/streams")
            .with_query("keys", "latlng")
            .with_query("key_by_type", true);
        assert_eq!(request.class, EndpointClass::Stream);
        assert_eq!(request.query_value("keys"), Some("latlng"));
        assert_eq!(request.query_value("key_by_type"), Some("true"));
        assert_eq!(request.query_value("page"), None);
    }
}
