// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP transport for the Courier backend API.
//!
//! Provides [`ApiClient`] which handles authentication headers, the
//! `{error}` envelope on non-2xx responses, and bounded retry with
//! exponential backoff for idempotent reads. Writes are never retried here:
//! `send` is not guaranteed idempotent by the backend, so an automatic
//! resubmission could duplicate a dispatch.

use std::time::Duration;

use courier_core::CourierError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Delay before the first read retry; doubles per attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

/// Upper bound on a single backoff sleep.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Total read attempts, including the first.
const DEFAULT_READ_ATTEMPTS: u32 = 3;

/// Error envelope returned by the backend on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: String,
}

/// HTTP client for the Courier backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    read_attempts: u32,
    retry_base: Duration,
}

impl ApiClient {
    /// Creates a client for `base_url`, attaching `token` as a bearer
    /// credential on every request when present.
    pub fn new(
        base_url: impl Into<String>,
        token: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, CourierError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| CourierError::Config(format!("invalid auth token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| CourierError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            read_attempts: DEFAULT_READ_ATTEMPTS,
            retry_base: RETRY_BASE_DELAY,
        })
    }

    /// Overrides the read retry policy.
    pub fn with_read_retry(mut self, attempts: u32, base: Duration) -> Self {
        self.read_attempts = attempts.max(1);
        self.retry_base = base;
        self
    }

    /// Issues a GET and decodes the JSON body, retrying transport failures
    /// with exponential backoff up to the configured attempt count.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, CourierError> {
        let url = format!("{}{path}", self.base_url);
        let mut last_error = None;

        for attempt in 0..self.read_attempts {
            if attempt > 0 {
                let delay = backoff_delay(self.retry_base, attempt);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    path,
                    "retrying read after transport error"
                );
                tokio::time::sleep(delay).await;
            }

            match self.try_get_json::<T>(&url, query).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt + 1 < self.read_attempts => {
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            CourierError::Internal("read retry loop exhausted without an error".into())
        }))
    }

    async fn try_get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T, CourierError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| CourierError::Transport {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, url, "read response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_response(status, &body));
        }

        let body = response.text().await.map_err(|e| CourierError::Transport {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        serde_json::from_str(&body).map_err(|e| CourierError::Transport {
            message: format!("failed to parse response body: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Issues a POST with a JSON body and decodes the JSON response.
    /// Never retried.
    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, CourierError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| CourierError::Transport {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, url, "write response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_response(status, &body));
        }

        let body = response.text().await.map_err(|e| CourierError::Transport {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        serde_json::from_str(&body).map_err(|e| CourierError::Transport {
            message: format!("failed to parse response body: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Issues a DELETE. Success bodies (204/empty) are discarded. Never
    /// retried.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), CourierError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| CourierError::Transport {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, url, "delete response received");

        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(error_from_response(status, &body))
    }
}

/// Maps a non-2xx response to the error taxonomy. 5xx and 429 are
/// transport-class (retryable for reads); everything else surfaces the
/// backend's decoded reason.
fn error_from_response(status: StatusCode, body: &str) -> CourierError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error)
        .unwrap_or_else(|_| format!("backend returned {status}: {body}"));

    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        CourierError::Transport {
            message,
            source: None,
        }
    } else {
        CourierError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    // attempt >= 1 here; shift is bounded to keep the multiplication sane.
    let factor = 1u32 << (attempt - 1).min(4);
    base.saturating_mul(factor).min(MAX_RETRY_DELAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_client(base_url: &str) -> ApiClient {
        ApiClient::new(base_url, Some("test-token"), Duration::from_secs(5))
            .unwrap()
            .with_read_retry(3, Duration::from_millis(1))
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let base = Duration::from_millis(250);
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(250));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(500));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(1000));
        assert_eq!(backoff_delay(base, 5), MAX_RETRY_DELAY);
    }

    #[tokio::test]
    async fn get_sends_bearer_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let client = fast_client(&server.uri());
        let value: serde_json::Value = client.get_json("/ping", &[]).await.unwrap();
        assert_eq!(value["ok"], true);
    }

    #[tokio::test]
    async fn get_retries_transport_errors_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(serde_json::json!({"error": "upstream unavailable"})),
            )
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": 1})))
            .mount(&server)
            .await;

        let client = fast_client(&server.uri());
        let value: serde_json::Value = client.get_json("/flaky", &[]).await.unwrap();
        assert_eq!(value["ok"], 1);
    }

    #[tokio::test]
    async fn get_does_not_retry_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bad"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "bad request"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = fast_client(&server.uri());
        let err = client
            .get_json::<serde_json::Value>("/bad", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CourierError::Api { status: 400, .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn get_exhausts_retries_and_surfaces_last_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"error": "database offline"})),
            )
            .expect(3)
            .mount(&server)
            .await;

        let client = fast_client(&server.uri());
        let err = client
            .get_json::<serde_json::Value>("/down", &[])
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("database offline"), "got: {err}");
    }

    #[tokio::test]
    async fn post_is_never_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/write"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(serde_json::json!({"error": "try later"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = fast_client(&server.uri());
        let err = client
            .post_json::<_, serde_json::Value>("/write", &serde_json::json!({"x": 1}))
            .await
            .unwrap_err();
        assert!(err.is_retryable(), "still transport-class for the caller: {err:?}");
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/garbled"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), None, Duration::from_secs(5))
            .unwrap()
            .with_read_retry(1, Duration::from_millis(1));
        let err = client
            .get_json::<serde_json::Value>("/garbled", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CourierError::Transport { .. }), "got: {err:?}");
    }
}
