//! Subscan accounts client.
//!
//! Issues the fixed `POST /api/scan/accounts` query and pulls `data.count`
//! out of the reply. Only one row is requested; the count is all we need.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use addr_relay_core::constants::{
    ACCOUNTS_PATH, API_KEY_HEADER, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SUBSCAN_BASE_URL,
};
use addr_relay_core::error::{RelayError, Result};
use addr_relay_core::traits::CountSource;

/// Subscan client configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct SubscanConfig {
    /// Explorer host, e.g. "https://polkadot.api.subscan.io"
    pub base_url: String,
    /// Value sent in the `x-api-key` header
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl SubscanConfig {
    /// Creates config for the default explorer host.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_SUBSCAN_BASE_URL.into(),
            api_key: api_key.into(),
            timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Points the client at another explorer host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Full URL of the accounts endpoint.
    pub fn accounts_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), ACCOUNTS_PATH)
    }
}

impl fmt::Debug for SubscanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscanConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Body of the accounts query.
///
/// Only the reply's `count` is read, so the defaults ask for the smallest
/// possible page.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct AccountsRequest {
    /// Account filter; empty matches every account
    pub filter: String,
    /// Rows per page
    pub row: u32,
    /// Zero-based page index
    pub page: u32,
    /// Sort direction, "asc" or "desc"
    pub order: String,
    /// Field the rows are sorted by
    pub order_field: String,
}

impl Default for AccountsRequest {
    fn default() -> Self {
        Self {
            filter: String::new(),
            row: 1,
            page: 0,
            order: "desc".into(),
            order_field: "balance".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AccountsResponse {
    data: AccountsData,
}

#[derive(Debug, Deserialize)]
struct AccountsData {
    count: u64,
}

/// Client for the explorer's accounts endpoint.
pub struct SubscanClient {
    config: SubscanConfig,
    http_client: reqwest::Client,
}

impl SubscanClient {
    /// Creates a client with the given config.
    pub fn with_config(config: SubscanConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| RelayError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Returns the client's configuration.
    pub fn config(&self) -> &SubscanConfig {
        &self.config
    }

    /// Fetches the raw account count.
    #[instrument(skip(self), fields(url = %self.config.accounts_url()))]
    pub async fn fetch_count(&self) -> Result<u64> {
        let response = self
            .http_client
            .post(self.config.accounts_url())
            .header(API_KEY_HEADER, &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&AccountsRequest::default())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        let parsed: AccountsResponse = serde_json::from_str(&text)
            .map_err(|e| RelayError::MalformedResponse(e.to_string()))?;

        debug!(count = parsed.data.count, "Fetched account count");
        Ok(parsed.data.count)
    }

    fn transport_error(&self, err: reqwest::Error) -> RelayError {
        if err.is_timeout() {
            RelayError::ConnectionTimeout(format!(
                "no reply within {}s: {}",
                self.config.timeout_seconds, err
            ))
        } else {
            RelayError::HttpError(err.to_string())
        }
    }
}

#[async_trait]
impl CountSource for SubscanClient {
    async fn fetch_count(&self) -> Result<u64> {
        SubscanClient::fetch_count(self).await
    }

    fn name(&self) -> &str {
        "subscan"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SubscanClient {
        let config = SubscanConfig::new("test-key").with_base_url(server.uri());
        SubscanClient::with_config(config).unwrap()
    }

    #[test]
    fn test_accounts_url_trims_slash() {
        let config = SubscanConfig::new("k").with_base_url("https://example.io/");
        assert_eq!(config.accounts_url(), "https://example.io/api/scan/accounts");
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = SubscanConfig::new("super-secret");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(AccountsRequest::default()).unwrap();
        assert_eq!(
            body,
            json!({"filter": "", "row": 1, "page": 0, "order": "desc", "order_field": "balance"})
        );
    }

    #[tokio::test]
    async fn test_fetch_count_sends_key_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/scan/accounts"))
            .and(header("x-api-key", "test-key"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "filter": "", "row": 1, "page": 0, "order": "desc", "order_field": "balance"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "message": "Success",
                "data": { "count": 1000, "list": [] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let count = client_for(&server).fetch_count().await.unwrap();
        assert_eq!(count, 1000);
    }

    #[tokio::test]
    async fn test_fetch_count_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_count().await.unwrap_err();
        assert!(matches!(err, RelayError::UpstreamStatus { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_fetch_count_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_count().await.unwrap_err();
        assert!(matches!(err, RelayError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_fetch_count_missing_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"code": 10004, "message": "API key invalid", "data": null})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_count().await.unwrap_err();
        assert!(matches!(err, RelayError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_fetch_count_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"count": 1}}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = SubscanConfig::new("test-key")
            .with_base_url(server.uri())
            .with_timeout(1);
        let client = SubscanClient::with_config(config).unwrap();

        let err = client.fetch_count().await.unwrap_err();
        assert!(matches!(err, RelayError::ConnectionTimeout(_)));
    }

    #[tokio::test]
    async fn test_fetch_count_unreachable() {
        let config = SubscanConfig::new("test-key").with_base_url("http://127.0.0.1:1");
        let client = SubscanClient::with_config(config).unwrap();

        let err = client.fetch_count().await.unwrap_err();
        assert!(err.is_upstream_error());
    }
}
