//! Platform HTTP client for API interactions

use log::debug;
use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::config::api;
use crate::error::{PlatformError, Result};
use crate::platform::credentials::{Token, TokenKind, TokenResolver};

/// Connection settings for a [`PlatformClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Overrides `{token base URL}/v1` (used for mock servers and proxies)
    pub base_url: Option<String>,
    /// Reuse pooled connections between requests
    pub keep_alive: bool,
    /// Per-request timeout; `None` lets transfers run as long as needed
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            keep_alive: true,
            request_timeout: None,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Platform API client
///
/// Cloning is cheap: clones share the underlying connection pool.
#[derive(Clone)]
pub struct PlatformClient {
    client: Client,
    token: Token,
    base_url: String,
    active_user: Option<String>,
    headers: HeaderMap,
}

impl std::fmt::Debug for PlatformClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token)
            .field("active_user", &self.active_user)
            .finish()
    }
}

impl PlatformClient {
    /// Create a client for the given token
    pub fn new(token: Token, config: ClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .tcp_keepalive(Duration::from_secs(60))
            .connect_timeout(config.connect_timeout);

        builder = if config.keep_alive {
            builder
                .pool_max_idle_per_host(20)
                .pool_idle_timeout(Duration::from_secs(90))
        } else {
            builder.pool_max_idle_per_host(0)
        };

        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().unwrap_or_else(|_| Client::new());

        let base_url = match config.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("{}{}", token.base_api_url(), api::VERSION_PATH),
        };
        debug!("Platform API base URL: {}", base_url);

        let headers = token.auth_headers(None)?;

        Ok(Self {
            client,
            token,
            base_url,
            active_user: None,
            headers,
        })
    }

    /// Create a client from the environment or activated token of `kind`
    pub fn from_env(kind: TokenKind) -> Result<Self> {
        let token = TokenResolver::new(kind).resolve(None)?;
        Self::new(token, ClientConfig::default())
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_application(&self) -> bool {
        self.token.kind() == TokenKind::Application
    }

    /// User currently impersonated by an application client
    pub fn active_user(&self) -> Option<&str> {
        self.active_user.as_deref()
    }

    /// Act on behalf of an application user until [`exit_user`](Self::exit_user)
    pub fn with_user(&mut self, username: &str) -> Result<()> {
        if !self.is_application() {
            return Err(PlatformError::Config(
                "Only application tokens can act on behalf of a user".to_string(),
            ));
        }
        self.headers = self.token.auth_headers(Some(username))?;
        self.active_user = Some(username.to_string());
        debug!("Activated application user '{}'", username);
        Ok(())
    }

    /// Stop impersonating an application user, if any
    pub fn exit_user(&mut self) {
        if let Some(user) = self.active_user.take() {
            debug!("Exited application user '{}'", user);
        }
        if let Ok(headers) = self.token.auth_headers(None) {
            self.headers = headers;
        }
    }

    /// Release pooled connections
    pub fn close(self) {
        debug!("Closing Platform client for {}", self.base_url);
    }

    /// Build a full URL from a path relative to the versioned base
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Prefix `path` with the application namespace for application tokens
    pub(crate) fn scoped(&self, path: &str) -> String {
        if self.is_application() {
            format!("{}/{}", api::APPS, path)
        } else {
            path.to_string()
        }
    }

    fn with_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.headers(self.headers.clone())
    }

    pub(crate) fn get(&self, url: &str) -> RequestBuilder {
        debug!("GET {}", url);
        self.with_headers(self.client.get(url))
    }

    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        debug!("POST {}", url);
        self.with_headers(self.client.post(url))
    }

    pub(crate) fn put(&self, url: &str) -> RequestBuilder {
        debug!("PUT {}", url);
        self.with_headers(self.client.put(url))
    }

    pub(crate) fn delete(&self, url: &str) -> RequestBuilder {
        debug!("DELETE {}", url);
        self.with_headers(self.client.delete(url))
    }

    /// Send a request and parse its JSON body
    pub(crate) async fn send_json(&self, request: RequestBuilder) -> Result<Value> {
        let response = validate_response(request.send().await?).await?;
        parse_json_body(response).await
    }

    /// Send a request whose body is irrelevant
    pub(crate) async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        validate_response(request.send().await?).await?;
        Ok(())
    }
}

/// Pass successful responses through; convert the rest into [`PlatformError::Api`]
///
/// The message comes from the `error.message` field of a JSON error body,
/// falling back to the reason phrase and URL.
pub(crate) async fn validate_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    debug!("Request to {} failed with {}: {}", url, status, body);

    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| {
            format!(
                "{} for URL: {}",
                status.canonical_reason().unwrap_or("Unknown Error"),
                url
            )
        });

    Err(PlatformError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn parse_json_body(response: Response) -> Result<Value> {
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

/// Remove and return a top-level field of a response envelope
pub(crate) fn take_field(mut value: Value, key: &str) -> Result<Value> {
    value
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| PlatformError::Json(format!("Response is missing field '{}'", key)))
}

/// Remove a top-level field and deserialize it
pub(crate) fn take_typed<T: DeserializeOwned>(value: Value, key: &str) -> Result<T> {
    Ok(serde_json::from_value(take_field(value, key)?)?)
}

/// Percent-encode a path segment
pub(crate) fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

#[cfg(test)]
impl PlatformClient {
    /// User-token client pointed at a mock server
    pub fn test_client(base_url: &str) -> Self {
        Self::test_client_with(base_url, TokenKind::User)
    }

    /// Client of a given token kind pointed at a mock server
    pub fn test_client_with(base_url: &str, kind: TokenKind) -> Self {
        let token = Token::new(kind, "test-key", None).unwrap();
        let config = ClientConfig {
            base_url: Some(base_url.to_string()),
            ..Default::default()
        };
        Self::new(token, config).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::credentials;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_base_url_from_token() {
        let token = Token::new(TokenKind::User, "k", Some("https://dev.example.com".into())).unwrap();
        let client = PlatformClient::new(token, ClientConfig::default()).unwrap();
        assert_eq!(client.base_url(), "https://dev.example.com/v1");
        assert_eq!(
            client.endpoint("/data/list"),
            "https://dev.example.com/v1/data/list"
        );
    }

    #[test]
    fn test_base_url_override_strips_slash() {
        let client = PlatformClient::test_client("http://127.0.0.1:9999/");
        assert_eq!(client.base_url(), "http://127.0.0.1:9999");
    }

    #[test]
    fn test_scoped_paths() {
        let user = PlatformClient::test_client("http://x");
        let app = PlatformClient::test_client_with("http://x", TokenKind::Application);
        assert_eq!(user.scoped("analytics/list"), "analytics/list");
        assert_eq!(app.scoped("analytics/list"), "apps/analytics/list");
    }

    #[test]
    fn test_with_user_rejected_for_user_token() {
        let mut client = PlatformClient::test_client("http://x");
        assert!(matches!(
            client.with_user("bob"),
            Err(PlatformError::Config(_))
        ));
        assert!(client.active_user().is_none());
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("abc-123"), "abc-123");
        assert_eq!(segment("a/b"), "a%2Fb");
    }

    #[test]
    fn test_take_field() {
        let value = serde_json::json!({"data": {"id": "d1"}});
        assert_eq!(take_field(value.clone(), "data").unwrap()["id"], "d1");
        assert!(take_field(value, "jobs").is_err());
    }

    #[tokio::test]
    async fn test_bearer_header_sent() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let value = client
            .send_json(client.get(&client.endpoint("ping")))
            .await
            .unwrap();
        assert_eq!(value["ok"], true);
    }

    #[tokio::test]
    async fn test_application_user_header_toggle() {
        let mock_server = MockServer::start().await;
        let mut client =
            PlatformClient::test_client_with(&mock_server.uri(), TokenKind::Application);

        Mock::given(method("GET"))
            .and(path("/as-user"))
            .and(header(credentials::APP_KEY_HEADER, "test-key"))
            .and(header(credentials::APP_USER_HEADER, "alice"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/as-app"))
            .and(header_exists(credentials::APP_KEY_HEADER))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        client.with_user("alice").unwrap();
        assert_eq!(client.active_user(), Some("alice"));
        client
            .send_empty(client.get(&client.endpoint("as-user")))
            .await
            .unwrap();

        client.exit_user();
        assert!(client.active_user().is_none());
        assert!(!client.headers.contains_key(credentials::APP_USER_HEADER));
        client
            .send_empty(client.get(&client.endpoint("as-app")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_error_envelope_message() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/data/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"code": 404, "message": "Data 'missing' not found"}
            })))
            .mount(&mock_server)
            .await;

        let err = client
            .send_json(client.get(&client.endpoint("data/missing")))
            .await
            .unwrap_err();
        match err {
            PlatformError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("Data 'missing' not found"));
            }
            other => panic!("Expected PlatformError::Api, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_without_json_body_uses_reason() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/boom"))
            .respond_with(ResponseTemplate::new(503).set_body_string("<html>down</html>"))
            .mount(&mock_server)
            .await;

        let err = client
            .send_json(client.get(&client.endpoint("boom")))
            .await
            .unwrap_err();
        match err {
            PlatformError::Api { status, message } => {
                assert_eq!(status, 503);
                assert!(message.starts_with("Service Unavailable for URL: "));
                assert!(message.ends_with("/boom"));
            }
            other => panic!("Expected PlatformError::Api, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_body_parses_as_null() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("PUT"))
            .and(path("/noop"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let value = client
            .send_json(client.put(&client.endpoint("noop")))
            .await
            .unwrap();
        assert!(value.is_null());
    }
}
