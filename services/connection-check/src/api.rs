//! Client side of the backend test endpoint.
use async_trait::async_trait;
use common::err_context::{ErrorContext, ErrorContextExt};
use common::settings::BackendSettings;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error};

/// What the user sees when the backend could not be reached.
pub const FALLBACK_MESSAGE: &str = "Error fetching data";

/// Body returned by `GET {api_url}/test`.
///
/// Only `message` is recognized, any other field is kept as is. A missing
/// or null `message` is read as an empty string, and a value that is not a
/// string is kept as its JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResponse {
    #[serde(default, deserialize_with = "deserialize_message")]
    pub message: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn deserialize_message<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(message)) => message,
        Some(other) => other.to_string(),
    })
}

impl TestResponse {
    pub fn new(message: impl Into<String>) -> Self {
        TestResponse {
            message: message.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// The mapping substituted for the backend's answer on failure.
    pub fn fallback() -> Self {
        TestResponse::new(FALLBACK_MESSAGE)
    }
}

/// Anything that prevents us from getting a `TestResponse` out of the backend.
#[derive(Debug)]
pub enum FetchError {
    /// The request could not be sent, or the response could not be read.
    Transport {
        context: String,
        source: reqwest::Error,
    },
    /// The backend answered with a non success status.
    Status { context: String, status: StatusCode },
    /// The body is not the JSON we expect.
    Body {
        context: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for FetchError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport { context, source } => {
                write!(fmt, "Transport Error: {context} | {source}")
            }
            FetchError::Status { context, status } => {
                write!(fmt, "Response Status Error: {context} | {status}")
            }
            FetchError::Body { context, source } => {
                write!(fmt, "Response Body Error: {context} | {source}")
            }
        }
    }
}

impl std::error::Error for FetchError {}

impl From<ErrorContext<String, reqwest::Error>> for FetchError {
    fn from(err: ErrorContext<String, reqwest::Error>) -> Self {
        FetchError::Transport {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<String, serde_json::Error>> for FetchError {
    fn from(err: ErrorContext<String, serde_json::Error>) -> Self {
        FetchError::Body {
            context: err.0,
            source: err.1,
        }
    }
}

/// The result of one call to the test endpoint. Failures are values, so
/// that the caller decides how each case is rendered.
#[derive(Debug)]
pub enum FetchOutcome {
    Success(TestResponse),
    Failed(FetchError),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// Collapses the outcome into a mapping, substituting the fallback
    /// mapping for any failure.
    pub fn into_response(self) -> TestResponse {
        match self {
            FetchOutcome::Success(resp) => resp,
            FetchOutcome::Failed(_) => TestResponse::fallback(),
        }
    }
}

impl From<Result<TestResponse, FetchError>> for FetchOutcome {
    fn from(res: Result<TestResponse, FetchError>) -> Self {
        match res {
            Ok(resp) => FetchOutcome::Success(resp),
            Err(err) => FetchOutcome::Failed(err),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestApi {
    /// Issues a single request to the test endpoint. This never fails: any
    /// error is logged, and returned as `FetchOutcome::Failed`.
    async fn fetch_test(&self) -> FetchOutcome;
}

/// Always resolves to a mapping, either the backend's, or the fallback.
pub async fn fetch_test_message(api: &(dyn TestApi + Send + Sync)) -> TestResponse {
    api.fetch_test().await.into_response()
}

#[derive(Debug)]
pub enum Error {
    /// The http client could not be built from the settings.
    Configuration {
        context: String,
        source: reqwest::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration { context, source } => {
                write!(fmt, "Backend Client Configuration: {context} | {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<String, reqwest::Error>> for Error {
    fn from(err: ErrorContext<String, reqwest::Error>) -> Self {
        Error::Configuration {
            context: err.0,
            source: err.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http_client: Client,
    // Full URL of the test endpoint.
    test_url: String,
}

impl BackendClient {
    pub fn new(settings: BackendSettings) -> Result<BackendClient, Error> {
        let BackendSettings { api_url, timeout } = settings;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let http_client = builder
            .build()
            .context("Could not build backend http client".to_string())?;
        Ok(BackendClient {
            http_client,
            test_url: format!("{}/test", api_url.trim_end_matches('/')),
        })
    }

    pub fn test_url(&self) -> &str {
        &self.test_url
    }

    async fn try_fetch_test(&self) -> Result<TestResponse, FetchError> {
        let resp = self
            .http_client
            .get(&self.test_url)
            .send()
            .await
            .context(format!("Could not send request to {}", self.test_url))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                context: format!("Unexpected response from {}", self.test_url),
                status,
            });
        }

        let body = resp
            .bytes()
            .await
            .context(format!("Could not read response from {}", self.test_url))?;

        let response = serde_json::from_slice(&body)
            .context(format!("Could not deserialize response from {}", self.test_url))?;

        Ok(response)
    }
}

#[async_trait]
impl TestApi for BackendClient {
    #[tracing::instrument(name = "Fetching test message", skip(self))]
    async fn fetch_test(&self) -> FetchOutcome {
        let res = self.try_fetch_test().await;
        match &res {
            Ok(resp) => {
                debug!(url = %self.test_url, text = %resp.message, "Received test message")
            }
            Err(err) => error!(url = %self.test_url, error = %err, "Error fetching data"),
        }
        res.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;
    use std::net::TcpListener;
    use tracing_test::traced_test;
    use wiremock::matchers::{any, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(api_url: String) -> BackendClient {
        BackendClient::new(BackendSettings {
            api_url,
            timeout: Some(5),
        })
        .expect("backend client")
    }

    /// An address nobody listens on.
    fn unreachable_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);
        format!("http://127.0.0.1:{port}/api")
    }

    async fn mock_backend(template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/test"))
            .respond_with(template)
            .expect(1)
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn fetch_test_should_fire_a_get_request_to_the_test_endpoint() {
        // Arrange
        let mock_server = mock_backend(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "message": "pong" })),
        )
        .await;
        let client = client_for(format!("{}/api", mock_server.uri()));

        // Act
        let _ = client.fetch_test().await;

        // Assert
        // wiremock asserts on drop
    }

    #[tokio::test]
    async fn fetch_test_returns_the_backend_message_verbatim() {
        let mock_server = mock_backend(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "message": "Backend is working!" })),
        )
        .await;
        let client = client_for(format!("{}/api", mock_server.uri()));

        let outcome = client.fetch_test().await;

        assert_that(&outcome.is_success()).is_true();
        assert_that(&outcome.into_response()).is_equal_to(TestResponse::new("Backend is working!"));
    }

    #[tokio::test]
    async fn fetch_test_keeps_unrecognized_fields() {
        let mock_server = mock_backend(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "message": "pong", "version": 3 })),
        )
        .await;
        let client = client_for(format!("{}/api", mock_server.uri()));

        let resp = client.fetch_test().await.into_response();

        assert_that(&resp.message.as_str()).is_equal_to("pong");
        assert_eq!(resp.extra.get("version"), Some(&serde_json::json!(3)));
    }

    #[tokio::test]
    async fn fetch_test_reads_a_missing_message_as_empty() {
        let mock_server =
            mock_backend(ResponseTemplate::new(200).set_body_json(serde_json::json!({}))).await;
        let client = client_for(format!("{}/api", mock_server.uri()));

        let outcome = client.fetch_test().await;

        assert_that(&outcome.is_success()).is_true();
        assert_that(&outcome.into_response().message).is_equal_to(String::new());
    }

    #[tokio::test]
    async fn fetch_test_ignores_a_trailing_slash_in_the_api_url() {
        let mock_server = mock_backend(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "message": "pong" })),
        )
        .await;
        let client = client_for(format!("{}/api/", mock_server.uri()));

        assert_that(&client.test_url().to_string())
            .is_equal_to(format!("{}/api/test", mock_server.uri()));
        assert_that(&client.fetch_test().await.is_success()).is_true();
    }

    #[tokio::test]
    async fn fetch_test_fails_if_the_server_returns_500() {
        let mock_server =
            mock_backend(ResponseTemplate::new(500).set_body_json(serde_json::json!({}))).await;
        let client = client_for(format!("{}/api", mock_server.uri()));

        let outcome = client.fetch_test().await;

        assert!(matches!(
            outcome,
            FetchOutcome::Failed(FetchError::Status { status, .. }) if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[tokio::test]
    async fn fetch_test_falls_back_on_any_non_success_status() {
        for code in [301u16, 404, 418, 503] {
            let mock_server = MockServer::start().await;
            Mock::given(any())
                .respond_with(
                    ResponseTemplate::new(code)
                        .set_body_json(serde_json::json!({ "message": "not for you" })),
                )
                .mount(&mock_server)
                .await;
            let client = client_for(format!("{}/api", mock_server.uri()));

            let resp = fetch_test_message(&client).await;

            assert_that(&resp).is_equal_to(TestResponse::fallback());
        }
    }

    #[tokio::test]
    async fn fetch_test_fails_on_a_malformed_body() {
        let mock_server =
            mock_backend(ResponseTemplate::new(200).set_body_string("<html>pong</html>")).await;
        let client = client_for(format!("{}/api", mock_server.uri()));

        let outcome = client.fetch_test().await;

        assert!(matches!(outcome, FetchOutcome::Failed(FetchError::Body { .. })));
    }

    #[tokio::test]
    async fn fetch_test_reads_a_null_message_as_empty() {
        let mock_server = mock_backend(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "message": null })),
        )
        .await;
        let client = client_for(format!("{}/api", mock_server.uri()));

        let outcome = client.fetch_test().await;

        assert_that(&outcome.is_success()).is_true();
        assert_that(&outcome.into_response().message).is_equal_to(String::new());
    }

    #[tokio::test]
    async fn fetch_test_keeps_a_number_message_as_text() {
        let mock_server = mock_backend(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "message": 42 })),
        )
        .await;
        let client = client_for(format!("{}/api", mock_server.uri()));

        let outcome = client.fetch_test().await;

        assert_that(&outcome.is_success()).is_true();
        assert_that(&outcome.into_response().message.as_str()).is_equal_to("42");
    }

    #[test]
    fn test_response_renders_structured_messages_as_json() {
        let resp: TestResponse =
            serde_json::from_str(r#"{"message": {"text": "pong"}, "ok": true}"#).unwrap();
        assert_eq!(resp.message, r#"{"text":"pong"}"#);
        assert_eq!(resp.extra.get("ok"), Some(&serde_json::json!(true)));
    }

    #[tokio::test]
    async fn fetch_test_fails_when_the_server_is_too_slow() {
        let mock_server = mock_backend(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "message": "late" }))
                .set_delay(Duration::from_secs(3)),
        )
        .await;
        let client = BackendClient::new(BackendSettings {
            api_url: format!("{}/api", mock_server.uri()),
            timeout: Some(1),
        })
        .expect("backend client");

        let outcome = client.fetch_test().await;

        assert!(matches!(outcome, FetchOutcome::Failed(FetchError::Transport { .. })));
    }

    #[tokio::test]
    #[traced_test]
    async fn fetch_test_logs_once_when_the_backend_is_unreachable() {
        let client = client_for(unreachable_url());

        let outcome = client.fetch_test().await;

        assert!(matches!(outcome, FetchOutcome::Failed(FetchError::Transport { .. })));
        logs_assert(|lines: &[&str]| {
            match lines.iter().filter(|line| line.contains("ERROR")).count() {
                1 => Ok(()),
                n => Err(format!("expected one error entry, found {n}")),
            }
        });
    }

    #[tokio::test]
    async fn fetch_test_message_collapses_failures_into_the_fallback() {
        let client = client_for(unreachable_url());

        let resp = fetch_test_message(&client).await;

        assert_that(&resp).is_equal_to(TestResponse::fallback());
        assert_that(&resp.message.as_str()).is_equal_to("Error fetching data");
    }

    #[tokio::test]
    async fn fetch_test_message_uses_whatever_the_api_returns() {
        let mut api = MockTestApi::new();
        api.expect_fetch_test()
            .times(1)
            .returning(|| FetchOutcome::Success(TestResponse::new("Hello")));

        let resp = fetch_test_message(&api).await;

        assert_that(&resp.message.as_str()).is_equal_to("Hello");
    }
}
