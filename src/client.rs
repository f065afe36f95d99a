use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use std::env;
use std::time::{Duration, Instant};
use url::Url;

use crate::dispatch::Transport;
use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUESTS, CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS};
use crate::types::{ChatReply, ChatRequest};

/// Address of the FAQ bot when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";

/// Environment variable that overrides [`DEFAULT_BASE_URL`].
pub const BASE_URL_ENV: &str = "CHATBOX_BASE_URL";

const SEND_MESSAGE_PATH: &str = "send_message";

/// HTTP client for the FAQ bot's `send_message` endpoint.
///
/// The client keeps a cookie store so the `session_id` cookie handed out by the server on the
/// first exchange is presented on every later request.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: ReqwestClient,
    base_url: Url,
    timeout: Option<Duration>,
}

impl ChatClient {
    /// Create a new client.
    ///
    /// The base URL is read from the CHATBOX_BASE_URL environment variable and falls back to
    /// [`DEFAULT_BASE_URL`].  No timeout is applied.
    pub fn new() -> Result<Self> {
        Self::with_options(env::var(BASE_URL_ENV).ok(), None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = parse_base_url(base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

        let mut builder = ReqwestClient::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The request timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The full URL of the `send_message` endpoint.
    pub fn endpoint(&self) -> Result<Url> {
        Ok(self.base_url.join(SEND_MESSAGE_PATH)?)
    }

    /// Create and return default headers for chat requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Turn a non-success response into an error.  Every status is treated alike.
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        match response.text().await {
            Ok(body) => Error::api(status_code, body),
            Err(e) => Error::api(status_code, format!("failed to read error response: {e}")),
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                self.timeout.map(|t| t.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Send one message to the bot and return its reply.
    pub async fn send_message(&self, message: &str) -> Result<ChatReply> {
        let start = Instant::now();
        CLIENT_REQUESTS.click();
        let result = self.send_message_inner(message).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if result.is_err() {
            CLIENT_REQUEST_ERRORS.click();
        }
        result
    }

    async fn send_message_inner(&self, message: &str) -> Result<ChatReply> {
        let url = self.endpoint()?;
        tracing::debug!(%url, "sending chat message");

        let response = self
            .client
            .post(url)
            .headers(self.default_headers())
            .json(&ChatRequest::new(message))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response.json::<ChatReply>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

#[async_trait::async_trait]
impl Transport for ChatClient {
    async fn send_message(&self, message: &str) -> Result<ChatReply> {
        ChatClient::send_message(self, message).await
    }
}

/// Parse a base URL, making sure it ends in a slash so the endpoint path joins beneath it.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut base = raw.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    let url = Url::parse(&base)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::validation(
            format!("unsupported URL scheme {scheme:?}"),
            Some("base_url".to_string()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ChatClient::with_options(None, None).unwrap();
        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
        assert!(client.timeout().is_none());
        assert_eq!(
            client.endpoint().unwrap().as_str(),
            "http://127.0.0.1:5000/send_message"
        );
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let client =
            ChatClient::with_options(Some("http://localhost:8080/api".to_string()), None).unwrap();
        assert_eq!(
            client.endpoint().unwrap().as_str(),
            "http://localhost:8080/api/send_message"
        );
    }

    #[test]
    fn timeout_is_kept() {
        let client =
            ChatClient::with_options(None, Some(Duration::from_secs(5))).unwrap();
        assert_eq!(client.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn rejects_bad_base_urls() {
        let err = ChatClient::with_options(Some("not a url".to_string()), None).unwrap_err();
        assert!(matches!(err, Error::Url { .. }));

        let err =
            ChatClient::with_options(Some("ftp://example.com/".to_string()), None).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn default_headers_are_json() {
        let client = ChatClient::with_options(None, None).unwrap();
        let headers = client.default_headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers[header::ACCEPT], "application/json");
    }

    #[tokio::test]
    async fn connection_refused_is_a_request_failure() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client =
            ChatClient::with_options(Some(format!("http://127.0.0.1:{port}/")), None).unwrap();
        let err = client.send_message("bonjour").await.unwrap_err();
        assert!(err.is_request_failure());
    }
}
