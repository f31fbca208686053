//! Backend for OpenAI-compatible chat-completion APIs.
//!
//! Both default tiers speak this protocol: OpenAI at `/v1/chat/completions`
//! and Perplexity at `/chat/completions`. The endpoint path is therefore part
//! of the provider configuration rather than hard-coded.
//!
//! Request: `{model, messages: [{role: "user", content}], temperature, max_tokens}`.
//! Response: text at `choices[0].message.content`.

use super::{Backend, CompletionRequest, CompletionResult};
use crate::config::ProviderConfig;
use crate::error::{ProviderError, ProviderErrorKind, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Per-attempt timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// Retry-After assumed for a 429 without a usable header.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Backend for one OpenAI-compatible provider.
///
/// # Example
///
/// ```
/// use content_planner::backend::OpenAiBackend;
///
/// let backend = OpenAiBackend::new(
///     "openai",
///     "https://api.openai.com/v1/chat/completions",
///     "gpt-3.5-turbo",
/// )
/// .unwrap()
/// .with_api_key("sk-...");
/// assert!(backend.has_api_key());
/// ```
#[derive(Clone)]
pub struct OpenAiBackend {
    name: String,
    url: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl std::fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_deref().map(redact))
            .finish()
    }
}

/// Mask a credential down to a short identifying prefix.
pub(crate) fn redact(key: &str) -> String {
    match key.get(..6) {
        Some(prefix) if key.len() > 6 => format!("{}***", prefix),
        _ => "***".to_string(),
    }
}

impl OpenAiBackend {
    /// Create a backend posting to the full chat-completions `url`, without
    /// authentication and with [`DEFAULT_TIMEOUT`].
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            name: name.into(),
            url: url.into(),
            model: model.into(),
            api_key: None,
            client,
        })
    }

    /// Build a backend from provider configuration.
    ///
    /// The credential is taken as already resolved; a missing one is not an
    /// error here, it only makes every call fail with
    /// [`ProviderErrorKind::MissingCredential`].
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        let backend = Self {
            name: config.name.clone(),
            url: config.endpoint(),
            model: config.model.clone(),
            api_key: None,
            client,
        };
        Ok(match config.api_key.as_deref() {
            Some(key) => backend.with_api_key(key),
            None => backend,
        })
    }

    /// Set the API key. Blank keys are treated as absent.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = if key.trim().is_empty() { None } else { Some(key) };
        self
    }

    /// Replace the HTTP client (its own timeout then applies).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Returns `true` if an API key has been configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the request body for the chat-completions endpoint.
    fn build_body(&self, request: &CompletionRequest) -> Value {
        json!({
            "model": self.model,
            "messages": [{"role": "user", "content": request.prompt()}],
            "temperature": request.temperature(),
            "max_tokens": request.max_tokens(),
        })
    }

    fn build_http_request(&self, key: &str, body: &Value) -> reqwest::RequestBuilder {
        self.client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", key))
            .json(body)
    }

    fn error(&self, kind: ProviderErrorKind, message: impl Into<String>) -> ProviderError {
        ProviderError::new(self.name.as_str(), kind, message)
    }

    /// Map a transport failure onto the error taxonomy.
    fn classify_transport(&self, err: &reqwest::Error) -> ProviderError {
        let kind = if err.is_timeout() {
            ProviderErrorKind::Timeout
        } else if err.is_connect() {
            ProviderErrorKind::ConnectionError
        } else {
            ProviderErrorKind::Unknown
        };
        self.error(kind, format!("request to {} failed: {}", self.url, err))
    }
}

/// Parse a `Retry-After` header value given in seconds.
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Map a non-success HTTP status onto the error taxonomy.
pub(crate) fn classify_status(
    provider: &str,
    status: StatusCode,
    retry_after: Option<&str>,
    body: &str,
) -> ProviderError {
    let code = status.as_u16();
    let message = format!("HTTP {}: {}", code, body);
    match code {
        429 => {
            let wait = retry_after
                .and_then(parse_retry_after)
                .unwrap_or(DEFAULT_RETRY_AFTER);
            ProviderError::rate_limited(provider, wait, message)
        }
        400 => ProviderError::new(provider, ProviderErrorKind::BadRequest, message),
        401 => ProviderError::new(provider, ProviderErrorKind::Unauthorized, message),
        403 => ProviderError::new(provider, ProviderErrorKind::Forbidden, message),
        c if c >= 500 => ProviderError::new(provider, ProviderErrorKind::ServerError, message),
        _ => ProviderError::new(provider, ProviderErrorKind::Unknown, message),
    }
}

/// Pull the trimmed first-choice content out of a success body.
pub(crate) fn extract_content(provider: &str, body: &Value) -> std::result::Result<String, ProviderError> {
    let text = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|t| !t.is_empty());

    match text {
        Some(t) => Ok(t.to_string()),
        None => Err(ProviderError::new(
            provider,
            ProviderErrorKind::InvalidResponseShape,
            format!("response has no choices[0].message.content: {}", body),
        )),
    }
}

#[async_trait]
impl Backend for OpenAiBackend {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<CompletionResult, ProviderError> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(self.error(
                ProviderErrorKind::MissingCredential,
                format!("no API key configured for {}", self.name),
            ));
        };

        let body = self.build_body(request);
        debug!(provider = %self.name, model = %self.model, url = %self.url, "sending completion request");

        let resp = self
            .build_http_request(key, &body)
            .send()
            .await
            .map_err(|e| self.classify_transport(&e))?;

        let status = resp.status();
        debug!(provider = %self.name, status = status.as_u16(), "provider responded");

        if !status.is_success() {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let text = resp.text().await.unwrap_or_default();
            return Err(classify_status(
                &self.name,
                status,
                retry_after.as_deref(),
                &text,
            ));
        }

        let text = resp.text().await.map_err(|e| self.classify_transport(&e))?;
        let json_resp: Value = serde_json::from_str(&text).map_err(|e| {
            self.error(
                ProviderErrorKind::InvalidResponseShape,
                format!("response is not JSON ({}): {}", e, text),
            )
        })?;

        Ok(CompletionResult {
            text: extract_content(&self.name, &json_resp)?,
            provider: self.name.clone(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn has_credential(&self) -> bool {
        self.has_api_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use tokio_test::assert_err;

    fn backend() -> OpenAiBackend {
        OpenAiBackend::new("openai", "https://api.openai.com/v1/chat/completions", "gpt-3.5-turbo")
            .unwrap()
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new("Why is the sky blue?", 512, 0.95).unwrap()
    }

    #[test]
    fn test_chat_payload() {
        let body = backend().build_body(&request());

        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["temperature"], 0.95);
        assert_eq!(body["max_tokens"], 512);

        let messages = body["messages"].as_array().expect("messages");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "Why is the sky blue?");
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn test_auth_header() {
        let backend = backend().with_api_key("sk-test123");
        let req = backend
            .build_http_request("sk-test123", &json!({"test": true}))
            .build()
            .expect("build request");

        let auth = req.headers().get("Authorization").expect("auth header");
        assert_eq!(auth, "Bearer sk-test123");
        assert_eq!(req.url().as_str(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_status_429_with_header() {
        let err = classify_status("openai", StatusCode::TOO_MANY_REQUESTS, Some("12"), "slow");
        assert_eq!(err.kind, ProviderErrorKind::RateLimited);
        assert_eq!(err.retry_after, Some(Duration::from_secs(12)));
    }

    #[test]
    fn test_status_429_without_header_defaults() {
        let err = classify_status("openai", StatusCode::TOO_MANY_REQUESTS, None, "");
        assert_eq!(err.retry_after, Some(DEFAULT_RETRY_AFTER));

        let garbled = classify_status("openai", StatusCode::TOO_MANY_REQUESTS, Some("soon"), "");
        assert_eq!(garbled.retry_after, Some(DEFAULT_RETRY_AFTER));
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (400, ProviderErrorKind::BadRequest),
            (401, ProviderErrorKind::Unauthorized),
            (403, ProviderErrorKind::Forbidden),
            (404, ProviderErrorKind::Unknown),
            (500, ProviderErrorKind::ServerError),
            (503, ProviderErrorKind::ServerError),
        ];
        for (code, kind) in cases {
            let status = StatusCode::from_u16(code).unwrap();
            let err = classify_status("perplexity", status, None, "body");
            assert_eq!(err.kind, kind, "status {code}");
            assert_eq!(err.provider, "perplexity");
            assert!(err.retry_after.is_none());
        }
    }

    #[test]
    fn test_bad_request_keeps_body() {
        let err = classify_status("perplexity", StatusCode::BAD_REQUEST, None, "invalid model");
        assert!(err.message.contains("invalid model"));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_extract_content_trims() {
        let body = json!({"choices": [{"message": {"content": "  hello world \n"}}]});
        assert_eq!(extract_content("openai", &body).unwrap(), "hello world");
    }

    #[test]
    fn test_extract_content_rejects_bad_shapes() {
        for body in [
            json!({}),
            json!({"choices": []}),
            json!({"choices": [{"message": {}}]}),
            json!({"choices": [{"message": {"content": "   "}}]}),
            json!({"choices": [{"message": {"content": 42}}]}),
        ] {
            let err = extract_content("openai", &body).unwrap_err();
            assert_eq!(err.kind, ProviderErrorKind::InvalidResponseShape, "{body}");
        }
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        // Unroutable URL: a network attempt would surface as a transport error.
        let backend = OpenAiBackend::new("openai", "http://127.0.0.1:1/none", "m").unwrap();
        let err = assert_err!(backend.complete(&request()).await);
        assert_eq!(err.kind, ProviderErrorKind::MissingCredential);
        assert!(!backend.has_credential());
    }

    #[test]
    fn test_blank_key_is_absent() {
        assert!(!backend().with_api_key("  ").has_api_key());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let backend = backend().with_api_key("sk-1234567890abcdef");
        let debug_output = format!("{:?}", backend);
        assert!(!debug_output.contains("1234567890abcdef"));
        assert!(debug_output.contains("sk-123***"));
    }

    #[test]
    fn test_redact_short_key() {
        assert_eq!(redact("abc"), "***");
    }

    /// Raw HTTP/1.1 response with a content length and `connection: close`.
    fn http_response(status: &str, headers: &[(&str, &str)], body: &str) -> String {
        let mut out = format!("HTTP/1.1 {}\r\n", status);
        for (name, value) in headers {
            out.push_str(&format!("{}: {}\r\n", name, value));
        }
        out.push_str(&format!(
            "content-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        ));
        out
    }

    /// Consume one request: headers, then `content-length` bytes of body.
    fn read_request(stream: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = match stream.read(&mut chunk) {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            buf.extend_from_slice(&chunk[..n]);
            let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + body_len {
                return;
            }
        }
    }

    /// Serve `response` to the first connection on a loopback port.
    fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                read_request(&mut stream);
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });
        format!("http://{}/v1/chat/completions", addr)
    }

    fn local_backend(url: &str) -> OpenAiBackend {
        OpenAiBackend::new("openai", url, "gpt-3.5-turbo")
            .unwrap()
            .with_api_key("sk-local")
    }

    #[tokio::test]
    async fn test_complete_returns_trimmed_content() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "  hello \n"}}]}"#;
        let url = serve_once(http_response(
            "200 OK",
            &[("content-type", "application/json")],
            body,
        ));
        let result = local_backend(&url).complete(&request()).await.unwrap();
        assert_eq!(result.text, "hello");
        assert_eq!(result.provider, "openai");
    }

    #[tokio::test]
    async fn test_complete_reads_retry_after_header() {
        let url = serve_once(http_response(
            "429 Too Many Requests",
            &[("retry-after", "7")],
            "slow down",
        ));
        let err = assert_err!(local_backend(&url).complete(&request()).await);
        assert_eq!(err.kind, ProviderErrorKind::RateLimited);
        assert_eq!(err.retry_after, Some(Duration::from_secs(7)));
        assert!(err.message.contains("slow down"));
    }

    #[tokio::test]
    async fn test_complete_non_json_success_is_invalid_shape() {
        let url = serve_once(http_response(
            "200 OK",
            &[("content-type", "text/plain")],
            "not json!",
        ));
        let err = assert_err!(local_backend(&url).complete(&request()).await);
        assert_eq!(err.kind, ProviderErrorKind::InvalidResponseShape);
    }

    #[tokio::test]
    async fn test_complete_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());
        std::thread::spawn(move || {
            // Hold the connection open without answering.
            if let Ok((stream, _)) = listener.accept() {
                std::thread::sleep(Duration::from_secs(3));
                drop(stream);
            }
        });

        let client = Client::builder()
            .timeout(Duration::from_millis(300))
            .build()
            .unwrap();
        let backend = local_backend(&url).with_client(client);
        let err = assert_err!(backend.complete(&request()).await);
        assert_eq!(err.kind, ProviderErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_complete_refused_connection() {
        let backend = local_backend("http://127.0.0.1:1/v1/chat/completions");
        let err = assert_err!(backend.complete(&request()).await);
        assert_eq!(err.kind, ProviderErrorKind::ConnectionError);
        assert!(err.is_transient());
    }
}
