use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client as HttpClient, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::types::ReportResponse;

const DEFAULT_USER_AGENT: &str = concat!("report-trigger/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct HttpTransportConfig {
    /// `None` leaves the client's own default in place (no timeout).
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpTransportConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(timeout) = std::env::var("REPORT_TIMEOUT_SECS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                cfg.timeout = Some(Duration::from_secs(parsed));
            }
        }
        if let Ok(ua) = std::env::var("REPORT_USER_AGENT") {
            if !ua.is_empty() {
                cfg.user_agent = ua;
            }
        }
        cfg
    }
}

#[async_trait]
pub trait ReportTransport: Send + Sync {
    async fn get_report(&self, endpoint: &str) -> Result<ReportResponse, TransportError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    pub fn new(cfg: HttpTransportConfig) -> Result<Self, TransportError> {
        let mut builder = HttpClient::builder().user_agent(cfg.user_agent);
        if let Some(timeout) = cfg.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(TransportError::from_reqwest)?;
        Ok(Self { http })
    }
}

#[async_trait]
impl ReportTransport for HttpTransport {
    async fn get_report(&self, endpoint: &str) -> Result<ReportResponse, TransportError> {
        let response = self
            .http
            .get(endpoint)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(TransportError::from_reqwest)?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status,
                body: body_text(&bytes),
            });
        }

        decode_success(&bytes)
    }
}

/// Any JSON on a 2xx is report data. Non-object JSON carries no flags and no
/// status, so it reads as an empty success.
fn decode_success(bytes: &[u8]) -> Result<ReportResponse, TransportError> {
    let decode_err = |source: serde_json::Error| TransportError::Decode { source, body: body_text(bytes) };
    let value: Value = serde_json::from_slice(bytes).map_err(decode_err)?;
    if !value.is_object() {
        debug!(body = %value, "report body is not an object");
        return Ok(ReportResponse::default());
    }
    serde_json::from_value(value).map_err(decode_err)
}

fn body_text(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    Some(String::from_utf8_lossy(bytes).into_owned())
}

#[derive(Debug)]
pub enum TransportError {
    Http(reqwest::Error),
    Timeout,
    Status {
        status: StatusCode,
        body: Option<String>,
    },
    Decode {
        source: serde_json::Error,
        body: Option<String>,
    },
    MockQueueEmpty,
}

impl TransportError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Http(err)
        }
    }

    /// Raw response body, when the server sent one.
    pub fn body(&self) -> Option<&str> {
        match self {
            TransportError::Status { body, .. } | TransportError::Decode { body, .. } => body.as_deref(),
            TransportError::Http(_) | TransportError::Timeout | TransportError::MockQueueEmpty => None,
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Http(err) => write!(f, "http error: {err}"),
            TransportError::Timeout => write!(f, "request timed out"),
            TransportError::Status { status, .. } => write!(f, "unexpected status {status}"),
            TransportError::Decode { source, .. } => write!(f, "decode error: {source}"),
            TransportError::MockQueueEmpty => write!(f, "mock transport response queue is empty"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Http(err) => Some(err),
            TransportError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<ReportResponse, TransportError>>>,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, resp: Result<ReportResponse, TransportError>) {
        self.responses.lock().unwrap().push_back(resp);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportTransport for MockTransport {
    async fn get_report(&self, endpoint: &str) -> Result<ReportResponse, TransportError> {
        self.calls.lock().unwrap().push(endpoint.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::MockQueueEmpty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a loopback port and return its URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = sock.read(&mut buf).await.unwrap();
            let resp = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(resp.as_bytes()).await.unwrap();
            let _ = sock.shutdown().await;
        });
        format!("http://{addr}/xblockcompletion/data")
    }

    fn transport() -> HttpTransport {
        HttpTransport::new(HttpTransportConfig {
            timeout: Some(Duration::from_secs(5)),
            ..HttpTransportConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn decodes_success_body() {
        let url = serve_once("200 OK", r#"{"status":"Report ready","task_id":"t-1"}"#).await;
        let resp = transport().get_report(&url).await.unwrap();
        assert_eq!(resp.status.as_deref(), Some("Report ready"));
        assert_eq!(resp.task_id.as_deref(), Some("t-1"));
    }

    #[tokio::test]
    async fn non_success_status_keeps_body() {
        let url = serve_once("500 Internal Server Error", r#""server exploded""#).await;
        let err = transport().get_report(&url).await.unwrap_err();
        match &err {
            TransportError::Status { status, .. } => assert_eq!(*status, StatusCode::INTERNAL_SERVER_ERROR),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.body(), Some(r#""server exploded""#));
    }

    #[tokio::test]
    async fn undecodable_body_is_decode_error() {
        let url = serve_once("200 OK", "<html>login</html>").await;
        let err = transport().get_report(&url).await.unwrap_err();
        assert!(matches!(err, TransportError::Decode { .. }));
        assert_eq!(err.body(), Some("<html>login</html>"));
    }

    #[tokio::test]
    async fn non_object_json_is_empty_success() {
        let url = serve_once("200 OK", r#""hello""#).await;
        let resp = transport().get_report(&url).await.unwrap();
        assert_eq!(resp, ReportResponse::default());
    }

    #[test]
    fn decode_tolerates_scalar_fields() {
        let resp = decode_success(br#"{"status":"ok","task_id":7}"#).unwrap();
        assert_eq!(resp.status.as_deref(), Some("ok"));
        assert_eq!(resp.task_id.as_deref(), Some("7"));

        let resp = decode_success(br#"{"error":"no role","status":1}"#).unwrap();
        assert!(resp.is_error());

        assert!(matches!(decode_success(b"[1, 2"), Err(TransportError::Decode { .. })));
    }

    #[tokio::test]
    async fn unreachable_host_is_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = transport().get_report(&format!("http://{addr}/")).await.unwrap_err();
        assert!(matches!(err, TransportError::Http(_)));
        assert_eq!(err.body(), None);
    }

    #[tokio::test]
    async fn mock_records_calls_and_drains_queue() {
        let mock = MockTransport::new();
        mock.push_response(Ok(ReportResponse::default()));
        assert!(mock.get_report("http://a/").await.is_ok());
        assert!(matches!(mock.get_report("http://b/").await, Err(TransportError::MockQueueEmpty)));
        assert_eq!(mock.calls(), vec!["http://a/".to_string(), "http://b/".to_string()]);
    }
}
