use report_trigger::requester::regions::{MemoryRegion, RegionKind, StatusRegions};
use report_trigger::requester::transport::{HttpTransport, HttpTransportConfig};
use report_trigger::requester::types::RequestSource;
use report_trigger::requester::{Outcome, ReportRequester, DEFAULT_ALREADY_RUNNING_MESSAGE, DEFAULT_ERROR_MESSAGE};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

async fn serve_once(status_line: &'static str, body: &'static str) -> RequestSource {
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
    RequestSource::new(format!("http://{addr}/xblockcompletion/data?course=course-v1:eol+T+2024&format=all"))
}

fn requester() -> ReportRequester<HttpTransport> {
    let transport = HttpTransport::new(HttpTransportConfig {
        timeout: Some(Duration::from_secs(5)),
        ..HttpTransportConfig::default()
    })
    .unwrap();
    ReportRequester::new(transport)
}

#[tokio::test]
async fn report_ready() {
    let source = serve_once("200 OK", r#"{"status": "Report ready"}"#).await;
    let mut regions = StatusRegions::<MemoryRegion>::default();
    let outcome = requester().run(&source, &mut regions).await;
    assert!(matches!(outcome, Outcome::Success { .. }));
    assert_eq!(regions.visible(), Some((RegionKind::Success, "Report ready")));
    assert_eq!(regions.visible_count(), 1);
}

#[tokio::test]
async fn application_error() {
    let source = serve_once("200 OK", r#"{"error": true}"#).await;
    let mut regions = StatusRegions::<MemoryRegion>::default();
    requester().run(&source, &mut regions).await;
    assert_eq!(regions.visible(), Some((RegionKind::Error, DEFAULT_ERROR_MESSAGE)));
    assert_eq!(regions.visible_count(), 1);
}

#[tokio::test]
async fn already_generating() {
    let source = serve_once("200 OK", r#"{"error_task": true}"#).await;
    let mut regions = StatusRegions::<MemoryRegion>::default();
    requester().run(&source, &mut regions).await;
    assert_eq!(regions.visible(), Some((RegionKind::Warning, DEFAULT_ALREADY_RUNNING_MESSAGE)));
    assert_eq!(regions.visible_count(), 1);
}

#[tokio::test]
async fn server_error_without_body() {
    let source = serve_once("502 Bad Gateway", "").await;
    let mut regions = StatusRegions::<MemoryRegion>::default();
    let outcome = requester().run(&source, &mut regions).await;
    assert!(matches!(outcome, Outcome::TransportError { .. }));
    assert_eq!(regions.visible(), Some((RegionKind::Error, DEFAULT_ERROR_MESSAGE)));
}

#[tokio::test]
async fn endpoint_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let source = RequestSource::new(format!("http://{addr}/xblockcompletion/data"));
    let mut regions = StatusRegions::<MemoryRegion>::default();
    let outcome = requester().run(&source, &mut regions).await;
    assert_eq!(outcome, Outcome::TransportError { message: DEFAULT_ERROR_MESSAGE.into() });
    assert_eq!(regions.visible(), Some((RegionKind::Error, DEFAULT_ERROR_MESSAGE)));
    assert_eq!(regions.visible_count(), 1);
}

#[tokio::test]
async fn numeric_task_id_still_reports_success() {
    let source = serve_once("200 OK", r#"{"status": "ok", "task_id": 7}"#).await;
    let mut regions = StatusRegions::<MemoryRegion>::default();
    let outcome = requester().run(&source, &mut regions).await;
    assert_eq!(outcome, Outcome::Success { status: "ok".into(), task_id: Some("7".into()) });
    assert_eq!(regions.visible(), Some((RegionKind::Success, "ok")));
}

#[tokio::test]
async fn plain_string_body_on_success_is_not_an_error() {
    let source = serve_once("200 OK", r#""hello""#).await;
    let mut regions = StatusRegions::<MemoryRegion>::default();
    let outcome = requester().run(&source, &mut regions).await;
    assert_eq!(outcome.region(), RegionKind::Success);
    assert_eq!(regions.visible_count(), 1);
    assert!(!regions.error.visible);
}
