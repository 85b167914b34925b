use std::sync::Arc;

use futures::StreamExt;
use tokio::time::{Instant, sleep};

use crate::config::TakeOptions;
use crate::error::{CaptureError, TransportError};
use crate::subscription::{InterceptorBuilder, ResponseInterceptor};
use crate::test_support::FakeTransport;
use crate::transport::Transport;
use crate::types::{BodyPayload, RawEvent, ResponseBody};

use super::*;

const SETTLE: Duration = Duration::from_millis(2100);

fn start(transport: &Arc<FakeTransport>) -> ResponseInterceptor {
    InterceptorBuilder::new(transport.clone() as Arc<dyn Transport>)
        .sniff("*")
        .start()
        .unwrap()
}

fn event(id: &str, status: u16) -> RawEvent {
    RawEvent::new(id, format!("https://x.com/api/{}", id), status)
}

fn options() -> TakeOptions {
    TakeOptions::default().timeout(Duration::from_secs(5))
}

#[tokio::test(start_paused = true)]
async fn test_take_with_bodies_in_order() {
    let transport = FakeTransport::new();
    let interceptor = start(&transport);
    transport.set_body("a", BodyPayload::text("first"));
    transport.set_body("b", BodyPayload::text("second"));
    transport.emit(event("a", 200));
    transport.emit(event("b", 200));

    let drained = interceptor.take(2, options()).collect().await;

    assert!(drained.is_complete(2));
    let bodies: Vec<_> = drained
        .responses
        .iter()
        .map(|r| r.body.as_ref().and_then(|b| b.as_text()).unwrap().to_string())
        .collect();
    assert_eq!(bodies, vec!["first", "second"]);
}

#[tokio::test(start_paused = true)]
async fn test_no_content_short_circuits() {
    let transport = FakeTransport::new();
    let interceptor = start(&transport);
    transport.emit(event("a", 204));
    transport.emit(event("b", 200));
    transport.emit(event("c", 200));

    let drained = interceptor.take(3, options()).collect().await;

    assert_eq!(drained.len(), 1);
    assert!(drained.error.is_none());
    assert_eq!(drained.responses[0].status, 204);
    assert!(drained.responses[0].body.is_none());
    assert_eq!(transport.fetch_count("a"), 0);
    assert_eq!(interceptor.pending_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_without_body_short_circuits() {
    let transport = FakeTransport::new();
    let interceptor = start(&transport);
    for id in ["a", "b", "c"] {
        transport.set_body(id, BodyPayload::text("data"));
        transport.emit(event(id, 200));
    }

    let drained = interceptor.take(3, options().without_body()).collect().await;

    assert_eq!(drained.len(), 1);
    assert_eq!(drained.responses[0].request_id, "a");
    assert!(!drained.responses[0].has_body());
    assert_eq!(transport.fetch_count("a"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_body_retry_exhaustion() {
    let transport = FakeTransport::new();
    let interceptor = start(&transport);
    transport.set_body("a", BodyPayload::text(""));
    transport.emit(event("a", 200));
    sleep(SETTLE).await;

    let start = Instant::now();
    let drained = interceptor.take(1, options().body_attempts(3)).collect().await;

    assert_eq!(drained.len(), 1);
    assert!(drained.responses[0].body.is_none());
    assert_eq!(transport.fetch_count("a"), 3);
    // Two pauses between three attempts, none after the last.
    assert!(start.elapsed() >= Duration::from_secs(2));
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_ends_the_sequence() {
    let transport = FakeTransport::new();
    let interceptor = start(&transport);
    transport.emit(event("a", 200));
    transport.set_body("b", BodyPayload::text("ok"));
    transport.emit(event("b", 200));

    let drained = interceptor.take(2, options().body_attempts(2)).collect().await;

    assert_eq!(drained.len(), 1);
    assert!(!drained.is_complete(2));
    assert_eq!(interceptor.pending_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_body_arrives_on_later_attempt() {
    let transport = FakeTransport::new();
    let interceptor = start(&transport);
    transport.script_bodies(
        "a",
        vec![None, Some(BodyPayload::text("   ")), Some(BodyPayload::text("{\"n\":1}"))],
    );
    transport.emit(event("a", 200));

    let response = interceptor.get(options()).await.unwrap().unwrap();

    assert_eq!(transport.fetch_count("a"), 3);
    assert_eq!(response.json().unwrap().unwrap()["n"], 1);
}

#[tokio::test(start_paused = true)]
async fn test_binary_body_is_decoded() {
    let transport = FakeTransport::new();
    let interceptor = start(&transport);
    transport.set_body("a", BodyPayload::base64("AAEC/w=="));
    transport.emit(event("a", 200));

    let response = interceptor.get(options()).await.unwrap().unwrap();

    assert_eq!(response.body, Some(ResponseBody::Binary(vec![0, 1, 2, 255])));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_on_empty_buffer() {
    let transport = FakeTransport::new();
    let interceptor = start(&transport);

    let mut take = interceptor.take(1, options().timeout(Duration::from_millis(100)));
    let first = take.next().await;
    assert!(matches!(first, Some(Err(CaptureError::Timeout(_)))));
    assert!(take.next().await.is_none());
    assert!(take.is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_collects_zero_items() {
    let transport = FakeTransport::new();
    let interceptor = start(&transport);

    let drained = interceptor
        .take(1, options().timeout(Duration::from_millis(100)))
        .collect()
        .await;

    assert!(drained.is_empty());
    assert!(drained.timed_out());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_after_some_items() {
    let transport = FakeTransport::new();
    let interceptor = start(&transport);
    transport.set_body("a", BodyPayload::text("ok"));
    transport.emit(event("a", 200));

    let drained = interceptor
        .take(3, options().timeout(Duration::from_secs(3)))
        .collect()
        .await;

    assert_eq!(drained.len(), 1);
    assert!(drained.timed_out());
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_ends_sequence() {
    let transport = Arc::new(FakeTransport {
        fail_fetch: true,
        ..Default::default()
    });
    let interceptor = start(&transport);
    transport.emit(event("a", 200));
    transport.emit(event("b", 200));

    let mut take = interceptor.take(2, options());
    let first = take.next().await;
    assert!(matches!(
        first,
        Some(Err(CaptureError::Transport(TransportError::ConnectionClosed)))
    ));
    assert!(take.next().await.is_none());
    assert_eq!(transport.fetch_count("a"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_binary_body_is_transport_error() {
    let transport = FakeTransport::new();
    let interceptor = start(&transport);
    transport.set_body("a", BodyPayload::base64("%%%"));
    transport.emit(event("a", 200));

    let result = interceptor.get(options()).await;
    assert!(matches!(
        result,
        Err(CaptureError::Transport(TransportError::InvalidResponse(_)))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_zero_total_yields_nothing() {
    let transport = FakeTransport::new();
    let interceptor = start(&transport);
    transport.emit(event("a", 200));

    let mut take = interceptor.take(0, options());
    assert_eq!(take.remaining(), 0);
    assert!(take.next().await.is_none());
    assert_eq!(interceptor.pending_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_zero_body_attempts_skips_fetch() {
    let transport = FakeTransport::new();
    let interceptor = start(&transport);
    transport.set_body("a", BodyPayload::text("ok"));
    transport.emit(event("a", 200));

    let response = interceptor
        .get(options().body_attempts(0))
        .await
        .unwrap()
        .unwrap();

    assert!(response.body.is_none());
    assert_eq!(transport.fetch_count("a"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_into_stream() {
    let transport = FakeTransport::new();
    let interceptor = start(&transport);
    for id in ["a", "b"] {
        transport.set_body(id, BodyPayload::text(id));
        transport.emit(event(id, 200));
    }

    let items: Vec<_> = interceptor.take(2, options()).into_stream().collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[1].as_ref().unwrap().request_id, "b");
}

#[tokio::test(start_paused = true)]
async fn test_remaining_counts_down() {
    let transport = FakeTransport::new();
    let interceptor = start(&transport);
    for id in ["a", "b"] {
        transport.set_body(id, BodyPayload::text(id));
        transport.emit(event(id, 200));
    }

    let mut take = interceptor.take(2, options());
    assert_eq!(take.remaining(), 2);
    take.next().await.unwrap().unwrap();
    assert_eq!(take.remaining(), 1);
    take.next().await.unwrap().unwrap();
    assert_eq!(take.remaining(), 0);
    assert!(take.next().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_dropped_next_keeps_its_slot() {
    let transport = FakeTransport::new();
    let interceptor = start(&transport);
    let mut take = interceptor.take(2, options());

    let cancelled = tokio::time::timeout(Duration::from_millis(10), take.next()).await;
    assert!(cancelled.is_err());
    assert_eq!(take.remaining(), 2);

    transport.set_body("a", BodyPayload::text("a"));
    transport.emit(event("a", 200));
    let first = take.next().await.unwrap().unwrap();
    assert_eq!(first.request_id, "a");
    assert_eq!(take.remaining(), 1);
    assert!(!take.is_finished());
}
