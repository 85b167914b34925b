use super::*;

#[test]
fn test_header_lookup_is_case_insensitive() {
    let event = RawEvent::new("1", "https://x.com/a", 200).with_header("Content-Type", "text/html");
    assert_eq!(event.header("content-type"), Some("text/html"));
    assert_eq!(event.header("x-missing"), None);
}

#[test]
fn test_blank_payload() {
    assert!(BodyPayload::text("").is_blank());
    assert!(BodyPayload::text("  \n\t").is_blank());
    assert!(!BodyPayload::text("{}").is_blank());
}

#[test]
fn test_decode_text_payload() {
    let body = BodyPayload::text("hello").decode().unwrap();
    assert_eq!(body, ResponseBody::Text("hello".to_string()));
    assert!(!body.is_binary());
}

#[test]
fn test_decode_base64_payload() {
    let body = BodyPayload::base64("iVBORw0KGgo=").decode().unwrap();
    assert!(body.is_binary());
    assert_eq!(body.as_bytes(), &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n']);
    assert!(body.as_text().is_none());
}

#[test]
fn test_decode_base64_text() {
    let body = BodyPayload::base64("eyJvayI6dHJ1ZX0=").decode().unwrap();
    assert_eq!(body.as_text(), Some("{\"ok\":true}"));
}

#[test]
fn test_decode_malformed_base64() {
    let err = BodyPayload::base64("not base64!!").decode().unwrap_err();
    assert!(matches!(err, TransportError::InvalidResponse(_)));
}

#[test]
fn test_captured_from_event() {
    let event = RawEvent::new("42", "https://x.com/api", 201)
        .with_header("X-Id", "7")
        .with_mime_type("application/json");
    let captured = CapturedResponse::from_event(event);

    assert_eq!(captured.request_id, "42");
    assert_eq!(captured.status, 201);
    assert_eq!(captured.headers.get("X-Id").map(String::as_str), Some("7"));
    assert_eq!(captured.mime_type.as_deref(), Some("application/json"));
    assert!(!captured.has_body());
}

#[test]
fn test_captured_json_body() {
    let captured = CapturedResponse::from_event(RawEvent::new("1", "u", 200))
        .with_body(ResponseBody::Text("{\"items\":[1,2]}".to_string()));
    let value = captured.json().unwrap().unwrap();
    assert_eq!(value["items"][1], 2);
}

#[test]
fn test_serialize_binary_body() {
    let captured = CapturedResponse::from_event(RawEvent::new("1", "u", 200))
        .with_body(ResponseBody::Binary(vec![1, 2, 3]));
    let json = serde_json::to_value(&captured).unwrap();
    assert_eq!(json["body"]["encoding"], "base64");
    assert_eq!(json["body"]["data"], "AQID");
}

#[test]
fn test_serialize_absent_body() {
    let captured = CapturedResponse::from_event(RawEvent::new("1", "u", 204));
    let json = serde_json::to_value(&captured).unwrap();
    assert!(json["body"].is_null());
    assert!(json.get("mime_type").is_none());
}
