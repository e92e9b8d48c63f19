//! Extraction client tests against a mocked inference endpoint.

use serde_json::json;
use syllabus_sync::error::ExtractError;
use syllabus_sync::{EventType, Extractor};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-2.5-flash";
const DOCUMENT: &[u8] = b"%PDF-1.4 fake syllabus";

fn extractor(server: &MockServer) -> Extractor {
    Extractor::with_base_url(server.uri(), "test-key".to_string(), MODEL.to_string())
}

fn envelope(payload: &serde_json::Value) -> serde_json::Value {
    json!({
        "candidates": [
            { "content": { "parts": [{ "text": payload.to_string() }] } }
        ]
    })
}

async fn mock_inference(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{MODEL}:generateContent")))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn maps_a_structured_payload() {
    let server = MockServer::start().await;
    mock_inference(
        &server,
        ResponseTemplate::new(200).set_body_json(envelope(&json!({
            "courseName": "CS 101",
            "events": [
                {
                    "title": "Midterm",
                    "date": "2024-10-15",
                    "time": "10:00 AM",
                    "type": "EXAM",
                    "description": "Chapters 1-5"
                },
                { "title": "Essay due", "date": "2024-09-03", "type": "ASSIGNMENT" }
            ]
        }))),
    )
    .await;

    let result = extractor(&server)
        .extract(DOCUMENT, "application/pdf")
        .await
        .unwrap();

    assert_eq!(result.course_name, "CS 101");
    assert_eq!(result.events.len(), 2);

    let midterm = &result.events[0];
    assert_eq!(midterm.title, "Midterm");
    assert_eq!(midterm.date, "2024-10-15".parse().unwrap());
    assert_eq!(midterm.time.as_deref(), Some("10:00 AM"));
    assert_eq!(midterm.kind, EventType::Exam);
    assert_eq!(midterm.description.as_deref(), Some("Chapters 1-5"));

    assert!(!midterm.id.is_empty());
    assert_ne!(midterm.id, result.events[1].id);
}

#[tokio::test]
async fn coerces_unknown_types_to_other() {
    let server = MockServer::start().await;
    mock_inference(
        &server,
        ResponseTemplate::new(200).set_body_json(envelope(&json!({
            "courseName": "CS 101",
            "events": [{ "title": "Lab", "date": "2024-09-01", "type": "BOGUS" }]
        }))),
    )
    .await;

    let result = extractor(&server)
        .extract(DOCUMENT, "application/pdf")
        .await
        .unwrap();

    assert_eq!(result.events[0].kind, EventType::Other);
}

#[tokio::test]
async fn missing_course_name_gets_the_fallback_label() {
    let server = MockServer::start().await;
    mock_inference(
        &server,
        ResponseTemplate::new(200).set_body_json(envelope(&json!({
            "events": [{ "title": "Final", "date": "2024-12-12", "type": "EXAM" }]
        }))),
    )
    .await;

    let result = extractor(&server)
        .extract(DOCUMENT, "application/pdf")
        .await
        .unwrap();

    assert_eq!(result.course_name, "Unknown Course");
}

#[tokio::test]
async fn ids_are_never_reused_across_extractions() {
    let server = MockServer::start().await;
    mock_inference(
        &server,
        ResponseTemplate::new(200).set_body_json(envelope(&json!({
            "courseName": "CS 101",
            "events": [{ "title": "Midterm", "date": "2024-10-15", "type": "EXAM" }]
        }))),
    )
    .await;

    let subject = extractor(&server);
    let first = subject.extract(DOCUMENT, "application/pdf").await.unwrap();
    let second = subject.extract(DOCUMENT, "application/pdf").await.unwrap();

    assert_ne!(first.events[0].id, second.events[0].id);
}

#[tokio::test]
async fn empty_response_fails_extraction() {
    let server = MockServer::start().await;
    mock_inference(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })),
    )
    .await;

    let err = extractor(&server)
        .extract(DOCUMENT, "application/pdf")
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::EmptyResponse));
}

#[tokio::test]
async fn unparseable_payload_fails_extraction() {
    let server = MockServer::start().await;
    mock_inference(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "not the expected shape" }] } }
            ]
        })),
    )
    .await;

    let err = extractor(&server)
        .extract(DOCUMENT, "application/pdf")
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::MalformedResponse(_)));
}

#[tokio::test]
async fn upstream_failure_fails_extraction() {
    let server = MockServer::start().await;
    mock_inference(&server, ResponseTemplate::new(500)).await;

    let err = extractor(&server)
        .extract(DOCUMENT, "application/pdf")
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::Http(_)));
}
