//! Integration tests for a contact form endpoint
//!
//! Drives an axum router that extracts a `SubmittedForm`, runs the processor
//! and sends through a capturing mock sender.

use std::sync::Arc;

use axum::{body::Body, extract::State, routing::post, Json, Router};
use formmail::prelude::*;
use formmail::testing::MockEmailSender;
use http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const NOW: i64 = 1_700_000_000;

const CONFIG: &str = r#"
[mail]
receiver = "office@example.com, sales@example.com"
sender = "noreply@example.com"
sender_name = "Website"
reply_to_field = "email"
subject = "Contact request"

[protection]
honeypot_fields = ["name", "email_confirm"]
timestamp_field = "stamp"
timestamp_max_age_secs = 3600

[[fields]]
name = "email"
label = "Email"
sanitizer = "email"
required = true
error_text = "Please enter a valid email address"

[[fields]]
name = "message"
label = "Message"
sanitizer = "textarea"
html_options = "nl2br"

[[fields]]
name = "topics"
label = "Topics"
sanitizer = "text"
fallback = "none"

[[fields]]
name = "privacy"
required = true

[[fields]]
name = "customfield--source"
label = "Source"
value = "<em>Website</em>"
html_options = "nohtmlentities fullwidth"
"#;

#[derive(Clone)]
struct AppState {
    processor: Arc<FormProcessor>,
    sender: MockEmailSender,
}

/// Helper to create a test app
fn test_app(sender: MockEmailSender) -> Router {
    let config = FormMailConfig::from_toml_str(CONFIG).unwrap();
    let processor = FormProcessor::from_config(&config, SanitizerRegistry::with_defaults()).unwrap();

    Router::new()
        .route("/contact", post(contact))
        .with_state(AppState {
            processor: Arc::new(processor),
            sender,
        })
}

async fn contact(
    State(state): State<AppState>,
    form: SubmittedForm,
) -> Result<Json<SanitizedFields>, FormRejection> {
    let fields = state
        .processor
        .process_form_and_send_at(&form, &state.sender, NOW)
        .await?;
    Ok(Json(fields))
}

fn form_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/contact")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn valid_body() -> String {
    format!(
        "email=ada%40example.com&message=Line1%0ALine2&privacy=1&stamp={}",
        NOW - 60
    )
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_valid_submission_is_sent() {
    let sender = MockEmailSender::new();
    let response = test_app(sender.clone())
        .oneshot(form_request(&valid_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["email"]["value"], "ada@example.com");
    assert_eq!(body["topics"]["value"], "none");

    assert_eq!(sender.sent_count(), 1);
    let email = sender.last_sent().unwrap();
    assert_eq!(email.to, vec!["office@example.com", "sales@example.com"]);
    assert_eq!(email.from.as_deref(), Some("Website <noreply@example.com>"));
    assert_eq!(email.reply_to.as_deref(), Some("ada@example.com"));

    let html = email.html.unwrap();
    assert!(html.contains("Line1<br>Line2"));
    assert!(html.contains("<td colspan='2'><strong>Source</strong><br><br>\n<em>Website</em></td>"));
    assert!(!html.contains("privacy"));

    let text = email.text.unwrap();
    assert!(text.contains("Message:\nLine1\nLine2\n"));
    assert!(text.contains("Source:\nWebsite\n"));
}

#[tokio::test]
async fn test_checkbox_group_is_joined() {
    let sender = MockEmailSender::new();
    let body = format!("{}&topics%5B%5D=rust&topics%5B%5D=mail", valid_body());

    let response = test_app(sender).oneshot(form_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["topics"]["value"], "rust | mail");
}

#[tokio::test]
async fn test_honeypot_rejects_without_sending() {
    let sender = MockEmailSender::new();
    let body = format!("{}&email_confirm=bot%40example.com", valid_body());

    let response = test_app(sender.clone())
        .oneshot(form_request(&body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({ "reason": "honeypot" }));
    assert_eq!(sender.sent_count(), 0);
}

#[tokio::test]
async fn test_stale_timestamp_rejects() {
    let sender = MockEmailSender::new();
    let body = format!(
        "email=ada%40example.com&privacy=1&stamp={}",
        NOW - 3601
    );

    let response = test_app(sender.clone())
        .oneshot(form_request(&body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["reason"], "timestamp");
    assert_eq!(sender.sent_count(), 0);
}

#[tokio::test]
async fn test_missing_required_fields_are_listed() {
    let sender = MockEmailSender::new();
    let body = format!("email=not-an-address&stamp={NOW}");

    let response = test_app(sender.clone())
        .oneshot(form_request(&body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["reason"], "required");
    assert_eq!(body["missing_fields"]["fields"], json!(["email", "privacy"]));
    assert_eq!(
        body["missing_fields"]["messages"],
        json!({ "email": "Please enter a valid email address" })
    );
    assert_eq!(sender.sent_count(), 0);
}

#[tokio::test]
async fn test_transport_failure_is_reported() {
    let sender = MockEmailSender::failing();

    let response = test_app(sender.clone())
        .oneshot(form_request(&valid_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["reason"], "mailnotsent");
    assert_eq!(sender.sent_count(), 0);
}

#[tokio::test]
async fn test_non_form_body_is_rejected_by_extractor() {
    let request = Request::builder()
        .method("POST")
        .uri("/contact")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = test_app(MockEmailSender::new())
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}
