//! Integration tests for `POST /api/contact`.
//!
//! Each test spins up the Axum app on a random port and drives it over
//! HTTP with reqwest. The oracle is a second local Axum server speaking
//! the siteverify form/JSON protocol, so the real `RecaptchaVerifier` is
//! exercised; email goes to an in-process recorder.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::extract::State;
use axum::routing::post;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use homecare_contact::config::ContactConfig;
use homecare_contact::contact::{ContactDeps, ContactService, app_router};
use homecare_contact::error::EmailError;
use homecare_contact::notify::{EmailSender, OutgoingEmail};
use homecare_contact::store::{LibSqlBackend, SubmissionStore};
use homecare_contact::verify::RecaptchaVerifier;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Records every email instead of sending it.
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// Fake siteverify endpoint returning a fixed JSON body and counting calls.
async fn start_oracle(response: &'static str) -> (String, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));

    async fn siteverify(
        State((calls, response)): State<(Arc<AtomicUsize>, &'static str)>,
    ) -> ([(&'static str, &'static str); 1], &'static str) {
        calls.fetch_add(1, Ordering::SeqCst);
        ([("content-type", "application/json")], response)
    }

    let app = Router::new()
        .route("/siteverify", post(siteverify))
        .with_state((Arc::clone(&calls), response));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://127.0.0.1:{port}/siteverify"), calls)
}

struct TestServer {
    base: String,
    oracle_calls: Arc<AtomicUsize>,
    store: Arc<LibSqlBackend>,
    mailer: Arc<RecordingMailer>,
}

/// Start the contact app on a random port.
async fn start_server(oracle_response: &'static str, secret: Option<&str>) -> TestServer {
    let (oracle_url, oracle_calls) = start_oracle(oracle_response).await;

    let config = ContactConfig {
        recaptcha_secret: secret.map(SecretString::from),
        verify_url: oracle_url.clone(),
        notification_email: Some("office@example.com".into()),
        ..ContactConfig::default()
    };
    let store = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let mailer = Arc::new(RecordingMailer::default());
    let verifier = RecaptchaVerifier::new(oracle_url, Duration::from_secs(2)).unwrap();

    let service = Arc::new(ContactService::new(
        config,
        ContactDeps {
            verifier: Arc::new(verifier),
            store: store.clone(),
            email: mailer.clone(),
        },
    ));
    let app = app_router(service, None);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        base: format!("http://127.0.0.1:{port}"),
        oracle_calls,
        store,
        mailer,
    }
}

const PASSING: &str = r#"{"success":true,"score":0.9,"action":"contact_form"}"#;

async fn post_raw(server: &TestServer, body: impl Into<reqwest::Body>) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(format!("{}/api/contact", server.base))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    let json: Value = resp.json().await.unwrap();
    (status, json)
}

async fn post_json(server: &TestServer, body: Value) -> (u16, Value) {
    post_raw(server, serde_json::to_vec(&body).unwrap()).await
}

fn jane() -> Value {
    json!({
        "name": "Jane Doe",
        "phone": "5551234567",
        "message": "Hi",
        "recaptchaToken": "tok",
    })
}

// ── Success path ─────────────────────────────────────────────────────

#[tokio::test]
async fn jane_without_email_is_stored_and_operator_notified() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(PASSING, Some("secret")).await;

        let (status, json) = post_json(&server, jane()).await;
        assert_eq!(status, 201);
        assert_eq!(json["message"], "Thank you! We'll be in touch soon.");

        assert_eq!(server.oracle_calls.load(Ordering::SeqCst), 1);
        assert_eq!(server.store.count_contact_requests().await.unwrap(), 1);

        let sent = server.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "office@example.com");
        assert!(sent[0].text.contains("Phone: (555) 123-4567"));
        assert!(sent[0].text.contains("Email: Not provided"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn submitter_with_email_gets_confirmation() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(PASSING, Some("secret")).await;

        let mut body = jane();
        body["email"] = json!("jane@example.com");
        let (status, _) = post_json(&server, body).await;
        assert_eq!(status, 201);

        let sent = server.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].to, "jane@example.com");
    })
    .await
    .expect("test timed out");
}

// ── Client errors ────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_json_is_400_with_no_side_effects() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(PASSING, Some("secret")).await;

        let (status, json) = post_raw(&server, "{\"name\": ").await;
        assert_eq!(status, 400);
        assert_eq!(json, json!({ "message": "Invalid request payload." }));

        assert_eq!(server.oracle_calls.load(Ordering::SeqCst), 0);
        assert_eq!(server.store.count_contact_requests().await.unwrap(), 0);
        assert!(server.mailer.sent.lock().unwrap().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn validation_errors_are_keyed_by_field() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(PASSING, Some("secret")).await;

        let (status, json) = post_json(
            &server,
            json!({
                "name": "",
                "email": "not-an-email",
                "phone": "555",
                "message": "Hi",
                "recaptchaToken": "tok",
            }),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(
            json["message"],
            "Please correct the highlighted fields and try again."
        );
        assert_eq!(json["errors"]["name"], json!(["Name is required"]));
        assert_eq!(
            json["errors"]["email"],
            json!(["Please enter a valid email address"])
        );
        assert_eq!(
            json["errors"]["phone"],
            json!(["Please enter a valid 10-digit US phone number"])
        );
        assert!(json["errors"].get("message").is_none());
        assert_eq!(server.oracle_calls.load(Ordering::SeqCst), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn low_score_is_400_without_details() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(r#"{"success":true,"score":0.1}"#, Some("secret")).await;

        let (status, json) = post_json(&server, jane()).await;
        assert_eq!(status, 400);
        assert_eq!(
            json,
            json!({ "message": "We couldn't verify your submission. Please try again." })
        );
        assert_eq!(server.store.count_contact_requests().await.unwrap(), 0);
        assert!(server.mailer.sent.lock().unwrap().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn other_action_is_400() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(r#"{"success":true,"action":"other_form"}"#, Some("secret")).await;

        let (status, json) = post_json(&server, jane()).await;
        assert_eq!(status, 400);
        assert!(json.get("errors").is_none());
        assert_eq!(server.store.count_contact_requests().await.unwrap(), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn non_json_oracle_reply_is_400() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server("<html>rate limited</html>", Some("secret")).await;

        let (status, _) = post_json(&server, jane()).await;
        assert_eq!(status, 400);
        assert_eq!(server.store.count_contact_requests().await.unwrap(), 0);
    })
    .await
    .expect("test timed out");
}

// ── Server errors ────────────────────────────────────────────────────

#[tokio::test]
async fn missing_secret_is_500_regardless_of_input() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(PASSING, None).await;

        let (status, json) = post_json(&server, jane()).await;
        assert_eq!(status, 500);
        assert_eq!(
            json["message"],
            "We couldn't submit your request right now. Please try again later."
        );

        let (status, _) = post_json(&server, json!({ "name": "" })).await;
        assert_eq!(status, 500);

        assert_eq!(server.oracle_calls.load(Ordering::SeqCst), 0);
        assert_eq!(server.store.count_contact_requests().await.unwrap(), 0);
    })
    .await
    .expect("test timed out");
}
