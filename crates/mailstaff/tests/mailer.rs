//! Tests for the send operation against an in-memory transport.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Write;
use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use mailstaff::{
    ClientConfig, CollectingDiagnostics, Delivery, Diagnostics, EmailRequest, Envelope, Level,
    Mailer, SendError, SendErrorKind, Transport,
};

const SENDER: &str = "staff@example.com";

/// Transport that records every delivery and optionally fails.
#[derive(Debug, Default)]
struct RecordingTransport {
    fail_with: Option<SendErrorKind>,
    calls: Mutex<Vec<(Envelope, Vec<u8>)>>,
}

impl RecordingTransport {
    fn failing(kind: SendErrorKind) -> Self {
        Self {
            fail_with: Some(kind),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<(Envelope, Vec<u8>)> {
        self.calls.lock().unwrap().clone()
    }

    fn wire(&self) -> String {
        let calls = self.calls();
        assert_eq!(calls.len(), 1);
        String::from_utf8(calls[0].1.clone()).unwrap()
    }
}

impl Transport for RecordingTransport {
    async fn deliver(
        &self,
        envelope: &Envelope,
        message: &[u8],
        diagnostics: &dyn Diagnostics,
    ) -> Result<Delivery, SendError> {
        diagnostics.info("Recording delivery");
        self.calls
            .lock()
            .unwrap()
            .push((envelope.clone(), message.to_vec()));

        match self.fail_with {
            None => Ok(Delivery::default()),
            Some(SendErrorKind::Authentication) => {
                Err(SendError::Authentication("535 credentials invalid".into()))
            }
            Some(SendErrorKind::Connection) => {
                Err(SendError::Connection("connection refused".into()))
            }
            Some(_) => Err(SendError::Transmission("554 transaction failed".into())),
        }
    }
}

fn mailer(transport: RecordingTransport) -> (Mailer<RecordingTransport>, Arc<CollectingDiagnostics>) {
    let config = ClientConfig::new("smtp.example.com", 587, SENDER, "secret");
    let sink = Arc::new(CollectingDiagnostics::new());
    (Mailer::with_transport(config, transport, sink.clone()), sink)
}

/// Returns the top-level header block of a rendered message.
fn head(wire: &str) -> &str {
    wire.split_once("\r\n\r\n").map_or(wire, |(head, _)| head)
}

#[tokio::test]
async fn test_no_recipients_never_reaches_transport() {
    let (mailer, sink) = mailer(RecordingTransport::default());

    let request = EmailRequest::new("Staff", "S", "hi");
    assert!(!mailer.send_ok(&request).await);
    assert!(mailer.transport().calls().is_empty());

    assert_eq!(
        sink.messages(Level::Error),
        vec!["No recipients provided. Aborting send operation.".to_string()]
    );
}

#[tokio::test]
async fn test_initialization_is_logged() {
    let (_mailer, sink) = mailer(RecordingTransport::default());
    let info = sink.messages(Level::Info);
    assert_eq!(info[0], "Mailer initialized for sender: staff@example.com");
    assert!(info[1].starts_with("Using SMTP server: smtp.example.com:587"));
}

#[tokio::test]
async fn test_envelope_is_to_cc_bcc() {
    let (mailer, _) = mailer(RecordingTransport::default());

    let request = EmailRequest::new("Staff", "S", "hi")
        .bcc("z@example.com")
        .cc("c@example.com")
        .to("a@example.com")
        .to("b@example.com");
    let report = mailer.send(&request).await.unwrap();

    let calls = mailer.transport().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.sender, SENDER);
    assert_eq!(
        calls[0].0.recipients,
        vec![
            "a@example.com",
            "b@example.com",
            "c@example.com",
            "z@example.com"
        ]
    );
    assert_eq!(report.recipients, calls[0].0.recipients);

    let wire = mailer.transport().wire();
    assert!(!head(&wire).contains("z@example.com"));
    assert!(head(&wire).contains("Cc: c@example.com"));
}

#[tokio::test]
async fn test_reply_to_defaults_to_sender() {
    let (mailer, _) = mailer(RecordingTransport::default());

    let request = EmailRequest::new("Staff", "S", "hi").to("a@example.com");
    mailer.send(&request).await.unwrap();

    assert!(head(&mailer.transport().wire()).contains("Reply-To: staff@example.com"));
}

#[tokio::test]
async fn test_html_and_plain_subtypes() {
    let (mailer, _) = mailer(RecordingTransport::default());
    let html = EmailRequest::new("Staff", "S", "<h1>Report</h1>")
        .to("a@example.com")
        .html(true);
    mailer.send(&html).await.unwrap();
    let wire = mailer.transport().wire();
    assert!(wire.contains("Content-Type: text/html; charset=us-ascii"));
    assert!(wire.contains("<h1>Report</h1>"));

    let (mailer, _) = self::mailer(RecordingTransport::default());
    let plain = EmailRequest::new("Staff", "S", "Report").to("a@example.com");
    mailer.send(&plain).await.unwrap();
    let wire = mailer.transport().wire();
    assert!(wire.contains("Content-Type: text/plain; charset=us-ascii"));
    assert!(!wire.contains("text/html"));
}

#[tokio::test]
async fn test_missing_attachment_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let present = dir.path().join("jira_req.txt");
    std::fs::File::create(&present)
        .unwrap()
        .write_all(b"MLCS-417 Feature Drift Monitoring")
        .unwrap();
    let missing = dir.path().join("does_not_exist.pdf");

    let (mailer, sink) = mailer(RecordingTransport::default());
    let request = EmailRequest::new("Staff", "S", "hi")
        .to("a@example.com")
        .attach(&present)
        .attach(&missing);
    let report = mailer.send(&request).await.unwrap();

    assert_eq!(report.attached, vec!["jira_req.txt"]);
    assert_eq!(report.skipped, vec![missing]);

    let wire = mailer.transport().wire();
    assert_eq!(wire.matches("Content-Disposition: attachment").count(), 1);
    assert!(wire.contains("filename=jira_req.txt"));

    assert_eq!(sink.messages(Level::Warn).len(), 1);
    assert!(
        sink.messages(Level::Info)
            .contains(&"Successfully attached file: jira_req.txt".to_string())
    );
}

#[tokio::test]
async fn test_unreadable_attachment_never_reaches_transport() {
    let dir = tempfile::tempdir().unwrap();
    let (mailer, sink) = mailer(RecordingTransport::default());

    let request = EmailRequest::new("Staff", "S", "hi")
        .to("a@example.com")
        .attach(dir.path());
    let err = mailer.send(&request).await.unwrap_err();

    assert_eq!(err.kind(), SendErrorKind::Attachment);
    assert!(mailer.transport().calls().is_empty());
    assert_eq!(sink.messages(Level::Error).len(), 1);
}

#[tokio::test]
async fn test_invalid_recipient_never_reaches_transport() {
    let (mailer, sink) = mailer(RecordingTransport::default());

    let request = EmailRequest::new("Staff", "S", "hi")
        .to("a@example.com")
        .bcc("Audit <audit at example.com>");
    let err = mailer.send(&request).await.unwrap_err();

    assert_eq!(err.kind(), SendErrorKind::InvalidAddress);
    assert!(mailer.transport().calls().is_empty());
    let errors = sink.messages(Level::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Invalid email address 'Audit <audit at example.com>'."));
}

#[tokio::test]
async fn test_auth_and_connection_failures_are_distinct() {
    let (auth_mailer, auth_sink) = mailer(RecordingTransport::failing(SendErrorKind::Authentication));
    let (conn_mailer, conn_sink) = mailer(RecordingTransport::failing(SendErrorKind::Connection));
    let request = EmailRequest::new("Staff", "S", "hi").to("a@example.com");

    let auth_err = auth_mailer.send(&request).await.unwrap_err();
    let conn_err = conn_mailer.send(&request).await.unwrap_err();
    assert_eq!(auth_err.kind(), SendErrorKind::Authentication);
    assert_eq!(conn_err.kind(), SendErrorKind::Connection);

    let auth_logged = auth_sink.messages(Level::Critical);
    let conn_logged = conn_sink.messages(Level::Critical);
    assert_eq!(auth_logged.len(), 1);
    assert_eq!(conn_logged.len(), 1);
    assert!(auth_logged[0].starts_with("SMTP Authentication Failed"));
    assert!(conn_logged[0].starts_with("SMTP Connection Error"));
}

#[tokio::test]
async fn test_transmission_failure_is_error_level() {
    let (mailer, sink) = mailer(RecordingTransport::failing(SendErrorKind::Transmission));
    let request = EmailRequest::new("Staff", "S", "hi").to("a@example.com");

    assert!(!mailer.send_ok(&request).await);
    assert!(sink.messages(Level::Critical).is_empty());
    let errors = sink.messages(Level::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("An unexpected error occurred during email transmission"));
    assert!(
        !sink
            .messages(Level::Info)
            .contains(&"Email sent successfully!".to_string())
    );
}

fn addresses(domain: &'static str) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 0..4)
        .prop_map(move |locals| locals.into_iter().map(|l| format!("{l}@{domain}")).collect())
}

proptest! {
    #[test]
    fn prop_envelope_order_and_hidden_bcc(
        to in addresses("to.example"),
        cc in addresses("cc.example"),
        bcc in addresses("bcc.example"),
    ) {
        let (mailer, _) = mailer(RecordingTransport::default());
        let request = EmailRequest {
            sender_name: "Staff".into(),
            to: to.clone(),
            cc: cc.clone(),
            bcc: bcc.clone(),
            subject: "S".into(),
            body: "hi".into(),
            ..EmailRequest::default()
        };

        let result = tokio_test::block_on(mailer.send(&request));
        let expected: Vec<String> = to.iter().chain(&cc).chain(&bcc).cloned().collect();

        if expected.is_empty() {
            prop_assert_eq!(result.unwrap_err().kind(), SendErrorKind::NoRecipients);
            prop_assert!(mailer.transport().calls().is_empty());
        } else {
            prop_assert!(result.is_ok());
            let calls = mailer.transport().calls();
            prop_assert_eq!(&calls[0].0.recipients, &expected);

            let wire = String::from_utf8(calls[0].1.clone()).unwrap();
            prop_assert!(!wire.contains("@bcc.example"));
            prop_assert_eq!(head(&wire).contains("\r\nTo: "), !to.is_empty());
            prop_assert_eq!(head(&wire).contains("\r\nCc: "), !cc.is_empty());
        }
    }
}
