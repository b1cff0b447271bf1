//! Turns an [`EmailRequest`] into a wire-ready multipart message.

use crate::diagnostics::Diagnostics;
use crate::error::{Result, SendError};
use crate::request::EmailRequest;
use crate::transport::Envelope;
use mailstaff_mime::{Attachment, Message, MessageBuilder};
use mailstaff_smtp::Mailbox;
use std::path::PathBuf;

/// A composed message together with its SMTP envelope.
#[derive(Debug, Clone)]
pub struct ComposedMessage {
    /// The rendered MIME message.
    pub message: Message,
    /// Envelope sender and recipients (To, CC, then BCC), reduced to bare
    /// addresses.
    pub envelope: Envelope,
    /// File names of the attachments that made it into the message.
    pub attached: Vec<String>,
    /// Attachment paths that did not exist and were skipped.
    pub skipped: Vec<PathBuf>,
}

impl ComposedMessage {
    /// Renders the message in wire format.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.message.to_bytes()
    }
}

/// Composes the message for `request`, sent as `sender_email`.
///
/// Attachment paths that do not exist are logged and skipped. A path that
/// exists but cannot be read fails the whole composition.
///
/// # Errors
///
/// - [`SendError::NoRecipients`] if To, CC and BCC are all empty
/// - [`SendError::InvalidAddress`] if the sender or a recipient is not an
///   address or `Display Name <address>`
/// - [`SendError::Attachment`] if an existing attachment cannot be read
/// - [`SendError::Transmission`] if a header value is malformed
pub fn compose(
    request: &EmailRequest,
    sender_email: &str,
    diagnostics: &dyn Diagnostics,
) -> Result<ComposedMessage> {
    diagnostics.info(&format!(
        "Starting email composition for subject: '{}'",
        request.subject
    ));

    let recipients = request.envelope_recipients();
    if recipients.is_empty() {
        return Err(SendError::NoRecipients);
    }
    let envelope = Envelope::new(
        envelope_address(sender_email)?,
        recipients
            .iter()
            .map(|r| envelope_address(r))
            .collect::<Result<Vec<_>>>()?,
    );

    let mut builder = MessageBuilder::new()
        .from_named(&request.sender_name, sender_email)
        .subject(request.subject.as_str());
    for address in &request.to {
        builder = builder.to(address.as_str());
    }
    for address in &request.cc {
        builder = builder.cc(address.as_str());
    }

    let reply_to = if request.reply_to.is_empty() {
        sender_email.to_string()
    } else {
        request.reply_to.join(", ")
    };
    builder = builder.reply_to(reply_to.as_str());
    diagnostics.info(&format!("Set Reply-To header to: {reply_to}"));

    let sub_type = if request.is_html {
        builder = builder.html_body(request.body.as_str());
        "html"
    } else {
        builder = builder.text_body(request.body.as_str());
        "plain"
    };
    diagnostics.info(&format!("Attached body content as {sub_type}."));

    let mut attached = Vec::new();
    let mut skipped = Vec::new();
    for path in &request.attachments {
        if !path.exists() {
            diagnostics.warn(&format!(
                "Attachment file not found: {}. Skipping.",
                path.display()
            ));
            skipped.push(path.clone());
            continue;
        }

        let attachment = Attachment::from_file(path).map_err(|source| SendError::Attachment {
            path: path.clone(),
            source,
        })?;
        diagnostics.info(&format!(
            "Successfully attached file: {}",
            attachment.filename
        ));
        attached.push(attachment.filename.clone());
        builder = builder.attach(attachment);
    }

    let message = builder
        .build()
        .map_err(|e| SendError::Transmission(e.to_string()))?;

    Ok(ComposedMessage {
        message,
        envelope,
        attached,
        skipped,
    })
}

/// Strips any display name, leaving the address used in `MAIL FROM` and
/// `RCPT TO`.
fn envelope_address(input: &str) -> Result<String> {
    Mailbox::parse(input)
        .map(|mailbox| mailbox.address.as_str().to_string())
        .map_err(|source| SendError::InvalidAddress {
            address: input.to_string(),
            source,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingDiagnostics, Level, NoopDiagnostics};
    use crate::error::SendErrorKind;
    use mailstaff_mime::Part;
    use std::io::Write;

    const SENDER: &str = "staff@example.com";

    #[test]
    fn test_no_recipients() {
        let request = EmailRequest::new("Staff", "S", "hi");
        let err = compose(&request, SENDER, &NoopDiagnostics).unwrap_err();
        assert_eq!(err.kind(), SendErrorKind::NoRecipients);
    }

    #[test]
    fn test_bcc_only_is_enough() {
        let request = EmailRequest::new("Staff", "S", "hi").bcc("b@example.com");
        let composed = compose(&request, SENDER, &NoopDiagnostics).unwrap();

        assert_eq!(composed.envelope.recipients, vec!["b@example.com"]);
        assert!(composed.message.to().is_none());
        assert!(composed.message.cc().is_none());
        assert!(!composed.message.to_string().contains("b@example.com"));
    }

    #[test]
    fn test_headers_and_envelope() {
        let request = EmailRequest::new("Staff Assistant", "Weekly", "hi")
            .to("a@example.com")
            .to("b@example.com")
            .cc("c@example.com")
            .bcc("d@example.com");
        let composed = compose(&request, SENDER, &NoopDiagnostics).unwrap();

        let message = &composed.message;
        assert_eq!(message.from(), Some("Staff Assistant <staff@example.com>"));
        assert_eq!(message.to(), Some("a@example.com, b@example.com"));
        assert_eq!(message.cc(), Some("c@example.com"));
        assert_eq!(message.subject(), Some("Weekly"));
        assert!(!message.headers.contains("Bcc"));

        assert_eq!(composed.envelope.sender, SENDER);
        assert_eq!(
            composed.envelope.recipients,
            vec![
                "a@example.com",
                "b@example.com",
                "c@example.com",
                "d@example.com"
            ]
        );
    }

    #[test]
    fn test_reply_to_defaults_to_sender() {
        let request = EmailRequest::new("Staff", "S", "hi").to("a@example.com");
        let composed = compose(&request, SENDER, &NoopDiagnostics).unwrap();
        assert_eq!(composed.message.reply_to(), Some(SENDER));
    }

    #[test]
    fn test_reply_to_joined() {
        let request = EmailRequest::new("Staff", "S", "hi")
            .to("a@example.com")
            .reply_to("x@example.com")
            .reply_to("y@example.com");
        let diagnostics = CollectingDiagnostics::new();
        let composed = compose(&request, SENDER, &diagnostics).unwrap();

        assert_eq!(
            composed.message.reply_to(),
            Some("x@example.com, y@example.com")
        );
        assert!(
            diagnostics
                .messages(Level::Info)
                .contains(&"Set Reply-To header to: x@example.com, y@example.com".to_string())
        );
    }

    #[test]
    fn test_body_subtype() {
        let html = EmailRequest::new("Staff", "S", "<h1>Report</h1>")
            .to("a@example.com")
            .html(true);
        let composed = compose(&html, SENDER, &NoopDiagnostics).unwrap();
        let body = composed.message.body_part().unwrap();
        assert_eq!(body.content_type().unwrap().essence(), "text/html");
        assert_eq!(body.body_text().unwrap(), "<h1>Report</h1>");

        let plain = EmailRequest::new("Staff", "S", "Report").to("a@example.com");
        let composed = compose(&plain, SENDER, &NoopDiagnostics).unwrap();
        let body = composed.message.body_part().unwrap();
        assert_eq!(body.content_type().unwrap().essence(), "text/plain");
    }

    #[test]
    fn test_missing_attachment_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("jira_req.txt");
        std::fs::File::create(&present)
            .unwrap()
            .write_all(b"MLCS-417")
            .unwrap();
        let missing = dir.path().join("missing.pdf");

        let request = EmailRequest::new("Staff", "S", "hi")
            .to("a@example.com")
            .attach(&missing)
            .attach(&present);
        let diagnostics = CollectingDiagnostics::new();
        let composed = compose(&request, SENDER, &diagnostics).unwrap();

        let attachments: Vec<&Part> = composed.message.attachments().collect();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].filename().as_deref(), Some("jira_req.txt"));
        assert_eq!(attachments[0].decode_body().unwrap(), b"MLCS-417");
        assert_eq!(composed.attached, vec!["jira_req.txt"]);
        assert_eq!(composed.skipped, vec![missing.clone()]);

        let warnings = diagnostics.messages(Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("missing.pdf"));
    }

    #[test]
    fn test_unreadable_attachment_fails() {
        // A directory exists but cannot be read as a file
        let dir = tempfile::tempdir().unwrap();
        let request = EmailRequest::new("Staff", "S", "hi")
            .to("a@example.com")
            .attach(dir.path());

        let err = compose(&request, SENDER, &NoopDiagnostics).unwrap_err();
        assert_eq!(err.kind(), SendErrorKind::Attachment);
    }

    #[test]
    fn test_header_injection_is_transmission_error() {
        let request =
            EmailRequest::new("Staff", "S\r\nBcc: x@example.com", "hi").to("a@example.com");
        let err = compose(&request, SENDER, &NoopDiagnostics).unwrap_err();
        assert_eq!(err.kind(), SendErrorKind::Transmission);
    }

    #[test]
    fn test_display_name_recipients_use_bare_envelope_address() {
        let request = EmailRequest::new("Staff", "S", "hi")
            .to("John Doe <john@example.com>")
            .cc("\"Roe, Jane\" <jane@example.com>")
            .bcc("<audit@example.com>");
        let composed = compose(&request, SENDER, &NoopDiagnostics).unwrap();

        assert_eq!(composed.envelope.sender, SENDER);
        assert_eq!(
            composed.envelope.recipients,
            vec!["john@example.com", "jane@example.com", "audit@example.com"]
        );
        assert_eq!(composed.message.to(), Some("John Doe <john@example.com>"));
    }

    #[test]
    fn test_invalid_recipient_fails_before_sending() {
        let request = EmailRequest::new("Staff", "S", "hi")
            .to("a@example.com")
            .cc("John <not-an-address>");
        let err = compose(&request, SENDER, &NoopDiagnostics).unwrap_err();

        assert_eq!(err.kind(), SendErrorKind::InvalidAddress);
        assert!(err.to_string().contains("'John <not-an-address>'"));

        let request = EmailRequest::new("Staff", "S", "hi").to("a@example.com\r\nBcc: x@example.com");
        let err = compose(&request, SENDER, &NoopDiagnostics).unwrap_err();
        assert_eq!(err.kind(), SendErrorKind::InvalidAddress);
    }
}
