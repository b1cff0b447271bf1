//! Per-send email request.

use std::path::PathBuf;

/// Everything needed to compose one email.
///
/// Recipients are kept in the order given; duplicates are not removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailRequest {
    /// Display name shown in `From`.
    pub sender_name: String,
    /// Primary recipients.
    pub to: Vec<String>,
    /// Carbon-copy recipients.
    pub cc: Vec<String>,
    /// Blind carbon-copy recipients (envelope only).
    pub bcc: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Body content, sent verbatim.
    pub body: String,
    /// Whether `body` is HTML.
    pub is_html: bool,
    /// Reply-To addresses; empty means "reply to the sender".
    pub reply_to: Vec<String>,
    /// Files to attach, in order.
    pub attachments: Vec<PathBuf>,
}

impl EmailRequest {
    /// Creates a plain-text request with no recipients.
    #[must_use]
    pub fn new(
        sender_name: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender_name: sender_name.into(),
            subject: subject.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Adds a recipient.
    #[must_use]
    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        self.to.push(recipient.into());
        self
    }

    /// Adds a CC recipient.
    #[must_use]
    pub fn cc(mut self, recipient: impl Into<String>) -> Self {
        self.cc.push(recipient.into());
        self
    }

    /// Adds a BCC recipient.
    #[must_use]
    pub fn bcc(mut self, recipient: impl Into<String>) -> Self {
        self.bcc.push(recipient.into());
        self
    }

    /// Adds a Reply-To address.
    #[must_use]
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to.push(address.into());
        self
    }

    /// Adds an attachment path.
    #[must_use]
    pub fn attach(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachments.push(path.into());
        self
    }

    /// Marks the body as HTML (or plain text).
    #[must_use]
    pub const fn html(mut self, is_html: bool) -> Self {
        self.is_html = is_html;
        self
    }

    /// Returns all envelope recipients: To, then CC, then BCC.
    #[must_use]
    pub fn envelope_recipients(&self) -> Vec<String> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .cloned()
            .collect()
    }
}
