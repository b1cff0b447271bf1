//! Builder for outgoing multipart messages.

use crate::encoding::encode_rfc2047;
use crate::error::{Error, Result};
use crate::header::Headers;
use crate::message::{Message, Part};
use chrono::{DateTime, FixedOffset, Local};
use rand::Rng;
use std::io;
use std::path::Path;

/// A file to be attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown to the recipient.
    pub filename: String,
    /// Raw file content.
    pub content: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment from in-memory content.
    #[must_use]
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }

    /// Reads an attachment from disk, named after the path's final component.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read or the path has no
    /// file name.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no file name", path.display()),
                )
            })?;

        let content = std::fs::read(path)?;
        Ok(Self::new(filename, content))
    }

    /// Converts the attachment into a MIME part.
    #[must_use]
    pub fn into_part(self) -> Part {
        Part::attachment(&self.filename, &self.content)
    }
}

/// Builder for a `multipart/mixed` message with one body part and any
/// number of attachments.
///
/// Headers are rendered in a fixed order: `From`, `To`, `Cc`, `Subject`,
/// `Reply-To`, `Date`, `MIME-Version`, `Content-Type`. Empty address lists
/// are omitted. There is no `bcc` setter; blind copies live only in the
/// SMTP envelope.
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    from: Option<String>,
    to: Vec<String>,
    cc: Vec<String>,
    reply_to: Vec<String>,
    subject: Option<String>,
    date: Option<DateTime<FixedOffset>>,
    body: Option<(String, &'static str)>,
    attachments: Vec<Attachment>,
}

impl MessageBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `From` header verbatim.
    #[must_use]
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Sets `From` to `name <address>`, encoding a non-ASCII name.
    ///
    /// A blank name yields the bare address.
    #[must_use]
    pub fn from_named(self, name: &str, address: &str) -> Self {
        let name = name.trim();
        if name.is_empty() {
            return self.from(address);
        }
        self.from(format!("{} <{address}>", encode_rfc2047(name, "utf-8")))
    }

    /// Adds a `To` recipient.
    #[must_use]
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    /// Adds a `Cc` recipient.
    #[must_use]
    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    /// Adds a `Reply-To` address.
    #[must_use]
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to.push(address.into());
        self
    }

    /// Sets the subject. Non-ASCII text is RFC 2047 encoded on build.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Overrides the `Date` header (defaults to the local time at build).
    #[must_use]
    pub const fn date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets a `text/plain` body.
    #[must_use]
    pub fn text_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some((body.into(), "plain"));
        self
    }

    /// Sets a `text/html` body.
    #[must_use]
    pub fn html_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some((body.into(), "html"));
        self
    }

    /// Appends an attachment.
    #[must_use]
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Builds the message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingHeader`] if no sender was set, or
    /// [`Error::InvalidHeader`] if an address contains a line break.
    pub fn build(self) -> Result<Message> {
        let from = self
            .from
            .ok_or_else(|| Error::MissingHeader("From".to_string()))?;

        let mut headers = Headers::new();
        headers.add("From", from);
        if !self.to.is_empty() {
            headers.add("To", self.to.join(", "));
        }
        if !self.cc.is_empty() {
            headers.add("Cc", self.cc.join(", "));
        }
        if let Some(subject) = &self.subject {
            headers.add("Subject", encode_rfc2047(subject, "utf-8"));
        }
        if !self.reply_to.is_empty() {
            headers.add("Reply-To", self.reply_to.join(", "));
        }
        let date = self.date.unwrap_or_else(|| Local::now().fixed_offset());
        headers.add("Date", date.to_rfc2822());
        headers.validate()?;

        let mut parts = Vec::with_capacity(self.attachments.len() + 1);
        if let Some((body, sub_type)) = &self.body {
            parts.push(Part::text(body, sub_type));
        }
        parts.extend(self.attachments.into_iter().map(Attachment::into_part));

        let boundary = unique_boundary(&parts);
        Ok(Message::multipart_mixed(headers, boundary, parts))
    }
}

/// Generates a random boundary that does not occur in any part.
fn unique_boundary(parts: &[Part]) -> String {
    let token: u64 = rand::thread_rng().gen_range(0..=9_999_999_999_999_999_999);
    let base = format!("{}{token:019}==", "=".repeat(15));

    let rendered: Vec<String> = parts
        .iter()
        .map(|part| format!("{}{}", part.headers, String::from_utf8_lossy(&part.body)))
        .collect();

    let mut boundary = base.clone();
    let mut counter = 0u32;
    while rendered.iter().any(|text| text.contains(&format!("--{boundary}"))) {
        boundary = format!("{base}.{counter}");
        counter += 1;
    }
    boundary
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    fn fixed_date() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc2822("Thu, 15 Jan 2026 09:30:00 +0100").unwrap()
    }

    #[test]
    fn test_header_order() {
        let message = MessageBuilder::new()
            .from_named("Staff Assistant", "staff@example.com")
            .to("a@example.com")
            .to("b@example.com")
            .cc("c@example.com")
            .reply_to("r@example.com")
            .subject("Report")
            .date(fixed_date())
            .text_body("hi")
            .build()
            .unwrap();

        let names: Vec<&str> = message.headers.iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![
                "From",
                "To",
                "Cc",
                "Subject",
                "Reply-To",
                "Date",
                "MIME-Version",
                "Content-Type"
            ]
        );
        assert_eq!(message.from(), Some("Staff Assistant <staff@example.com>"));
        assert_eq!(message.to(), Some("a@example.com, b@example.com"));
        assert_eq!(message.header("Date"), Some("Thu, 15 Jan 2026 09:30:00 +0100"));
    }

    #[test]
    fn test_empty_lists_are_omitted() {
        let message = MessageBuilder::new()
            .from("staff@example.com")
            .subject("S")
            .text_body("hi")
            .build()
            .unwrap();

        assert!(message.to().is_none());
        assert!(message.cc().is_none());
        assert!(message.reply_to().is_none());
        assert!(!message.headers.contains("Bcc"));
    }

    #[test]
    fn test_missing_from() {
        let result = MessageBuilder::new().to("a@example.com").build();
        assert!(matches!(result, Err(Error::MissingHeader(_))));
    }

    #[test]
    fn test_blank_display_name_gives_bare_from() {
        let message = MessageBuilder::new()
            .from_named("  ", "staff@example.com")
            .to("a@example.com")
            .build()
            .unwrap();
        assert_eq!(message.from(), Some("staff@example.com"));
    }

    #[test]
    fn test_address_injection_rejected() {
        let result = MessageBuilder::new()
            .from("staff@example.com")
            .to("a@example.com\r\nBcc: spy@example.com")
            .build();
        assert!(matches!(result, Err(Error::InvalidHeader(_))));
    }

    #[test]
    fn test_non_ascii_name_and_subject_encoded() {
        let message = MessageBuilder::new()
            .from_named("Zoë", "staff@example.com")
            .subject("Héllo")
            .text_body("hi")
            .build()
            .unwrap();

        assert_eq!(message.from(), Some("=?utf-8?B?Wm/Dqw==?= <staff@example.com>"));
        assert_eq!(message.subject(), Some("=?utf-8?B?SMOpbGxv?="));
    }

    #[test]
    fn test_boundary_format() {
        let message = MessageBuilder::new()
            .from("staff@example.com")
            .text_body("hi")
            .build()
            .unwrap();

        let boundary = message.boundary();
        assert_eq!(boundary.len(), 36);
        assert!(boundary.starts_with("==============="));
        assert!(boundary.ends_with("=="));
        assert!(boundary[15..34].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_boundary_avoids_collision() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain");
        let part = Part::new(headers, b"--taken\r\n".to_vec());

        let boundary = unique_boundary(std::slice::from_ref(&part));
        let text = String::from_utf8_lossy(&part.body).into_owned();
        assert!(!text.contains(&format!("--{boundary}")));
    }

    #[test]
    fn test_attachment_from_file() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"%PDF-1.4").unwrap();

        let attachment = Attachment::from_file(file.path()).unwrap();
        let expected = file.path().file_name().unwrap().to_string_lossy();
        assert_eq!(attachment.filename, expected);
        assert_eq!(attachment.content, b"%PDF-1.4");
    }

    #[test]
    fn test_attachment_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Attachment::from_file(dir.path().join("missing.txt"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_parts_in_order() {
        let message = MessageBuilder::new()
            .from("staff@example.com")
            .html_body("<b>hi</b>")
            .attach(Attachment::new("one.txt", b"1".to_vec()))
            .attach(Attachment::new("two.txt", b"2".to_vec()))
            .build()
            .unwrap();

        assert_eq!(message.parts.len(), 3);
        let body = message.body_part().unwrap();
        assert_eq!(body.content_type().unwrap().essence(), "text/html");
        let names: Vec<String> = message.attachments().filter_map(Part::filename).collect();
        assert_eq!(names, vec!["one.txt", "two.txt"]);
    }

    proptest! {
        #[test]
        fn prop_any_subject_yields_parseable_headers(subject in "\\PC*|[\\x00-\\x7f]{0,120}") {
            let message = MessageBuilder::new()
                .from("staff@example.com")
                .to("a@example.com")
                .subject(subject)
                .text_body("hi")
                .build()
                .unwrap();

            let rendered = message.to_string();
            let (head, _) = rendered.split_once("\r\n\r\n").unwrap();
            prop_assert!(!head.replace("\r\n", "").contains(['\r', '\n']));

            let parsed = Headers::parse(head).unwrap();
            prop_assert!(parsed.contains("Subject"));
            prop_assert_eq!(parsed.get("To"), Some("a@example.com"));
            prop_assert!(!parsed.contains("Bcc"));
        }
    }
}
