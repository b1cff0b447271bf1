//! MIME message structure and rendering.

use crate::content_type::{ContentType, quote_parameter};
use crate::encoding::{decode_base64, encode_base64_lines};
use crate::error::Result;
use crate::header::Headers;
use std::fmt;

/// Longest line allowed in a 7bit body (RFC 5322, excluding CRLF).
const MAX_7BIT_LINE: usize = 998;

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// Base64 encoding.
    Base64,
}

impl TransferEncoding {
    /// Parses transfer encoding from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("base64") {
            Self::Base64
        } else {
            Self::SevenBit
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::Base64 => write!(f, "base64"),
        }
    }
}

/// MIME message part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Part headers.
    pub headers: Headers,
    /// Part body as transmitted (already transfer-encoded).
    pub body: Vec<u8>,
}

impl Part {
    /// Creates a new part.
    #[must_use]
    pub const fn new(headers: Headers, body: Vec<u8>) -> Self {
        Self { headers, body }
    }

    /// Creates a `text/<sub_type>` body part.
    ///
    /// ASCII content with short lines is sent as 7bit with CRLF line endings
    /// and an `us-ascii` charset; anything else is UTF-8 in Base64.
    #[must_use]
    pub fn text(content: &str, sub_type: &str) -> Self {
        let seven_bit = content.is_ascii() && content.lines().all(|l| l.len() <= MAX_7BIT_LINE);

        let mut headers = Headers::new();
        let (charset, encoding, body) = if seven_bit {
            ("us-ascii", TransferEncoding::SevenBit, normalize_crlf(content))
        } else {
            (
                "utf-8",
                TransferEncoding::Base64,
                encode_base64_lines(content.as_bytes()).into_bytes(),
            )
        };

        headers.add(
            "Content-Type",
            ContentType::text(sub_type, charset).to_string(),
        );
        headers.add("Content-Transfer-Encoding", encoding.to_string());

        Self::new(headers, body)
    }

    /// Creates an `application/octet-stream` attachment part, Base64-encoded.
    #[must_use]
    pub fn attachment(filename: &str, content: &[u8]) -> Self {
        let mut headers = Headers::new();
        headers.add("Content-Type", ContentType::octet_stream().to_string());
        headers.add(
            "Content-Transfer-Encoding",
            TransferEncoding::Base64.to_string(),
        );
        headers.add(
            "Content-Disposition",
            format!("attachment; filename={}", quote_parameter(filename)),
        );

        Self::new(headers, encode_base64_lines(content).into_bytes())
    }

    /// Gets the content type, defaulting to `text/plain`.
    ///
    /// # Errors
    ///
    /// Returns an error if content type header is invalid.
    pub fn content_type(&self) -> Result<ContentType> {
        self.headers.get("content-type").map_or_else(
            || Ok(ContentType::text("plain", "us-ascii")),
            ContentType::parse,
        )
    }

    /// Gets the transfer encoding.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.headers
            .get("content-transfer-encoding")
            .map_or(TransferEncoding::SevenBit, TransferEncoding::parse)
    }

    /// Returns true if the part carries an `attachment` disposition.
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        self.headers.get("content-disposition").is_some_and(|d| {
            d.split(';')
                .next()
                .is_some_and(|kind| kind.trim().eq_ignore_ascii_case("attachment"))
        })
    }

    /// Returns the `filename` parameter of the content disposition.
    #[must_use]
    pub fn filename(&self) -> Option<String> {
        let disposition = self.headers.get("content-disposition")?;
        disposition.split(';').skip(1).find_map(|param| {
            let (key, value) = param.trim().split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("filename")
                .then(|| value.trim().trim_matches('"').to_string())
        })
    }

    /// Decodes the body according to the transfer encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails.
    pub fn decode_body(&self) -> Result<Vec<u8>> {
        match self.transfer_encoding() {
            TransferEncoding::Base64 => decode_base64(&String::from_utf8_lossy(&self.body)),
            TransferEncoding::SevenBit => Ok(self.body.clone()),
        }
    }

    /// Gets the decoded body as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding or UTF-8 conversion fails.
    pub fn body_text(&self) -> Result<String> {
        String::from_utf8(self.decode_body()?).map_err(Into::into)
    }
}

/// Multipart MIME message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Top-level headers, including `Content-Type` with the boundary.
    pub headers: Headers,
    /// Message parts, in order.
    pub parts: Vec<Part>,
    boundary: String,
}

impl Message {
    /// Creates a multipart/mixed message.
    ///
    /// `MIME-Version` and `Content-Type` are set from `boundary`, replacing
    /// any values already in `headers`.
    #[must_use]
    pub fn multipart_mixed(mut headers: Headers, boundary: String, parts: Vec<Part>) -> Self {
        headers.set("MIME-Version", "1.0");
        headers.set(
            "Content-Type",
            ContentType::multipart_mixed(boundary.as_str()).to_string(),
        );
        Self {
            headers,
            parts,
            boundary,
        }
    }

    /// Returns the multipart boundary.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Gets the first value of a top-level header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Gets the From header.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        self.headers.get("from")
    }

    /// Gets the To header.
    #[must_use]
    pub fn to(&self) -> Option<&str> {
        self.headers.get("to")
    }

    /// Gets the Cc header.
    #[must_use]
    pub fn cc(&self) -> Option<&str> {
        self.headers.get("cc")
    }

    /// Gets the Reply-To header.
    #[must_use]
    pub fn reply_to(&self) -> Option<&str> {
        self.headers.get("reply-to")
    }

    /// Gets the Subject header.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.headers.get("subject")
    }

    /// Returns the first part that is not an attachment.
    #[must_use]
    pub fn body_part(&self) -> Option<&Part> {
        self.parts.iter().find(|p| !p.is_attachment())
    }

    /// Returns the attachment parts in order.
    pub fn attachments(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|p| p.is_attachment())
    }

    /// Renders the message in wire format.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\r\n", self.headers)?;

        for part in &self.parts {
            write!(f, "--{}\r\n{}\r\n", self.boundary, part.headers)?;
            let body = String::from_utf8_lossy(&part.body);
            f.write_str(&body)?;
            if !body.ends_with("\r\n") {
                f.write_str("\r\n")?;
            }
        }

        write!(f, "--{}--\r\n", self.boundary)
    }
}

/// Converts bare LF and CR line endings to CRLF.
fn normalize_crlf(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + text.len() / 40);
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.extend_from_slice(b"\r\n");
            }
            '\n' => out.extend_from_slice(b"\r\n"),
            _ => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
        }
    }

    out
}
