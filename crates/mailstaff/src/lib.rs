//! # mailstaff
//!
//! Compose a multipart email (text or HTML body, attachments, CC/BCC and
//! Reply-To) and send it over SMTP with STARTTLS or implicit TLS, reporting
//! every step to a diagnostic sink.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use mailstaff::{ClientConfig, EmailRequest, Mailer, TracingDiagnostics};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::from_env()?;
//!     let mailer = Mailer::new(config, Arc::new(TracingDiagnostics));
//!
//!     let request = EmailRequest::new("Staff Assistant", "Weekly report", "<h1>Done</h1>")
//!         .to("team@example.com")
//!         .bcc("archive@example.com")
//!         .attach("report.pdf")
//!         .html(true);
//!
//!     let report = mailer.send(&request).await?;
//!     println!("delivered to {} recipients", report.recipients.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Send sequence
//!
//! ```text
//! compose ──→ connect (TLS on 465, else STARTTLS) ──→ AUTH ──→ MAIL/RCPT/DATA ──→ QUIT
//!    │               │                                  │             │
//!    ▼               ▼                                  ▼             ▼
//! NoRecipients   Connection                      Authentication  Transmission
//! InvalidAddress
//! Attachment
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod compose;
pub mod config;
pub mod diagnostics;
mod error;
mod mailer;
mod request;
pub mod transport;

pub use compose::{ComposedMessage, compose};
pub use config::{ClientConfig, ConfigError, Security};
pub use diagnostics::{CollectingDiagnostics, Diagnostics, Level, NoopDiagnostics, TracingDiagnostics};
pub use error::{Result, SendError, SendErrorKind};
pub use mailer::{Mailer, SendReport};
pub use request::EmailRequest;
pub use transport::{Delivery, Envelope, SmtpTransport, Transport};
