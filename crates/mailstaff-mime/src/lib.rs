//! # mailstaff-mime
//!
//! MIME message generation for outgoing email.
//!
//! ## Features
//!
//! - **Ordered headers**: headers render in insertion order, long values are
//!   folded at whitespace
//! - **Multipart/mixed messages**: one body part plus any number of
//!   attachments, with a collision-free random boundary
//! - **Encoding**: Base64 (76-column lines) and RFC 2047 header encoding
//!
//! ## Building a message
//!
//! ```ignore
//! use mailstaff_mime::{Attachment, MessageBuilder};
//!
//! let message = MessageBuilder::new()
//!     .from("Staff Assistant <staff@example.com>")
//!     .to("recipient@example.com")
//!     .subject("Weekly report")
//!     .html_body("<h1>Report</h1>")
//!     .attach(Attachment::from_file("report.pdf")?)
//!     .build()?;
//!
//! let wire = message.to_bytes();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod builder;
mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use builder::{Attachment, MessageBuilder};
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{Message, Part, TransferEncoding};
