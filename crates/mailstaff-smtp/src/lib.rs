//! # mailstaff-smtp
//!
//! SMTP client library used by `mailstaff` to hand a finished message to a
//! submission server.
//!
//! ## Features
//!
//! - **Type-state connection management**: the compiler rejects commands
//!   issued in the wrong session state
//! - **TLS**: implicit TLS (port 465) and STARTTLS upgrades via rustls
//! - **Authentication**: PLAIN and LOGIN
//! - **Envelope handling**: per-recipient refusal reporting, `SIZE` parameter
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailstaff_smtp::{Address, Client};
//! use mailstaff_smtp::connection::connect;
//!
//! #[tokio::main]
//! async fn main() -> mailstaff_smtp::Result<()> {
//!     let stream = connect("smtp.example.com", 587).await?;
//!     let client = Client::from_stream(stream).await?;
//!     let client = client.ehlo("client.example.com").await?;
//!     let client = client.starttls("smtp.example.com", "client.example.com").await?;
//!     let client = client.auth_plain("user@example.com", "password").await?;
//!
//!     let from = Address::new("sender@example.com")?;
//!     let to = vec![Address::new("recipient@example.com")?];
//!
//!     let client = client.mail_from(from, None).await?;
//!     let (client, _refused) = client.recipients(&to).await?;
//!     let client = client.data().await?;
//!     let client = client.send_message(b"Subject: Test\r\n\r\nHello\r\n").await?;
//!
//!     client.quit().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! ┌──────────────┐
//! │  Connected   │ ─── auth_plain() / auth_login() ───→ Authenticated
//! └──────────────┘                                          │
//!        │                                                  │
//!        └────────────── mail_from() ←──────────────────────┘
//!                            │
//!                            ▼
//!                     MailTransaction ─── recipients() ───→ RecipientAdded ─── data() ───→ Data
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use connection::{
    Authenticated, Client, Connected, Data, MailTransaction, RecipientAdded, ServerInfo,
    SmtpConnection,
};
pub use error::{Error, Result};
pub use types::{Address, AuthMechanism, Extension, Mailbox, Reply, ReplyCode};
