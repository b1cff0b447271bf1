//! Message delivery.
//!
//! [`Transport`] is the seam between composing and sending: the
//! [`Mailer`](crate::Mailer) hands it an envelope and the rendered message,
//! and the transport owns everything that touches the network.

mod smtp;

pub use mailstaff_smtp::connection::RefusedRecipient;
pub use smtp::SmtpTransport;

use crate::diagnostics::Diagnostics;
use crate::error::SendError;
use std::future::Future;

/// SMTP envelope: who the message is from and who receives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// `MAIL FROM` address.
    pub sender: String,
    /// `RCPT TO` addresses, in order.
    pub recipients: Vec<String>,
}

impl Envelope {
    /// Creates an envelope.
    #[must_use]
    pub fn new(sender: impl Into<String>, recipients: Vec<String>) -> Self {
        Self {
            sender: sender.into(),
            recipients,
        }
    }
}

/// Outcome of a successful delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Recipients the server refused while accepting the others.
    pub refused: Vec<RefusedRecipient>,
}

/// Delivers one rendered message per call.
pub trait Transport: Send + Sync {
    /// Delivers `message` to the envelope recipients.
    ///
    /// Progress is reported through `diagnostics`; the final outcome is
    /// reported by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Connection`], [`SendError::Authentication`] or
    /// [`SendError::Transmission`] depending on the failing step.
    fn deliver(
        &self,
        envelope: &Envelope,
        message: &[u8],
        diagnostics: &dyn Diagnostics,
    ) -> impl Future<Output = Result<Delivery, SendError>> + Send;
}
