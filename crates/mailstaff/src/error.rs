//! Send failure taxonomy.

use crate::diagnostics::Level;
use std::path::PathBuf;

/// Result type alias for send operations.
pub type Result<T> = std::result::Result<T, SendError>;

/// Reasons a send can fail.
///
/// The `Display` text is what gets logged at the end of a failed send.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// To, CC and BCC were all empty. Nothing was sent.
    #[error("No recipients provided. Aborting send operation.")]
    NoRecipients,

    /// An attachment that exists could not be read.
    #[error("Error attaching file {}: {source}", path.display())]
    Attachment {
        /// The offending path.
        path: PathBuf,
        /// Underlying failure.
        source: mailstaff_mime::Error,
    },

    /// A sender or recipient address could not be parsed. Nothing was sent.
    #[error("Invalid email address '{address}'. Aborting send operation. Error: {source}")]
    InvalidAddress {
        /// The address as given.
        address: String,
        /// Underlying parse failure.
        source: mailstaff_smtp::Error,
    },

    /// The server rejected the credentials.
    #[error(
        "SMTP Authentication Failed. Check SENDER_EMAIL and SENDER_PASSWORD/App Password. Error: {0}"
    )]
    Authentication(String),

    /// The server could not be reached or the session could not be secured.
    #[error("SMTP Connection Error. Check server address and port. Error: {0}")]
    Connection(String),

    /// Any other failure while composing or transmitting.
    #[error("An unexpected error occurred during email transmission: {0}")]
    Transmission(String),
}

/// Discriminant of [`SendError`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SendErrorKind {
    /// See [`SendError::NoRecipients`].
    NoRecipients,
    /// See [`SendError::Attachment`].
    Attachment,
    /// See [`SendError::InvalidAddress`].
    InvalidAddress,
    /// See [`SendError::Authentication`].
    Authentication,
    /// See [`SendError::Connection`].
    Connection,
    /// See [`SendError::Transmission`].
    Transmission,
}

impl SendError {
    /// Returns the error category.
    #[must_use]
    pub const fn kind(&self) -> SendErrorKind {
        match self {
            Self::NoRecipients => SendErrorKind::NoRecipients,
            Self::Attachment { .. } => SendErrorKind::Attachment,
            Self::InvalidAddress { .. } => SendErrorKind::InvalidAddress,
            Self::Authentication(_) => SendErrorKind::Authentication,
            Self::Connection(_) => SendErrorKind::Connection,
            Self::Transmission(_) => SendErrorKind::Transmission,
        }
    }

    /// Returns the severity this error is reported at.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.kind().level()
    }
}

impl SendErrorKind {
    /// Returns the severity errors of this kind are reported at.
    #[must_use]
    pub const fn level(self) -> Level {
        match self {
            Self::Authentication | Self::Connection => Level::Critical,
            Self::NoRecipients | Self::Attachment | Self::InvalidAddress | Self::Transmission => {
                Level::Error
            }
        }
    }
}
