//! The send operation.

use crate::compose::compose;
use crate::config::ClientConfig;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::request::EmailRequest;
use crate::transport::{RefusedRecipient, SmtpTransport, Transport};
use std::path::PathBuf;
use std::sync::Arc;

/// Summary of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReport {
    /// Envelope recipients, To then CC then BCC.
    pub recipients: Vec<String>,
    /// Number of To and CC recipients.
    pub visible_count: usize,
    /// Number of BCC recipients.
    pub bcc_count: usize,
    /// File names that were attached.
    pub attached: Vec<String>,
    /// Attachment paths skipped because they did not exist.
    pub skipped: Vec<PathBuf>,
    /// Recipients the server refused while accepting the others.
    pub refused: Vec<RefusedRecipient>,
}

/// Composes and sends email for one configured sender.
///
/// Each [`send`](Self::send) opens its own connection, so a `Mailer` can be
/// shared between tasks; concurrent sends are independent.
pub struct Mailer<T = SmtpTransport> {
    config: ClientConfig,
    transport: T,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Mailer<SmtpTransport> {
    /// Creates a mailer that delivers over SMTP.
    #[must_use]
    pub fn new(config: ClientConfig, diagnostics: Arc<dyn Diagnostics>) -> Self {
        let transport = SmtpTransport::new(&config);
        Self::with_transport(config, transport, diagnostics)
    }
}

impl<T: Transport> Mailer<T> {
    /// Creates a mailer with a custom transport.
    #[must_use]
    pub fn with_transport(
        config: ClientConfig,
        transport: T,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        diagnostics.info(&format!(
            "Mailer initialized for sender: {}",
            config.sender_email
        ));
        diagnostics.info(&format!(
            "Using SMTP server: {}:{} ({})",
            config.server, config.port, config.security
        ));

        Self {
            config,
            transport,
            diagnostics,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Composes and sends one email.
    ///
    /// A single attempt is made. Every failure is reported through the
    /// diagnostic sink before it is returned.
    ///
    /// # Errors
    ///
    /// See [`SendError`](crate::SendError) for the possible failures.
    pub async fn send(&self, request: &EmailRequest) -> Result<SendReport> {
        match self.try_send(request).await {
            Ok(report) => {
                let diagnostics = &*self.diagnostics;
                diagnostics.info("Email sent successfully!");
                diagnostics.info(&format!("To: {}", request.to.join(", ")));
                diagnostics.info(&format!("CC: {}", request.cc.join(", ")));
                diagnostics.info(&format!("BCC count: {}", report.bcc_count));
                Ok(report)
            }
            Err(err) => {
                self.diagnostics.log(err.level(), &err.to_string());
                Err(err)
            }
        }
    }

    /// Sends and reports only whether it worked.
    pub async fn send_ok(&self, request: &EmailRequest) -> bool {
        self.send(request).await.is_ok()
    }

    async fn try_send(&self, request: &EmailRequest) -> Result<SendReport> {
        let composed = compose(request, &self.config.sender_email, &*self.diagnostics)?;
        let wire = composed.to_bytes();

        let delivery = self
            .transport
            .deliver(&composed.envelope, &wire, &*self.diagnostics)
            .await?;

        Ok(SendReport {
            recipients: composed.envelope.recipients,
            visible_count: request.to.len() + request.cc.len(),
            bcc_count: request.bcc.len(),
            attached: composed.attached,
            skipped: composed.skipped,
            refused: delivery.refused,
        })
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Mailer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer")
            .field("config", &self.config)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}
