//! SMTP delivery over `mailstaff-smtp`.

use super::{Delivery, Envelope, Transport};
use crate::config::{ClientConfig, Security};
use crate::diagnostics::Diagnostics;
use crate::error::SendError;
use mailstaff_smtp::connection::{RefusedRecipient, connect, connect_tls};
use mailstaff_smtp::{
    Address, AuthMechanism, Authenticated, Client, Connected, Error as SmtpError, SmtpConnection,
};
use secrecy::{ExposeSecret, SecretString};

/// Sends mail through one SMTP server, opening a fresh connection per
/// message.
///
/// The connection is owned by the delivery future and closed on every exit
/// path: `QUIT` on success, dropped on failure.
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    server: String,
    port: u16,
    security: Security,
    client_hostname: String,
    username: String,
    password: SecretString,
}

impl SmtpTransport {
    /// Creates a transport from the client configuration.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            server: config.server.clone(),
            port: config.port,
            security: config.security,
            client_hostname: config.client_hostname.clone(),
            username: config.sender_email.clone(),
            password: config.sender_password.clone(),
        }
    }

    /// Returns the security mode used for connections.
    #[must_use]
    pub const fn security(&self) -> Security {
        self.security
    }

    /// Connects, reads the greeting and completes EHLO (and STARTTLS when
    /// configured).
    async fn open(&self) -> mailstaff_smtp::Result<Client<Connected>> {
        let stream = match self.security {
            Security::Tls => connect_tls(&self.server, self.port).await?,
            Security::StartTls | Security::None => connect(&self.server, self.port).await?,
        };

        let client = Client::from_stream(stream)
            .await?
            .ehlo(&self.client_hostname)
            .await?;

        if self.security == Security::StartTls {
            client.starttls(&self.server, &self.client_hostname).await
        } else {
            Ok(client)
        }
    }

    /// Logs in with PLAIN when offered (or when nothing is advertised),
    /// otherwise LOGIN.
    async fn authenticate(
        &self,
        client: Client<Connected>,
    ) -> Result<Client<Authenticated>, SendError> {
        let mechanisms = client.server_info().auth_mechanisms();
        let password = self.password.expose_secret();

        let result = if mechanisms.is_empty() || mechanisms.contains(&AuthMechanism::Plain) {
            client.auth_plain(&self.username, password).await
        } else if mechanisms.contains(&AuthMechanism::Login) {
            client.auth_login(&self.username, password).await
        } else {
            return Err(SendError::Transmission(format!(
                "No supported authentication mechanism (server offers {mechanisms:?})"
            )));
        };

        result.map_err(|e| match e {
            SmtpError::SmtpError { .. } => SendError::Authentication(e.to_string()),
            other => SendError::Transmission(other.to_string()),
        })
    }

    /// Validates the envelope so a bad address never costs a connection.
    fn envelope_addresses(envelope: &Envelope) -> Result<(Address, Vec<Address>), SendError> {
        let parse = |address: &str| {
            Address::new(address).map_err(|source| SendError::InvalidAddress {
                address: address.to_string(),
                source,
            })
        };
        let recipients = envelope
            .recipients
            .iter()
            .map(|r| parse(r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((parse(&envelope.sender)?, recipients))
    }

    /// Runs the mail transaction and returns to the connected state.
    async fn transmit(
        client: Client<Authenticated>,
        from: Address,
        recipients: &[Address],
        message: &[u8],
    ) -> mailstaff_smtp::Result<(Client<Connected>, Vec<RefusedRecipient>)> {
        let client = client.mail_from(from, Some(message.len())).await?;
        let (client, refused) = client.recipients(recipients).await?;
        let client = client.data().await?.send_message(message).await?;

        Ok((client, refused))
    }
}

impl Transport for SmtpTransport {
    async fn deliver(
        &self,
        envelope: &Envelope,
        message: &[u8],
        diagnostics: &dyn Diagnostics,
    ) -> Result<Delivery, SendError> {
        let (from, recipients) = Self::envelope_addresses(envelope)?;

        diagnostics.info(&format!(
            "Connecting to SMTP server {}:{}...",
            self.server, self.port
        ));
        tracing::debug!(security = %self.security, "Opening SMTP session");

        let client = self
            .open()
            .await
            .map_err(|e| SendError::Connection(e.to_string()))?;
        diagnostics.info("Connection established. Logging in...");

        let client = self.authenticate(client).await?;
        diagnostics.info("Login successful. Sending email...");

        let (client, refused) = Self::transmit(client, from, &recipients, message)
            .await
            .map_err(|e| SendError::Transmission(e.to_string()))?;
        for recipient in &refused {
            diagnostics.warn(&format!(
                "Recipient refused: {} ({} {})",
                recipient.address, recipient.code, recipient.message
            ));
        }

        client
            .quit()
            .await
            .map_err(|e| SendError::Transmission(e.to_string()))?;
        diagnostics.info("SMTP server connection closed.");

        Ok(Delivery { refused })
    }
}
