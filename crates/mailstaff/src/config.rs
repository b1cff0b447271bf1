//! SMTP client configuration.
//!
//! Values normally come from the process environment:
//!
//! | Variable          | Required | Default                  |
//! |-------------------|----------|--------------------------|
//! | `SMTP_SERVER`     | yes      |                          |
//! | `SMTP_PORT`       | no       | `587`                    |
//! | `SENDER_EMAIL`    | yes      |                          |
//! | `SENDER_PASSWORD` | yes      |                          |
//! | `SMTP_HELO_NAME`  | no       | `localhost`              |
//! | `SMTP_SECURITY`   | no       | derived from the port    |

use secrecy::SecretString;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Port on which the server expects TLS from the first byte.
pub const IMPLICIT_TLS_PORT: u16 = 465;

/// Submission port used when `SMTP_PORT` is not set.
pub const DEFAULT_PORT: u16 = 587;

/// EHLO identity used when none is configured.
pub const DEFAULT_CLIENT_HOSTNAME: &str = "localhost";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set or empty.
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    /// `SMTP_PORT` is not a valid port number.
    #[error("Invalid SMTP port {value:?}: {source}")]
    InvalidPort {
        /// The rejected value.
        value: String,
        /// Parse failure.
        source: ParseIntError,
    },

    /// `SMTP_SECURITY` names an unknown mode.
    #[error("Invalid security mode {0:?} (expected tls, starttls or none)")]
    InvalidSecurity(String),
}

/// Security/encryption mode for the SMTP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Security {
    /// Implicit TLS (connect directly with TLS).
    Tls,
    /// STARTTLS upgrade after plaintext connect.
    StartTls,
    /// No encryption (local relays and test servers only).
    None,
}

impl Security {
    /// Returns the mode used for a port when none is configured:
    /// implicit TLS on 465, STARTTLS everywhere else.
    #[must_use]
    pub const fn for_port(port: u16) -> Self {
        if port == IMPLICIT_TLS_PORT {
            Self::Tls
        } else {
            Self::StartTls
        }
    }

    /// Get display name for the security mode.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::None => "None (insecure)",
            Self::Tls => "SSL/TLS",
            Self::StartTls => "STARTTLS",
        }
    }
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Security {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tls" | "ssl" | "implicit" => Ok(Self::Tls),
            "starttls" => Ok(Self::StartTls),
            "none" | "plain" => Ok(Self::None),
            _ => Err(ConfigError::InvalidSecurity(s.to_string())),
        }
    }
}

/// Connection and identity settings for one sender account.
///
/// Immutable once built; the password is redacted from `Debug` output.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// SMTP server hostname.
    pub server: String,
    /// SMTP server port.
    pub port: u16,
    /// Sender address, used for `MAIL FROM`, `From` and login.
    pub sender_email: String,
    /// Sender password.
    pub sender_password: SecretString,
    /// Name announced in EHLO.
    pub client_hostname: String,
    /// Connection security.
    pub security: Security,
}

impl ClientConfig {
    /// Creates a configuration with the security mode derived from `port`.
    #[must_use]
    pub fn new(
        server: impl Into<String>,
        port: u16,
        sender_email: impl Into<String>,
        sender_password: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            port,
            sender_email: sender_email.into(),
            sender_password: SecretString::new(sender_password.into()),
            client_hostname: DEFAULT_CLIENT_HOSTNAME.to_string(),
            security: Security::for_port(port),
        }
    }

    /// Sets the EHLO identity.
    #[must_use]
    pub fn with_client_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.client_hostname = hostname.into();
        self
    }

    /// Overrides the security mode.
    #[must_use]
    pub const fn with_security(mut self, security: Security) -> Self {
        self.security = security;
        self
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is
    /// malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is
    /// malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let server = require("SMTP_SERVER")?;
        let sender_email = require("SENDER_EMAIL")?;
        let sender_password = require("SENDER_PASSWORD")?;

        let port = match get("SMTP_PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|source| ConfigError::InvalidPort { value, source })?,
            None => DEFAULT_PORT,
        };

        let mut config = Self::new(server.trim(), port, sender_email.trim(), sender_password);

        if let Some(hostname) = get("SMTP_HELO_NAME") {
            config = config.with_client_hostname(hostname.trim());
        }
        if let Some(security) = get("SMTP_SECURITY") {
            config = config.with_security(security.parse()?);
        }

        Ok(config)
    }
}
