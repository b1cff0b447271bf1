//! `mailstaff` - send one email from the command line.
//!
//! SMTP settings come from the environment (a `.env` file in the working
//! directory is loaded first); see [`mailstaff::config`].

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mailstaff::{ClientConfig, EmailRequest, Mailer, TracingDiagnostics};

/// Compose an email and send it over SMTP
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Display name shown in the From header
    #[arg(long, default_value = "Staff Assistant")]
    sender_name: String,

    /// Primary recipient (repeatable)
    #[arg(long, value_name = "ADDRESS")]
    to: Vec<String>,

    /// Carbon-copy recipient (repeatable)
    #[arg(long, value_name = "ADDRESS")]
    cc: Vec<String>,

    /// Blind carbon-copy recipient (repeatable)
    #[arg(long, value_name = "ADDRESS")]
    bcc: Vec<String>,

    /// Reply-To address (repeatable, defaults to the sender)
    #[arg(long, value_name = "ADDRESS")]
    reply_to: Vec<String>,

    /// File to attach (repeatable; missing files are skipped)
    #[arg(long = "attach", value_name = "PATH")]
    attachments: Vec<PathBuf>,

    /// Subject line
    #[arg(short, long)]
    subject: String,

    /// Body text
    #[arg(short, long, conflicts_with = "body_file")]
    body: Option<String>,

    /// Read the body from a file
    #[arg(long, value_name = "PATH")]
    body_file: Option<PathBuf>,

    /// Send the body as HTML
    #[arg(long)]
    html: bool,
}

impl Args {
    async fn body(&self) -> Result<String> {
        if let Some(body) = &self.body {
            return Ok(body.clone());
        }
        let Some(path) = &self.body_file else {
            bail!("either --body or --body-file is required");
        };
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read body from {}", path.display()))
    }

    fn into_request(self, body: String) -> EmailRequest {
        EmailRequest {
            sender_name: self.sender_name,
            to: self.to,
            cc: self.cc,
            bcc: self.bcc,
            subject: self.subject,
            body,
            is_html: self.html,
            reply_to: self.reply_to,
            attachments: self.attachments,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // A missing .env file is fine; the variables may already be exported
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailstaff=info,mailstaff_smtp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let body = args.body().await?;
    let request = args.into_request(body);

    let config = ClientConfig::from_env().context("Failed to load SMTP configuration")?;
    let mailer = Mailer::new(config, Arc::new(TracingDiagnostics));

    match mailer.send(&request).await {
        Ok(report) => {
            println!(
                "Email sent to {} recipient(s) with {} attachment(s).",
                report.recipients.len() - report.refused.len(),
                report.attached.len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("Email failed to send: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}
