//! Process a recorded submission

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;
use formmail::email::{ConsoleBackend, EmailSender, SmtpBackend};
use formmail::prelude::*;
use serde_json::{json, Value};

use crate::Backend;

/// Run a urlencoded submission through a configured processor
pub struct ProcessCommand {
    config: PathBuf,
    input: PathBuf,
    send: bool,
    backend: Backend,
    now: Option<i64>,
}

impl ProcessCommand {
    /// Create a new command instance
    ///
    /// # Arguments
    ///
    /// * `config` - TOML configuration file
    /// * `input` - File holding an `application/x-www-form-urlencoded` body
    #[must_use]
    pub const fn new(config: PathBuf, input: PathBuf) -> Self {
        Self {
            config,
            input,
            send: false,
            backend: Backend::Console,
            now: None,
        }
    }

    /// Send the email after a successful run
    #[must_use]
    pub const fn send(mut self, send: bool, backend: Backend) -> Self {
        self.send = send;
        self.backend = backend;
        self
    }

    /// Check the timestamp against this Unix time instead of the clock
    #[must_use]
    pub const fn now(mut self, now: Option<i64>) -> Self {
        self.now = now;
        self
    }

    /// Load the configuration and submission, then process it
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration cannot be loaded or is invalid
    /// - The submission file cannot be read or decoded
    /// - The SMTP backend cannot be configured
    pub async fn run(&self) -> Result<Outcome> {
        let config = FormMailConfig::load_from(&self.config)
            .with_context(|| format!("Failed to load config: {}", self.config.display()))?;
        let processor = FormProcessor::from_config(&config, SanitizerRegistry::with_defaults())
            .context("Invalid field definitions")?;

        let body = fs::read_to_string(&self.input)
            .with_context(|| format!("Failed to read input: {}", self.input.display()))?;
        let form = SubmittedForm::from_urlencoded(body.trim_end())
            .context("Input is not a urlencoded form body")?;

        tracing::debug!(fields = form.len(), send = self.send, "Processing submission");

        if !self.send {
            return Ok(match self.now {
                Some(now) => processor.process_form_at(&form, now),
                None => processor.process_form(&form),
            });
        }

        let sender: Box<dyn EmailSender> = match self.backend {
            Backend::Console => Box::new(ConsoleBackend::new()),
            Backend::Smtp => Box::new(SmtpBackend::from_env().context("SMTP is not configured")?),
        };

        Ok(match self.now {
            Some(now) => {
                processor
                    .process_form_and_send_at(&form, sender.as_ref(), now)
                    .await
            }
            None => processor.process_form_and_send(&form, sender.as_ref()).await,
        })
    }

    /// Execute the command, printing the outcome as JSON
    ///
    /// Returns whether the submission was accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the run fails before producing an outcome
    pub async fn execute(&self) -> Result<bool> {
        let outcome = self.run().await?;
        let report = outcome_json(&outcome);

        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize outcome")?
        );

        match &outcome {
            Ok(_) => eprintln!("{}", style("✓ Submission accepted").green().bold()),
            Err(rejection) => eprintln!(
                "{} {}",
                style("✗ Submission rejected:").red().bold(),
                style(rejection.reason()).yellow()
            ),
        }

        Ok(outcome.is_ok())
    }
}

/// JSON report for an outcome
///
/// Accepted runs carry the sanitized fields, rejections carry the reason code
/// and, for required-field rejections, the missing fields.
#[must_use]
pub fn outcome_json(outcome: &Outcome) -> Value {
    match outcome {
        Ok(fields) => json!({ "success": true, "fields": fields }),
        Err(rejection) => {
            let mut report = json!({ "success": false });
            if let (Value::Object(target), Ok(Value::Object(source))) =
                (&mut report, serde_json::to_value(rejection))
            {
                target.extend(source);
            }
            report
        }
    }
}
