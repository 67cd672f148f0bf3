//! Configuration check command

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;
use formmail::config::FormMailConfig;
use formmail::forms::{FieldSpec, SanitizerRegistry};

/// Validate a configuration file
pub struct CheckConfigCommand {
    config: PathBuf,
}

impl CheckConfigCommand {
    /// Create a new command instance
    #[must_use]
    pub const fn new(config: PathBuf) -> Self {
        Self { config }
    }

    /// Load and validate the configuration
    ///
    /// Returns the configuration and the names of fields that reference a
    /// sanitizer the default registry does not provide.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or fails
    /// validation
    pub fn run(&self) -> Result<(FormMailConfig, Vec<String>)> {
        let config = FormMailConfig::load_from(&self.config)
            .with_context(|| format!("Failed to load config: {}", self.config.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config: {}", self.config.display()))?;

        let registry = SanitizerRegistry::with_defaults();
        let unknown = config
            .field_specs()?
            .into_iter()
            .filter_map(|(name, spec)| match spec {
                FieldSpec::Regular(field) => field
                    .sanitizer
                    .filter(|sanitizer| !registry.has(sanitizer))
                    .map(|sanitizer| format!("{name} ({sanitizer})")),
                FieldSpec::Custom(_) => None,
            })
            .collect();

        Ok((config, unknown))
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn execute(&self) -> Result<()> {
        let (config, unknown) = self.run()?;

        println!(
            "{} {}",
            style("✓ Configuration is valid:").green().bold(),
            style(self.config.display()).cyan()
        );
        println!("  Subject:   {}", config.mail.subject);
        println!("  Receivers: {}", config.mail.receiver.join(", "));
        println!("  Fields:    {}", config.fields.len());
        println!("  Honeypots: {}", config.protection.honeypot_fields.len());

        for field in &unknown {
            println!(
                "{} unknown sanitizer on {}, values pass through unchanged",
                style("!").yellow().bold(),
                field
            );
        }

        Ok(())
    }
}
