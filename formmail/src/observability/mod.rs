//! Observability (logging and tracing)
//!
//! The pipeline logs through `tracing`; this module installs a subscriber
//! for binaries that do not bring their own.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber
///
/// Sets up:
/// - Pretty formatting in debug builds, JSON formatting in release builds,
///   both written to stderr
/// - Filtering through `RUST_LOG`, defaulting to `info,formmail=debug` in
///   debug builds and `info` in release builds
///
/// # Example
///
/// ```rust,no_run
/// use formmail::observability;
///
/// # fn main() -> anyhow::Result<()> {
/// observability::init()?;
/// tracing::info!("Form handler started");
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init() -> anyhow::Result<()> {
    init_with(&ObservabilityConfig::default())
}

/// Initialize the tracing subscriber with an explicit configuration
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init_with(config: &ObservabilityConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter()));

    if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init()?;
    }

    tracing::debug!(service = %config.service_name, "Tracing initialized");
    Ok(())
}

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name, used as the crate filter target
    pub service_name: String,

    /// Emit JSON lines instead of pretty output
    pub json: bool,

    /// Log this crate at debug level when `RUST_LOG` is unset
    pub verbose: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "formmail".to_string(),
            json: !cfg!(debug_assertions),
            verbose: cfg!(debug_assertions),
        }
    }
}

impl ObservabilityConfig {
    /// Create new observability config
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Emit JSON lines
    #[must_use]
    pub const fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Log the service at debug level by default
    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Filter directive used when `RUST_LOG` is unset
    #[must_use]
    pub fn default_filter(&self) -> String {
        if self.verbose {
            format!("info,{}=debug", self.service_name.replace('-', "_"))
        } else {
            "info".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.service_name, "formmail");
        assert_eq!(config.json, !cfg!(debug_assertions));
    }

    #[test]
    fn test_default_filter() {
        let config = ObservabilityConfig::new("formmail-cli").with_verbose(true);
        assert_eq!(config.default_filter(), "info,formmail_cli=debug");

        let config = config.with_verbose(false).with_json(true);
        assert_eq!(config.default_filter(), "info");
        assert!(config.json);
    }
}
