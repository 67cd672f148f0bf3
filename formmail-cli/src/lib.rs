//! formmail CLI library

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub mod commands;

pub use commands::{outcome_json, CheckConfigCommand, ProcessCommand};

/// Mail backend used by `formmail process --send`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    /// Print the email to the terminal (default)
    #[default]
    Console,
    /// Deliver through the SMTP relay named by the `SMTP_*` variables
    Smtp,
}
