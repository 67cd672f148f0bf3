//! CLI command implementations

pub mod check;
pub mod process;

pub use check::CheckConfigCommand;
pub use process::{outcome_json, ProcessCommand};
