//! Email backend implementations
//!
//! - **SMTP**: deliver through an SMTP relay (production)
//! - **Console**: print to the terminal (development)

pub mod console;
pub mod smtp;
