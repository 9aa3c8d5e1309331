//! Logging utilities.
//!
//! Library code only talks to the `log` facade. Binaries and tests that want
//! output call [`init_logging`] once.

mod init;

pub use init::{LoggingConfig, init_logging};
