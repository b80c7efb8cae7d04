//! Logging utilities.
//!
//! The crate itself only emits through the `log` facade; this module offers an
//! `env_logger` setup for binaries and tests that want output.

mod init;

pub use init::{LoggingConfig, init_logging};
