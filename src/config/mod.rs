//! Client configuration and constants.
//!
//! This module provides:
//! - Default values (pool sizing, timeouts, resolver limits)
//! - Names of the environment variables honoured as system properties
//! - The immutable [`ClientConfiguration`] value and its parts
//! - Command-line options of the binary

mod cli;
mod constants;
mod types;

pub use cli::{Cli, Command, GetArgs, ResolveArgs};
// Re-export all constants
pub use constants::*;
pub use types::{
    ClientConfiguration, ConnectionPoolSettings, CookieSpec, LogFormat, LogLevel, RequestPolicy,
};
