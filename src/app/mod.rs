//! Application Layer
//!
//! Command-line parsing and TOML configuration with environment overrides.

pub mod cli;
pub mod config;

pub use cli::Cli;
pub use config::Config;
