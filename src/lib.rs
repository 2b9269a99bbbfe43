pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod faces;
pub mod infrastructure;
pub mod util;

/// Program name used in messages and help output.
pub const APP_NAME: &str = "facecli";
