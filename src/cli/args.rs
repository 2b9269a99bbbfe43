//! CLI argument definitions using clap
//!
//! Only the first word is parsed here. Everything after the face name is
//! handed to the resolver, which knows the face's options.

use clap::{Parser, Subcommand};

/// Pluggable faces with per-action options, and indirected resource requests
#[derive(Parser, Debug)]
#[command(name = "facecli")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List faces, a face's actions, or one action's usage
    Help {
        /// Face to describe
        face: Option<String>,
        /// Action of the face to describe
        action: Option<String>,
    },

    /// `<face> [options] [action] [arguments]`
    #[command(external_subcommand)]
    Face(Vec<String>),
}
