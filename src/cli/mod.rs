//! Command-line interface.

mod commands;

use clap::{Parser, Subcommand};

/// handlefinder - find the accounts you follow on the fediverse
#[derive(Parser)]
#[command(name = "handlefinder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server (default)
    Serve,

    /// Search once and print the matches
    #[command(alias = "s")]
    Search {
        /// Username on the source network, with or without a leading @
        username: String,
    },

    /// Drop the cached search for a username
    #[command(alias = "rm")]
    Forget {
        username: String,
    },

    /// Create default config file
    #[command(alias = "init")]
    InitConfig,
}

pub use commands::*;
