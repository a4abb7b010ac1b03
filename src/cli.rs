//! Command-line interface for gridmatch.

use clap::{Parser, Subcommand};

/// Gridmatch - turn-based tic-tac-toe match server
#[derive(Parser, Debug)]
#[command(name = "gridmatch")]
#[command(about = "Tic-tac-toe match server with player statistics", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP match server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Path to the database file (created if it doesn't exist)
        #[arg(long, default_value = "gridmatch.db")]
        db_path: String,
    },
}
