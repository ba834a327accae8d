//! CLI module
//!
//! - `serve`: run the HTTP service (default)
//! - `migrate`: apply the credential schema to PostgreSQL and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Credential authentication service
#[derive(Parser)]
#[command(name = "auth-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Apply pending database migrations
    Migrate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let cli = Cli::try_parse_from(["auth-service"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_subcommands() {
        let cli = Cli::try_parse_from(["auth-service", "migrate"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Migrate)));

        assert!(Cli::try_parse_from(["auth-service", "unknown"]).is_err());
    }
}
