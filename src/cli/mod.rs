//! Command-line interface.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// Book catalog REST service
#[derive(Debug, Parser)]
#[command(name = "book-catalog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default search paths
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Run the HTTP server until Ctrl+C (default)
    Serve,

    /// Apply database migrations and exit
    Migrate,

    /// Write a default config file if none exists
    InitConfig {
        #[arg(long, default_value = "config.toml")]
        path: PathBuf,
    },

    /// Validate the config and print the effective settings
    CheckConfig,
}

impl Cli {
    #[must_use]
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }

    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load_with_path(path),
            None => Config::load(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_is_default() {
        let cli = Cli::try_parse_from(["book-catalog"]).unwrap();
        assert_eq!(cli.command(), Commands::Serve);
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["book-catalog", "init-config", "--path", "/tmp/c.toml"])
            .unwrap();
        assert_eq!(
            cli.command(),
            Commands::InitConfig {
                path: PathBuf::from("/tmp/c.toml")
            }
        );

        let cli = Cli::try_parse_from(["book-catalog", "check-config", "-c", "alt.toml"]).unwrap();
        assert_eq!(cli.command(), Commands::CheckConfig);
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));

        assert!(Cli::try_parse_from(["book-catalog", "daemon"]).is_err());
    }
}
