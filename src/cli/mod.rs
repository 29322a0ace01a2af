//! CLI module for the trainlog server
//!
//! Provides command-line interface parsing and handling for the trainlog-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod maintenance;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Trainlog - training-log REST server
///
/// Users, animals and training logs over HTTP/JSON, with bearer-token
/// authentication and image/video uploads.
#[derive(Parser, Debug)]
#[command(
    name = "trainlog-server",
    version,
    about = "Trainlog - training-log REST server",
    long_about = "REST backend for recording animal training sessions.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a new project.",
    after_help = "EXAMPLES:\n    \
                  trainlog-server init                # Scaffold trainlog.toml and .env.example\n    \
                  trainlog-server                     # Start the server (requires trainlog.toml)\n    \
                  trainlog-server seed --users 5      # Insert random demo data\n    \
                  trainlog-server clear-db --yes      # Delete every record"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "trainlog.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new project with configuration files
    ///
    /// Creates trainlog.toml, .env.example, .gitignore and the data/
    /// directory.
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "3000")]
        port: u16,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file and resolve secrets
        #[arg(long)]
        validate: bool,
    },

    /// Delete every user, animal and training log
    ClearDb {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Insert random demo data
    Seed {
        /// Number of users to create
        #[arg(long, default_value = "10")]
        users: usize,

        /// Number of animals to create (owned by random seeded users)
        #[arg(long, default_value = "10")]
        animals: usize,

        /// Number of training logs to create
        #[arg(long, default_value = "10")]
        logs: usize,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_serves() {
        let cli = Cli::try_parse_from(["trainlog-server"]).expect("should parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("trainlog.toml"));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "trainlog-server",
            "config",
            "--validate",
            "--config",
            "other.toml",
            "--no-color",
        ])
        .expect("should parse");

        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(cli.no_color);
        assert!(matches!(cli.command, Some(Commands::Config { validate: true })));
    }

    #[test]
    fn test_seed_defaults() {
        let cli = Cli::try_parse_from(["trainlog-server", "seed", "--logs", "3"]).expect("parse");
        match cli.command {
            Some(Commands::Seed { users, animals, logs }) => {
                assert_eq!((users, animals, logs), (10, 10, 3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_init_options() {
        let cli = Cli::try_parse_from(["trainlog-server", "init", "proj", "--force", "--port", "8080"])
            .expect("parse");
        match cli.command {
            Some(Commands::Init { path, force, host, port }) => {
                assert_eq!(path, PathBuf::from("proj"));
                assert!(force);
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 8080);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_clear_db_flag() {
        let cli = Cli::try_parse_from(["trainlog-server", "clear-db", "-y"]).expect("parse");
        assert!(matches!(cli.command, Some(Commands::ClearDb { yes: true })));
    }
}
