//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for coflow.

use clap::{Parser, Subcommand};

/// coflow - suspendable data-collection workflows
///
/// Runs the same workflows under different drivers: a counter that can be
/// resumed forever, a greeting asked at the console, and a user enrollment
/// answered either by a person or by the rows of a CSV file.
#[derive(Parser, Debug)]
#[command(name = "coflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, env = "COFLOW_CONFIG", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print values from the infinite counter
    Counter {
        /// First value
        #[arg(short, long, default_value = "0")]
        start: u64,

        /// How many values to print
        #[arg(short, long, default_value = "10")]
        take: usize,

        /// After printing this many values, continue from --jump-to
        #[arg(long, requires = "jump_to")]
        jump_at: Option<usize>,

        /// Value to continue from after --jump-at
        #[arg(long, requires = "jump_at")]
        jump_to: Option<u64>,
    },

    /// Ask for your name and greet you
    Greet,

    /// Enroll users
    Enroll {
        #[command(subcommand)]
        subcommand: EnrollSubcommand,
    },

    /// Inspect enrolled users
    Users {
        #[command(subcommand)]
        subcommand: UsersSubcommand,
    },

    /// Display version and build information
    Version,

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Enrollment subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum EnrollSubcommand {
    /// Enroll one user by answering prompts
    Interactive {
        /// Users file (overrides [storage] users_file)
        #[arg(short, long)]
        store: Option<String>,

        /// Validate and show the result without saving it
        #[arg(long)]
        dry_run: bool,
    },

    /// Enroll every row of a CSV file
    Import {
        /// CSV file with a header row, or a .jsonl file of user records
        file: String,

        /// Users file (overrides [storage] users_file)
        #[arg(short, long)]
        store: Option<String>,

        /// Stop at the first rejected row
        #[arg(long)]
        fail_fast: bool,

        /// Validate every row without saving anything
        #[arg(long)]
        dry_run: bool,
    },
}

/// User inspection subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum UsersSubcommand {
    /// List enrolled users
    List {
        /// Users file (overrides [storage] users_file)
        #[arg(short, long)]
        store: Option<String>,

        /// Print one JSON object per user
        #[arg(long)]
        json: bool,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show,

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate,
}
