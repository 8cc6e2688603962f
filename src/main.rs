//! coflow - suspendable data-collection workflows
//!
//! Entry point for the coflow binary. Each command builds a workflow,
//! picks the driver that answers its requests (a fixed plan, a person at
//! the console, or CSV rows) and reports the outcome.

mod cli;
mod config;
mod counter;
mod drivers;
mod enrollment;
mod error;
mod i18n;
mod logging;
mod prompt;
mod store;
mod version;
mod workflow;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{debug, info};

use crate::cli::{Cli, Commands, ConfigSubcommand, EnrollSubcommand, UsersSubcommand};
use crate::config::CoflowConfig;
use crate::counter::Counter;
use crate::enrollment::Enrollment;
use crate::error::Result;
use crate::prompt::{Console, Greeting};
use crate::store::{JsonlStore, MemoryStore, StoredUser, UserStore};
use crate::workflow::{drive, Step, Workflow};

fn main() -> Result<()> {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    match &cli.command {
        Commands::Version => {
            version::print_version();
            return Ok(());
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            if let Err(e) = handle_config_command(subcommand.clone(), cli.config.as_deref()) {
                eprint!("{}", e.format_for_terminal());
                std::process::exit(e.exit_code());
            }
            return Ok(());
        }
        _ => {}
    }

    let config = match CoflowConfig::load(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprint!("{}", e.format_for_terminal());
            std::process::exit(e.exit_code());
        }
    };

    // The guards must be kept alive for the lifetime of the program
    let log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

    let build = version::build_info();
    info!(
        version = %build.full_version(),
        target = %build.target,
        profile = %build.profile,
        "Starting coflow"
    );

    let outcome = match cli.command {
        Commands::Counter {
            start,
            take,
            jump_at,
            jump_to,
        } => run_counter(start, take, jump_at.zip(jump_to)).map(|_| 0),
        Commands::Greet => run_greet(&config).map(|_| 0),
        Commands::Enroll { subcommand } => handle_enroll_command(subcommand, &config),
        Commands::Users { subcommand } => handle_users_command(subcommand, &config).map(|_| 0),
        Commands::Version | Commands::Config { .. } => {
            // Already handled above
            unreachable!();
        }
    };

    let code = outcome.unwrap_or_else(|e| {
        eprint!("{}", e.format_for_terminal());
        e.exit_code()
    });
    if code != 0 {
        // process::exit skips destructors, so flush the file writer first
        drop(log_guards);
        std::process::exit(code);
    }
    Ok(())
}

/// Print `take` counter values, optionally continuing from another value
/// once `jump.0` values have been printed.
fn run_counter(start: u64, take: usize, jump: Option<(usize, u64)>) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let Some((jump_at, jump_to)) = jump else {
        for value in Counter::new(start).take(take) {
            writeln!(out, "{}", value)?;
        }
        return Ok(());
    };

    if take == 0 {
        return Ok(());
    }

    let mut counter = Counter::new(start);
    let mut step = counter.start()?;
    for printed in 1..=take {
        let value = match step {
            Step::Suspend(value) => value,
            Step::Complete(never) => match never {},
        };
        writeln!(out, "{}", value)?;
        if printed == take {
            break;
        }
        let resume_with = (printed == jump_at).then_some(jump_to);
        match resume_with {
            Some(target) => debug!(after = printed, target, "Counter jumping"),
            None if value == u64::MAX => {
                debug!(printed, "Counter reached u64::MAX");
                break;
            }
            None => {}
        }
        step = counter.resume(resume_with)?;
    }
    Ok(())
}

fn run_greet(config: &CoflowConfig) -> Result<()> {
    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout(), config.prompt.locale);
    let greeting = drive(&mut Greeting::new(config.prompt.locale), &mut console)?;
    console.say(&greeting)
}

/// Returns the process exit code: 0, or the code of the first rejected row.
fn handle_enroll_command(subcommand: EnrollSubcommand, config: &CoflowConfig) -> Result<i32> {
    match subcommand {
        EnrollSubcommand::Interactive { store, dry_run } => {
            let store = open_store(store.as_deref(), dry_run, config);
            let stdin = io::stdin();
            let mut console = Console::new(stdin.lock(), io::stdout(), config.prompt.locale);

            let user = drive(&mut Enrollment::from_settings(&config.enrollment), &mut console)?;
            let stored = store.insert_user(&user)?;

            if dry_run {
                console.say(&format!("Valid: {} (not saved)", stored.email))?;
            } else {
                console.say(&format!("Enrolled {} ({})", stored.email, stored.id))?;
            }
        }
        EnrollSubcommand::Import {
            file,
            store,
            fail_fast,
            dry_run,
        } => {
            let store = open_store(store.as_deref(), dry_run, config);
            let mut options = config.import.clone();
            options.fail_fast |= fail_fast;

            let report = drivers::import_file(Path::new(&file), &config.enrollment, &options, &*store)?;

            for failure in &report.failures {
                eprintln!("line {}: {}", failure.line, failure.error);
            }
            let verb = if dry_run { "Validated" } else { "Imported" };
            println!(
                "{} {} user(s), {} row(s) rejected{}",
                verb,
                report.imported.len(),
                report.failures.len(),
                if report.aborted { " (stopped early)" } else { "" }
            );

            if !report.is_clean() {
                return Ok(report.failures.first().map(|f| f.error.exit_code()).unwrap_or(1));
            }
        }
    }
    Ok(0)
}

fn handle_users_command(subcommand: UsersSubcommand, config: &CoflowConfig) -> Result<()> {
    match subcommand {
        UsersSubcommand::List { store, json } => {
            let store = JsonlStore::new(store_path(store.as_deref(), config));
            debug!(path = %store.path().display(), "Listing users");
            let users = store.list_users()?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            if json {
                for user in &users {
                    writeln!(out, "{}", serde_json::to_string(&PublicUser::from(user))?)?;
                }
            } else if users.is_empty() {
                writeln!(out, "No users enrolled.")?;
            } else {
                writeln!(out, "{:<36}  {:<24}  {:<32}  PREFERENCES", "ID", "NAME", "EMAIL")?;
                for user in &users {
                    writeln!(
                        out,
                        "{:<36}  {:<24}  {:<32}  {}",
                        user.id,
                        user.name,
                        user.email,
                        user.preferences.join(",")
                    )?;
                }
            }
        }
    }
    Ok(())
}

/// A stored user without its credentials
#[derive(serde::Serialize)]
struct PublicUser<'a> {
    id: String,
    name: &'a str,
    email: &'a str,
    preferences: &'a [String],
    created_at: String,
}

impl<'a> From<&'a StoredUser> for PublicUser<'a> {
    fn from(user: &'a StoredUser) -> Self {
        Self {
            id: user.id.to_string(),
            name: &user.name,
            email: &user.email,
            preferences: &user.preferences,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

fn store_path(cli_path: Option<&str>, config: &CoflowConfig) -> PathBuf {
    cli_path
        .map(PathBuf::from)
        .unwrap_or_else(|| config.storage.users_path())
}

fn open_store(cli_path: Option<&str>, dry_run: bool, config: &CoflowConfig) -> Box<dyn UserStore> {
    if dry_run {
        debug!("Dry run, users are kept in memory");
        return Box::new(MemoryStore::new());
    }
    let path = store_path(cli_path, config);
    debug!(path = %path.display(), "Using users file");
    Box::new(JsonlStore::new(path))
}

fn handle_config_command(subcommand: ConfigSubcommand, config_path: Option<&str>) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show => {
            let cfg = CoflowConfig::load(config_path)?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration written to {}", written.display());
        }
        ConfigSubcommand::Validate => match CoflowConfig::load(config_path) {
            Ok(_) => {
                println!("Configuration is valid.");
            }
            Err(e) => {
                eprint!("{}", e.format_for_terminal());
                std::process::exit(e.exit_code());
            }
        },
    }

    Ok(())
}
