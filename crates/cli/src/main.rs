use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use rook_core::types::{RookError, GENERIC_FAILURE_CODE};
use rook_core::workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
use tracing_subscriber::EnvFilter;

mod commands;

/// Rook - A self-documenting task runner
#[derive(Parser)]
#[command(name = "rook")]
#[command(about = "Run declared targets in dependency order inside provisioned environments")]
#[command(version)]
struct Cli {
    /// Path to the workspace root (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List documented targets (the default command)
    List {
        /// Include targets without help text
        #[arg(long)]
        all: bool,
    },
    /// Run targets and their prerequisites
    Run {
        /// Targets to run, in order
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Show the execution order for targets without running them
    Plan {
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Show every target with its prerequisites
    Graph,
    /// Manage environments
    Env {
        #[command(subcommand)]
        env_command: EnvCommands,
    },
    /// Print the JSON schema of workspace.yml
    Schema,
}

#[derive(Subcommand)]
enum EnvCommands {
    /// List environments and whether they are provisioned
    List,
    /// Provision an environment according to its policy
    Ensure { name: String },
    /// Remove an environment directory
    Destroy { name: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Failing steps propagate their own status, everything else exits with 2
fn exit_code(err: &anyhow::Error) -> u8 {
    let code = err
        .downcast_ref::<RookError>()
        .map(RookError::exit_code)
        .unwrap_or(GENERIC_FAILURE_CODE);
    match (code & 0xff) as u8 {
        0 => 1,
        code => code,
    }
}

fn execute(cli: Cli) -> Result<()> {
    // The schema does not need a loaded workspace
    if let Some(Commands::Schema) = cli.command {
        return commands::schema::execute();
    }

    let manager = WorkspaceManager::new(WorkspaceManagerConfig {
        workspace_root: cli.workspace,
    })?;

    // Execute command (CLI layer only handles presentation)
    match cli.command {
        None => commands::list::execute(&manager, false),
        Some(Commands::List { all }) => commands::list::execute(&manager, all),
        Some(Commands::Run { targets }) => commands::run::execute(&manager, &targets),
        Some(Commands::Plan { targets }) => commands::plan::execute(&manager, &targets),
        Some(Commands::Graph) => commands::graph::execute(&manager),
        Some(Commands::Env { env_command }) => commands::env::execute(&manager, env_command),
        Some(Commands::Schema) => commands::schema::execute(),
    }
}
