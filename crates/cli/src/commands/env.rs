use anyhow::Result;
use colored::*;
use rook_core::configs::environment::ProvisionPolicy;
use rook_core::workspace_manager::WorkspaceManager;

use crate::EnvCommands;

pub fn execute(manager: &WorkspaceManager, command: EnvCommands) -> Result<()> {
    match command {
        EnvCommands::List => list(manager),
        EnvCommands::Ensure { name } => {
            let handle = manager.ensure_environment(&name)?;
            println!(
                "{} {}",
                "✓".green().bold(),
                format!("Environment '{}' ready at {}", name, handle.path.display()).green()
            );
            Ok(())
        }
        EnvCommands::Destroy { name } => {
            if manager.destroy_environment(&name)? {
                println!("{} Removed environment '{}'", "✓".green().bold(), name);
            } else {
                println!("{}", format!("Environment '{}' was not provisioned", name).dimmed());
            }
            Ok(())
        }
    }
}

fn list(manager: &WorkspaceManager) -> Result<()> {
    println!("{}", "Environments".bold().underline());

    let environments = manager.list_environments();
    if environments.is_empty() {
        println!("  {}", "No environments declared".dimmed());
        return Ok(());
    }

    for environment in environments {
        let policy = match environment.policy {
            ProvisionPolicy::Lazy => "lazy",
            ProvisionPolicy::Strict => "strict",
        };
        let state = if environment.provisioned {
            "provisioned".green()
        } else {
            "absent".dimmed()
        };
        println!(
            "  {} {} {} {}",
            environment.name.blue().bold(),
            format!("[{}]", policy).bright_black(),
            environment.path.display(),
            state
        );
    }

    Ok(())
}
