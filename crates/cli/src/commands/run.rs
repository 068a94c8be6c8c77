use anyhow::Result;
use colored::*;
use rook_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager, targets: &[String]) -> Result<()> {
    println!("{} {}", "Running".bold(), targets.join(" ").cyan());

    let report = manager.run_many(targets)?;

    println!();
    println!(
        "{} {}",
        "✓".green().bold(),
        format!("{} steps completed successfully!", report.executed.len())
            .green()
            .bold()
    );

    Ok(())
}
