use anyhow::Result;
use colored::*;
use rook_core::execution::dependencies::describe_cycle;
use rook_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager) -> Result<()> {
    println!("{}", "Target Dependency Graph:".bold().underline());

    let result = manager.get_dependency_graph();

    if !result.cycles.is_empty() {
        let cycles_description = result
            .cycles
            .iter()
            .map(|cycle| describe_cycle(cycle))
            .collect::<Vec<_>>()
            .join("; ");

        println!(
            "{} {}",
            "Warning:".yellow().bold(),
            format!("Circular dependencies detected: {}", cycles_description).yellow()
        );
    }

    for (name, deps) in &result.targets {
        println!("{}", name.blue().bold());

        if !deps.is_empty() {
            println!("  {} {}", "depends on:".dimmed(), deps.join(", "));
        } else {
            println!("  {}", "no dependencies".dimmed());
        }
        println!();
    }

    Ok(())
}
