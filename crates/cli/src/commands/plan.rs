use anyhow::Result;
use colored::*;
use rook_core::execution::Step;
use rook_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager, targets: &[String]) -> Result<()> {
    println!("{} {}", "Execution plan for".bold(), targets.join(" ").cyan());

    let plan = manager.get_execution_plan(targets)?;

    println!("\n{}:", "Execution order".bold());
    for (i, step) in plan.iter().enumerate() {
        match step {
            Step::Provision(name) => {
                println!("  {}. {} {}", i + 1, step.label(), format!("(provision {})", name).dimmed())
            }
            Step::Target(_) => println!("  {}. {}", i + 1, step.label()),
        }
    }

    Ok(())
}
