use anyhow::Result;
use colored::*;
use rook_core::tasks::get_target_color;
use rook_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager, all: bool) -> Result<()> {
    let heading = match &manager.workspace_config.name {
        Some(name) => format!("Targets ({})", name),
        None => "Targets".to_string(),
    };
    println!("{}", heading.bold().underline());

    let targets = manager.list_targets(all);
    if targets.is_empty() {
        println!("  {}", "No targets found".dimmed());
        return Ok(());
    }

    let width = targets.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for target in targets {
        let name = format!("{:<width$}", target.name, width = width);
        match &target.help {
            Some(help) => println!("  {}  {}", name.color(get_target_color(&target.name)).bold(), help),
            None => println!("  {}", name.dimmed()),
        }
    }

    Ok(())
}
