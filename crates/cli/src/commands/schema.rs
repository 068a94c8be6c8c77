use anyhow::Result;
use rook_core::configs::workspace::workspace_schema;

pub fn execute() -> Result<()> {
    println!("{}", workspace_schema()?);
    Ok(())
}
