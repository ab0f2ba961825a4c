//! Refresh command - re-read a resource into its state file

use console::style;
use std::path::Path;

use super::{check_resource, connect, finish};
use crate::document;
use crate::error::{CliError, Result};
use crate::ConnectionArgs;

pub async fn run(conn: &ConnectionArgs, type_name: &str, state_path: &Path) -> Result<()> {
    let state = document::read_state(state_path)?
        .ok_or_else(|| CliError::document(state_path.display().to_string(), "no state recorded"))?;

    let provider = connect(conn).await?;
    check_resource(&provider, type_name)?;

    let response = provider.read(type_name, &state).await?;
    if !response.diagnostics.has_error() {
        document::write_state(state_path, response.state.as_ref())?;
    }
    finish("Refresh", &response.diagnostics)?;

    match response.state {
        Some(_) => println!("{} Refreshed {}", style("✓").green().bold(), type_name),
        None => println!("{} {} removed from state", style("!").yellow().bold(), type_name),
    }
    Ok(())
}
