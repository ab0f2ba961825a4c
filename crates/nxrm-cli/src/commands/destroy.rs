//! Destroy command - delete a resource and forget its state

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

    let response = provider.delete(type_name, &state).await?;
    finish("Destroy", &response.diagnostics)?;
    document::write_state(state_path, None)?;

    println!("{} Destroyed {}", style("✓").green().bold(), type_name);
    Ok(())
}
