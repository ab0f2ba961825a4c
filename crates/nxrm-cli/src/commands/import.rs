//! Import command - adopt an existing server object

use console::style;
use std::path::Path;

use super::{check_resource, connect, finish};
use crate::display::render_state;
use crate::document;
use crate::error::Result;
use crate::ConnectionArgs;

pub async fn run(conn: &ConnectionArgs, type_name: &str, id: &str, state_path: Option<&Path>) -> Result<()> {
    let provider = connect(conn).await?;
    check_resource(&provider, type_name)?;

    let response = provider.import(type_name, id).await?;
    finish("Import", &response.diagnostics)?;

    let Some(state) = response.state else {
        return Ok(());
    };
    match state_path {
        Some(path) => {
            document::write_state(path, Some(&state))?;
            println!(
                "{} Imported {} '{}' ({})",
                style("✓").green().bold(),
                type_name,
                id,
                path.display()
            );
        }
        None => println!("{}", render_state(provider.resource(type_name)?.schema(), &state)),
    }
    Ok(())
}
