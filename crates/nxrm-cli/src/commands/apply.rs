//! Apply command - converge one resource on its document

use console::style;
use nxrm_core::Diagnostics;
use std::path::Path;

use super::{check_resource, connect, finish};
use crate::commands::plan::print_plan;
use crate::display::print_diagnostics;
use crate::document;
use crate::error::{CliError, Result};
use crate::ConnectionArgs;

pub async fn run(conn: &ConnectionArgs, type_name: &str, config_path: &Path, state_path: &Path) -> Result<()> {
    let config = document::read(config_path)?;
    let prior = document::read_state(state_path)?;

    let provider = connect(conn).await?;
    check_resource(&provider, type_name)?;

    let plan = provider.plan(type_name, prior.as_ref(), &config)?;
    let errors = print_diagnostics(&plan.diagnostics);
    if errors > 0 {
        return Err(CliError::Validation { errors });
    }
    let schema = provider.resource(type_name)?.schema();
    print_plan(type_name, schema, prior.as_ref(), &plan);
    if !plan.has_changes {
        return Ok(());
    }

    let mut diagnostics = Diagnostics::new();
    let response = match &prior {
        None => provider.create(type_name, &plan.planned_state).await?,
        Some(prior) if !plan.requires_replace.is_empty() => {
            let deleted = provider.delete(type_name, prior).await?;
            let failed = deleted.diagnostics.has_error();
            diagnostics.extend(deleted.diagnostics);
            if failed {
                return finish("Apply", &diagnostics);
            }
            document::write_state(state_path, None)?;

            let fresh = provider.plan(type_name, None, &config)?;
            diagnostics.extend(fresh.diagnostics);
            if diagnostics.has_error() {
                return finish("Apply", &diagnostics);
            }
            provider.create(type_name, &fresh.planned_state).await?
        }
        Some(prior) => provider.update(type_name, &plan.planned_state, prior).await?,
    };
    diagnostics.extend(response.diagnostics);

    // Partial state from a failed apply is still recorded
    if response.state.is_some() || !diagnostics.has_error() {
        document::write_state(state_path, response.state.as_ref())?;
    }
    finish("Apply", &diagnostics)?;

    println!(
        "{} Applied {} ({})",
        style("✓").green().bold(),
        type_name,
        state_path.display()
    );
    Ok(())
}
