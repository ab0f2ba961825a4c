//! Plan command - show the changes a document would make

use console::style;
use nxrm_provider::{PlanResponse, Provider};
use serde_json::json;
use std::path::Path;

use super::{check_resource, connect};
use crate::display::{plan_diff, print_diagnostics};
use crate::document;
use crate::error::{CliError, Result};
use crate::ConnectionArgs;

pub async fn run(
    conn: &ConnectionArgs,
    type_name: &str,
    config_path: &Path,
    state_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = document::read(config_path)?;
    let prior = match state_path {
        Some(path) => document::read_state(path)?,
        None => None,
    };

    // Without a server the plan runs offline and skips version checks
    let provider = if conn.has_url() {
        connect(conn).await?
    } else {
        Provider::new()
    };
    check_resource(&provider, type_name)?;

    let plan = provider.plan(type_name, prior.as_ref(), &config)?;
    let schema = provider.resource(type_name)?.schema();

    if json {
        let out = json!({
            "type": type_name,
            "planned_state": schema.redact(&plan.planned_state),
            "requires_replace": &plan.requires_replace,
            "has_changes": plan.has_changes,
            "diagnostics": &plan.diagnostics,
        });
        document::print(&out)?;
        return validation_result(&plan, false);
    }

    if !plan.diagnostics.has_error() {
        print_plan(type_name, schema, prior.as_ref(), &plan);
    }
    validation_result(&plan, true)
}

pub(crate) fn print_plan(
    type_name: &str,
    schema: &nxrm_core::Schema,
    prior: Option<&serde_json::Value>,
    plan: &PlanResponse,
) {
    if !plan.has_changes {
        println!("{} No changes.", style("✓").green().bold());
        return;
    }

    let action = match prior {
        None => style("create").green(),
        Some(_) if !plan.requires_replace.is_empty() => style("replace").red(),
        Some(_) => style("update").yellow(),
    };
    println!("{} will {}:", style(type_name).cyan().bold(), action);
    print!("{}", plan_diff(schema, prior, &plan.planned_state));

    if prior.is_some() && !plan.requires_replace.is_empty() {
        println!();
        println!("Forces replacement: {}", plan.requires_replace.join(", "));
    }
}

fn validation_result(plan: &PlanResponse, print: bool) -> Result<()> {
    let errors = if print {
        print_diagnostics(&plan.diagnostics)
    } else {
        plan.diagnostics.errors().count()
    };
    match errors {
        0 => Ok(()),
        errors => Err(CliError::Validation { errors }),
    }
}
