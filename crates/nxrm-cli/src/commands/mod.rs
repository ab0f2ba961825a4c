//! CLI commands

pub mod apply;
pub mod data;
pub mod destroy;
pub mod import;
pub mod plan;
pub mod refresh;
pub mod resources;
pub mod schema;

use console::style;
use nxrm_core::Diagnostics;
use nxrm_provider::Provider;

use crate::display::{did_you_mean, print_diagnostics};
use crate::error::{CliError, Result};
use crate::ConnectionArgs;

/// A configured provider; fails when the server cannot be reached
pub async fn connect(conn: &ConnectionArgs) -> Result<Provider> {
    let mut provider = Provider::new();
    let config = conn.client_config();
    tracing::debug!(url = %config.url, "connecting");
    let diags = provider.configure_client(config).await;
    print_diagnostics(&diags);
    if diags.has_error() {
        return Err(CliError::Connection);
    }
    if let Some(version) = provider.version() {
        eprintln!("{} {}", style("Connected to Nexus").dim(), style(version).dim());
    }
    Ok(provider)
}

/// Reject unknown resource types with a suggestion
pub fn check_resource(provider: &Provider, type_name: &str) -> Result<()> {
    if provider.registry().resource(type_name).is_some() {
        return Ok(());
    }
    Err(CliError::UnknownType {
        what: "resource",
        name: type_name.to_string(),
        help: did_you_mean(type_name, provider.registry().resource_names()),
    })
}

/// Reject unknown data source types with a suggestion
pub fn check_data_source(provider: &Provider, type_name: &str) -> Result<()> {
    if provider.registry().data_source(type_name).is_some() {
        return Ok(());
    }
    Err(CliError::UnknownType {
        what: "data source",
        name: type_name.to_string(),
        help: did_you_mean(type_name, provider.registry().data_source_names()),
    })
}

/// Print diagnostics and turn errors into a failure of `operation`
pub fn finish(operation: &str, diagnostics: &Diagnostics) -> Result<()> {
    match print_diagnostics(diagnostics) {
        0 => Ok(()),
        errors => Err(CliError::apply(operation, errors)),
    }
}
