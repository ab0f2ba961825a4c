//! Print a type's schema

use nxrm_provider::Provider;

use super::{check_data_source, check_resource};
use crate::document;
use crate::error::{CliError, Result};

pub fn run(type_name: &str, data_source: bool) -> Result<()> {
    let provider = Provider::new();
    let schema = if data_source {
        check_data_source(&provider, type_name)?;
        provider.data_source(type_name)?.schema()
    } else {
        check_resource(&provider, type_name)?;
        provider.resource(type_name)?.schema()
    };
    let value = serde_json::to_value(schema).map_err(|e| CliError::internal(e.to_string()))?;
    document::print(&value)
}
