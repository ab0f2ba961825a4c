//! Data command - read a data source

use serde_json::json;
use std::path::Path;

use super::{check_data_source, connect, finish};
use crate::display::render_state;
use crate::document;
use crate::error::Result;
use crate::ConnectionArgs;

pub async fn run(conn: &ConnectionArgs, type_name: &str, config_path: Option<&Path>) -> Result<()> {
    let config = match config_path {
        Some(path) => document::read(path)?,
        None => json!({}),
    };

    let provider = connect(conn).await?;
    check_data_source(&provider, type_name)?;

    let response = provider.read_data_source(type_name, &config).await?;
    finish("Read", &response.diagnostics)?;
    if let Some(state) = response.state {
        println!("{}", render_state(provider.data_source(type_name)?.schema(), &state));
    }
    Ok(())
}
