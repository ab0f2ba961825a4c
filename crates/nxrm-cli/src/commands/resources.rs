//! List registered types

use console::style;
use nxrm_provider::Provider;

use crate::error::Result;

pub fn run(data_sources: bool, filter: Option<&str>) -> Result<()> {
    let provider = Provider::new();
    let registry = provider.registry();
    let names: Vec<&str> = if data_sources {
        registry.data_source_names().collect()
    } else {
        registry.resource_names().collect()
    };

    let mut shown = 0;
    for name in names {
        if filter.is_some_and(|f| !name.contains(f)) {
            continue;
        }
        println!("{}", name);
        shown += 1;
    }

    let kind = if data_sources { "data source(s)" } else { "resource(s)" };
    eprintln!("{}", style(format!("{} {}", shown, kind)).dim());
    Ok(())
}
