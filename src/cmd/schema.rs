//! Schema command - print JSON Schemas for the documents the CLI handles.

use anyhow::{bail, Context, Result};
use schema_forge::json_schema::{all_schemas, get_schema, schema_names};

pub fn run(name: Option<String>, list: bool) -> Result<()> {
    if list {
        for name in schema_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let json = match name {
        Some(name) => {
            let Some(schema) = get_schema(&name) else {
                bail!(
                    "Unknown schema: {}. Available: {}",
                    name,
                    schema_names().join(", ")
                );
            };
            serde_json::to_string_pretty(&schema)
        }
        None => serde_json::to_string_pretty(&all_schemas()),
    }
    .context("failed to serialize schema")?;

    println!("{}", json);
    Ok(())
}
