//! Normalize command - repair a raw extraction into a schema document.

use super::input::{load_normalizer, normalize_value, read_json, write_output};
use anyhow::{bail, Context, Result};
use schema_forge::normalize::NormalizeOptions;
use std::path::PathBuf;

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    name: Option<String>,
    description: Option<String>,
    config: Option<PathBuf>,
) -> Result<()> {
    let value = read_json(&file)?;
    if !value.is_object() {
        bail!("expected a JSON object in {}", file.display());
    }

    let normalizer = load_normalizer(config.as_deref())?;
    let options = NormalizeOptions {
        name: name.or_else(|| {
            file.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        }),
        description,
    };

    let normalized = normalize_value(value, &normalizer, &options)?;
    let schema = &normalized.schema;

    let mut json = serde_json::to_string_pretty(schema).context("failed to serialize schema")?;
    json.push('\n');
    write_output(output.as_ref(), &json)?;

    eprintln!(
        "Normalized {} tables, {} columns, {} relationships ({} warnings)",
        schema.tables.len(),
        schema.column_count(),
        schema.relationships.len(),
        normalized.warnings.len()
    );
    Ok(())
}
