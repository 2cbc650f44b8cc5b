//! Diagram command - emit a Mermaid ER diagram.

use super::input::{load_schema, write_output};
use anyhow::{bail, Result};
use schema_forge::normalize::Normalizer;
use std::path::PathBuf;

pub fn run(file: PathBuf, output: Option<PathBuf>, strict: bool) -> Result<()> {
    let schema = load_schema(&file, &Normalizer::default())?;
    let diagram = schema_forge::diagram::render(&schema);

    write_output(output.as_ref(), &diagram.to_text())?;

    if diagram.is_clean() {
        eprintln!(
            "Generated diagram: {} entities, {} relationships",
            schema.tables.len(),
            schema.relationships.len()
        );
        return Ok(());
    }

    eprintln!("Diagram has {} validation findings:", diagram.issues.len());
    for issue in &diagram.issues {
        eprintln!("  - {}", issue);
    }
    if strict {
        bail!("diagram validation failed");
    }
    Ok(())
}
