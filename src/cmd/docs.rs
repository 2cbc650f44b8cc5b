//! Docs command - render Markdown or HTML documentation.

use super::input::{load_schema, write_output};
use anyhow::Result;
use schema_forge::docs::{generate, DocFormat};
use schema_forge::normalize::Normalizer;
use std::path::PathBuf;

pub fn run(file: PathBuf, format: String, output: Option<PathBuf>) -> Result<()> {
    let schema = load_schema(&file, &Normalizer::default())?;
    let doc_format = DocFormat::from_name_or_default(&format);

    // A bare output name gets the format's extension
    let output = output.map(|path| {
        if path.extension().is_none() {
            path.with_extension(doc_format.extension())
        } else {
            path
        }
    });

    let content = generate(&schema, doc_format);
    write_output(output.as_ref(), &content)?;

    eprintln!(
        "Generated {} documentation for {} tables",
        doc_format,
        schema.tables.len()
    );
    Ok(())
}
