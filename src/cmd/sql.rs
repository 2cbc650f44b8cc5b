//! Sql command - emit DDL for one dialect.

use super::input::{load_normalizer, load_schema, write_output};
use anyhow::{anyhow, Result};
use schema_forge::sql::{SqlDialect, SqlGenerator};
use std::path::PathBuf;

pub fn run(
    file: PathBuf,
    dialect: String,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<()> {
    let normalizer = load_normalizer(config.as_deref())?;
    let schema = load_schema(&file, &normalizer)?;
    let sql_dialect = SqlDialect::from_name_or_default(&dialect);

    let sql = SqlGenerator::new(sql_dialect)
        .with_lookup_config(normalizer.config().lookup.clone())
        .generate(&schema)
        .map_err(|e| anyhow!("SQL generation failed: {e}"))?;
    write_output(output.as_ref(), &sql)?;

    eprintln!(
        "Generated {} DDL for {} tables",
        sql_dialect.display_name(),
        schema.tables.len()
    );
    Ok(())
}
