//! JSON Schema export for the documents the CLI reads and writes.
//!
//! `extraction` describes the loose input accepted by `normalize`, `schema`
//! the normalized document every generator consumes. Exported via the
//! `schema` subcommand.

use schemars::{schema_for, Schema};
use std::collections::BTreeMap;

/// All schemas keyed by name, in deterministic order
pub fn all_schemas() -> BTreeMap<&'static str, Schema> {
    let mut schemas = BTreeMap::new();

    schemas.insert(
        "extraction",
        schema_for!(crate::model::ExtractionResult),
    );
    schemas.insert("schema", schema_for!(crate::model::Schema));

    schemas
}

/// A single schema by name
pub fn get_schema(name: &str) -> Option<Schema> {
    all_schemas().remove(name)
}

pub fn schema_names() -> Vec<&'static str> {
    all_schemas().keys().copied().collect()
}
