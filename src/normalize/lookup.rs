//! Lookup-table detection heuristic.

use super::config::LookupConfig;
use crate::model::Table;

/// Whether `table` looks like a small enumerated-value table.
///
/// Requires a primary key and a name-like or code-like column; then either
/// the table name contains a lookup keyword or the table has at most
/// `max_columns` non-system columns. Weak and junction tables never qualify.
pub fn is_lookup_table(table: &Table, config: &LookupConfig) -> bool {
    if table.is_weak_entity || table.is_junction_table {
        return false;
    }
    if table.reference_column().is_none() {
        return false;
    }

    let has_value_column = table.columns.iter().any(|c| {
        !c.is_primary_key && (config.is_name_column(&c.name) || config.is_code_column(&c.name))
    });
    if !has_value_column {
        return false;
    }

    if config.keyword_in(&table.name).is_some() {
        return true;
    }

    let non_system = table
        .columns
        .iter()
        .filter(|c| !c.is_primary_key && !config.is_system_column(&c.name))
        .count();
    non_system <= config.max_columns
}
