//! Seed rows for detected lookup tables.

use crate::model::{Column, Table};
use crate::normalize::config::LookupConfig;
use once_cell::sync::Lazy;

/// Known value sets keyed by the lookup keyword in the table name.
/// Each entry is a display value plus an optional explicit code.
static VALUE_SETS: Lazy<Vec<(&'static str, Vec<(&'static str, Option<&'static str>)>)>> =
    Lazy::new(|| {
        vec![
            ("status", plain(&["Active", "Inactive", "Pending"])),
            ("type", plain(&["Standard", "Premium", "Basic"])),
            ("category", plain(&["General", "Featured", "Archived"])),
            ("role", plain(&["Admin", "Editor", "Viewer"])),
            ("level", plain(&["Beginner", "Intermediate", "Advanced"])),
            ("priority", plain(&["Low", "Medium", "High"])),
            ("kind", plain(&["Primary", "Secondary", "Other"])),
            ("tag", plain(&["New", "Popular", "Sale"])),
            ("genre", plain(&["Fiction", "Non-Fiction", "Poetry"])),
            (
                "currency",
                vec![
                    ("US Dollar", Some("USD")),
                    ("Euro", Some("EUR")),
                    ("British Pound", Some("GBP")),
                ],
            ),
            (
                "country",
                vec![
                    ("United States", Some("US")),
                    ("United Kingdom", Some("GB")),
                    ("Germany", Some("DE")),
                ],
            ),
            (
                "language",
                vec![
                    ("English", Some("en")),
                    ("Spanish", Some("es")),
                    ("French", Some("fr")),
                ],
            ),
        ]
    });

fn plain(values: &[&'static str]) -> Vec<(&'static str, Option<&'static str>)> {
    values.iter().map(|v| (*v, None)).collect()
}

/// Columns and literal rows for one seed INSERT
#[derive(Debug, Clone, PartialEq)]
pub struct SeedPlan {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// First name-like non-key column, falling back to a code-like one
pub fn display_column(table: &Table, config: &LookupConfig) -> Option<String> {
    let candidates = || table.columns.iter().filter(|c| !c.is_primary_key && !c.is_foreign_key);
    candidates()
        .find(|c| config.is_name_column(&c.name))
        .or_else(|| candidates().find(|c| config.is_code_column(&c.name)))
        .map(|c| c.name.clone())
}

fn default_code(value: &str) -> String {
    value
        .to_uppercase()
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect()
}

/// Plan the seed rows for `table`, or explain why none can be generated.
///
/// `is_serial` tells whether a key column is generated by the database.
pub fn plan(
    table: &Table,
    config: &LookupConfig,
    is_serial: impl Fn(&Table, &Column) -> bool,
) -> Result<SeedPlan, String> {
    let keyword = config
        .keyword_in(&table.name)
        .ok_or_else(|| "no known value set for this table".to_string())?;
    let values = VALUE_SETS
        .iter()
        .find(|(k, _)| *k == keyword)
        .map(|(_, v)| v)
        .ok_or_else(|| format!("no known value set for keyword '{}'", keyword))?;

    let keys = table.primary_key_columns();
    if keys.len() != 1 || !is_serial(table, keys[0]) {
        return Err("primary key is not generated automatically".to_string());
    }

    let name_col = table
        .columns
        .iter()
        .find(|c| !c.is_primary_key && !c.is_foreign_key && config.is_name_column(&c.name));
    let code_col = table
        .columns
        .iter()
        .find(|c| !c.is_primary_key && !c.is_foreign_key && config.is_code_column(&c.name));
    if name_col.is_none() && code_col.is_none() {
        return Err("no name or code column".to_string());
    }

    let filled = |c: &Column| {
        name_col.is_some_and(|n| n.name == c.name) || code_col.is_some_and(|n| n.name == c.name)
    };
    if let Some(required) = table.columns.iter().find(|c| {
        !c.is_primary_key && !c.is_nullable && c.default_value.is_none() && !filled(c)
    }) {
        return Err(format!("required column {} has no default", required.name));
    }

    let mut columns = Vec::new();
    if let Some(c) = name_col {
        columns.push(c.name.clone());
    }
    if let Some(c) = code_col {
        columns.push(c.name.clone());
    }

    let rows = values
        .iter()
        .map(|(value, code)| {
            let mut row = Vec::with_capacity(2);
            if name_col.is_some() {
                row.push(value.to_string());
            }
            if code_col.is_some() {
                row.push(code.map(str::to_string).unwrap_or_else(|| default_code(value)));
            }
            row
        })
        .collect();

    Ok(SeedPlan { columns, rows })
}
