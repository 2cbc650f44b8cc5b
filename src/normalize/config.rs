//! YAML configuration for normalization heuristics.
//!
//! The lookup-table heuristic is a best guess; every threshold and keyword
//! list lives here so it can be tuned without touching the normalizer.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Lookup-table detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Table-name keywords that mark enumerated-value tables
    pub keywords: Vec<String>,
    /// Column names that hold a display value
    pub name_columns: Vec<String>,
    /// Column names that hold a code/key
    pub code_columns: Vec<String>,
    /// Tables with at most this many non-system columns qualify without a keyword
    pub max_columns: usize,
    /// Columns ignored when counting
    pub system_columns: Vec<String>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            keywords: to_strings(&[
                "status", "type", "category", "role", "level", "priority", "kind", "tag", "genre",
                "currency", "country", "language",
            ]),
            name_columns: to_strings(&["name", "title", "label", "value", "display_name"]),
            code_columns: to_strings(&["code", "key", "slug", "abbreviation", "symbol"]),
            max_columns: 3,
            system_columns: to_strings(&["id", "created_at", "updated_at"]),
        }
    }
}

impl LookupConfig {
    /// The keyword contained in `table_name`, if any
    pub fn keyword_in(&self, table_name: &str) -> Option<&str> {
        let lower = table_name.to_lowercase();
        self.keywords
            .iter()
            .find(|k| lower.contains(k.as_str()))
            .map(|k| k.as_str())
    }

    pub fn is_name_column(&self, column: &str) -> bool {
        matches_column(&self.name_columns, column)
    }

    pub fn is_code_column(&self, column: &str) -> bool {
        matches_column(&self.code_columns, column)
    }

    pub fn is_system_column(&self, column: &str) -> bool {
        self.system_columns
            .iter()
            .any(|c| c.eq_ignore_ascii_case(column))
    }
}

/// `name` matches `name` and `status_name`
fn matches_column(list: &[String], column: &str) -> bool {
    let lower = column.to_lowercase();
    list.iter()
        .any(|c| lower == *c || lower.ends_with(&format!("_{}", c)))
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Complete normalizer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    pub lookup: LookupConfig,
}

impl NormalizeConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: NormalizeConfig = serde_yaml_ng::from_str(content)?;
        Ok(config)
    }
}
