//! Schema documentation in Markdown or HTML.
//!
//! Both renderers draw from one [`SchemaFacts`] value built from the schema,
//! so the factual content is identical and only the presentation differs.

mod html;
mod markdown;

use crate::model::{Column, Relationship, Schema, Table};
use std::fmt;
use std::str::FromStr;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocFormat {
    #[default]
    Markdown,
    Html,
}

impl FromStr for DocFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(DocFormat::Markdown),
            "html" | "htm" => Ok(DocFormat::Html),
            "pdf" => {
                tracing::warn!("pdf output is not supported, rendering markdown");
                Ok(DocFormat::Markdown)
            }
            _ => Err(format!(
                "Unknown format: {}. Valid options: markdown, html, pdf",
                s
            )),
        }
    }
}

impl fmt::Display for DocFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocFormat::Markdown => write!(f, "markdown"),
            DocFormat::Html => write!(f, "html"),
        }
    }
}

impl DocFormat {
    /// Parse a format name, falling back to Markdown for anything unknown
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(format = name, "unsupported documentation format, using markdown");
            DocFormat::Markdown
        })
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocFormat::Markdown => "md",
            DocFormat::Html => "html",
        }
    }
}

/// Render documentation for `schema`
pub fn generate(schema: &Schema, format: DocFormat) -> String {
    let facts = SchemaFacts::from_schema(schema);
    tracing::debug!(format = %format, tables = facts.tables.len(), "generating documentation");
    match format {
        DocFormat::Markdown => markdown::render(&facts),
        DocFormat::Html => html::render(&facts),
    }
}

/// Render documentation for a format given by name; unknown names use Markdown
pub fn generate_for(schema: &Schema, format: &str) -> String {
    generate(schema, DocFormat::from_name_or_default(format))
}

/// Everything the renderers show, already stringified
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaFacts {
    pub name: String,
    pub description: Option<String>,
    pub version: String,
    pub tables: Vec<TableFacts>,
    pub relationships: Vec<RelationshipFacts>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableFacts {
    pub name: String,
    pub anchor: String,
    pub description: Option<String>,
    /// "Strong Entity", "Weak Entity", ...
    pub kind: String,
    pub columns: Vec<ColumnFacts>,
    pub foreign_keys: Vec<ForeignKeyFacts>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFacts {
    pub name: String,
    pub data_type: String,
    /// "PK", "FK", "PK, FK" or empty
    pub keys: String,
    pub nullable: bool,
    pub unique: bool,
    pub default: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyFacts {
    pub column: String,
    pub references: String,
    pub on_delete: String,
    pub on_update: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipFacts {
    pub source: String,
    pub verb: String,
    pub target: String,
    pub rel_type: String,
    pub cardinality: String,
    pub participation: String,
    pub identifying: bool,
    pub description: Option<String>,
    pub attributes: Vec<ColumnFacts>,
}

impl SchemaFacts {
    pub fn from_schema(schema: &Schema) -> Self {
        Self {
            name: schema.name.clone(),
            description: non_empty(schema.description.as_deref()),
            version: schema.version.clone(),
            tables: schema.tables.iter().map(TableFacts::from_table).collect(),
            relationships: schema
                .relationships
                .iter()
                .map(RelationshipFacts::from_relationship)
                .collect(),
        }
    }

    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }
}

impl TableFacts {
    fn from_table(table: &Table) -> Self {
        let foreign_keys = table
            .columns
            .iter()
            .filter_map(|c| {
                let fk = c.references.as_ref()?;
                Some(ForeignKeyFacts {
                    column: c.name.clone(),
                    references: format!("{}.{}", fk.table, fk.column),
                    on_delete: fk.on_delete.as_sql().to_string(),
                    on_update: fk.on_update.as_sql().to_string(),
                })
            })
            .collect();
        Self {
            name: table.name.clone(),
            anchor: anchor(&table.name),
            description: non_empty(table.description.as_deref()),
            kind: table.kind().label().to_string(),
            columns: table.columns.iter().map(ColumnFacts::from_column).collect(),
            foreign_keys,
        }
    }
}

impl ColumnFacts {
    fn from_column(column: &Column) -> Self {
        let mut keys = Vec::new();
        if column.is_primary_key {
            keys.push("PK");
        }
        if column.is_foreign_key {
            keys.push("FK");
        }
        Self {
            name: column.name.clone(),
            data_type: column.data_type.clone(),
            keys: keys.join(", "),
            nullable: column.is_nullable,
            unique: column.is_unique,
            default: non_empty(column.default_value.as_deref()),
            description: non_empty(column.description.as_deref()),
        }
    }
}

impl RelationshipFacts {
    fn from_relationship(rel: &Relationship) -> Self {
        Self {
            source: rel.source_table.clone(),
            verb: rel.name.clone(),
            target: rel.target_table.clone(),
            rel_type: rel.rel_type.as_str().to_string(),
            cardinality: format!("{} : {}", rel.source_cardinality, rel.target_cardinality),
            participation: format!(
                "{} / {}",
                rel.source_participation, rel.target_participation
            ),
            identifying: rel.is_identifying,
            description: non_empty(rel.description.as_deref()),
            attributes: rel.attributes.iter().map(ColumnFacts::from_column).collect(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Lower-case, hyphenated fragment id
fn anchor(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect()
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}
