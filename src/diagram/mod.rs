//! Mermaid ER diagram generation.
//!
//! Raw emission, then a structural formatting pass, then validation of the
//! formatted text. Findings never fail generation; they are appended to the
//! output as `%%` comment lines.

pub mod formatter;
pub mod lines;
pub mod sanitize;
pub mod validator;

pub use formatter::format;
pub use validator::{validate, with_diagnostics, DiagramIssue};

use crate::model::{Relationship, RelationshipType, Schema, Table};
use sanitize::{attribute_name, coarse_type, entity_name};

/// Formatted diagram plus the validator's findings
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    /// Formatted source without diagnostics
    pub source: String,
    pub issues: Vec<DiagramIssue>,
}

impl Diagram {
    /// Source with the `%%` diagnostic trailer
    pub fn to_text(&self) -> String {
        with_diagnostics(&self.source, &self.issues)
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Mermaid source for `schema`, diagnostics included
pub fn generate(schema: &Schema) -> String {
    render(schema).to_text()
}

/// Emit, format and validate
pub fn render(schema: &Schema) -> Diagram {
    let raw = emit(schema);
    let source = format(&raw);
    let issues = validate(&source);
    for issue in &issues {
        tracing::debug!(issue = %issue, "diagram validation finding");
    }
    tracing::debug!(
        entities = schema.tables.len(),
        relationships = schema.relationships.len(),
        issues = issues.len(),
        "generated diagram"
    );
    Diagram { source, issues }
}

/// Unformatted `erDiagram` text
pub fn emit(schema: &Schema) -> String {
    let mut out = String::from("erDiagram\n");
    for table in &schema.tables {
        emit_entity(&mut out, table);
    }
    for rel in &schema.relationships {
        out.push_str(&relationship_line(rel));
        out.push('\n');
    }
    out
}

fn emit_entity(out: &mut String, table: &Table) {
    out.push_str(&format!("{} {{\n", entity_name(&table.name)));
    for column in &table.columns {
        let mut line = format!(
            "{} {}",
            coarse_type(&column.data_type),
            attribute_name(&column.name)
        );
        // A column that is both shows as PK
        if column.is_primary_key {
            line.push_str(" PK");
        } else if column.is_foreign_key {
            line.push_str(" FK");
        }
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("}\n");
}

fn relationship_line(rel: &Relationship) -> String {
    let (default_left, default_right) = type_symbols(rel.rel_type);
    let left = left_symbol(&rel.source_cardinality).unwrap_or(default_left);
    let right = right_symbol(&rel.target_cardinality).unwrap_or(default_right);
    let label = rel.name.replace('"', "'");
    format!(
        "{} {}--{} {} : \"{}\"",
        entity_name(&rel.source_table),
        left,
        right,
        entity_name(&rel.target_table),
        label
    )
}

/// Symbols by relationship type
fn type_symbols(rel_type: RelationshipType) -> (&'static str, &'static str) {
    match rel_type {
        RelationshipType::OneToOne => ("||", "||"),
        RelationshipType::OneToMany => ("||", "o{"),
        RelationshipType::ManyToOne => ("}o", "||"),
        RelationshipType::ManyToMany => ("}o", "o{"),
    }
}

fn cardinality_word(value: &str) -> Option<&'static str> {
    match value.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
        "one" | "exactly-one" => Some("one"),
        "zero-or-one" => Some("zero-or-one"),
        "many" | "zero-or-many" => Some("many"),
        "one-or-many" => Some("one-or-many"),
        _ => None,
    }
}

fn left_symbol(value: &str) -> Option<&'static str> {
    Some(match cardinality_word(value)? {
        "one" => "||",
        "zero-or-one" => "|o",
        "one-or-many" => "}|",
        _ => "}o",
    })
}

fn right_symbol(value: &str) -> Option<&'static str> {
    Some(match cardinality_word(value)? {
        "one" => "||",
        "zero-or-one" => "o|",
        "one-or-many" => "|{",
        _ => "o{",
    })
}
