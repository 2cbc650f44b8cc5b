//! Markdown renderer.
//!
//! Emits a GitHub-flavored document with a contents list and one section per
//! table, followed by the relationship table.

use super::{yes_no, ColumnFacts, SchemaFacts};

/// Table cells cannot hold pipes or line breaks
fn cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn optional_cell(value: Option<&str>) -> String {
    value.map(cell).unwrap_or_else(|| "-".to_string())
}

fn code_cell(value: &str) -> String {
    format!("`{}`", value.replace('`', "'"))
}

pub fn render(facts: &SchemaFacts) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", facts.name));
    if let Some(description) = &facts.description {
        out.push_str(&format!("{}\n\n", description));
    }
    out.push_str(&format!("- **Version:** {}\n", facts.version));
    out.push_str(&format!("- **Tables:** {}\n", facts.tables.len()));
    out.push_str(&format!("- **Relationships:** {}\n\n", facts.relationships.len()));

    if !facts.tables.is_empty() {
        out.push_str("## Contents\n\n");
        for table in &facts.tables {
            out.push_str(&format!("- [{}](#{})\n", table.name, table.anchor));
        }
        out.push_str("- [Relationships](#relationships)\n\n");
    }

    out.push_str("## Tables\n\n");
    if facts.tables.is_empty() {
        out.push_str("_No tables defined._\n\n");
    }
    for table in &facts.tables {
        out.push_str(&format!("### {}\n\n", table.name));
        out.push_str(&format!("**Type:** {}\n\n", table.kind));
        if let Some(description) = &table.description {
            out.push_str(&format!("{}\n\n", description));
        }

        column_table(&mut out, &table.columns);

        if !table.foreign_keys.is_empty() {
            out.push_str("**Foreign keys**\n\n");
            out.push_str("| Column | References | On Delete | On Update |\n");
            out.push_str("|--------|------------|-----------|-----------|\n");
            for fk in &table.foreign_keys {
                out.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    code_cell(&fk.column),
                    code_cell(&fk.references),
                    fk.on_delete,
                    fk.on_update
                ));
            }
            out.push('\n');
        }
    }

    out.push_str("## Relationships\n\n");
    if facts.relationships.is_empty() {
        out.push_str("_No relationships defined._\n");
        return out;
    }

    out.push_str("| Source | Verb | Target | Type | Cardinality | Participation | Identifying | Description |\n");
    out.push_str("|--------|------|--------|------|-------------|---------------|-------------|-------------|\n");
    for rel in &facts.relationships {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
            cell(&rel.source),
            cell(&rel.verb),
            cell(&rel.target),
            rel.rel_type,
            cell(&rel.cardinality),
            rel.participation,
            yes_no(rel.identifying),
            optional_cell(rel.description.as_deref())
        ));
    }
    out.push('\n');

    for rel in facts.relationships.iter().filter(|r| !r.attributes.is_empty()) {
        out.push_str(&format!(
            "### {} {} {} attributes\n\n",
            rel.source, rel.verb, rel.target
        ));
        column_table(&mut out, &rel.attributes);
    }

    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

fn column_table(out: &mut String, columns: &[ColumnFacts]) {
    out.push_str("| Column | Type | Key | Nullable | Unique | Default | Description |\n");
    out.push_str("|--------|------|-----|----------|--------|---------|-------------|\n");
    for column in columns {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            code_cell(&column.name),
            cell(&column.data_type),
            if column.keys.is_empty() { "-" } else { column.keys.as_str() },
            yes_no(column.nullable),
            yes_no(column.unique),
            optional_cell(column.default.as_deref()),
            optional_cell(column.description.as_deref())
        ));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::tests::library;

    #[test]
    fn test_markdown_layout() {
        let md = render(&SchemaFacts::from_schema(&library()));
        assert!(md.starts_with("# library\n\nBooks & authors\n"));
        assert!(md.contains("- [book](#book)"));
        assert!(md.contains("| `author_id` | INTEGER | FK | Yes | No | - | - |"));
        assert!(md.contains("| `author_id` | `author.id` | CASCADE | CASCADE |"));
        assert!(md.contains("| author | writes | book | ONE_TO_MANY | 1 : N | PARTIAL / PARTIAL | No | - |"));
        assert!(md.contains("### author writes book attributes"));
        assert!(md.ends_with("|\n"));
    }

    #[test]
    fn test_pipes_escaped() {
        assert_eq!(cell("a|b\nc"), "a\\|b c");
    }

    #[test]
    fn test_empty_schema() {
        let schema = crate::model::Schema::new("empty");
        let md = render(&SchemaFacts::from_schema(&schema));
        assert!(md.contains("_No tables defined._"));
        assert!(md.ends_with("_No relationships defined._\n"));
    }
}
