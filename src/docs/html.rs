//! Standalone HTML renderer.
//!
//! A single self-contained page with inline CSS; every text value is escaped
//! before it reaches the markup.

use super::{yes_no, ColumnFacts, SchemaFacts};

const STYLE: &str = r#"body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 2rem auto; max-width: 1100px; color: #1f2328; line-height: 1.5; }
h1 { border-bottom: 2px solid #d0d7de; padding-bottom: .3rem; }
h2 { margin-top: 2.5rem; border-bottom: 1px solid #d0d7de; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid #d0d7de; padding: .35rem .6rem; text-align: left; vertical-align: top; }
th { background: #f6f8fa; }
code { background: #f6f8fa; padding: 0 .25rem; border-radius: 3px; }
.kind { display: inline-block; font-size: .85rem; padding: .1rem .5rem; border-radius: 1rem; background: #ddf4ff; }
.meta { color: #57606a; }"#;

/// Escape text for element content and attribute values
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn optional(value: Option<&str>) -> String {
    value.map(escape).unwrap_or_else(|| "-".to_string())
}

fn row(out: &mut String, cells: &[String]) {
    out.push_str("<tr>");
    for cell in cells {
        out.push_str(&format!("<td>{}</td>", cell));
    }
    out.push_str("</tr>\n");
}

fn header_row(out: &mut String, titles: &[&str]) {
    out.push_str("<thead><tr>");
    for title in titles {
        out.push_str(&format!("<th>{}</th>", title));
    }
    out.push_str("</tr></thead>\n");
}

pub fn render(facts: &SchemaFacts) -> String {
    let name = escape(&facts.name);
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{} - Schema Documentation</title>\n", name));
    out.push_str(&format!("<style>\n{}\n</style>\n</head>\n<body>\n", STYLE));

    out.push_str(&format!("<h1>{}</h1>\n", name));
    if let Some(description) = &facts.description {
        out.push_str(&format!("<p>{}</p>\n", escape(description)));
    }
    out.push_str(&format!(
        "<p class=\"meta\">Version {} &middot; {} tables &middot; {} relationships</p>\n",
        escape(&facts.version),
        facts.tables.len(),
        facts.relationships.len()
    ));

    if !facts.tables.is_empty() {
        out.push_str("<nav>\n<h2>Contents</h2>\n<ul>\n");
        for table in &facts.tables {
            out.push_str(&format!(
                "<li><a href=\"#{}\">{}</a></li>\n",
                escape(&table.anchor),
                escape(&table.name)
            ));
        }
        out.push_str("<li><a href=\"#relationships\">Relationships</a></li>\n</ul>\n</nav>\n");
    }

    out.push_str("<h2>Tables</h2>\n");
    if facts.tables.is_empty() {
        out.push_str("<p><em>No tables defined.</em></p>\n");
    }
    for table in &facts.tables {
        out.push_str(&format!(
            "<section id=\"{}\">\n<h3>{}</h3>\n<p><span class=\"kind\">{}</span></p>\n",
            escape(&table.anchor),
            escape(&table.name),
            escape(&table.kind)
        ));
        if let Some(description) = &table.description {
            out.push_str(&format!("<p>{}</p>\n", escape(description)));
        }
        column_table(&mut out, &table.columns);

        if !table.foreign_keys.is_empty() {
            out.push_str("<h4>Foreign keys</h4>\n<table>\n");
            header_row(&mut out, &["Column", "References", "On Delete", "On Update"]);
            out.push_str("<tbody>\n");
            for fk in &table.foreign_keys {
                row(
                    &mut out,
                    &[
                        format!("<code>{}</code>", escape(&fk.column)),
                        format!("<code>{}</code>", escape(&fk.references)),
                        escape(&fk.on_delete),
                        escape(&fk.on_update),
                    ],
                );
            }
            out.push_str("</tbody>\n</table>\n");
        }
        out.push_str("</section>\n");
    }

    out.push_str("<h2 id=\"relationships\">Relationships</h2>\n");
    if facts.relationships.is_empty() {
        out.push_str("<p><em>No relationships defined.</em></p>\n");
    } else {
        out.push_str("<table>\n");
        header_row(
            &mut out,
            &[
                "Source",
                "Verb",
                "Target",
                "Type",
                "Cardinality",
                "Participation",
                "Identifying",
                "Description",
            ],
        );
        out.push_str("<tbody>\n");
        for rel in &facts.relationships {
            row(
                &mut out,
                &[
                    escape(&rel.source),
                    escape(&rel.verb),
                    escape(&rel.target),
                    escape(&rel.rel_type),
                    escape(&rel.cardinality),
                    escape(&rel.participation),
                    yes_no(rel.identifying).to_string(),
                    optional(rel.description.as_deref()),
                ],
            );
        }
        out.push_str("</tbody>\n</table>\n");

        for rel in facts.relationships.iter().filter(|r| !r.attributes.is_empty()) {
            out.push_str(&format!(
                "<h3>{} {} {} attributes</h3>\n",
                escape(&rel.source),
                escape(&rel.verb),
                escape(&rel.target)
            ));
            column_table(&mut out, &rel.attributes);
        }
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn column_table(out: &mut String, columns: &[ColumnFacts]) {
    out.push_str("<table>\n");
    header_row(
        out,
        &["Column", "Type", "Key", "Nullable", "Unique", "Default", "Description"],
    );
    out.push_str("<tbody>\n");
    for column in columns {
        row(
            out,
            &[
                format!("<code>{}</code>", escape(&column.name)),
                escape(&column.data_type),
                if column.keys.is_empty() {
                    "-".to_string()
                } else {
                    escape(&column.keys)
                },
                yes_no(column.nullable).to_string(),
                yes_no(column.unique).to_string(),
                optional(column.default.as_deref()),
                optional(column.description.as_deref()),
            ],
        );
    }
    out.push_str("</tbody>\n</table>\n");
}
