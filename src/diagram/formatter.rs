//! Structural pretty-printer for Mermaid `erDiagram` source.
//!
//! Repairs common defects by line role: missing blank lines between entity
//! blocks, sloppy relationship operators and spacing, stray keyword tokens in
//! attributes, and indentation. The output is a fixed point: formatting it
//! again yields the same text.

use super::lines::{classify, parse_relationship_loose, LineKind};

const ENTITY_INDENT: &str = "    ";
const ATTRIBUTE_INDENT: &str = "        ";

/// Attribute tokens Mermaid rejects; constraints belong in the SQL, not here
const DISALLOWED_TOKENS: &[&str] = &[
    "required",
    "optional",
    "nullable",
    "not",
    "null",
    "unique",
    "auto_increment",
    "autoincrement",
    "primary",
    "foreign",
    "key",
];

/// Format `source` into canonical `erDiagram` layout
pub fn format(source: &str) -> String {
    let lines = classify(source);
    let mut out: Vec<String> = vec!["erDiagram".to_string()];
    let mut last = LineKind::Header;
    let mut in_block = false;

    for line in &lines {
        let formatted = match &line.kind {
            LineKind::Header => continue,
            LineKind::Blank => {
                if !in_block && !matches!(last, LineKind::Blank | LineKind::Header) {
                    out.push(String::new());
                    last = LineKind::Blank;
                }
                continue;
            }
            LineKind::Comment if in_block => format!("{}{}", ATTRIBUTE_INDENT, line.text),
            LineKind::Comment => line.text.clone(),
            LineKind::EntityOpen(name) => {
                in_block = true;
                format!("{}{} {{", ENTITY_INDENT, name)
            }
            LineKind::EntityClose => {
                in_block = false;
                format!("{}}}", ENTITY_INDENT)
            }
            LineKind::Attribute => format!("{}{}", ATTRIBUTE_INDENT, format_attribute(&line.text)),
            LineKind::Relationship => {
                format!("{}{}", ENTITY_INDENT, format_relationship(&line.text))
            }
        };

        // Entity blocks are always followed by a blank line
        if last == LineKind::EntityClose {
            out.push(String::new());
        }
        out.push(formatted);
        last = line.kind.clone();
    }

    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    let mut text = out.join("\n");
    text.push('\n');
    text
}

/// Canonical spacing and `--` operator; `..` is kept
fn format_relationship(text: &str) -> String {
    let Some(rel) = parse_relationship_loose(text) else {
        return collapse_spaces(text);
    };
    let operator = if rel.operator == ".." { ".." } else { "--" };
    let head = format!(
        "{} {}{}{} {}",
        rel.source, rel.left, operator, rel.right, rel.target
    );
    match rel.label {
        Some(label) if label.starts_with('"') && label.ends_with('"') && label.len() >= 2 => {
            format!("{} : {}", head, label)
        }
        Some(label) if label.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') => {
            format!("{} : {}", head, label)
        }
        Some(label) => format!("{} : \"{}\"", head, label.replace('"', "'")),
        None => head,
    }
}

/// Drop disallowed tokens, normalize key markers
fn format_attribute(text: &str) -> String {
    let (body, comment) = match text.find('"') {
        Some(i) => (&text[..i], Some(text[i..].trim())),
        None => (text, None),
    };

    let mut tokens: Vec<String> = Vec::new();
    let mut keys: Vec<String> = Vec::new();
    for (i, token) in body.split_whitespace().enumerate() {
        // Type and name are never treated as keywords
        if i < 2 {
            tokens.push(token.to_string());
            continue;
        }
        for part in token.split(',').filter(|p| !p.is_empty()) {
            let upper = part.to_uppercase();
            if matches!(upper.as_str(), "PK" | "FK" | "UK") {
                if !keys.contains(&upper) {
                    keys.push(upper);
                }
            } else if !DISALLOWED_TOKENS.contains(&part.to_lowercase().as_str()) {
                tokens.push(part.to_string());
            }
        }
    }

    let mut result = tokens.join(" ");
    if !keys.is_empty() {
        result.push(' ');
        result.push_str(&keys.join(", "));
    }
    if let Some(comment) = comment {
        result.push(' ');
        result.push_str(comment);
    }
    result
}

fn collapse_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reindents_and_separates_blocks() {
        let input = "erDiagram\nbook {\nstring title\n}\nauthor {\n  number id PK\n}\nauthor ||--o{ book : \"writes\"";
        let expected = "erDiagram\n    book {\n        string title\n    }\n\n    author {\n        number id PK\n    }\n\n    author ||--o{ book : \"writes\"\n";
        assert_eq!(format(input), expected);
    }

    #[test]
    fn test_repairs_relationship_operators() {
        assert_eq!(format_relationship("a ||-o{ b : has"), "a ||--o{ b : has");
        assert_eq!(format_relationship("a||—o{b:has"), "a ||--o{ b : has");
        assert_eq!(format_relationship("a || – o{ b : has"), "a ||--o{ b : has");
        assert_eq!(format_relationship("a ||- -o{ b : has"), "a ||--o{ b : has");
        assert_eq!(format_relationship("a }o..|| b : \"x\""), "a }o..|| b : \"x\"");
        assert_eq!(
            format_relationship("a ||--|| b : belongs to"),
            "a ||--|| b : \"belongs to\""
        );
    }

    #[test]
    fn test_strips_disallowed_tokens() {
        assert_eq!(format_attribute("string email required unique"), "string email");
        assert_eq!(format_attribute("number id pk"), "number id PK");
        assert_eq!(format_attribute("number user_id PK,FK"), "number user_id PK, FK");
        assert_eq!(
            format_attribute("string title   not null \"Book title\""),
            "string title \"Book title\""
        );
    }

    #[test]
    fn test_header_inserted_once() {
        let out = format("book {\n}\nerDiagram\n");
        assert_eq!(out, "erDiagram\n    book {\n    }\n");
    }

    #[test]
    fn test_idempotent() {
        let messy = "\n\nerDiagram\n\n\nbook{\n\n string title required\n }\n%% note\nauthor {\n}\n\n\nauthor||-o{book:writes\n\n";
        let once = format(messy);
        assert_eq!(format(&once), once);
    }
}
