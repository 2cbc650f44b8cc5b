//! Identifier and type sanitization for Mermaid output.

use crate::normalize::naming::to_snake_case;

/// Words Mermaid treats specially in an `erDiagram`
const RESERVED: &[&str] = &[
    "erdiagram", "end", "graph", "subgraph", "flowchart", "direction", "style", "class",
    "classdef", "click", "call", "href", "linkstyle", "default", "pk", "fk", "uk",
];

/// Entity name: lower snake_case, reserved words suffixed with `_entity`
pub fn entity_name(name: &str) -> String {
    let base = identifier(name).unwrap_or_else(|| "entity".to_string());
    if RESERVED.contains(&base.as_str()) {
        format!("{}_entity", base)
    } else {
        base
    }
}

/// Attribute name: lower snake_case
pub fn attribute_name(name: &str) -> String {
    identifier(name).unwrap_or_else(|| "attribute".to_string())
}

/// Non-word characters become underscores before the snake_case pass
fn identifier(name: &str) -> Option<String> {
    let worded: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    let snake = to_snake_case(&worded)?;
    let snake = snake.trim_start_matches('_');
    if snake.is_empty() {
        None
    } else if snake.starts_with(|c: char| c.is_ascii_digit()) {
        Some(format!("n_{}", snake))
    } else {
        Some(snake.to_string())
    }
}

/// Coarse Mermaid attribute type for an SQL type
pub fn coarse_type(sql_type: &str) -> &'static str {
    let t = sql_type.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| t.contains(n));

    if has(&["bool", "bit"]) || t == "tinyint(1)" {
        "boolean"
    } else if has(&["date", "time", "year"]) {
        "date"
    } else if has(&["blob", "binary", "bytea", "image"]) {
        "binary"
    } else if has(&[
        "int", "decimal", "numeric", "number", "float", "double", "real", "serial", "money",
    ]) {
        "number"
    } else {
        "string"
    }
}
