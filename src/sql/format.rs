//! Best-effort SQL pretty-printer.
//!
//! Normalizes whitespace and indentation of generated scripts. Input that does
//! not scan cleanly (unbalanced parentheses, unterminated strings) is rejected
//! so the caller can fall back to the raw text.

use super::SqlDialect;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unbalanced parentheses at line {line}")]
    UnbalancedParens { line: usize },

    #[error("unterminated string literal starting at line {line}")]
    UnterminatedString { line: usize },

    #[error("unterminated dollar-quoted block starting at line {line}")]
    UnterminatedDollarQuote { line: usize },
}

/// Pretty-print a generated script
pub fn pretty_print(sql: &str, dialect: SqlDialect) -> Result<String, FormatError> {
    check_balanced(sql)?;

    let mut out: Vec<String> = Vec::new();
    let mut in_table_body = false;
    let mut in_dollar_block = false;

    for raw in sql.lines() {
        let line = raw.trim_end();

        if dialect == SqlDialect::Postgres && line.matches("$$").count() % 2 == 1 {
            in_dollar_block = !in_dollar_block;
            out.push(line.to_string());
            continue;
        }
        if in_dollar_block {
            out.push(line.to_string());
            continue;
        }

        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            // Collapse runs of blank lines
            if out.last().is_some_and(|l| !l.is_empty()) {
                out.push(String::new());
            }
            continue;
        }

        if in_table_body {
            if trimmed.starts_with(')') {
                in_table_body = false;
                out.push(trimmed.to_string());
            } else {
                out.push(format!("    {}", trimmed));
            }
            continue;
        }

        if trimmed.to_uppercase().starts_with("CREATE TABLE") && trimmed.ends_with('(') {
            in_table_body = true;
        }
        out.push(line.to_string());
    }

    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    let start = out.iter().position(|l| !l.is_empty()).unwrap_or(out.len());

    let mut result = out[start..].join("\n");
    result.push('\n');
    Ok(result)
}

/// Scan for balanced parentheses outside comments and literals
fn check_balanced(sql: &str) -> Result<(), FormatError> {
    let mut depth: i64 = 0;
    let mut line = 1usize;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' => line += 1,
            '-' if chars.peek() == Some(&'-') => {
                // Line comment
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                        break;
                    }
                }
            }
            '\'' => {
                let start = line;
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '\n' => line += 1,
                        '\'' if chars.peek() == Some(&'\'') => {
                            chars.next();
                        }
                        '\'' => {
                            closed = true;
                            break;
                        }
                        _ => {}
                    }
                }
                if !closed {
                    return Err(FormatError::UnterminatedString { line: start });
                }
            }
            '$' if chars.peek() == Some(&'$') => {
                chars.next();
                let start = line;
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '\n' => line += 1,
                        '$' if chars.peek() == Some(&'$') => {
                            chars.next();
                            closed = true;
                            break;
                        }
                        _ => {}
                    }
                }
                if !closed {
                    return Err(FormatError::UnterminatedDollarQuote { line: start });
                }
            }
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(FormatError::UnbalancedParens { line });
                }
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(FormatError::UnbalancedParens { line });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reindents_table_body() {
        let sql = "CREATE TABLE book (\n  id INT,\n\t\ttitle TEXT   \n);";
        let out = pretty_print(sql, SqlDialect::MySql).unwrap();
        assert_eq!(out, "CREATE TABLE book (\n    id INT,\n    title TEXT\n);\n");
    }

    #[test]
    fn test_collapses_blank_lines() {
        let sql = "\n\nSELECT 1;\n\n\n\nSELECT 2;\n\n";
        let out = pretty_print(sql, SqlDialect::Sqlite).unwrap();
        assert_eq!(out, "SELECT 1;\n\nSELECT 2;\n");
    }

    #[test]
    fn test_rejects_unbalanced() {
        assert!(matches!(
            pretty_print("CREATE TABLE x (\n id INT", SqlDialect::MySql),
            Err(FormatError::UnbalancedParens { .. })
        ));
        assert!(matches!(
            pretty_print("INSERT INTO x VALUES ('abc);", SqlDialect::MySql),
            Err(FormatError::UnterminatedString { .. })
        ));
    }

    #[test]
    fn test_ignores_parens_in_comments_and_literals() {
        let sql = "-- note (\nINSERT INTO x (a) VALUES ('(', 'it''s');";
        assert!(pretty_print(sql, SqlDialect::MySql).is_ok());
    }

    #[test]
    fn test_dollar_block_untouched() {
        let sql = "CREATE FUNCTION f() RETURNS TRIGGER AS $$\nBEGIN\n  RETURN NEW;\nEND;\n$$ LANGUAGE plpgsql;";
        let out = pretty_print(sql, SqlDialect::Postgres).unwrap();
        assert!(out.contains("\n  RETURN NEW;\n"));
    }
}
