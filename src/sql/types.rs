//! Data type mapping from dialect-neutral tokens to each SQL dialect.
//!
//! Handles:
//! - Integer types (INTEGER, BIGINT, SMALLINT)
//! - Decimal and float types
//! - String types (VARCHAR, CHAR, TEXT)
//! - Boolean, date/time, JSON, UUID and binary types

use super::SqlDialect;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_ ]*?)\s*(?:\(\s*([^)]*?)\s*\))?\s*$").unwrap());

/// Map a neutral type token (`VARCHAR(255)`, `BOOLEAN`, ...) to `dialect`.
///
/// Tokens outside the neutral vocabulary pass through unchanged.
pub fn map_type(dialect: SqlDialect, neutral: &str) -> String {
    let Some(caps) = RE_TYPE.captures(neutral) else {
        return neutral.to_string();
    };
    let base = caps[1].to_uppercase();
    let args = caps.get(2).map(|m| m.as_str().replace(' ', ""));
    let args = args.as_deref().filter(|a| !a.is_empty());

    match dialect {
        SqlDialect::MySql => mysql_type(&base, args),
        SqlDialect::Postgres => postgres_type(&base, args),
        SqlDialect::Sqlite => sqlite_type(&base, args),
        SqlDialect::MsSql => mssql_type(&base, args),
    }
    .unwrap_or_else(|| neutral.trim().to_string())
}

fn with_args(base: &str, args: Option<&str>, default: &str) -> String {
    format!("{}({})", base, args.unwrap_or(default))
}

fn mysql_type(base: &str, args: Option<&str>) -> Option<String> {
    Some(match base {
        "INTEGER" => "INT".to_string(),
        "BIGINT" => "BIGINT".to_string(),
        "SMALLINT" => "SMALLINT".to_string(),
        "VARCHAR" => with_args("VARCHAR", args, "255"),
        "CHAR" => with_args("CHAR", args, "1"),
        "TEXT" => "TEXT".to_string(),
        "DECIMAL" => with_args("DECIMAL", args, "10,2"),
        "FLOAT" => "FLOAT".to_string(),
        "DOUBLE" => "DOUBLE".to_string(),
        "BOOLEAN" => "TINYINT(1)".to_string(),
        "DATE" => "DATE".to_string(),
        "TIME" => "TIME".to_string(),
        "TIMESTAMP" => "TIMESTAMP".to_string(),
        "JSON" => "JSON".to_string(),
        "UUID" => "CHAR(36)".to_string(),
        "BLOB" => "BLOB".to_string(),
        "ENUM" => "VARCHAR(255)".to_string(),
        _ => return None,
    })
}

fn postgres_type(base: &str, args: Option<&str>) -> Option<String> {
    Some(match base {
        "INTEGER" => "INTEGER".to_string(),
        "BIGINT" => "BIGINT".to_string(),
        "SMALLINT" => "SMALLINT".to_string(),
        "VARCHAR" => with_args("VARCHAR", args, "255"),
        "CHAR" => with_args("CHAR", args, "1"),
        "TEXT" => "TEXT".to_string(),
        "DECIMAL" => with_args("NUMERIC", args, "10,2"),
        "FLOAT" => "REAL".to_string(),
        "DOUBLE" => "DOUBLE PRECISION".to_string(),
        "BOOLEAN" => "BOOLEAN".to_string(),
        "DATE" => "DATE".to_string(),
        "TIME" => "TIME".to_string(),
        "TIMESTAMP" => "TIMESTAMP".to_string(),
        "JSON" => "JSONB".to_string(),
        "UUID" => "UUID".to_string(),
        "BLOB" => "BYTEA".to_string(),
        "ENUM" => "VARCHAR(255)".to_string(),
        _ => return None,
    })
}

fn sqlite_type(base: &str, _args: Option<&str>) -> Option<String> {
    // SQLite only has storage classes; keep names that give the right affinity
    Some(
        match base {
            "INTEGER" | "BIGINT" | "SMALLINT" | "BOOLEAN" => "INTEGER",
            "VARCHAR" | "CHAR" | "TEXT" | "JSON" | "UUID" | "ENUM" => "TEXT",
            "DECIMAL" => "NUMERIC",
            "FLOAT" | "DOUBLE" => "REAL",
            "DATE" | "TIME" => "TEXT",
            "TIMESTAMP" => "DATETIME",
            "BLOB" => "BLOB",
            _ => return None,
        }
        .to_string(),
    )
}

fn mssql_type(base: &str, args: Option<&str>) -> Option<String> {
    Some(match base {
        "INTEGER" => "INT".to_string(),
        "BIGINT" => "BIGINT".to_string(),
        "SMALLINT" => "SMALLINT".to_string(),
        "VARCHAR" => with_args("NVARCHAR", args, "255"),
        "CHAR" => with_args("NCHAR", args, "1"),
        "TEXT" | "JSON" => "NVARCHAR(MAX)".to_string(),
        "DECIMAL" => with_args("DECIMAL", args, "10,2"),
        "FLOAT" | "DOUBLE" => "FLOAT".to_string(),
        "BOOLEAN" => "BIT".to_string(),
        "DATE" => "DATE".to_string(),
        "TIME" => "TIME".to_string(),
        "TIMESTAMP" => "DATETIME2".to_string(),
        "UUID" => "UNIQUEIDENTIFIER".to_string(),
        "BLOB" => "VARBINARY(MAX)".to_string(),
        "ENUM" => "NVARCHAR(255)".to_string(),
        _ => return None,
    })
}

/// Single-quoted SQL string literal
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
