//! Dialect-neutral data types.
//!
//! Handles:
//! - Inferring a type from a column name when the extraction supplies none
//! - Normalizing loosely spelled input types (INT, string, bool, money, ...)

/// One way a rule can match a snake_case column name
#[derive(Debug, Clone, Copy)]
enum NameMatch {
    Contains(&'static str),
    Prefix(&'static str),
    Suffix(&'static str),
    Exact(&'static str),
}

impl NameMatch {
    fn matches(self, name: &str) -> bool {
        match self {
            NameMatch::Contains(s) => name.contains(s),
            NameMatch::Prefix(s) => name.starts_with(s),
            NameMatch::Suffix(s) => name.ends_with(s),
            NameMatch::Exact(s) => name == s,
        }
    }
}

struct TypeRule {
    patterns: &'static [NameMatch],
    data_type: &'static str,
}

use NameMatch::*;

/// Ordered keyword → type rules; the first match wins.
static TYPE_RULES: &[TypeRule] = &[
    TypeRule {
        patterns: &[
            Contains("price"),
            Contains("cost"),
            Contains("amount"),
            Contains("total"),
            Contains("salary"),
            Contains("fee"),
            Contains("balance"),
        ],
        data_type: "DECIMAL(10,2)",
    },
    TypeRule {
        patterns: &[Contains("email")],
        data_type: "VARCHAR(255)",
    },
    TypeRule {
        patterns: &[Contains("phone")],
        data_type: "VARCHAR(20)",
    },
    TypeRule {
        patterns: &[Contains("url"), Contains("website")],
        data_type: "VARCHAR(500)",
    },
    TypeRule {
        patterns: &[
            Contains("description"),
            Contains("content"),
            Contains("body"),
            Contains("notes"),
            Exact("bio"),
            Contains("comment"),
        ],
        data_type: "TEXT",
    },
    TypeRule {
        patterns: &[Prefix("is_"), Prefix("has_"), Contains("status")],
        data_type: "BOOLEAN",
    },
    TypeRule {
        patterns: &[Suffix("_at"), Contains("timestamp")],
        data_type: "TIMESTAMP",
    },
    TypeRule {
        patterns: &[Contains("date"), Suffix("_on"), Exact("birthday")],
        data_type: "DATE",
    },
    TypeRule {
        patterns: &[
            Contains("count"),
            Contains("quantity"),
            Exact("qty"),
            Exact("age"),
            Exact("year"),
            Contains("stock"),
        ],
        data_type: "INTEGER",
    },
    TypeRule {
        patterns: &[Exact("id"), Suffix("_id")],
        data_type: "INTEGER",
    },
];

/// Fallback when no rule matches
pub const DEFAULT_DATA_TYPE: &str = "VARCHAR(255)";

/// Infer a data type from a (snake_case) column name
pub fn infer_data_type(column_name: &str) -> &'static str {
    let name = column_name.to_lowercase();
    TYPE_RULES
        .iter()
        .find(|rule| rule.patterns.iter().any(|p| p.matches(&name)))
        .map(|rule| rule.data_type)
        .unwrap_or(DEFAULT_DATA_TYPE)
}

/// Normalize a user-supplied type into the dialect-neutral vocabulary.
///
/// Unknown types are upper-cased and kept so nothing the user asked for is lost.
pub fn normalize_data_type(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_DATA_TYPE.to_string();
    }

    let upper = trimmed.to_uppercase();
    let (base, args) = split_type_args(&upper);
    let base = base.split_whitespace().collect::<Vec<_>>().join(" ");

    match base.as_str() {
        "INT" | "INTEGER" | "INT4" | "SERIAL" | "MEDIUMINT" => "INTEGER".to_string(),
        "BIGINT" | "INT8" | "BIGSERIAL" | "LONG" => "BIGINT".to_string(),
        "TINYINT" if args == Some("1") => "BOOLEAN".to_string(),
        "SMALLINT" | "INT2" | "TINYINT" | "SMALLSERIAL" => "SMALLINT".to_string(),
        "STRING" | "VARCHAR" | "NVARCHAR" | "CHARACTER VARYING" | "VARCHAR2" => {
            format!("VARCHAR({})", args.unwrap_or("255"))
        }
        "CHAR" | "NCHAR" | "CHARACTER" => format!("CHAR({})", args.unwrap_or("1")),
        "TEXT" | "LONGTEXT" | "MEDIUMTEXT" | "TINYTEXT" | "CLOB" | "NTEXT" => "TEXT".to_string(),
        "DECIMAL" | "NUMERIC" | "NUMBER" | "MONEY" | "CURRENCY" => {
            format!("DECIMAL({})", args.map(strip_spaces).unwrap_or_else(|| "10,2".to_string()))
        }
        "FLOAT" | "REAL" | "FLOAT4" => "FLOAT".to_string(),
        "DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" => "DOUBLE".to_string(),
        "BOOL" | "BOOLEAN" | "BIT" => "BOOLEAN".to_string(),
        "DATE" => "DATE".to_string(),
        "TIME" => "TIME".to_string(),
        "DATETIME" | "DATETIME2" | "TIMESTAMP" | "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" => {
            "TIMESTAMP".to_string()
        }
        "JSON" | "JSONB" | "OBJECT" => "JSON".to_string(),
        "UUID" | "GUID" | "UNIQUEIDENTIFIER" => "UUID".to_string(),
        "BLOB" | "BYTEA" | "BINARY" | "VARBINARY" | "LONGBLOB" | "BYTES" => "BLOB".to_string(),
        "ENUM" => {
            // Keep the literal list in its original case
            let (_, original_args) = split_type_args(trimmed);
            format!("ENUM({})", original_args.unwrap_or(""))
        }
        _ => upper,
    }
}

/// Values of an `ENUM('a','b')` type, if it is one
pub fn enum_values(data_type: &str) -> Option<Vec<String>> {
    let (base, args) = split_type_args(data_type.trim());
    if !base.trim().eq_ignore_ascii_case("enum") {
        return None;
    }
    let values = args?
        .split(',')
        .map(|v| v.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>();
    Some(values)
}

/// Split `VARCHAR(255)` into (`VARCHAR`, Some(`255`))
pub fn split_type_args(s: &str) -> (&str, Option<&str>) {
    match (s.find('('), s.rfind(')')) {
        (Some(open), Some(close)) if close > open => (&s[..open], Some(s[open + 1..close].trim())),
        _ => (s, None),
    }
}

fn strip_spaces(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}
