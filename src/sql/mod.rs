//! SQL DDL generation.
//!
//! Expands a normalized schema into an ordered, re-runnable DDL script:
//! header, DROP-IF-EXISTS, enum types, CREATE TABLE, deferred foreign keys,
//! indexes, views/triggers/procedures, lookup seed data and footer. Syntax
//! specifics live behind [`DialectBackend`], one implementation per
//! [`SqlDialect`]; optional capabilities return `None` where a dialect has
//! nothing to emit.
//!
//! Many-to-many relationships are rewritten into junction tables on a private
//! copy of the schema; the caller's schema is never touched.

mod dialect;
mod format;
mod junction;
mod mssql;
mod mysql;
mod order;
mod postgres;
mod seed;
mod sqlite;
pub mod types;

pub use dialect::{DialectBackend, FkPlacement};
pub use format::{pretty_print, FormatError};
pub use junction::expand_many_to_many;
pub use order::{creation_order, CreationOrder};

use crate::error::{GenerateError, GenerateResult};
use crate::model::Schema;
use crate::normalize::config::LookupConfig;
use std::fmt;
use std::str::FromStr;

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SqlDialect {
    #[default]
    MySql,
    Postgres,
    Sqlite,
    /// SQL Server / Azure SQL
    MsSql,
}

impl FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(SqlDialect::MySql),
            "postgresql" | "postgres" | "pg" | "pgsql" => Ok(SqlDialect::Postgres),
            "sqlite" | "sqlite3" => Ok(SqlDialect::Sqlite),
            "sqlserver" | "mssql" | "tsql" | "azuresql" | "sql-server" => Ok(SqlDialect::MsSql),
            _ => Err(format!(
                "Unknown dialect: {}. Valid options: mysql, postgresql, sqlite, sqlserver",
                s
            )),
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlDialect::MySql => write!(f, "mysql"),
            SqlDialect::Postgres => write!(f, "postgresql"),
            SqlDialect::Sqlite => write!(f, "sqlite"),
            SqlDialect::MsSql => write!(f, "sqlserver"),
        }
    }
}

impl SqlDialect {
    /// Parse a dialect name, falling back to MySQL for anything unknown
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(dialect = name, "unsupported dialect, falling back to mysql");
            SqlDialect::MySql
        })
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SqlDialect::MySql => "MySQL",
            SqlDialect::Postgres => "PostgreSQL",
            SqlDialect::Sqlite => "SQLite",
            SqlDialect::MsSql => "SQL Server",
        }
    }

    /// The backend implementing this dialect's syntax
    pub fn backend(self) -> &'static dyn DialectBackend {
        match self {
            SqlDialect::MySql => &mysql::MySqlBackend,
            SqlDialect::Postgres => &postgres::PostgresBackend,
            SqlDialect::Sqlite => &sqlite::SqliteBackend,
            SqlDialect::MsSql => &mssql::MsSqlBackend,
        }
    }
}

/// Generate a DDL script for `schema`
pub fn generate_sql(schema: &Schema, dialect: SqlDialect) -> GenerateResult<String> {
    SqlGenerator::new(dialect).generate(schema)
}

/// Generate a DDL script for a dialect given by name; unknown names use MySQL
pub fn generate_sql_for(schema: &Schema, dialect: &str) -> GenerateResult<String> {
    generate_sql(schema, SqlDialect::from_name_or_default(dialect))
}

/// Ordered DDL pipeline over one dialect backend
pub struct SqlGenerator {
    dialect: SqlDialect,
    backend: &'static dyn DialectBackend,
    timestamp: bool,
    lookup: LookupConfig,
}

impl SqlGenerator {
    pub fn new(dialect: SqlDialect) -> Self {
        Self {
            dialect,
            backend: dialect.backend(),
            timestamp: true,
            lookup: LookupConfig::default(),
        }
    }

    /// Lookup heuristics used for seed rows and view display columns
    pub fn with_lookup_config(mut self, lookup: LookupConfig) -> Self {
        self.lookup = lookup;
        self
    }

    /// Omit the generation time from the header (stable output)
    pub fn without_timestamp(mut self) -> Self {
        self.timestamp = false;
        self
    }

    pub fn generate(&self, schema: &Schema) -> GenerateResult<String> {
        let backend = self.backend;
        let mut sections: Vec<String> = Vec::new();

        sections.push(self.header(schema));

        let working = expand_many_to_many(schema)?;
        let order = creation_order(&working)?;
        let ordered: Vec<&crate::model::Table> =
            order.order.iter().map(|&i| &working.tables[i]).collect();

        push_statements(&mut sections, None, backend.header_statements());

        if !ordered.is_empty() {
            push_statements(
                &mut sections,
                Some("Drop existing objects"),
                backend.drop_statements(&working, &ordered),
            );
        }

        if let Some(types) = backend.enum_types(&working) {
            push_statements(&mut sections, Some("Enum types"), types);
        }

        let mut created: Vec<&str> = Vec::with_capacity(ordered.len());
        let mut deferred = Vec::new();
        let mut creates = Vec::with_capacity(ordered.len());
        for table in &ordered {
            created.push(table.name.as_str());
            let (create, pending) = backend.create_table(table, &created);
            creates.push(create);
            deferred.extend(pending);
        }
        push_statements(&mut sections, Some("Tables"), creates);

        let alters: Vec<String> = deferred
            .iter()
            .map(|fk| backend.add_foreign_key(fk))
            .collect();
        push_statements(&mut sections, Some("Foreign keys"), alters);

        let indexes: Vec<String> = ordered.iter().flat_map(|t| backend.indexes(t)).collect();
        push_statements(&mut sections, Some("Indexes"), indexes);

        if let Some(views) = backend.views(&working, &self.lookup) {
            push_statements(&mut sections, Some("Views"), views);
        }
        if let Some(procedures) = backend.procedures(&working) {
            push_statements(&mut sections, Some("Stored procedures"), procedures);
        }
        if let Some(triggers) = backend.triggers(&working) {
            push_statements(&mut sections, Some("Triggers"), triggers);
        }

        let seeds: Vec<String> = ordered
            .iter()
            .filter(|t| t.is_lookup_table)
            .filter_map(|t| backend.seed_data(t, &self.lookup))
            .collect();
        push_statements(&mut sections, Some("Seed data"), seeds);

        push_statements(&mut sections, None, backend.footer_statements());

        let raw = sections.join("\n\n");
        tracing::debug!(
            dialect = %self.dialect,
            tables = ordered.len(),
            deferred_fks = deferred.len(),
            "generated sql"
        );

        match pretty_print(&raw, self.dialect) {
            Ok(formatted) => Ok(formatted),
            Err(e) => {
                tracing::debug!(error = %e, "sql formatting failed, returning raw output");
                Ok(raw)
            }
        }
    }

    fn header(&self, schema: &Schema) -> String {
        let rule = "-- ============================================";
        let mut lines = vec![rule.to_string()];
        lines.push(format!("-- Schema: {}", schema.name));
        if let Some(desc) = schema.description.as_deref().filter(|d| !d.trim().is_empty()) {
            lines.push(format!("-- Description: {}", single_line(desc)));
        }
        lines.push(format!("-- Dialect: {}", self.dialect.display_name()));
        lines.push(format!("-- Version: {}", schema.version));
        if self.timestamp {
            lines.push(format!(
                "-- Generated by schema-forge at {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
            ));
        } else {
            lines.push("-- Generated by schema-forge".to_string());
        }
        lines.push(rule.to_string());
        lines.join("\n")
    }
}

fn push_statements(sections: &mut Vec<String>, title: Option<&str>, statements: Vec<String>) {
    if statements.is_empty() {
        return;
    }
    let body = statements.join("\n\n");
    match title {
        Some(title) => sections.push(format!("-- {}\n{}", title, body)),
        None => sections.push(body),
    }
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Error for a relationship endpoint missing from the schema
pub(crate) fn missing_table(relationship: &str, table: &str) -> GenerateError {
    GenerateError::MissingTable {
        relationship: relationship.to_string(),
        table: table.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_parse() {
        assert_eq!("mysql".parse::<SqlDialect>().unwrap(), SqlDialect::MySql);
        assert_eq!("PostgreSQL".parse::<SqlDialect>().unwrap(), SqlDialect::Postgres);
        assert_eq!("sqlite3".parse::<SqlDialect>().unwrap(), SqlDialect::Sqlite);
        assert_eq!("mssql".parse::<SqlDialect>().unwrap(), SqlDialect::MsSql);
        assert!("oracle".parse::<SqlDialect>().is_err());
    }

    #[test]
    fn test_unknown_dialect_falls_back_to_mysql() {
        assert_eq!(SqlDialect::from_name_or_default("oracle"), SqlDialect::MySql);
        assert_eq!(SqlDialect::from_name_or_default("sqlserver"), SqlDialect::MsSql);
    }

    #[test]
    fn test_backend_matches_dialect() {
        for dialect in [
            SqlDialect::MySql,
            SqlDialect::Postgres,
            SqlDialect::Sqlite,
            SqlDialect::MsSql,
        ] {
            assert_eq!(dialect.backend().dialect(), dialect);
        }
    }

    #[test]
    fn test_empty_schema() {
        let schema = Schema::new("empty");
        let sql = SqlGenerator::new(SqlDialect::Postgres)
            .without_timestamp()
            .generate(&schema)
            .unwrap();
        assert!(sql.contains("-- Schema: empty"));
        assert!(!sql.contains("CREATE TABLE"));
    }
}
