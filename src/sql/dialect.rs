//! Dialect capability interface.
//!
//! Backends implement a handful of syntax hooks; statement assembly shared by
//! all dialects lives in the provided methods. Optional capabilities (enum
//! types, views, procedures, triggers) return `None` when unsupported.

use super::seed;
use super::types::{map_type, quote_literal};
use super::SqlDialect;
use crate::model::{Column, ForeignKeyRef, ReferentialAction, Schema, Table};
use crate::normalize::config::LookupConfig;
use crate::normalize::types::enum_values;
use once_cell::sync::Lazy;
use regex::Regex;

/// A function-call default such as `gen_random_uuid()` or `pg_catalog.now()`
static FUNCTION_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*\(.*\)$").unwrap());

/// Where foreign-key constraints are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FkPlacement {
    /// Inside CREATE TABLE when the target already exists, else ALTER TABLE
    Inline,
    /// Always inside CREATE TABLE (targets are not checked at creation)
    InlineOnly,
    /// Always as ALTER TABLE ... ADD CONSTRAINT after all tables exist
    AlterTable,
}

/// A foreign key deferred to ALTER TABLE
#[derive(Debug, Clone, PartialEq)]
pub struct PendingForeignKey {
    pub table: String,
    pub column: String,
    pub references: ForeignKeyRef,
    pub second_path: bool,
}

pub fn fk_constraint_name(table: &str, column: &str) -> String {
    format!("fk_{}_{}", table, column)
}

/// Whether cascading through `column` opens a second path into its parent:
/// a self reference, or a later foreign key to a parent already referenced.
pub fn second_cascade_path(table: &Table, column: &Column) -> bool {
    let Some(fk) = column.references.as_ref() else {
        return false;
    };
    if fk.table == table.name {
        return true;
    }
    table
        .foreign_key_columns()
        .into_iter()
        .take_while(|c| c.name != column.name)
        .any(|c| c.references.as_ref().is_some_and(|r| r.table == fk.table))
}

/// Words quoted when used as identifiers, across all supported dialects
const RESERVED_WORDS: &[&str] = &[
    "add", "all", "alter", "and", "as", "asc", "between", "by", "case", "check", "column",
    "constraint", "create", "cross", "current_date", "current_time", "current_timestamp",
    "current_user", "database", "default", "delete", "desc", "distinct", "drop", "else", "end",
    "exists", "foreign", "from", "full", "grant", "group", "having", "in", "index", "inner",
    "insert", "into", "is", "join", "key", "left", "like", "limit", "not", "null", "offset", "on",
    "or", "order", "outer", "primary", "references", "right", "rows", "select", "session_user",
    "set", "table", "then", "to", "transaction", "trigger", "union", "unique", "update", "user",
    "using", "values", "view", "when", "where", "with",
];

pub fn is_reserved(ident: &str) -> bool {
    let lower = ident.to_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
}

pub trait DialectBackend: Sync {
    fn dialect(&self) -> SqlDialect;

    /// Opening and closing identifier quote characters
    fn quote_chars(&self) -> (char, char);

    fn fk_placement(&self) -> FkPlacement;

    /// Full column definition for an auto-increment surrogate key
    fn serial_definition(&self, name: &str, neutral_type: &str) -> String;

    /// Whether `serial_definition` already declares the primary key
    fn serial_declares_primary_key(&self) -> bool {
        false
    }

    fn current_timestamp(&self) -> &'static str {
        "CURRENT_TIMESTAMP"
    }

    fn current_date(&self) -> &'static str {
        "CURRENT_DATE"
    }

    fn current_time(&self) -> &'static str {
        "CURRENT_TIME"
    }

    /// `None` when the dialect has no session user function
    fn current_user(&self) -> Option<&'static str> {
        Some("CURRENT_USER")
    }

    /// A function-call default as the dialect accepts it
    fn expression_default(&self, expr: &str) -> String {
        expr.to_string()
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    /// Extra clause on `updated_at` (MySQL `ON UPDATE CURRENT_TIMESTAMP`)
    fn on_update_timestamp(&self) -> Option<&'static str> {
        None
    }

    /// Text after the closing parenthesis of CREATE TABLE
    fn table_options(&self) -> &'static str {
        ""
    }

    /// Type and optional CHECK for an enum column
    fn enum_column(&self, table: &str, column: &str, values: &[String]) -> (String, Option<String>);

    fn header_statements(&self) -> Vec<String> {
        Vec::new()
    }

    fn footer_statements(&self) -> Vec<String> {
        Vec::new()
    }

    fn drop_table(&self, table: &str) -> String;

    /// Idempotent teardown, children before parents
    fn drop_statements(&self, _schema: &Schema, ordered: &[&Table]) -> Vec<String> {
        ordered
            .iter()
            .rev()
            .map(|t| self.drop_table(&self.quote(&t.name)))
            .collect()
    }

    /// Standalone enum type declarations
    fn enum_types(&self, _schema: &Schema) -> Option<Vec<String>> {
        None
    }

    fn views(&self, _schema: &Schema, _lookup: &LookupConfig) -> Option<Vec<String>> {
        None
    }

    fn procedures(&self, _schema: &Schema) -> Option<Vec<String>> {
        None
    }

    fn triggers(&self, _schema: &Schema) -> Option<Vec<String>> {
        None
    }

    /// Adjust referential actions the dialect cannot express as given.
    ///
    /// `second_path` is set when the key is a self reference or repeats a
    /// parent another key of the same table already references.
    fn referential_actions(
        &self,
        fk: &ForeignKeyRef,
        _second_path: bool,
    ) -> (ReferentialAction, ReferentialAction) {
        (fk.on_delete, fk.on_update)
    }

    /// Quote an identifier if it collides with a reserved word
    fn quote(&self, ident: &str) -> String {
        if is_reserved(ident) {
            let (open, close) = self.quote_chars();
            format!("{}{}{}", open, ident, close)
        } else {
            ident.to_string()
        }
    }

    fn map_type(&self, neutral: &str) -> String {
        map_type(self.dialect(), neutral)
    }

    /// Translate a neutral default value into this dialect
    fn default_literal(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        let upper = trimmed.to_uppercase();
        match upper.as_str() {
            "CURRENT_TIMESTAMP" | "CURRENT_TIMESTAMP()" | "NOW()" | "NOW" | "GETDATE()" => {
                self.current_timestamp().to_string()
            }
            "CURRENT_DATE" | "CURRENT_DATE()" | "CURDATE()" => self.current_date().to_string(),
            "CURRENT_TIME" | "CURRENT_TIME()" | "CURTIME()" => self.current_time().to_string(),
            "CURRENT_USER" | "CURRENT_USER()" => match self.current_user() {
                Some(user) => user.to_string(),
                None => quote_literal(trimmed),
            },
            "TRUE" => self.boolean_literal(true).to_string(),
            "FALSE" => self.boolean_literal(false).to_string(),
            "NULL" => "NULL".to_string(),
            _ => {
                let quoted = trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'');
                if quoted || trimmed.parse::<f64>().is_ok() {
                    trimmed.to_string()
                } else if FUNCTION_CALL.is_match(trimmed) {
                    self.expression_default(trimmed)
                } else {
                    quote_literal(trimmed)
                }
            }
        }
    }

    /// Single-column integer surrogate key that should auto-increment
    fn is_serial(&self, table: &Table, column: &Column) -> bool {
        let keys = table.primary_key_columns();
        keys.len() == 1
            && keys[0].name == column.name
            && !column.is_foreign_key
            && column.default_value.is_none()
            && matches!(column.data_type.as_str(), "INTEGER" | "BIGINT")
    }

    fn column_definition(&self, table: &Table, column: &Column) -> String {
        let name = self.quote(&column.name);
        if self.is_serial(table, column) {
            return self.serial_definition(&name, &column.data_type);
        }

        let (sql_type, check) = match enum_values(&column.data_type) {
            Some(values) => self.enum_column(&table.name, &column.name, &values),
            None => (self.map_type(&column.data_type), None),
        };

        let mut parts = vec![name, sql_type];
        if !column.is_nullable {
            parts.push("NOT NULL".to_string());
        }
        // A lone key column is unique already; a composite key member is not
        if column.is_unique && (!column.is_primary_key || table.has_composite_key()) {
            parts.push("UNIQUE".to_string());
        }
        if let Some(default) = column.default_value.as_deref() {
            parts.push(format!("DEFAULT {}", self.default_literal(default)));
        }
        if column.name == "updated_at" {
            if let Some(clause) = self.on_update_timestamp() {
                parts.push(clause.to_string());
            }
        }
        if let Some(check) = check {
            parts.push(check);
        }
        parts.join(" ")
    }

    fn foreign_key_clause(
        &self,
        table: &str,
        column: &str,
        fk: &ForeignKeyRef,
        second_path: bool,
    ) -> String {
        let (on_delete, on_update) = self.referential_actions(fk, second_path);
        format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}({}) ON DELETE {} ON UPDATE {}",
            fk_constraint_name(table, column),
            self.quote(column),
            self.quote(&fk.table),
            self.quote(&fk.column),
            on_delete.as_sql(),
            on_update.as_sql()
        )
    }

    /// CREATE TABLE plus the foreign keys that must be added afterwards.
    ///
    /// `created` lists tables already created, including this one.
    fn create_table(&self, table: &Table, created: &[&str]) -> (String, Vec<PendingForeignKey>) {
        let mut lines: Vec<String> = table
            .columns
            .iter()
            .map(|c| self.column_definition(table, c))
            .collect();

        let keys = table.primary_key_columns();
        let serial_inline = self.serial_declares_primary_key()
            && keys.len() == 1
            && self.is_serial(table, keys[0]);
        if !keys.is_empty() && !serial_inline {
            let names: Vec<String> = keys.iter().map(|c| self.quote(&c.name)).collect();
            lines.push(format!("PRIMARY KEY ({})", names.join(", ")));
        }

        let mut pending = Vec::new();
        for column in table.columns.iter().filter(|c| c.is_foreign_key) {
            let Some(fk) = column.references.as_ref() else {
                continue;
            };
            let inline = match self.fk_placement() {
                FkPlacement::InlineOnly => true,
                FkPlacement::AlterTable => false,
                FkPlacement::Inline => created.iter().any(|t| *t == fk.table),
            };
            let second_path = second_cascade_path(table, column);
            if inline {
                lines.push(self.foreign_key_clause(&table.name, &column.name, fk, second_path));
            } else {
                pending.push(PendingForeignKey {
                    table: table.name.clone(),
                    column: column.name.clone(),
                    references: fk.clone(),
                    second_path,
                });
            }
        }

        let body = lines
            .iter()
            .map(|l| format!("    {}", l))
            .collect::<Vec<_>>()
            .join(",\n");
        let sql = format!(
            "CREATE TABLE {} (\n{}\n){};",
            self.quote(&table.name),
            body,
            self.table_options()
        );
        (sql, pending)
    }

    fn add_foreign_key(&self, fk: &PendingForeignKey) -> String {
        format!(
            "ALTER TABLE {} ADD {};",
            self.quote(&fk.table),
            self.foreign_key_clause(&fk.table, &fk.column, &fk.references, fk.second_path)
        )
    }

    /// One index per foreign-key column not already leading the primary key
    fn indexes(&self, table: &Table) -> Vec<String> {
        let leading_key = table.reference_column().map(|c| c.name.as_str());
        table
            .columns
            .iter()
            .filter(|c| c.is_foreign_key && Some(c.name.as_str()) != leading_key)
            .map(|c| {
                format!(
                    "CREATE INDEX idx_{}_{} ON {} ({});",
                    table.name,
                    c.name,
                    self.quote(&table.name),
                    self.quote(&c.name)
                )
            })
            .collect()
    }

    fn view_prefix(&self) -> &'static str {
        "CREATE VIEW"
    }

    /// Tables that get a `<table>_details` view
    fn view_tables<'a>(&self, schema: &'a Schema) -> Vec<&'a Table> {
        schema
            .tables
            .iter()
            .filter(|t| t.columns.iter().any(|c| c.is_foreign_key && c.references.is_some()))
            .collect()
    }

    /// Tables with a single-column key get a `get_<table>_by_id` procedure
    fn procedure_tables<'a>(&self, schema: &'a Schema) -> Vec<&'a Table> {
        schema
            .tables
            .iter()
            .filter(|t| t.primary_key_columns().len() == 1)
            .collect()
    }

    /// `<table>_details` views joining every referenced table
    fn detail_views(&self, schema: &Schema, lookup: &LookupConfig) -> Vec<String> {
        self.view_tables(schema)
            .into_iter()
            .map(|t| self.detail_view(schema, t, lookup))
            .collect()
    }

    fn detail_view(&self, schema: &Schema, table: &Table, lookup: &LookupConfig) -> String {
        let mut select = vec!["t.*".to_string()];
        let mut joins = Vec::new();

        for (i, column) in table.columns.iter().filter(|c| c.is_foreign_key).enumerate() {
            let Some(fk) = column.references.as_ref() else {
                continue;
            };
            let alias = format!("r{}", i + 1);
            let label_base = column.name.strip_suffix("_id").unwrap_or(&column.name);
            joins.push(format!(
                "LEFT JOIN {} {} ON t.{} = {}.{}",
                self.quote(&fk.table),
                alias,
                self.quote(&column.name),
                alias,
                self.quote(&fk.column)
            ));
            // Only a display column adds information beyond the FK itself
            let Some(display) = schema
                .get_table(&fk.table)
                .and_then(|t| seed::display_column(t, lookup))
            else {
                continue;
            };
            select.push(format!(
                "{}.{} AS {}_{}",
                alias,
                self.quote(&display),
                label_base,
                display
            ));
        }

        format!(
            "{} {}_details AS\nSELECT\n    {}\nFROM {} t\n{};",
            self.view_prefix(),
            table.name,
            select.join(",\n    "),
            self.quote(&table.name),
            joins.join("\n")
        )
    }

    /// Seed INSERT for a lookup table, or an explanatory comment
    fn seed_data(&self, table: &Table, lookup: &LookupConfig) -> Option<String> {
        let plan = match seed::plan(table, lookup, |t, c| self.is_serial(t, c)) {
            Ok(plan) => plan,
            Err(reason) => return Some(format!("-- Skipped seed data for {}: {}", table.name, reason)),
        };

        let columns: Vec<String> = plan.columns.iter().map(|c| self.quote(c)).collect();
        let rows: Vec<String> = plan
            .rows
            .iter()
            .map(|row| {
                let values: Vec<String> = row.iter().map(|v| quote_literal(v)).collect();
                format!("    ({})", values.join(", "))
            })
            .collect();
        Some(format!(
            "INSERT INTO {} ({}) VALUES\n{};",
            self.quote(&table.name),
            columns.join(", "),
            rows.join(",\n")
        ))
    }

    /// Tables whose `updated_at` a trigger should maintain
    fn audited_tables<'a>(&self, schema: &'a Schema) -> Vec<&'a Table> {
        schema
            .tables
            .iter()
            .filter(|t| t.has_column("updated_at") && !t.primary_key_columns().is_empty())
            .collect()
    }
}
