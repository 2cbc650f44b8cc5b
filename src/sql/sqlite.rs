//! SQLite backend.

use super::dialect::{DialectBackend, FkPlacement};
use super::types::quote_literal;
use super::SqlDialect;
use crate::model::{Schema, Table};
use crate::normalize::config::LookupConfig;

pub struct SqliteBackend;

impl DialectBackend for SqliteBackend {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::Sqlite
    }

    fn quote_chars(&self) -> (char, char) {
        ('"', '"')
    }

    fn fk_placement(&self) -> FkPlacement {
        // No ALTER TABLE ... ADD CONSTRAINT here, and targets are not checked at creation
        FkPlacement::InlineOnly
    }

    fn serial_definition(&self, name: &str, _neutral_type: &str) -> String {
        format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", name)
    }

    fn serial_declares_primary_key(&self) -> bool {
        true
    }

    fn current_user(&self) -> Option<&'static str> {
        None
    }

    fn expression_default(&self, expr: &str) -> String {
        format!("({})", expr)
    }

    fn enum_column(&self, _table: &str, column: &str, values: &[String]) -> (String, Option<String>) {
        let values: Vec<String> = values.iter().map(|v| quote_literal(v)).collect();
        (
            "TEXT".to_string(),
            Some(format!("CHECK ({} IN ({}))", self.quote(column), values.join(", "))),
        )
    }

    fn header_statements(&self) -> Vec<String> {
        vec!["PRAGMA foreign_keys = OFF;\nBEGIN TRANSACTION;".to_string()]
    }

    fn footer_statements(&self) -> Vec<String> {
        vec!["COMMIT;\nPRAGMA foreign_keys = ON;".to_string()]
    }

    fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {};", table)
    }

    fn drop_statements(&self, schema: &Schema, ordered: &[&Table]) -> Vec<String> {
        // Views survive DROP TABLE in SQLite
        let mut statements: Vec<String> = self
            .view_tables(schema)
            .iter()
            .map(|t| format!("DROP VIEW IF EXISTS {}_details;", t.name))
            .collect();
        statements.extend(ordered.iter().rev().map(|t| self.drop_table(&self.quote(&t.name))));
        vec![statements.join("\n")]
    }

    fn views(&self, schema: &Schema, lookup: &LookupConfig) -> Option<Vec<String>> {
        Some(self.detail_views(schema, lookup))
    }

    fn triggers(&self, schema: &Schema) -> Option<Vec<String>> {
        let triggers = self
            .audited_tables(schema)
            .into_iter()
            .map(|t| {
                let table = self.quote(&t.name);
                let key_match: Vec<String> = t
                    .primary_key_columns()
                    .iter()
                    .map(|c| {
                        let col = self.quote(&c.name);
                        format!("{} = NEW.{}", col, col)
                    })
                    .collect();
                format!(
                    "CREATE TRIGGER trg_{name}_updated_at\nAFTER UPDATE ON {table}\nFOR EACH ROW\nWHEN NEW.updated_at = OLD.updated_at\nBEGIN\n    UPDATE {table} SET updated_at = CURRENT_TIMESTAMP WHERE {keys};\nEND;",
                    name = t.name,
                    table = table,
                    keys = key_match.join(" AND ")
                )
            })
            .collect();
        Some(triggers)
    }
}
