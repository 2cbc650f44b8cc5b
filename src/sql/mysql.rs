//! MySQL / MariaDB backend.

use super::dialect::{DialectBackend, FkPlacement};
use super::types::quote_literal;
use super::SqlDialect;
use crate::model::{Schema, Table};
use crate::normalize::config::LookupConfig;

pub struct MySqlBackend;

impl DialectBackend for MySqlBackend {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::MySql
    }

    fn quote_chars(&self) -> (char, char) {
        ('`', '`')
    }

    fn fk_placement(&self) -> FkPlacement {
        FkPlacement::Inline
    }

    fn serial_definition(&self, name: &str, neutral_type: &str) -> String {
        format!("{} {} NOT NULL AUTO_INCREMENT", name, self.map_type(neutral_type))
    }

    fn current_date(&self) -> &'static str {
        "(CURRENT_DATE)"
    }

    fn current_time(&self) -> &'static str {
        "(CURRENT_TIME)"
    }

    /// Expression defaults must be parenthesized (8.0.13+)
    fn expression_default(&self, expr: &str) -> String {
        format!("({})", expr)
    }

    fn on_update_timestamp(&self) -> Option<&'static str> {
        Some("ON UPDATE CURRENT_TIMESTAMP")
    }

    fn table_options(&self) -> &'static str {
        " ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"
    }

    fn enum_column(&self, _table: &str, _column: &str, values: &[String]) -> (String, Option<String>) {
        let values: Vec<String> = values.iter().map(|v| quote_literal(v)).collect();
        (format!("ENUM({})", values.join(", ")), None)
    }

    fn header_statements(&self) -> Vec<String> {
        vec!["SET NAMES utf8mb4;\nSTART TRANSACTION;".to_string()]
    }

    fn footer_statements(&self) -> Vec<String> {
        vec!["COMMIT;".to_string()]
    }

    fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {};", table)
    }

    fn drop_statements(&self, schema: &Schema, ordered: &[&Table]) -> Vec<String> {
        let mut statements = vec!["SET FOREIGN_KEY_CHECKS = 0;".to_string()];
        for table in self.view_tables(schema) {
            statements.push(format!("DROP VIEW IF EXISTS {}_details;", table.name));
        }
        for table in self.procedure_tables(schema) {
            statements.push(format!("DROP PROCEDURE IF EXISTS get_{}_by_id;", table.name));
        }
        statements.extend(ordered.iter().rev().map(|t| self.drop_table(&self.quote(&t.name))));
        statements.push("SET FOREIGN_KEY_CHECKS = 1;".to_string());
        vec![statements.join("\n")]
    }

    fn view_prefix(&self) -> &'static str {
        "CREATE OR REPLACE VIEW"
    }

    fn views(&self, schema: &Schema, lookup: &LookupConfig) -> Option<Vec<String>> {
        Some(self.detail_views(schema, lookup))
    }

    fn procedures(&self, schema: &Schema) -> Option<Vec<String>> {
        let procedures: Vec<String> = self
            .procedure_tables(schema)
            .into_iter()
            .filter_map(|table| {
                let key = table.reference_column()?;
                Some(format!(
                    "DELIMITER //\nCREATE PROCEDURE get_{name}_by_id(IN p_id {ty})\nBEGIN\n    SELECT * FROM {table} WHERE {key} = p_id;\nEND //\nDELIMITER ;",
                    name = table.name,
                    ty = self.map_type(&key.data_type),
                    table = self.quote(&table.name),
                    key = self.quote(&key.name),
                ))
            })
            .collect();
        Some(procedures)
    }
}
