//! SQL Server / Azure SQL backend.
//!
//! Views, procedures and triggers must each start a batch, so they are
//! separated with `GO`.

use super::dialect::{fk_constraint_name, DialectBackend, FkPlacement};
use super::types::quote_literal;
use super::SqlDialect;
use crate::model::{ForeignKeyRef, ReferentialAction, Schema, Table};
use crate::normalize::config::LookupConfig;

pub struct MsSqlBackend;

/// Wrap batch-leading statements in `GO` separators
fn batches(statements: Vec<String>) -> Vec<String> {
    if statements.is_empty() {
        return statements;
    }
    let mut out = Vec::with_capacity(statements.len() + 1);
    out.push("GO".to_string());
    out.extend(statements.into_iter().map(|s| format!("{}\nGO", s)));
    out
}

impl DialectBackend for MsSqlBackend {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::MsSql
    }

    fn quote_chars(&self) -> (char, char) {
        ('[', ']')
    }

    fn fk_placement(&self) -> FkPlacement {
        FkPlacement::AlterTable
    }

    fn serial_definition(&self, name: &str, neutral_type: &str) -> String {
        format!("{} {} IDENTITY(1,1) NOT NULL", name, self.map_type(neutral_type))
    }

    fn current_timestamp(&self) -> &'static str {
        "GETDATE()"
    }

    fn current_date(&self) -> &'static str {
        "CAST(GETDATE() AS DATE)"
    }

    fn current_time(&self) -> &'static str {
        "CAST(GETDATE() AS TIME)"
    }

    fn enum_column(&self, _table: &str, column: &str, values: &[String]) -> (String, Option<String>) {
        let values: Vec<String> = values.iter().map(|v| quote_literal(v)).collect();
        (
            "NVARCHAR(50)".to_string(),
            Some(format!("CHECK ({} IN ({}))", self.quote(column), values.join(", "))),
        )
    }

    /// SQL Server rejects multiple cascade paths into one table, so only the
    /// first key from a table to a given parent may cascade
    fn referential_actions(
        &self,
        fk: &ForeignKeyRef,
        second_path: bool,
    ) -> (ReferentialAction, ReferentialAction) {
        if second_path {
            (ReferentialAction::NoAction, ReferentialAction::NoAction)
        } else {
            (fk.on_delete, fk.on_update)
        }
    }

    fn header_statements(&self) -> Vec<String> {
        vec!["SET NOCOUNT ON;\nGO".to_string()]
    }

    fn drop_table(&self, table: &str) -> String {
        format!(
            "IF OBJECT_ID({}, 'U') IS NOT NULL DROP TABLE {};",
            quote_literal(table),
            table
        )
    }

    fn drop_statements(&self, schema: &Schema, ordered: &[&Table]) -> Vec<String> {
        let mut statements = Vec::new();

        // Constraints first so tables can go in any order
        for table in ordered {
            for column in table.columns.iter().filter(|c| c.references.is_some()) {
                let constraint = fk_constraint_name(&table.name, &column.name);
                statements.push(format!(
                    "IF OBJECT_ID({}, 'F') IS NOT NULL ALTER TABLE {} DROP CONSTRAINT {};",
                    quote_literal(&constraint),
                    self.quote(&table.name),
                    constraint
                ));
            }
        }
        for table in self.view_tables(schema) {
            let view = format!("{}_details", table.name);
            statements.push(format!(
                "IF OBJECT_ID({}, 'V') IS NOT NULL DROP VIEW {};",
                quote_literal(&view),
                view
            ));
        }
        for table in self.procedure_tables(schema) {
            let procedure = format!("get_{}_by_id", table.name);
            statements.push(format!(
                "IF OBJECT_ID({}, 'P') IS NOT NULL DROP PROCEDURE {};",
                quote_literal(&procedure),
                procedure
            ));
        }
        statements.extend(ordered.iter().rev().map(|t| self.drop_table(&self.quote(&t.name))));
        statements.push("GO".to_string());
        vec![statements.join("\n")]
    }

    fn view_prefix(&self) -> &'static str {
        "CREATE OR ALTER VIEW"
    }

    fn views(&self, schema: &Schema, lookup: &LookupConfig) -> Option<Vec<String>> {
        Some(batches(self.detail_views(schema, lookup)))
    }

    fn procedures(&self, schema: &Schema) -> Option<Vec<String>> {
        let procedures = self
            .procedure_tables(schema)
            .into_iter()
            .filter_map(|table| {
                let key = table.reference_column()?;
                Some(format!(
                    "CREATE OR ALTER PROCEDURE get_{name}_by_id\n    @id {ty}\nAS\nBEGIN\n    SET NOCOUNT ON;\n    SELECT * FROM {table} WHERE {key} = @id;\nEND;",
                    name = table.name,
                    ty = self.map_type(&key.data_type),
                    table = self.quote(&table.name),
                    key = self.quote(&key.name),
                ))
            })
            .collect();
        Some(batches(procedures))
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
                        format!("tgt.{} = i.{}", col, col)
                    })
                    .collect();
                format!(
                    "CREATE OR ALTER TRIGGER trg_{name}_updated_at ON {table}\nAFTER UPDATE\nAS\nBEGIN\n    SET NOCOUNT ON;\n    UPDATE tgt SET updated_at = GETDATE()\n    FROM {table} AS tgt\n    INNER JOIN inserted AS i ON {keys};\nEND;",
                    name = t.name,
                    table = table,
                    keys = key_match.join(" AND ")
                )
            })
            .collect();
        Some(batches(triggers))
    }
}
