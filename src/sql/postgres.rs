//! PostgreSQL backend.

use super::dialect::{DialectBackend, FkPlacement};
use super::types::quote_literal;
use super::SqlDialect;
use crate::model::{Schema, Table};
use crate::normalize::config::LookupConfig;
use crate::normalize::types::enum_values;

pub struct PostgresBackend;

const TIMESTAMP_FUNCTION: &str = "update_updated_at_column";

fn enum_type_name(table: &str, column: &str) -> String {
    format!("{}_{}_enum", table, column)
}

/// (type name, values) for every enum column in `schema`
fn enum_columns(schema: &Schema) -> Vec<(String, Vec<String>)> {
    schema
        .tables
        .iter()
        .flat_map(|t| {
            t.columns.iter().filter_map(move |c| {
                enum_values(&c.data_type).map(|values| (enum_type_name(&t.name, &c.name), values))
            })
        })
        .collect()
}

impl DialectBackend for PostgresBackend {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::Postgres
    }

    fn quote_chars(&self) -> (char, char) {
        ('"', '"')
    }

    fn fk_placement(&self) -> FkPlacement {
        FkPlacement::Inline
    }

    fn serial_definition(&self, name: &str, neutral_type: &str) -> String {
        if neutral_type == "BIGINT" {
            format!("{} BIGSERIAL", name)
        } else {
            format!("{} SERIAL", name)
        }
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    fn enum_column(&self, table: &str, column: &str, _values: &[String]) -> (String, Option<String>) {
        (enum_type_name(table, column), None)
    }

    fn header_statements(&self) -> Vec<String> {
        vec!["BEGIN;".to_string()]
    }

    fn footer_statements(&self) -> Vec<String> {
        vec!["COMMIT;".to_string()]
    }

    fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {} CASCADE;", table)
    }

    fn drop_statements(&self, schema: &Schema, ordered: &[&Table]) -> Vec<String> {
        let mut statements: Vec<String> = ordered
            .iter()
            .rev()
            .map(|t| self.drop_table(&self.quote(&t.name)))
            .collect();
        statements.extend(
            enum_columns(schema)
                .into_iter()
                .map(|(name, _)| format!("DROP TYPE IF EXISTS {} CASCADE;", name)),
        );
        vec![statements.join("\n")]
    }

    fn enum_types(&self, schema: &Schema) -> Option<Vec<String>> {
        let types = enum_columns(schema)
            .into_iter()
            .map(|(name, values)| {
                let values: Vec<String> = values.iter().map(|v| quote_literal(v)).collect();
                format!("CREATE TYPE {} AS ENUM ({});", name, values.join(", "))
            })
            .collect();
        Some(types)
    }

    fn view_prefix(&self) -> &'static str {
        "CREATE OR REPLACE VIEW"
    }

    fn views(&self, schema: &Schema, lookup: &LookupConfig) -> Option<Vec<String>> {
        Some(self.detail_views(schema, lookup))
    }

    fn triggers(&self, schema: &Schema) -> Option<Vec<String>> {
        let tables = self.audited_tables(schema);
        if tables.is_empty() {
            return Some(Vec::new());
        }

        let mut statements = vec![format!(
            "CREATE OR REPLACE FUNCTION {}()\nRETURNS TRIGGER AS $$\nBEGIN\n    NEW.updated_at = CURRENT_TIMESTAMP;\n    RETURN NEW;\nEND;\n$$ LANGUAGE plpgsql;",
            TIMESTAMP_FUNCTION
        )];
        statements.extend(tables.iter().map(|t| {
            format!(
                "CREATE TRIGGER trg_{}_updated_at\n    BEFORE UPDATE ON {}\n    FOR EACH ROW\n    EXECUTE FUNCTION {}();",
                t.name,
                self.quote(&t.name),
                TIMESTAMP_FUNCTION
            )
        }));
        Some(statements)
    }
}
