//! Errors raised by generators when handed a schema that bypassed normalization.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("relationship '{relationship}' references missing table '{table}'")]
    MissingTable { relationship: String, table: String },

    #[error("table '{table}' has no primary key column")]
    MissingPrimaryKey { table: String },

    #[error("foreign key {table}.{column} references missing table '{referenced}'")]
    DanglingForeignKey {
        table: String,
        column: String,
        referenced: String,
    },
}

pub type GenerateResult<T> = Result<T, GenerateError>;
