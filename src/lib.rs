// Allow dead code for items that are part of the public API but only used in tests
#![allow(dead_code)]

pub mod diagram;
pub mod docs;
pub mod error;
pub mod json_schema;
pub mod model;
pub mod normalize;
pub mod sql;

pub use error::{GenerateError, GenerateResult};
pub use model::{ExtractionResult, Schema};
pub use normalize::{normalize, NormalizeOptions, Normalized};
pub use sql::{generate_sql, SqlDialect};
