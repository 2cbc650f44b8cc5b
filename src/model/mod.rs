//! Schema data model shared by the normalizer and all generators.
//!
//! This module provides:
//! - The normalized schema types (`Schema`, `Table`, `Column`, `Relationship`)
//! - The raw extraction input consumed by the normalizer (see [`input`])
//! - `EntityKind`, the single entity classification every generator renders

pub mod input;

pub use input::{ExtractionResult, RawAttribute, RawEntity, RawRelationship};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relationship type between two tables
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    OneToOne,
    #[default]
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl RelationshipType {
    /// Parse the many spellings extraction services produce
    /// (`ONE_TO_MANY`, `one-to-many`, `1:N`, `M:N`, ...)
    pub fn parse_loose(s: &str) -> Option<Self> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect();

        match key.as_str() {
            "onetoone" | "1:1" | "1to1" => Some(RelationshipType::OneToOne),
            "onetomany" | "1:n" | "1:m" | "1:*" | "1ton" | "hasmany" => {
                Some(RelationshipType::OneToMany)
            }
            "manytoone" | "n:1" | "m:1" | "*:1" | "nto1" | "belongsto" => {
                Some(RelationshipType::ManyToOne)
            }
            "manytomany" | "m:n" | "n:m" | "n:n" | "m:m" | "*:*" | "mton" => {
                Some(RelationshipType::ManyToMany)
            }
            _ => None,
        }
    }

    /// Default display cardinalities (source, target)
    pub fn default_cardinalities(self) -> (&'static str, &'static str) {
        match self {
            RelationshipType::OneToOne => ("1", "1"),
            RelationshipType::OneToMany => ("1", "N"),
            RelationshipType::ManyToOne => ("N", "1"),
            RelationshipType::ManyToMany => ("M", "N"),
        }
    }

    /// Verb used when the extraction supplies none
    pub fn default_verb(self) -> &'static str {
        match self {
            RelationshipType::OneToMany => "has",
            _ => "relates_to",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipType::OneToOne => "ONE_TO_ONE",
            RelationshipType::OneToMany => "ONE_TO_MANY",
            RelationshipType::ManyToOne => "MANY_TO_ONE",
            RelationshipType::ManyToMany => "MANY_TO_MANY",
        }
    }
}

impl FromStr for RelationshipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_loose(s).ok_or_else(|| {
            format!(
                "Unknown relationship type: {}. Valid options: ONE_TO_ONE, ONE_TO_MANY, MANY_TO_ONE, MANY_TO_MANY",
                s
            )
        })
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Participation constraint of one side of a relationship
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Participation {
    Total,
    #[default]
    Partial,
}

impl Participation {
    pub fn parse_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "total" | "mandatory" | "required" => Some(Participation::Total),
            "partial" | "optional" => Some(Participation::Partial),
            _ => None,
        }
    }
}

impl fmt::Display for Participation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participation::Total => write!(f, "TOTAL"),
            Participation::Partial => write!(f, "PARTIAL"),
        }
    }
}

/// Referential action for ON DELETE / ON UPDATE
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
pub enum ReferentialAction {
    #[default]
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "RESTRICT")]
    Restrict,
    #[serde(rename = "NO ACTION")]
    NoAction,
}

impl ReferentialAction {
    pub fn as_sql(self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::NoAction => "NO ACTION",
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Target of a foreign key column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyRef {
    /// Referenced table name
    pub table: String,
    /// Referenced column name (usually the primary key)
    pub column: String,
    #[serde(default)]
    pub on_delete: ReferentialAction,
    #[serde(default)]
    pub on_update: ReferentialAction,
}

impl ForeignKeyRef {
    /// Reference with CASCADE on both delete and update
    pub fn cascade(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            on_delete: ReferentialAction::Cascade,
            on_update: ReferentialAction::Cascade,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Column definition within a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column name (snake_case)
    pub name: String,
    /// Dialect-neutral type token: INTEGER, VARCHAR(n), DECIMAL(p,s), TIMESTAMP, ...
    pub data_type: String,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_foreign_key: bool,
    #[serde(default = "default_true")]
    pub is_nullable: bool,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Present iff `is_foreign_key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<ForeignKeyRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Column {
    /// Create a nullable, non-key column
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_primary_key: false,
            is_foreign_key: false,
            is_nullable: true,
            is_unique: false,
            default_value: None,
            references: None,
            description: None,
        }
    }

    /// Mark as primary key (implies NOT NULL)
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.is_nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Turn this column into a foreign key pointing at `target`
    pub fn references(mut self, target: ForeignKeyRef) -> Self {
        self.is_foreign_key = true;
        self.references = Some(target);
        self
    }

    /// Audit timestamp column (`created_at` / `updated_at`)
    pub fn timestamp(name: &str) -> Self {
        Column::new(name, "TIMESTAMP")
            .not_null()
            .with_default("CURRENT_TIMESTAMP")
    }

    /// Whether this is one of the audit columns every table carries
    pub fn is_audit(&self) -> bool {
        self.name == "created_at" || self.name == "updated_at"
    }
}

/// Layout hint for diagram tooling; not semantically load-bearing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Entity classification shared by every generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Strong,
    Weak,
    Lookup,
    Junction,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Strong => "Strong Entity",
            EntityKind::Weak => "Weak Entity",
            EntityKind::Lookup => "Lookup Table",
            EntityKind::Junction => "Junction Table",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Table definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Unique within the schema, snake_case
    pub name: String,
    /// Ordered columns; the primary-key group comes first after normalization
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_weak_entity: bool,
    #[serde(default)]
    pub is_lookup_table: bool,
    #[serde(default)]
    pub is_junction_table: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            description: None,
            is_weak_entity: false,
            is_lookup_table: false,
            is_junction_table: false,
            position: None,
        }
    }

    /// Get a column by name (case-insensitive)
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn get_column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Columns forming the primary-key group, in column order
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_primary_key).collect()
    }

    /// The column other tables reference: the first primary-key column
    pub fn reference_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_primary_key)
    }

    pub fn foreign_key_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_foreign_key).collect()
    }

    pub fn has_composite_key(&self) -> bool {
        self.columns.iter().filter(|c| c.is_primary_key).count() > 1
    }

    pub fn kind(&self) -> EntityKind {
        if self.is_junction_table {
            EntityKind::Junction
        } else if self.is_weak_entity {
            EntityKind::Weak
        } else if self.is_lookup_table {
            EntityKind::Lookup
        } else {
            EntityKind::Strong
        }
    }
}

/// Relationship between two tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Verb phrase, e.g. `has`, `enrolls_in`
    pub name: String,
    pub source_table: String,
    pub target_table: String,
    /// Pre-normalization entity name, kept for traceability
    pub source_entity: String,
    pub target_entity: String,
    #[serde(rename = "type")]
    pub rel_type: RelationshipType,
    #[serde(default)]
    pub is_identifying: bool,
    pub source_cardinality: String,
    pub target_cardinality: String,
    #[serde(default)]
    pub source_participation: Participation,
    #[serde(default)]
    pub target_participation: Participation,
    /// Relationship-owned columns (junction-table payload)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Relationship {
    /// Relationship with default cardinalities and partial participation
    pub fn new(
        name: impl Into<String>,
        source_table: impl Into<String>,
        target_table: impl Into<String>,
        rel_type: RelationshipType,
    ) -> Self {
        let source_table = source_table.into();
        let target_table = target_table.into();
        let (source_cardinality, target_cardinality) = rel_type.default_cardinalities();
        Self {
            name: name.into(),
            source_entity: source_table.clone(),
            target_entity: target_table.clone(),
            source_table,
            target_table,
            rel_type,
            is_identifying: false,
            source_cardinality: source_cardinality.to_string(),
            target_cardinality: target_cardinality.to_string(),
            source_participation: Participation::Partial,
            target_participation: Participation::Partial,
            attributes: Vec::new(),
            description: None,
        }
    }
}

/// Complete normalized schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl Schema {
    /// Create an empty schema stamped with the current time
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: None,
            tables: Vec::new(),
            relationships: Vec::new(),
            version: default_version(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Get a table by name (exact match first, then case-insensitive)
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .or_else(|| self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name)))
    }

    pub fn table_index(&self, name: &str) -> Option<usize> {
        self.tables
            .iter()
            .position(|t| t.name == name)
            .or_else(|| {
                self.tables
                    .iter()
                    .position(|t| t.name.eq_ignore_ascii_case(name))
            })
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }

    /// Mark foreign-key targets that sit inside a composite key as unique.
    ///
    /// A referenced column must be unique on its own; one member of a
    /// composite key is not.
    pub fn mark_referenced_keys_unique(&mut self) {
        let targets: Vec<(String, String)> = self
            .tables
            .iter()
            .flat_map(|t| t.foreign_key_columns())
            .filter_map(|c| c.references.as_ref())
            .map(|fk| (fk.table.clone(), fk.column.clone()))
            .collect();

        for (table, column) in targets {
            let Some(i) = self.table_index(&table) else {
                continue;
            };
            let target = &mut self.tables[i];
            if !target.has_composite_key() {
                continue;
            }
            if let Some(column) = target.get_column_mut(&column) {
                column.is_unique = true;
            }
        }
    }
}
