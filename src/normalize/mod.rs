//! Schema normalization.
//!
//! Turns a loose extraction result into a structurally valid relational schema:
//! - snake_case table/column names, inferred data types
//! - guaranteed primary key and `created_at`/`updated_at` audit columns
//! - foreign keys derived from relationship types
//! - composite keys for weak entities owned through identifying relationships
//! - lookup-table classification
//!
//! Normalization never fails. Input defects are repaired and reported as
//! [`NormalizeWarning`]s alongside the schema.
//!
//! The work runs in phases over owned values: tables are built first, then an
//! immutable key snapshot is taken, relationships are resolved against it, and
//! foreign-key columns are folded into fresh copies of the tables.

pub mod config;
pub mod lookup;
pub mod naming;
pub mod types;
mod warnings;

pub use config::{LookupConfig, NormalizeConfig};
pub use lookup::is_lookup_table;
pub use naming::to_snake_case;
pub use warnings::{NormalizeWarning, WarningCollector};

use crate::model::{
    Column, ExtractionResult, ForeignKeyRef, Participation, Position, RawAttribute, RawEntity,
    RawRelationship, Relationship, RelationshipType, Schema, Table,
};
use ahash::AHashMap;
use naming::{identifier_or, unique_name};
use types::{infer_data_type, normalize_data_type};

/// Columns per row of the layout grid
const GRID_COLUMNS: usize = 4;
const GRID_X: f64 = 300.0;
const GRID_Y: f64 = 250.0;

/// Schema-level options supplied by the caller
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl NormalizeOptions {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            description: None,
        }
    }
}

/// Best-effort output plus the repairs that produced it
#[derive(Debug, Clone)]
pub struct Normalized {
    pub schema: Schema,
    pub warnings: Vec<NormalizeWarning>,
}

impl Normalized {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Normalize with the default configuration
pub fn normalize(extraction: &ExtractionResult, options: &NormalizeOptions) -> Normalized {
    Normalizer::default().normalize(extraction, options)
}

/// Primary-key snapshot of a table, used to type and target foreign keys
#[derive(Debug, Clone)]
struct TableKey {
    table: String,
    column: String,
    data_type: String,
}

/// Foreign-key column to fold into the table at `holder`
#[derive(Debug, Clone)]
struct ForeignKeyPlan {
    holder: usize,
    column: Column,
}

/// Case-insensitive index of tables by entity and table name
#[derive(Debug, Default)]
struct TableIndex {
    by_name: AHashMap<String, usize>,
}

impl TableIndex {
    fn insert(&mut self, key: &str, idx: usize) {
        self.by_name.entry(key.trim().to_lowercase()).or_insert(idx);
    }

    fn resolve(&self, name: &str) -> Option<usize> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .or_else(|| to_snake_case(name).and_then(|n| self.by_name.get(&n)))
            .copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizeConfig,
}

impl Normalizer {
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizeConfig {
        &self.config
    }

    pub fn normalize(&self, extraction: &ExtractionResult, options: &NormalizeOptions) -> Normalized {
        let mut warnings = WarningCollector::new();

        let (tables, index) = build_tables(&extraction.entities, &mut warnings);
        let tables = resolve_declared_foreign_keys(tables, &index, &mut warnings);
        let keys = snapshot_keys(&tables);

        let relationships =
            resolve_relationships(&extraction.relationships, &tables, &index, &mut warnings);

        let plans: Vec<ForeignKeyPlan> = relationships
            .iter()
            .filter_map(|(rel, src, tgt)| plan_foreign_key(rel, *src, *tgt, &keys))
            .collect();
        let tables = apply_foreign_keys(tables, &plans);
        let tables = apply_identifying(tables, &relationships);

        let tables: Vec<Table> = tables
            .into_iter()
            .enumerate()
            .map(|(i, table)| self.finalize_table(table, i))
            .collect();

        let mut schema = Schema::new(
            options
                .name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "generated_schema".to_string()),
        );
        schema.description = options.description.clone();
        schema.tables = tables;
        schema.relationships = relationships.into_iter().map(|(rel, _, _)| rel).collect();
        schema.mark_referenced_keys_unique();

        tracing::debug!(
            tables = schema.tables.len(),
            relationships = schema.relationships.len(),
            warnings = warnings.warnings().len(),
            "normalized schema"
        );

        Normalized {
            schema,
            warnings: warnings.into_warnings(),
        }
    }

    fn finalize_table(&self, mut table: Table, ordinal: usize) -> Table {
        group_primary_key(&mut table);
        table.is_lookup_table = is_lookup_table(&table, &self.config.lookup);
        table.position = Some(Position {
            x: (ordinal % GRID_COLUMNS) as f64 * GRID_X,
            y: (ordinal / GRID_COLUMNS) as f64 * GRID_Y,
        });
        table
    }
}

/// Phase 1: one table per entity, in encounter order
fn build_tables(entities: &[RawEntity], warnings: &mut WarningCollector) -> (Vec<Table>, TableIndex) {
    let mut tables: Vec<Table> = Vec::with_capacity(entities.len());
    let mut index = TableIndex::default();

    for (i, entity) in entities.iter().enumerate() {
        let base = identifier_or(entity.name.as_deref(), "unnamed_table");
        if entity.name.as_deref().and_then(to_snake_case).is_none() {
            warnings.add(NormalizeWarning::UnnamedEntity {
                index: i,
                assigned: base.clone(),
            });
        }

        let name = unique_name(&base, |n| tables.iter().any(|t| t.name == n));
        if name != base && entity.name.is_some() {
            warnings.add(NormalizeWarning::DuplicateTable {
                name: base.clone(),
                renamed_to: name.clone(),
            });
        }

        let mut table = Table::new(&name);
        table.description = entity.description.clone();
        table.is_weak_entity = entity.is_weak_entity.unwrap_or(false);
        table.columns = match entity.attributes.as_deref() {
            Some(attrs) if !attrs.is_empty() => build_columns(&name, attrs, warnings),
            _ => default_columns(),
        };
        ensure_primary_key(&mut table);
        ensure_audit_columns(&mut table);

        if let Some(raw) = entity.name.as_deref() {
            index.insert(raw, tables.len());
        }
        index.insert(&name, tables.len());
        tables.push(table);
    }

    (tables, index)
}

fn default_columns() -> Vec<Column> {
    vec![
        Column::new("id", "INTEGER").primary_key(),
        Column::new("name", "VARCHAR(255)"),
        Column::timestamp("created_at"),
        Column::timestamp("updated_at"),
    ]
}

/// Columns from attributes; the FK flag is kept unresolved until phase 2
fn build_columns(table: &str, attrs: &[RawAttribute], warnings: &mut WarningCollector) -> Vec<Column> {
    let mut columns: Vec<Column> = Vec::with_capacity(attrs.len() + 3);

    for attr in attrs {
        let named = attr.name.as_deref().and_then(to_snake_case);
        let name = match named {
            Some(n) => n,
            None => {
                let assigned =
                    unique_name("unnamed_column", |n| columns.iter().any(|c| c.name == n));
                warnings.add(NormalizeWarning::UnnamedAttribute {
                    table: table.to_string(),
                    assigned: assigned.clone(),
                });
                assigned
            }
        };

        if columns.iter().any(|c| c.name == name) {
            warnings.add(NormalizeWarning::DuplicateColumn {
                table: table.to_string(),
                column: name,
            });
            continue;
        }

        columns.push(build_column(name, attr));
    }

    columns
}

fn build_column(name: String, attr: &RawAttribute) -> Column {
    let data_type = match attr.data_type.as_deref() {
        Some(t) if !t.trim().is_empty() => normalize_data_type(t),
        _ => infer_data_type(&name).to_string(),
    };

    let mut column = Column::new(name, data_type);
    column.is_nullable = attr.is_nullable.unwrap_or(true);
    column.is_unique = attr.is_unique.unwrap_or(false);
    column.is_foreign_key = attr.is_foreign_key.unwrap_or(false);
    column.default_value = attr
        .default_value
        .clone()
        .filter(|v| !v.trim().is_empty());
    column.description = attr.description.clone();
    if attr.is_primary_key.unwrap_or(false) {
        column = column.primary_key();
    }
    column
}

/// Guarantee a primary key: promote an existing `id`, else synthesize one
fn ensure_primary_key(table: &mut Table) {
    if table.columns.iter().any(|c| c.is_primary_key) {
        return;
    }
    if let Some(id) = table.get_column_mut("id") {
        id.is_primary_key = true;
        id.is_nullable = false;
        return;
    }
    table
        .columns
        .insert(0, Column::new("id", "INTEGER").primary_key());
}

/// Guarantee `created_at`/`updated_at` exactly once each
fn ensure_audit_columns(table: &mut Table) {
    for name in ["created_at", "updated_at"] {
        match table.get_column_mut(name) {
            Some(existing) => {
                if existing.default_value.is_none() && existing.data_type == "TIMESTAMP" {
                    existing.default_value = Some("CURRENT_TIMESTAMP".to_string());
                }
            }
            None => table.columns.push(Column::timestamp(name)),
        }
    }
}

/// Phase 2a: give declared `<table>_id` foreign keys their reference
fn resolve_declared_foreign_keys(
    tables: Vec<Table>,
    index: &TableIndex,
    warnings: &mut WarningCollector,
) -> Vec<Table> {
    let keys = snapshot_keys(&tables);

    tables
        .into_iter()
        .map(|mut table| {
            let table_name = table.name.clone();
            for column in table.columns.iter_mut() {
                if !column.is_foreign_key || column.references.is_some() {
                    continue;
                }
                let target = column
                    .name
                    .strip_suffix("_id")
                    .and_then(|prefix| index.resolve(prefix))
                    .and_then(|idx| keys.get(idx));
                match target {
                    Some(key) => {
                        column.references = Some(ForeignKeyRef::cascade(&key.table, &key.column));
                    }
                    None => {
                        column.is_foreign_key = false;
                        warnings.add(NormalizeWarning::UnresolvedForeignKey {
                            table: table_name.clone(),
                            column: column.name.clone(),
                        });
                    }
                }
            }
            table
        })
        .collect()
}

fn snapshot_keys(tables: &[Table]) -> Vec<TableKey> {
    tables
        .iter()
        .map(|t| {
            let (column, data_type) = t
                .reference_column()
                .map(|c| (c.name.clone(), c.data_type.clone()))
                .unwrap_or_else(|| ("id".to_string(), "INTEGER".to_string()));
            TableKey {
                table: t.name.clone(),
                column,
                data_type,
            }
        })
        .collect()
}

/// Phase 2b: resolve endpoints and build relationship records
fn resolve_relationships(
    raw: &[RawRelationship],
    tables: &[Table],
    index: &TableIndex,
    warnings: &mut WarningCollector,
) -> Vec<(Relationship, usize, usize)> {
    let mut resolved = Vec::with_capacity(raw.len());

    for (i, rel) in raw.iter().enumerate() {
        let source = rel.source_entity.as_deref().map(str::trim).unwrap_or("");
        let target = rel.target_entity.as_deref().map(str::trim).unwrap_or("");
        if source.is_empty() || target.is_empty() {
            warnings.add(NormalizeWarning::IncompleteRelationship { index: i });
            continue;
        }

        let rel_type = match rel.rel_type.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => {
                RelationshipType::parse_loose(value).unwrap_or_else(|| {
                    warnings.add(NormalizeWarning::UnknownRelationshipType {
                        value: value.to_string(),
                        assumed: RelationshipType::OneToMany.to_string(),
                    });
                    RelationshipType::OneToMany
                })
            }
            _ => RelationshipType::OneToMany,
        };

        let name = rel
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| rel_type.default_verb())
            .to_string();

        let (src, tgt) = match (index.resolve(source), index.resolve(target)) {
            (Some(s), Some(t)) => (s, t),
            _ => {
                warnings.add(NormalizeWarning::UnresolvedRelationship {
                    relationship: name,
                    source: source.to_string(),
                    target: target.to_string(),
                });
                continue;
            }
        };

        let implied = tables[tgt].is_weak_entity
            && src != tgt
            && matches!(rel_type, RelationshipType::OneToMany | RelationshipType::OneToOne);
        let mut is_identifying = rel.is_identifying.unwrap_or(implied);
        if is_identifying && rel_type == RelationshipType::ManyToMany {
            warnings.add(NormalizeWarning::IgnoredIdentifying {
                relationship: name.clone(),
                reason: "many-to-many relationships become junction tables".to_string(),
            });
            is_identifying = false;
        }
        if is_identifying && src == tgt {
            warnings.add(NormalizeWarning::IgnoredIdentifying {
                relationship: name.clone(),
                reason: "an entity cannot own itself".to_string(),
            });
            is_identifying = false;
        }

        let (default_src_card, default_tgt_card) = rel_type.default_cardinalities();
        let mut relationship = Relationship::new(
            name,
            tables[src].name.clone(),
            tables[tgt].name.clone(),
            rel_type,
        );
        relationship.source_entity = source.to_string();
        relationship.target_entity = target.to_string();
        relationship.is_identifying = is_identifying;
        relationship.source_cardinality = non_empty(&rel.source_cardinality)
            .unwrap_or(default_src_card)
            .to_string();
        relationship.target_cardinality = non_empty(&rel.target_cardinality)
            .unwrap_or(default_tgt_card)
            .to_string();
        relationship.source_participation = rel
            .source_participation
            .as_deref()
            .and_then(Participation::parse_loose)
            .unwrap_or_default();
        relationship.target_participation = if is_identifying {
            Participation::Total
        } else {
            rel.target_participation
                .as_deref()
                .and_then(Participation::parse_loose)
                .unwrap_or_default()
        };
        relationship.description = rel.description.clone();
        if let Some(attrs) = rel.attributes.as_deref() {
            let owner = format!("{}_{}", relationship.source_table, relationship.target_table);
            relationship.attributes = build_columns(&owner, attrs, warnings)
                .into_iter()
                .map(|mut c| {
                    c.is_primary_key = false;
                    c.is_foreign_key = false;
                    c
                })
                .collect();
        }

        resolved.push((relationship, src, tgt));
    }

    resolved
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Where a relationship's foreign key lives. Many-to-many has none here; the
/// SQL generator synthesizes a junction table instead.
fn plan_foreign_key(
    rel: &Relationship,
    src: usize,
    tgt: usize,
    keys: &[TableKey],
) -> Option<ForeignKeyPlan> {
    let (holder, referenced) = if rel.is_identifying {
        (tgt, src)
    } else {
        match rel.rel_type {
            RelationshipType::OneToMany | RelationshipType::OneToOne => (tgt, src),
            RelationshipType::ManyToOne => (src, tgt),
            RelationshipType::ManyToMany => return None,
        }
    };

    let key = &keys[referenced];
    let mut column = Column::new(format!("{}_id", key.table), key.data_type.clone())
        .references(ForeignKeyRef::cascade(&key.table, &key.column));
    if rel.rel_type == RelationshipType::OneToOne {
        column.is_unique = true;
    }
    if rel.is_identifying {
        column = column.primary_key();
        column.is_unique = false;
    }

    Some(ForeignKeyPlan { holder, column })
}

/// Phase 2c: fold planned FK columns into copies of their tables
fn apply_foreign_keys(tables: Vec<Table>, plans: &[ForeignKeyPlan]) -> Vec<Table> {
    tables
        .into_iter()
        .enumerate()
        .map(|(i, table)| {
            plans
                .iter()
                .filter(|p| p.holder == i)
                .fold(table, |table, plan| merge_fk_column(table, plan.column.clone()))
        })
        .collect()
}

fn merge_fk_column(mut table: Table, column: Column) -> Table {
    let target = column.references.as_ref().map(|r| r.table.clone());

    if let Some(existing) = table.get_column_mut(&column.name) {
        let same_target = existing.references.as_ref().map(|r| r.table.clone()) == target;
        if !existing.is_foreign_key || same_target {
            existing.is_foreign_key = true;
            existing.references = column.references;
            existing.data_type = column.data_type;
            existing.is_unique = existing.is_unique || column.is_unique;
            if column.is_primary_key {
                existing.is_primary_key = true;
                existing.is_nullable = false;
                existing.is_unique = false;
            }
            return table;
        }
    }

    let mut column = column;
    column.name = unique_name(&column.name, |n| table.has_column(n));
    let at = table
        .columns
        .iter()
        .position(|c| c.is_audit())
        .unwrap_or(table.columns.len());
    table.columns.insert(at, column);
    table
}

/// Phase 3: weak entities get a composite key through their owner's FK
fn apply_identifying(tables: Vec<Table>, relationships: &[(Relationship, usize, usize)]) -> Vec<Table> {
    tables
        .into_iter()
        .enumerate()
        .map(|(i, mut table)| {
            let owned = relationships
                .iter()
                .any(|(rel, _, tgt)| rel.is_identifying && *tgt == i);
            if !owned {
                return table;
            }

            table.is_weak_entity = true;
            let has_partial_key = table
                .columns
                .iter()
                .any(|c| c.is_primary_key && !c.is_foreign_key);
            if !has_partial_key {
                let name = unique_name("partial_id", |n| table.has_column(n));
                table
                    .columns
                    .insert(0, Column::new(name, "INTEGER").primary_key());
            }
            table
        })
        .collect()
}

/// Move the key group to the front (stable) and force it NOT NULL
fn group_primary_key(table: &mut Table) {
    let (mut keys, rest): (Vec<Column>, Vec<Column>) =
        table.columns.drain(..).partition(|c| c.is_primary_key);
    for key in keys.iter_mut() {
        key.is_nullable = false;
    }
    keys.extend(rest);
    table.columns = keys;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_resolves_raw_and_snake_names() {
        let mut index = TableIndex::default();
        index.insert("OrderItem", 0);
        index.insert("order_item", 0);
        assert_eq!(index.resolve("orderitem"), Some(0));
        assert_eq!(index.resolve("Order Item"), Some(0));
        assert_eq!(index.resolve("ORDER_ITEM"), Some(0));
        assert_eq!(index.resolve("product"), None);
    }

    #[test]
    fn test_merge_reuses_declared_column() {
        let mut table = Table::new("book");
        table.columns.push(Column::new("id", "INTEGER").primary_key());
        table.columns.push(Column::new("author_id", "BIGINT"));
        let fk = Column::new("author_id", "INTEGER")
            .references(ForeignKeyRef::cascade("author", "id"));

        let merged = merge_fk_column(table, fk);
        assert_eq!(merged.columns.len(), 2);
        let col = merged.get_column("author_id").unwrap();
        assert!(col.is_foreign_key);
        assert_eq!(col.data_type, "INTEGER");
    }

    #[test]
    fn test_merge_inserts_before_audit_columns() {
        let mut table = Table::new("book");
        table.columns.push(Column::new("id", "INTEGER").primary_key());
        table.columns.push(Column::timestamp("created_at"));
        table.columns.push(Column::timestamp("updated_at"));
        let fk = Column::new("author_id", "INTEGER")
            .references(ForeignKeyRef::cascade("author", "id"));

        let merged = merge_fk_column(table, fk);
        let names: Vec<&str> = merged.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "author_id", "created_at", "updated_at"]);
    }

    #[test]
    fn test_group_primary_key_is_stable() {
        let mut table = Table::new("line");
        table.columns.push(Column::new("note", "TEXT"));
        table.columns.push(Column::new("order_id", "INTEGER").primary_key());
        table.columns.push(Column::new("line_no", "INTEGER").primary_key());
        group_primary_key(&mut table);
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["order_id", "line_no", "note"]);
    }
}
