//! Many-to-many rewrite into junction tables.

use super::missing_table;
use crate::error::{GenerateError, GenerateResult};
use crate::model::{
    Column, ForeignKeyRef, Participation, Relationship, RelationshipType, Schema, Table,
};
use crate::normalize::naming::unique_name;

/// Copy of `schema` where every MANY_TO_MANY relationship is replaced by a
/// junction table and two identifying ONE_TO_MANY relationships.
///
/// The junction is named `<source>_<target>` and keyed by both foreign keys.
/// Referenced members of composite keys come back marked unique.
pub fn expand_many_to_many(schema: &Schema) -> GenerateResult<Schema> {
    let mut working = schema.clone();
    let mut relationships = Vec::with_capacity(schema.relationships.len());

    for rel in &schema.relationships {
        if rel.rel_type != RelationshipType::ManyToMany {
            relationships.push(rel.clone());
            continue;
        }

        let junction = build_junction(&working, rel)?;
        tracing::debug!(
            relationship = %rel.name,
            junction = %junction.name,
            "expanded many-to-many relationship"
        );

        for (side, entity) in [
            (&rel.source_table, &rel.source_entity),
            (&rel.target_table, &rel.target_entity),
        ] {
            let owner = working
                .get_table(side)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| side.clone());
            let mut link = Relationship::new(
                rel.name.clone(),
                owner,
                junction.name.clone(),
                RelationshipType::OneToMany,
            );
            link.source_entity = entity.clone();
            link.target_entity = junction.name.clone();
            link.is_identifying = true;
            link.target_participation = Participation::Total;
            link.description = rel.description.clone();
            relationships.push(link);
        }
        working.tables.push(junction);
    }

    working.relationships = relationships;
    working.mark_referenced_keys_unique();
    Ok(working)
}

fn build_junction(schema: &Schema, rel: &Relationship) -> GenerateResult<Table> {
    let source = schema
        .get_table(&rel.source_table)
        .ok_or_else(|| missing_table(&rel.name, &rel.source_table))?;
    let target = schema
        .get_table(&rel.target_table)
        .ok_or_else(|| missing_table(&rel.name, &rel.target_table))?;
    let source_key = key_of(source)?;
    let target_key = key_of(target)?;

    let source_column = format!("{}_id", source.name);
    let target_column = if source.name == target.name {
        format!("related_{}_id", target.name)
    } else {
        format!("{}_id", target.name)
    };

    let name = unique_name(&format!("{}_{}", source.name, target.name), |n| {
        schema.get_table(n).is_some()
    });
    let mut table = Table::new(name);
    table.is_junction_table = true;
    table.description = Some(format!(
        "Junction table for {} {} {}",
        source.name, rel.name, target.name
    ));

    table.columns.push(
        Column::new(source_column, source_key.data_type.clone())
            .primary_key()
            .references(ForeignKeyRef::cascade(&source.name, &source_key.name)),
    );
    table.columns.push(
        Column::new(target_column, target_key.data_type.clone())
            .primary_key()
            .references(ForeignKeyRef::cascade(&target.name, &target_key.name)),
    );

    for attribute in &rel.attributes {
        if attribute.is_audit() || table.has_column(&attribute.name) {
            continue;
        }
        let mut column = attribute.clone();
        column.is_primary_key = false;
        column.is_foreign_key = false;
        column.references = None;
        table.columns.push(column);
    }

    table.columns.push(Column::timestamp("created_at"));
    table.columns.push(Column::timestamp("updated_at"));
    Ok(table)
}

fn key_of(table: &Table) -> GenerateResult<&Column> {
    table
        .reference_column()
        .ok_or_else(|| GenerateError::MissingPrimaryKey {
            table: table.name.clone(),
        })
}
