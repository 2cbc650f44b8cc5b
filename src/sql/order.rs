//! Table creation order from foreign-key dependencies.

use crate::error::{GenerateError, GenerateResult};
use crate::model::Schema;
use ahash::AHashSet;
use std::collections::VecDeque;

/// Result of ordering tables for creation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreationOrder {
    /// Every table index, referenced tables before referencing ones.
    /// Tables caught in a cycle come last, in schema order.
    pub order: Vec<usize>,
    /// Indices of tables that are part of a foreign-key cycle
    pub cyclic: Vec<usize>,
}

impl CreationOrder {
    pub fn has_cycles(&self) -> bool {
        !self.cyclic.is_empty()
    }
}

/// Order tables so that every referenced table is created first.
///
/// Self-references do not constrain the order. A foreign key naming a table
/// absent from the schema is an error.
pub fn creation_order(schema: &Schema) -> GenerateResult<CreationOrder> {
    let n = schema.tables.len();
    let mut parents: Vec<AHashSet<usize>> = vec![AHashSet::new(); n];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];

    for (i, table) in schema.tables.iter().enumerate() {
        for column in &table.columns {
            let Some(fk) = column.references.as_ref() else {
                continue;
            };
            let parent = schema.table_index(&fk.table).ok_or_else(|| {
                GenerateError::DanglingForeignKey {
                    table: table.name.clone(),
                    column: column.name.clone(),
                    referenced: fk.table.clone(),
                }
            })?;
            if parent != i && parents[i].insert(parent) {
                children[parent].push(i);
            }
        }
    }

    // Kahn's algorithm
    let mut in_degree: Vec<usize> = parents.iter().map(|p| p.len()).collect();
    let mut queue: VecDeque<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &deg)| deg == 0)
        .map(|(i, _)| i)
        .collect();

    let mut order = Vec::with_capacity(n);
    while let Some(i) = queue.pop_front() {
        order.push(i);
        for &child in &children[i] {
            in_degree[child] -= 1;
            if in_degree[child] == 0 {
                queue.push_back(child);
            }
        }
    }

    let cyclic: Vec<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &deg)| deg > 0)
        .map(|(i, _)| i)
        .collect();
    if !cyclic.is_empty() {
        tracing::debug!(tables = cyclic.len(), "foreign-key cycle detected");
    }
    order.extend(cyclic.iter().copied());

    Ok(CreationOrder { order, cyclic })
}
