//! Non-fatal diagnostics produced while normalizing an extraction.
//!
//! Defects in the input are repaired, never rejected; each repair is recorded
//! here so callers can surface it.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizeWarning {
    /// Entity without a usable name
    UnnamedEntity { index: usize, assigned: String },
    /// Attribute without a usable name
    UnnamedAttribute { table: String, assigned: String },
    /// Two entities normalized to the same table name
    DuplicateTable { name: String, renamed_to: String },
    /// Attribute repeated within one entity
    DuplicateColumn { table: String, column: String },
    /// Relationship missing an endpoint name
    IncompleteRelationship { index: usize },
    /// Relationship endpoint that matches no table
    UnresolvedRelationship {
        relationship: String,
        source: String,
        target: String,
    },
    /// Relationship type that could not be parsed
    UnknownRelationshipType { value: String, assumed: String },
    /// Declared foreign key whose target table could not be found
    UnresolvedForeignKey { table: String, column: String },
    /// Identifying flag that cannot apply
    IgnoredIdentifying { relationship: String, reason: String },
}

impl fmt::Display for NormalizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeWarning::UnnamedEntity { index, assigned } => {
                write!(f, "Entity #{} has no name, using '{}'", index + 1, assigned)
            }
            NormalizeWarning::UnnamedAttribute { table, assigned } => {
                write!(f, "Attribute without a name in '{}', using '{}'", table, assigned)
            }
            NormalizeWarning::DuplicateTable { name, renamed_to } => {
                write!(f, "Duplicate table '{}' renamed to '{}'", name, renamed_to)
            }
            NormalizeWarning::DuplicateColumn { table, column } => {
                write!(f, "Duplicate column {}.{} ignored", table, column)
            }
            NormalizeWarning::IncompleteRelationship { index } => {
                write!(f, "Relationship #{} is missing an endpoint, dropped", index + 1)
            }
            NormalizeWarning::UnresolvedRelationship {
                relationship,
                source,
                target,
            } => write!(
                f,
                "Relationship '{}' ({} -> {}) references an unknown entity, dropped",
                relationship, source, target
            ),
            NormalizeWarning::UnknownRelationshipType { value, assumed } => {
                write!(f, "Unknown relationship type '{}', assuming {}", value, assumed)
            }
            NormalizeWarning::UnresolvedForeignKey { table, column } => write!(
                f,
                "Foreign key {}.{} has no resolvable target, kept as a plain column",
                table, column
            ),
            NormalizeWarning::IgnoredIdentifying {
                relationship,
                reason,
            } => write!(f, "Identifying flag on '{}' ignored: {}", relationship, reason),
        }
    }
}

/// Collects warnings during normalization
#[derive(Debug, Default)]
pub struct WarningCollector {
    warnings: Vec<NormalizeWarning>,
    max_warnings: usize,
}

impl WarningCollector {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            max_warnings: 200,
        }
    }

    /// Add a warning, logging it once
    pub fn add(&mut self, warning: NormalizeWarning) {
        if self.warnings.len() >= self.max_warnings || self.warnings.contains(&warning) {
            return;
        }
        tracing::warn!(warning = %warning, "normalization repaired input");
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[NormalizeWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<NormalizeWarning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deduplicates() {
        let mut collector = WarningCollector::new();
        let w = NormalizeWarning::IncompleteRelationship { index: 0 };
        collector.add(w.clone());
        collector.add(w);
        assert_eq!(collector.warnings().len(), 1);
    }

    #[test]
    fn test_display() {
        let w = NormalizeWarning::DuplicateTable {
            name: "user".to_string(),
            renamed_to: "user_2".to_string(),
        };
        assert_eq!(w.to_string(), "Duplicate table 'user' renamed to 'user_2'");
    }
}
