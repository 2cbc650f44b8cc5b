//! Structural checks over formatted Mermaid source.
//!
//! Findings are data; the generator appends them as `%%` comments.

use super::lines::{classify, is_valid_attribute, parse_relationship, Line, LineKind};
use ahash::AHashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramIssue {
    /// No entity blocks at all
    EmptyDiagram,
    /// Entity block never closed
    UnclosedEntity { entity: String, line: usize },
    /// Entity opened inside another block
    NestedEntity { entity: String, line: usize },
    /// `}` without an open block
    UnmatchedBrace { line: usize },
    DuplicateEntity {
        entity: String,
        line: usize,
        first_line: usize,
    },
    UndefinedEntity {
        entity: String,
        line: usize,
        suggestion: Option<String>,
    },
    InvalidRelationship { line: usize, text: String },
    InvalidAttribute {
        entity: String,
        line: usize,
        text: String,
    },
}

impl fmt::Display for DiagramIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramIssue::EmptyDiagram => write!(f, "Diagram is empty: no entities defined"),
            DiagramIssue::UnclosedEntity { entity, line } => {
                write!(f, "Line {}: entity '{}' is missing a closing brace", line, entity)
            }
            DiagramIssue::NestedEntity { entity, line } => write!(
                f,
                "Line {}: entity '{}' opened before the previous block was closed",
                line, entity
            ),
            DiagramIssue::UnmatchedBrace { line } => {
                write!(f, "Line {}: closing brace without an open entity", line)
            }
            DiagramIssue::DuplicateEntity {
                entity,
                line,
                first_line,
            } => write!(
                f,
                "Line {}: duplicate entity '{}' (first defined on line {})",
                line, entity, first_line
            ),
            DiagramIssue::UndefinedEntity {
                entity,
                line,
                suggestion,
            } => {
                write!(f, "Line {}: relationship references undefined entity '{}'", line, entity)?;
                if let Some(s) = suggestion {
                    write!(f, " (did you mean '{}'?)", s)?;
                }
                Ok(())
            }
            DiagramIssue::InvalidRelationship { line, text } => {
                write!(f, "Line {}: invalid relationship syntax: {}", line, text)
            }
            DiagramIssue::InvalidAttribute { entity, line, text } => write!(
                f,
                "Line {}: invalid attribute in '{}': {} (expected 'type name [PK|FK]')",
                line, entity, text
            ),
        }
    }
}

impl DiagramIssue {
    pub fn is_undefined_entity(&self) -> bool {
        matches!(self, DiagramIssue::UndefinedEntity { .. })
    }
}

/// Validate `source`, returning every finding in line order
pub fn validate(source: &str) -> Vec<DiagramIssue> {
    let lines = classify(source);
    let mut issues = Vec::new();

    let entities = check_blocks(&lines, &mut issues);
    if entities.is_empty() {
        issues.insert(0, DiagramIssue::EmptyDiagram);
    }

    for line in lines.iter().filter(|l| l.kind == LineKind::Relationship) {
        let Some(rel) = parse_relationship(&line.text) else {
            issues.push(DiagramIssue::InvalidRelationship {
                line: line.number,
                text: line.text.clone(),
            });
            continue;
        };
        let mut endpoints = vec![rel.source];
        if rel.target != rel.source {
            endpoints.push(rel.target);
        }
        for endpoint in endpoints {
            if !entities.contains_key(endpoint) {
                issues.push(DiagramIssue::UndefinedEntity {
                    entity: endpoint.to_string(),
                    line: line.number,
                    suggestion: suggest(endpoint, &entities),
                });
            }
        }
    }

    issues
}

/// Brace matching, duplicates and attribute grammar; returns defined entities
fn check_blocks(lines: &[Line], issues: &mut Vec<DiagramIssue>) -> AHashMap<String, usize> {
    let mut entities: AHashMap<String, usize> = AHashMap::new();
    let mut open: Option<(&str, usize)> = None;

    for line in lines {
        match &line.kind {
            LineKind::EntityOpen(name) => {
                if let Some((entity, _)) = open {
                    issues.push(DiagramIssue::NestedEntity {
                        entity: name.clone(),
                        line: line.number,
                    });
                    issues.push(DiagramIssue::UnclosedEntity {
                        entity: entity.to_string(),
                        line: line.number,
                    });
                }
                if let Some(&first_line) = entities.get(name.as_str()) {
                    issues.push(DiagramIssue::DuplicateEntity {
                        entity: name.clone(),
                        line: line.number,
                        first_line,
                    });
                } else {
                    entities.insert(name.clone(), line.number);
                }
                open = Some((name.as_str(), line.number));
            }
            LineKind::EntityClose => {
                if open.take().is_none() {
                    issues.push(DiagramIssue::UnmatchedBrace { line: line.number });
                }
            }
            LineKind::Attribute => {
                if !is_valid_attribute(&line.text) {
                    issues.push(DiagramIssue::InvalidAttribute {
                        entity: open.map(|(e, _)| e.to_string()).unwrap_or_default(),
                        line: line.number,
                        text: line.text.clone(),
                    });
                }
            }
            _ => {}
        }
    }

    if let Some((entity, line)) = open {
        issues.push(DiagramIssue::UnclosedEntity {
            entity: entity.to_string(),
            line,
        });
    }
    entities
}

/// Closest defined entity by case, underscore-stripped or substring match
fn suggest(name: &str, entities: &AHashMap<String, usize>) -> Option<String> {
    let lower = name.to_lowercase();
    let stripped = lower.replace('_', "");

    let mut candidates: Vec<(&String, usize)> = entities.iter().map(|(k, &v)| (k, v)).collect();
    candidates.sort_by_key(|(_, line)| *line);

    let find = |pred: &dyn Fn(&str) -> bool| {
        candidates
            .iter()
            .find(|(c, _)| pred(&c.to_lowercase()))
            .map(|(c, _)| c.to_string())
    };

    find(&|c: &str| c == lower)
        .or_else(|| find(&|c: &str| c.replace('_', "") == stripped))
        .or_else(|| find(&|c: &str| c.contains(lower.as_str()) || lower.contains(c)))
}

/// Append findings as a `%%` comment trailer
pub fn with_diagnostics(source: &str, issues: &[DiagramIssue]) -> String {
    if issues.is_empty() {
        return source.to_string();
    }
    let mut out = source.to_string();
    if !out.ends_with('\n') {
        out.push('\n');
    }
    let noun = if issues.len() == 1 { "issue" } else { "issues" };
    out.push_str(&format!("%% Validation: {} {} found\n", issues.len(), noun));
    for issue in issues {
        out.push_str(&format!("%% - {}\n", issue));
    }
    out
}
