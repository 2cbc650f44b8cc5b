//! Line classification for Mermaid `erDiagram` source.
//!
//! Both the formatter and the validator work on this classification, so the
//! grammar lives in one place.

use once_cell::sync::Lazy;
use regex::Regex;

/// Structural role of one source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Header,
    Blank,
    Comment,
    /// `name {`
    EntityOpen(String),
    EntityClose,
    /// Any non-structural line inside an entity block
    Attribute,
    /// Any non-structural line outside an entity block
    Relationship,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number
    pub number: usize,
    /// Trimmed text
    pub text: String,
    pub kind: LineKind,
}

static RE_ENTITY_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][\w-]*)\s*\{$").unwrap());

/// Strict relationship grammar: `src ||--o{ tgt : "label"`
static RE_RELATIONSHIP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^([A-Za-z_][\w-]*) (\|\||\|o|o\||\}o|\}\||\|\{|o\{)(--|\.\.)(\|\||\|o|o\||\}o|\}\||\|\{|o\{) ([A-Za-z_][\w-]*) : ("[^"]*"|[\w-]+)$"#,
    )
    .unwrap()
});

/// Lenient relationship shape accepted by the formatter for repair
static RE_RELATIONSHIP_LOOSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^([A-Za-z_][\w-]*)\s*(\|\||\|o|o\||\}o|\}\||\|\{|o\{)\s*(--|\.\.|-\s+-|-|—|–)\s*(\|\||\|o|o\||\}o|\}\||\|\{|o\{)\s*([A-Za-z_][\w-]*)\s*(?::\s*(.*))?$"#,
    )
    .unwrap()
});

/// Strict attribute grammar: `type name [PK|FK|UK[, ...]] ["comment"]`
static RE_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^[A-Za-z][\w\[\]-]*(\([\d, ]*\))? [A-Za-z_][\w-]*( (PK|FK|UK)(, (PK|FK|UK))*)?( "[^"]*")?$"#,
    )
    .unwrap()
});

/// Parsed relationship line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipLine<'a> {
    pub source: &'a str,
    pub left: &'a str,
    pub operator: &'a str,
    pub right: &'a str,
    pub target: &'a str,
    pub label: Option<&'a str>,
}

/// Classify every line of `source`, tracking entity-block nesting
pub fn classify(source: &str) -> Vec<Line> {
    let mut in_block = false;
    source
        .lines()
        .enumerate()
        .map(|(i, raw)| {
            let text = raw.trim();
            let kind = if text.is_empty() {
                LineKind::Blank
            } else if text.starts_with("%%") {
                LineKind::Comment
            } else if text == "erDiagram" {
                LineKind::Header
            } else if text == "}" {
                in_block = false;
                LineKind::EntityClose
            } else if let Some(name) = entity_open(text) {
                in_block = true;
                LineKind::EntityOpen(name.to_string())
            } else if in_block {
                LineKind::Attribute
            } else {
                LineKind::Relationship
            };
            Line {
                number: i + 1,
                text: text.to_string(),
                kind,
            }
        })
        .collect()
}

fn entity_open(text: &str) -> Option<&str> {
    RE_ENTITY_OPEN
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Parse a relationship line in canonical form
pub fn parse_relationship(text: &str) -> Option<RelationshipLine<'_>> {
    let caps = RE_RELATIONSHIP.captures(text)?;
    Some(RelationshipLine {
        source: caps.get(1)?.as_str(),
        left: caps.get(2)?.as_str(),
        operator: caps.get(3)?.as_str(),
        right: caps.get(4)?.as_str(),
        target: caps.get(5)?.as_str(),
        label: caps.get(6).map(|m| m.as_str()),
    })
}

/// Parse a relationship line with sloppy spacing or dash variants
pub fn parse_relationship_loose(text: &str) -> Option<RelationshipLine<'_>> {
    let caps = RE_RELATIONSHIP_LOOSE.captures(text)?;
    Some(RelationshipLine {
        source: caps.get(1)?.as_str(),
        left: caps.get(2)?.as_str(),
        operator: caps.get(3)?.as_str(),
        right: caps.get(4)?.as_str(),
        target: caps.get(5)?.as_str(),
        label: caps.get(6).map(|m| m.as_str().trim()).filter(|l| !l.is_empty()),
    })
}

pub fn is_valid_attribute(text: &str) -> bool {
    RE_ATTRIBUTE.is_match(text)
}
