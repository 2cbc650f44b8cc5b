//! Raw extraction input.
//!
//! Everything here is optional: extraction services return partial data and the
//! normalizer fills the gaps instead of rejecting the request.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Loose entity/relationship extraction result
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionResult {
    pub entities: Vec<RawEntity>,
    pub relationships: Vec<RawRelationship>,
}

impl ExtractionResult {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEntity {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_weak_entity: Option<bool>,
    pub attributes: Option<Vec<RawAttribute>>,
}

impl RawEntity {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<RawAttribute>) -> Self {
        self.attributes = Some(attributes);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAttribute {
    pub name: Option<String>,
    #[serde(alias = "type")]
    pub data_type: Option<String>,
    pub is_primary_key: Option<bool>,
    pub is_foreign_key: Option<bool>,
    pub is_nullable: Option<bool>,
    pub is_unique: Option<bool>,
    pub default_value: Option<String>,
    pub description: Option<String>,
}

impl RawAttribute {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn typed(name: &str, data_type: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            data_type: Some(data_type.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRelationship {
    #[serde(alias = "verb", alias = "action")]
    pub name: Option<String>,
    pub source_entity: Option<String>,
    pub target_entity: Option<String>,
    #[serde(rename = "type")]
    pub rel_type: Option<String>,
    pub is_identifying: Option<bool>,
    pub source_cardinality: Option<String>,
    pub target_cardinality: Option<String>,
    pub source_participation: Option<String>,
    pub target_participation: Option<String>,
    pub description: Option<String>,
    pub attributes: Option<Vec<RawAttribute>>,
}

impl RawRelationship {
    pub fn between(source: &str, target: &str, rel_type: &str) -> Self {
        Self {
            source_entity: Some(source.to_string()),
            target_entity: Some(target.to_string()),
            rel_type: Some(rel_type.to_string()),
            ..Default::default()
        }
    }
}
