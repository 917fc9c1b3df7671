//! Entity model for dependency-aware planning.
//!
//! This module provides:
//! - Case-normalized entity identities
//! - Normalized entity records with their outbound attribute references
//! - CDM definition normalization (see `cdm`)
//! - Dependency graph construction and leveled topological sorting (see `graph`)

mod cdm;
mod graph;

pub use cdm::*;
pub use graph::*;

use crate::error::{ErdError, GraphWarning, WarningCollector};
use ahash::AHashMap;
use schemars::JsonSchema;
use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;
use std::path::Path;

/// Case-normalized identity of one entity.
///
/// Identities are compared case-insensitively; the stored form is lower case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Where an attribute reference points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeTarget {
    /// A named entity (which may or may not be part of the manifest)
    Entity(EntityId),
    /// The reference exists but its target could not be read as an entity
    /// name; holds a short preview of the raw value
    Unresolvable(String),
}

/// One attribute of an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRef {
    pub name: String,
    /// `None` for scalar attributes
    pub target: Option<AttributeTarget>,
}

impl AttributeRef {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
        }
    }

    pub fn reference(name: impl Into<String>, target: &str) -> Self {
        Self {
            name: name.into(),
            target: Some(AttributeTarget::Entity(EntityId::new(target))),
        }
    }

    /// The referenced entity, if this attribute is a resolvable reference
    pub fn target_entity(&self) -> Option<&EntityId> {
        match &self.target {
            Some(AttributeTarget::Entity(id)) => Some(id),
            _ => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        self.target.is_some()
    }
}

/// Normalized in-memory form of one entity definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    pub id: EntityId,
    pub display_name: String,
    pub description: Option<String>,
    pub attributes: Vec<AttributeRef>,
}

impl EntityRecord {
    pub fn new(name: &str) -> Self {
        Self {
            id: EntityId::new(name),
            display_name: name.trim().to_string(),
            description: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: AttributeRef) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Resolvable reference targets in attribute order (may repeat)
    pub fn referenced_entities(&self) -> impl Iterator<Item = &EntityId> {
        self.attributes.iter().filter_map(|a| a.target_entity())
    }

    pub fn has_self_reference(&self) -> bool {
        self.referenced_entities().any(|t| *t == self.id)
    }
}

/// Ordered collection of unique entity records
#[derive(Debug, Default)]
pub struct Schema {
    entities: Vec<EntityRecord>,
    index: AHashMap<EntityId, usize>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema from records, keeping the first record of each identity
    pub fn from_records(
        records: impl IntoIterator<Item = EntityRecord>,
        warnings: &mut WarningCollector,
    ) -> Self {
        let mut schema = Self::new();
        for record in records {
            if !schema.add(record.clone()) {
                warnings.add(GraphWarning::DuplicateEntity { entity: record.id });
            }
        }
        schema
    }

    /// Normalize raw definitions into a schema. A definition without an
    /// identity aborts the whole manifest.
    pub fn from_definitions(
        definitions: &[LoadedDefinition],
        warnings: &mut WarningCollector,
    ) -> Result<Self, ErdError> {
        let records = definitions
            .iter()
            .map(|d| normalize_definition(&d.definition, Some(d.document.as_path())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_records(records, warnings))
    }

    /// Add a record; returns false if the identity is already present
    pub fn add(&mut self, record: EntityRecord) -> bool {
        if self.index.contains_key(&record.id) {
            return false;
        }
        self.index.insert(record.id.clone(), self.entities.len());
        self.entities.push(record);
        true
    }

    /// Lookup is case-insensitive
    pub fn get(&self, name: &str) -> Option<&EntityRecord> {
        let id = EntityId::new(name);
        self.index.get(&id).map(|&i| &self.entities[i])
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.entities.iter()
    }

    pub fn records(&self) -> &[EntityRecord] {
        &self.entities
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.entities.iter().map(|e| &e.id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// A raw definition together with the document it came from
#[derive(Debug, Clone)]
pub struct LoadedDefinition {
    pub definition: RawEntityDefinition,
    pub document: std::path::PathBuf,
}

impl LoadedDefinition {
    pub fn new(definition: RawEntityDefinition, document: &Path) -> Self {
        Self {
            definition,
            document: document.to_path_buf(),
        }
    }
}
