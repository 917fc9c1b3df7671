//! Graph view with filtering and focus capabilities for ERD generation.

use crate::schema::Schema;
use crate::style::{StyleLookup, DEFAULT_COLOR};
use ahash::{AHashMap, AHashSet};
use glob::Pattern;
use std::collections::VecDeque;

/// Information about one attribute of an entity
#[derive(Debug, Clone)]
pub struct AttributeInfo {
    /// Attribute name
    pub name: String,
    /// Referenced entity, when the reference resolves to a known entity
    pub references: Option<String>,
    /// Row color: the referenced entity's color for references, else the
    /// owning entity's color
    pub color: String,
}

impl AttributeInfo {
    pub fn is_reference(&self) -> bool {
        self.references.is_some()
    }
}

/// Information about an entity for ERD rendering
#[derive(Debug, Clone)]
pub struct EntityInfo {
    /// Normalized identity
    pub id: String,
    pub display_name: String,
    pub description: Option<String>,
    /// Header color
    pub color: String,
    /// All attributes in definition order
    pub attributes: Vec<AttributeInfo>,
}

/// An attribute-level reference between two entities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeInfo {
    /// Entity owning the reference attribute
    pub from_entity: String,
    /// Reference attribute
    pub from_attribute: String,
    /// Referenced entity
    pub to_entity: String,
}

impl EdgeInfo {
    pub fn is_self_reference(&self) -> bool {
        self.from_entity == self.to_entity
    }
}

/// A filtered view of a schema for ERD visualization
#[derive(Debug, Default)]
pub struct ErdView {
    /// Entities included in this view
    pub entities: AHashMap<String, EntityInfo>,
    /// References between included entities
    pub edges: Vec<EdgeInfo>,
}

impl ErdView {
    /// Create a full view of a schema. References to entities outside the
    /// schema are kept as plain attributes but produce no edge.
    pub fn from_schema(schema: &Schema, styles: &dyn StyleLookup) -> Self {
        let mut entities = AHashMap::new();
        let mut edges = Vec::new();

        for record in schema.iter() {
            let color = styles.color_or_default(&record.id).to_string();

            let attributes = record
                .attributes
                .iter()
                .map(|attr| {
                    let target = attr.target_entity().filter(|t| schema.contains(t));
                    AttributeInfo {
                        name: attr.name.clone(),
                        references: target.map(|t| t.to_string()),
                        color: target
                            .and_then(|t| styles.color(t))
                            .unwrap_or(&color)
                            .to_string(),
                    }
                })
                .collect();

            for attr in &record.attributes {
                if let Some(target) = attr.target_entity().filter(|t| schema.contains(t)) {
                    edges.push(EdgeInfo {
                        from_entity: record.id.to_string(),
                        from_attribute: attr.name.clone(),
                        to_entity: target.to_string(),
                    });
                }
            }

            entities.insert(
                record.id.to_string(),
                EntityInfo {
                    id: record.id.to_string(),
                    display_name: record.display_name.clone(),
                    description: record.description.clone(),
                    color,
                    attributes,
                },
            );
        }

        Self { entities, edges }
    }

    /// Filter to include only entities matching the given patterns
    pub fn filter_entities(&mut self, patterns: &[Pattern]) {
        if patterns.is_empty() {
            return;
        }

        let matching: AHashSet<String> = self
            .entities
            .keys()
            .filter(|name| patterns.iter().any(|p| p.matches(name)))
            .cloned()
            .collect();

        self.apply_node_filter(&matching);
    }

    /// Exclude entities matching the given patterns
    pub fn exclude_entities(&mut self, patterns: &[Pattern]) {
        if patterns.is_empty() {
            return;
        }

        let remaining: AHashSet<String> = self
            .entities
            .keys()
            .filter(|name| !patterns.iter().any(|p| p.matches(name)))
            .cloned()
            .collect();

        self.apply_node_filter(&remaining);
    }

    /// Focus on one entity and its relationships.
    ///
    /// `transitive` follows what the entity depends on, `reverse` follows what
    /// depends on it; with neither, only direct neighbours are kept.
    pub fn focus_entity(
        &mut self,
        entity: &str,
        transitive: bool,
        reverse: bool,
        max_depth: Option<usize>,
    ) {
        let entity = entity.trim().to_lowercase();
        if !self.entities.contains_key(&entity) {
            self.entities.clear();
            self.edges.clear();
            return;
        }

        let mut result_nodes = AHashSet::new();
        result_nodes.insert(entity.clone());

        let (outgoing, incoming) = self.build_adjacency_maps();

        if transitive {
            self.traverse(&outgoing, &entity, max_depth, &mut result_nodes);
        }

        if reverse {
            self.traverse(&incoming, &entity, max_depth, &mut result_nodes);
        }

        if !transitive && !reverse {
            for neighbours in [outgoing.get(&entity), incoming.get(&entity)]
                .into_iter()
                .flatten()
            {
                result_nodes.extend(neighbours.iter().cloned());
            }
        }

        self.apply_node_filter(&result_nodes);
    }

    /// Keep only entities that are part of cycles
    pub fn filter_to_cyclic_entities(&mut self, cyclic: &AHashSet<String>) {
        self.apply_node_filter(cyclic);
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn attribute_count(&self) -> usize {
        self.entities.values().map(|e| e.attributes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities sorted by identity
    pub fn sorted_entities(&self) -> Vec<&EntityInfo> {
        let mut entities: Vec<_> = self.entities.values().collect();
        entities.sort_by(|a, b| a.id.cmp(&b.id));
        entities
    }

    pub fn get_entity(&self, id: &str) -> Option<&EntityInfo> {
        self.entities.get(id)
    }

    /// Header color of an entity, or the default marker
    pub fn color_of(&self, id: &str) -> &str {
        self.entities
            .get(id)
            .map(|e| e.color.as_str())
            .unwrap_or(DEFAULT_COLOR)
    }

    fn apply_node_filter(&mut self, keep: &AHashSet<String>) {
        self.entities.retain(|n, _| keep.contains(n));
        self.edges
            .retain(|e| keep.contains(&e.from_entity) && keep.contains(&e.to_entity));
    }

    fn build_adjacency_maps(
        &self,
    ) -> (AHashMap<String, Vec<String>>, AHashMap<String, Vec<String>>) {
        let mut outgoing: AHashMap<String, Vec<String>> = AHashMap::new();
        let mut incoming: AHashMap<String, Vec<String>> = AHashMap::new();

        for edge in &self.edges {
            outgoing
                .entry(edge.from_entity.clone())
                .or_default()
                .push(edge.to_entity.clone());
            incoming
                .entry(edge.to_entity.clone())
                .or_default()
                .push(edge.from_entity.clone());
        }

        (outgoing, incoming)
    }

    fn traverse(
        &self,
        adjacency: &AHashMap<String, Vec<String>>,
        start: &str,
        max_depth: Option<usize>,
        result: &mut AHashSet<String>,
    ) {
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        queue.push_back((start.to_string(), 0));

        while let Some((current, depth)) = queue.pop_front() {
            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }

            if let Some(neighbors) = adjacency.get(&current) {
                for neighbor in neighbors {
                    if result.insert(neighbor.clone()) {
                        queue.push_back((neighbor.clone(), depth + 1));
                    }
                }
            }
        }
    }
}
