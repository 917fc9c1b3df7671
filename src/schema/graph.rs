//! Entity dependency graph and leveled load planning.
//!
//! Provides:
//! - Dependency map construction from entity attribute references
//! - Leveled topological sorting (Kahn's algorithm, one level per round)
//! - Cycle detection that fails the whole plan

use super::{AttributeTarget, EntityId, EntityRecord, Schema};
use crate::error::{ErdError, GraphWarning, WarningCollector};
use ahash::{AHashMap, AHashSet};
use std::collections::{BTreeMap, BTreeSet};

/// Mapping from each entity to the entities it depends on.
///
/// Invariants upheld by every constructor:
/// - no entity depends on itself
/// - every dependency is itself a key of the map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyMap {
    deps: BTreeMap<EntityId, BTreeSet<EntityId>>,
}

impl DependencyMap {
    /// Build the map from normalized records.
    ///
    /// Self-references are dropped silently. References to entities outside
    /// the record set, and references whose target could not be read, are
    /// dropped and reported as `UnresolvedReference` warnings.
    pub fn from_records(records: &[EntityRecord], warnings: &mut WarningCollector) -> Self {
        let known: AHashSet<&EntityId> = records.iter().map(|r| &r.id).collect();
        let mut deps: BTreeMap<EntityId, BTreeSet<EntityId>> = BTreeMap::new();

        for record in records {
            if deps.contains_key(&record.id) {
                warnings.add(GraphWarning::DuplicateEntity {
                    entity: record.id.clone(),
                });
                continue;
            }

            let mut targets = BTreeSet::new();
            for attribute in &record.attributes {
                match &attribute.target {
                    None => {}
                    Some(AttributeTarget::Entity(target)) if *target == record.id => {}
                    Some(AttributeTarget::Entity(target)) if known.contains(target) => {
                        targets.insert(target.clone());
                    }
                    Some(AttributeTarget::Entity(target)) => {
                        warnings.add(GraphWarning::UnresolvedReference {
                            entity: record.id.clone(),
                            attribute: attribute.name.clone(),
                            target: target.to_string(),
                        });
                    }
                    Some(AttributeTarget::Unresolvable(raw)) => {
                        warnings.add(GraphWarning::UnresolvedReference {
                            entity: record.id.clone(),
                            attribute: attribute.name.clone(),
                            target: raw.clone(),
                        });
                    }
                }
            }
            deps.insert(record.id.clone(), targets);
        }

        log::debug!(
            "built dependency map: {} entities, {} edges",
            deps.len(),
            deps.values().map(BTreeSet::len).sum::<usize>()
        );

        Self { deps }
    }

    pub fn from_schema(schema: &Schema, warnings: &mut WarningCollector) -> Self {
        Self::from_records(schema.records(), warnings)
    }

    /// Build the map from raw `(entity, dependencies)` pairs, applying the
    /// same rules as `from_records`. Names are case-normalized.
    pub fn from_pairs<I, K, D, T>(pairs: I, warnings: &mut WarningCollector) -> Self
    where
        I: IntoIterator<Item = (K, D)>,
        K: AsRef<str>,
        D: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let records: Vec<EntityRecord> = pairs
            .into_iter()
            .map(|(name, targets)| {
                let mut record = EntityRecord::new(name.as_ref());
                for target in targets {
                    let target = target.as_ref();
                    record = record.with_attribute(super::AttributeRef::reference(
                        format!("{}Id", target.trim()),
                        target,
                    ));
                }
                record
            })
            .collect();
        Self::from_records(&records, warnings)
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.deps.contains_key(id)
    }

    /// Direct dependencies of an entity
    pub fn dependencies(&self, id: &str) -> Option<&BTreeSet<EntityId>> {
        self.deps.get(id)
    }

    /// Entities in identity order with their dependencies
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &BTreeSet<EntityId>)> {
        self.deps.iter()
    }

    pub fn edge_count(&self) -> usize {
        self.deps.values().map(BTreeSet::len).sum()
    }

    /// Reverse adjacency: for each entity, the entities that depend on it
    pub fn dependents(&self) -> BTreeMap<&EntityId, Vec<&EntityId>> {
        let mut dependents: BTreeMap<&EntityId, Vec<&EntityId>> =
            self.deps.keys().map(|k| (k, Vec::new())).collect();
        for (entity, deps) in &self.deps {
            for dep in deps {
                if let Some(list) = dependents.get_mut(dep) {
                    list.push(entity);
                }
            }
        }
        dependents
    }

    /// Entities without dependencies
    pub fn roots(&self) -> Vec<&EntityId> {
        self.deps
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(id, _)| id)
            .collect()
    }

    /// Partition the graph into load levels.
    ///
    /// Level 0 holds every entity without dependencies; each following level
    /// holds every entity whose dependencies all sit in earlier levels.
    /// Members of a level are sorted by identity. If some entities can never
    /// be placed the graph has a cycle and no plan is returned.
    pub fn level_sort(&self) -> Result<LoadPlan, ErdError> {
        // Working state: remaining dependency count per entity. The map
        // itself is never touched.
        let mut remaining: AHashMap<&EntityId, usize> = self
            .deps
            .iter()
            .map(|(id, deps)| (id, deps.len()))
            .collect();
        let dependents = self.dependents();

        let mut frontier: Vec<&EntityId> = self.roots();
        let mut levels = Vec::new();
        let mut placed = 0usize;

        while !frontier.is_empty() {
            frontier.sort_unstable();
            let mut next = Vec::new();

            for id in &frontier {
                for &dependent in &dependents[*id] {
                    if let Some(count) = remaining.get_mut(dependent) {
                        *count -= 1;
                        if *count == 0 {
                            next.push(dependent);
                        }
                    }
                }
            }

            placed += frontier.len();
            levels.push(Level::new(frontier.into_iter().cloned().collect()));
            frontier = next;
        }

        if placed < self.deps.len() {
            let mut entities: Vec<EntityId> = remaining
                .into_iter()
                .filter(|(_, count)| *count > 0)
                .map(|(id, _)| id.clone())
                .collect();
            entities.sort_unstable();
            log::debug!(
                "leveling stopped after {} levels; {} entities unresolved",
                levels.len(),
                entities.len()
            );
            return Err(ErdError::CircularDependency { entities });
        }

        log::debug!("leveled {} entities into {} levels", placed, levels.len());
        Ok(LoadPlan { levels })
    }
}

/// Level a dependency map. See [`DependencyMap::level_sort`].
pub fn level_sort(map: &DependencyMap) -> Result<LoadPlan, ErdError> {
    map.level_sort()
}

/// One batch of entities that can be loaded concurrently
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level(Vec<EntityId>);

impl Level {
    pub fn new(entities: Vec<EntityId>) -> Self {
        Self(entities)
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|e| e.as_str() == id)
    }
}

/// Ordered sequence of levels covering every entity exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPlan {
    levels: Vec<Level>,
}

impl LoadPlan {
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }

    /// Number of levels
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn entity_count(&self) -> usize {
        self.levels.iter().map(Level::len).sum()
    }

    /// Size of the widest level
    pub fn max_parallelism(&self) -> usize {
        self.levels.iter().map(Level::len).max().unwrap_or(0)
    }

    /// Zero-based level index of an entity
    pub fn level_of(&self, id: &str) -> Option<usize> {
        let id = EntityId::new(id);
        self.levels
            .iter()
            .position(|level| level.0.iter().any(|e| *e == id))
    }

    /// Flat load order (level by level)
    pub fn flatten(&self) -> Vec<&EntityId> {
        self.levels.iter().flat_map(Level::iter).collect()
    }

    /// Level membership as plain strings, handy for comparisons
    pub fn to_names(&self) -> Vec<Vec<String>> {
        self.levels
            .iter()
            .map(|l| l.iter().map(|e| e.to_string()).collect())
            .collect()
    }
}
