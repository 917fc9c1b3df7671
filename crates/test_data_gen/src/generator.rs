//! Layered entity-graph generator.
//!
//! Entities are placed on layers; an entity on layer `k > 0` references at
//! least one entity on layer `k - 1` and optionally more on lower layers, so
//! its load level is exactly `k`. Self-references and references to unknown
//! entities can be mixed in without changing that; an injected cycle makes
//! the graph unplannable.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generation scale presets
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// 4 layers × 5 entities
    Small,
    /// 8 layers × 25 entities
    Medium,
    /// 12 layers × 200 entities
    Large,
}

impl Scale {
    pub fn layers(&self) -> usize {
        match self {
            Scale::Small => 4,
            Scale::Medium => 8,
            Scale::Large => 12,
        }
    }

    pub fn entities_per_layer(&self) -> usize {
        match self {
            Scale::Small => 5,
            Scale::Medium => 25,
            Scale::Large => 200,
        }
    }
}

impl std::str::FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "small" | "s" => Ok(Scale::Small),
            "medium" | "m" => Ok(Scale::Medium),
            "large" | "l" => Ok(Scale::Large),
            _ => Err(format!(
                "Unknown scale: {}. Use small, medium, or large",
                s
            )),
        }
    }
}

/// Knobs for one generated graph
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub layers: usize,
    pub entities_per_layer: usize,
    /// Extra references per entity beyond the mandatory one
    pub max_extra_refs: usize,
    /// Probability that an entity references itself
    pub self_ref_ratio: f64,
    /// Probability that an entity references an entity outside the graph
    pub unknown_ref_ratio: f64,
    /// Close a loop from the bottom layer back to the top one
    pub inject_cycle: bool,
}

impl GeneratorConfig {
    pub fn from_scale(scale: Scale) -> Self {
        Self {
            layers: scale.layers(),
            entities_per_layer: scale.entities_per_layer(),
            max_extra_refs: 3,
            self_ref_ratio: 0.1,
            unknown_ref_ratio: 0.05,
            inject_cycle: false,
        }
    }
}

/// One generated entity
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedEntity {
    /// Mixed-case name, as it would appear in a definition
    pub name: String,
    pub layer: usize,
    /// Referenced entity names, in attribute order (may repeat)
    pub references: Vec<String>,
}

impl GeneratedEntity {
    /// Normalized identity
    pub fn id(&self) -> String {
        self.name.to_lowercase()
    }
}

/// A generated graph
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSchema {
    pub entities: Vec<GeneratedEntity>,
    pub has_cycle: bool,
}

impl GeneratedSchema {
    /// Correct load plan as normalized ids, each level sorted.
    /// Meaningless when `has_cycle` is set.
    pub fn expected_levels(&self) -> Vec<Vec<String>> {
        let layers = self.entities.iter().map(|e| e.layer).max().map_or(0, |m| m + 1);
        let mut levels = vec![Vec::new(); layers];
        for entity in &self.entities {
            levels[entity.layer].push(entity.id());
        }
        for level in &mut levels {
            level.sort();
        }
        levels
    }

    /// `(entity, references)` pairs for driving the graph builder directly
    pub fn to_pairs(&self) -> Vec<(String, Vec<String>)> {
        self.entities
            .iter()
            .map(|e| (e.name.clone(), e.references.clone()))
            .collect()
    }

    /// Names referenced but never defined
    pub fn unknown_references(&self) -> Vec<String> {
        let known: std::collections::HashSet<String> =
            self.entities.iter().map(|e| e.id()).collect();
        let mut unknown: Vec<String> = self
            .entities
            .iter()
            .flat_map(|e| e.references.iter())
            .filter(|r| !known.contains(&r.to_lowercase()))
            .map(|r| r.to_lowercase())
            .collect();
        unknown.sort();
        unknown.dedup();
        unknown
    }
}

/// Deterministic generator
pub struct Generator {
    rng: ChaCha8Rng,
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(seed: u64, scale: Scale) -> Self {
        Self::with_config(seed, GeneratorConfig::from_scale(scale))
    }

    pub fn with_config(seed: u64, config: GeneratorConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
        }
    }

    pub fn generate(&mut self) -> GeneratedSchema {
        let layers = self.config.layers;
        let width = self.config.entities_per_layer.max(1);

        let names: Vec<Vec<String>> = (0..layers)
            .map(|layer| (0..width).map(|i| entity_name(layer, i)).collect())
            .collect();

        let mut entities = Vec::with_capacity(layers * width);
        let mut external = 0usize;

        for layer in 0..layers {
            for i in 0..width {
                let mut references = Vec::new();

                if layer > 0 {
                    let pick = self.rng.random_range(0..width);
                    references.push(names[layer - 1][pick].clone());

                    let extra = self.rng.random_range(0..=self.config.max_extra_refs);
                    for _ in 0..extra {
                        let lower = self.rng.random_range(0..layer);
                        let pick = self.rng.random_range(0..width);
                        references.push(names[lower][pick].clone());
                    }
                }

                if self.rng.random_bool(self.config.self_ref_ratio) {
                    // Vary the case to exercise normalization
                    references.push(names[layer][i].to_uppercase());
                }

                if self.rng.random_bool(self.config.unknown_ref_ratio) {
                    references.push(format!("External{:03}", external));
                    external += 1;
                }

                entities.push(GeneratedEntity {
                    name: names[layer][i].clone(),
                    layer,
                    references,
                });
            }
        }

        let has_cycle = self.config.inject_cycle && layers > 1;
        if has_cycle {
            // Walk the mandatory references from the last entity down to
            // layer 0, then close the loop back to where the walk started.
            let index_of = |name: &str| {
                let (layer, i) = parse_entity_name(name)?;
                Some(layer * width + i)
            };
            let start = entities.len() - 1;
            let mut current = start;
            while entities[current].layer > 0 {
                match entities[current].references.first().and_then(|r| index_of(r.as_str())) {
                    Some(next) => current = next,
                    None => break,
                }
            }
            let start_name = entities[start].name.clone();
            entities[current].references.push(start_name);
        }

        GeneratedSchema {
            entities,
            has_cycle,
        }
    }
}

fn entity_name(layer: usize, index: usize) -> String {
    format!("Layer{}Entity{:03}", layer, index)
}

fn parse_entity_name(name: &str) -> Option<(usize, usize)> {
    let rest = name.strip_prefix("Layer")?;
    let (layer, index) = rest.split_once("Entity")?;
    Some((layer.parse().ok()?, index.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = Generator::new(7, Scale::Small).generate();
        let b = Generator::new(7, Scale::Small).generate();
        assert_eq!(a, b);

        let c = Generator::new(8, Scale::Small).generate();
        assert_ne!(a, c);
    }

    #[test]
    fn test_layers_reference_previous_layer() {
        let schema = Generator::new(1, Scale::Medium).generate();
        for entity in schema.entities.iter().filter(|e| e.layer > 0) {
            let prefix = format!("Layer{}Entity", entity.layer - 1);
            assert!(entity.references.iter().any(|r| r.starts_with(&prefix)));
        }
    }

    #[test]
    fn test_expected_levels_cover_all() {
        let schema = Generator::new(3, Scale::Small).generate();
        let levels = schema.expected_levels();
        assert_eq!(levels.len(), 4);
        assert!(levels.iter().all(|l| l.len() == 5));
        assert_eq!(levels[0][0], "layer0entity000");
    }

    #[test]
    fn test_cycle_injection() {
        let mut config = GeneratorConfig::from_scale(Scale::Small);
        config.inject_cycle = true;
        config.self_ref_ratio = 0.0;
        config.unknown_ref_ratio = 0.0;
        let schema = Generator::with_config(5, config).generate();

        assert!(schema.has_cycle);
        let closing: Vec<&GeneratedEntity> = schema
            .entities
            .iter()
            .filter(|e| e.layer == 0 && !e.references.is_empty())
            .collect();
        assert_eq!(closing.len(), 1);
        assert_eq!(closing[0].references, vec!["Layer3Entity004".to_string()]);
    }

    #[test]
    fn test_unknown_references() {
        let mut config = GeneratorConfig::from_scale(Scale::Small);
        config.unknown_ref_ratio = 1.0;
        let schema = Generator::with_config(5, config).generate();
        assert_eq!(schema.unknown_references().len(), 20);
    }
}
