//! Cycle analysis over ERD views (Tarjan's strongly connected components).

use crate::graph::view::ErdView;
use ahash::{AHashMap, AHashSet};

/// A cycle in the graph (entities forming the cycle)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    pub entities: Vec<String>,
}

impl Cycle {
    /// Check if this is a self-referencing cycle (single entity)
    pub fn is_self_reference(&self) -> bool {
        self.entities.len() == 1
    }

    /// Format the cycle for display
    pub fn display(&self) -> String {
        if self.is_self_reference() {
            format!(
                "{} -> {} (self-reference)",
                self.entities[0], self.entities[0]
            )
        } else {
            let mut parts = self.entities.clone();
            parts.push(self.entities[0].clone());
            parts.join(" -> ")
        }
    }
}

/// Find all cycles in the view, self-references included.
///
/// Multi-entity cycles are returned with their members sorted, and cycles
/// are ordered by their first member.
pub fn find_cycles(view: &ErdView) -> Vec<Cycle> {
    let mut finder = TarjanScc::new(view);
    finder.find_sccs();

    let mut cycles: Vec<Cycle> = finder
        .sccs
        .into_iter()
        .filter(|scc| {
            scc.len() > 1
                || view
                    .edges
                    .iter()
                    .any(|e| e.is_self_reference() && e.from_entity == scc[0])
        })
        .map(|mut scc| {
            scc.sort();
            Cycle { entities: scc }
        })
        .collect();

    cycles.sort_by(|a, b| a.entities.cmp(&b.entities));
    cycles
}

/// Get all entities that are part of any cycle
pub fn cyclic_entities(view: &ErdView) -> AHashSet<String> {
    find_cycles(view)
        .into_iter()
        .flat_map(|c| c.entities)
        .collect()
}

struct TarjanScc {
    nodes: Vec<String>,
    index_counter: usize,
    stack: Vec<String>,
    on_stack: AHashSet<String>,
    indices: AHashMap<String, usize>,
    lowlinks: AHashMap<String, usize>,
    sccs: Vec<Vec<String>>,
    adjacency: AHashMap<String, Vec<String>>,
}

impl TarjanScc {
    fn new(view: &ErdView) -> Self {
        let mut adjacency: AHashMap<String, Vec<String>> = view
            .entities
            .keys()
            .map(|k| (k.clone(), Vec::new()))
            .collect();
        for edge in &view.edges {
            if view.entities.contains_key(&edge.to_entity) {
                if let Some(targets) = adjacency.get_mut(&edge.from_entity) {
                    targets.push(edge.to_entity.clone());
                }
            }
        }

        let mut nodes: Vec<String> = view.entities.keys().cloned().collect();
        nodes.sort();

        Self {
            nodes,
            index_counter: 0,
            stack: Vec::new(),
            on_stack: AHashSet::new(),
            indices: AHashMap::new(),
            lowlinks: AHashMap::new(),
            sccs: Vec::new(),
            adjacency,
        }
    }

    fn find_sccs(&mut self) {
        let nodes = std::mem::take(&mut self.nodes);
        for node in &nodes {
            if !self.indices.contains_key(node) {
                self.strongconnect(node);
            }
        }
    }

    fn strongconnect(&mut self, v: &str) {
        self.indices.insert(v.to_string(), self.index_counter);
        self.lowlinks.insert(v.to_string(), self.index_counter);
        self.index_counter += 1;
        self.stack.push(v.to_string());
        self.on_stack.insert(v.to_string());

        if let Some(neighbors) = self.adjacency.get(v).cloned() {
            for w in neighbors {
                if !self.indices.contains_key(&w) {
                    self.strongconnect(&w);
                    let low = self.lowlinks[v].min(self.lowlinks[&w]);
                    self.lowlinks.insert(v.to_string(), low);
                } else if self.on_stack.contains(&w) {
                    let low = self.lowlinks[v].min(self.indices[&w]);
                    self.lowlinks.insert(v.to_string(), low);
                }
            }
        }

        // Root of an SCC: pop it off the stack
        if self.lowlinks[v] == self.indices[v] {
            let mut scc = Vec::new();
            while let Some(w) = self.stack.pop() {
                self.on_stack.remove(&w);
                let done = w == v;
                scc.push(w);
                if done {
                    break;
                }
            }
            self.sccs.push(scc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::view::{EdgeInfo, EntityInfo};

    fn entity(name: &str) -> EntityInfo {
        EntityInfo {
            id: name.to_string(),
            display_name: name.to_string(),
            description: None,
            color: "#FFFFFF".to_string(),
            attributes: vec![],
        }
    }

    fn edge(from: &str, to: &str) -> EdgeInfo {
        EdgeInfo {
            from_entity: from.to_string(),
            from_attribute: format!("{}Id", to),
            to_entity: to.to_string(),
        }
    }

    fn view(names: &[&str], edges: &[(&str, &str)]) -> ErdView {
        ErdView {
            entities: names.iter().map(|n| (n.to_string(), entity(n))).collect(),
            edges: edges.iter().map(|(f, t)| edge(f, t)).collect(),
        }
    }

    #[test]
    fn test_no_cycles() {
        let view = view(&["account", "contact", "lead"], &[("contact", "account")]);
        assert!(find_cycles(&view).is_empty());
    }

    #[test]
    fn test_self_reference_cycle() {
        let view = view(&["category"], &[("category", "category")]);
        let cycles = find_cycles(&view);
        assert_eq!(cycles.len(), 1);
        assert!(cycles[0].is_self_reference());
        assert_eq!(cycles[0].display(), "category -> category (self-reference)");
    }

    #[test]
    fn test_multi_entity_cycle() {
        let view = view(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);
        let cycles = find_cycles(&view);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].entities, vec!["a", "b", "c"]);
        assert_eq!(cycles[0].display(), "a -> b -> c -> a");
    }

    #[test]
    fn test_cyclic_entities_excludes_downstream() {
        let view = view(
            &["a", "b", "c"],
            &[("a", "b"), ("b", "a"), ("c", "a")],
        );
        let cyclic = cyclic_entities(&view);
        assert!(cyclic.contains("a"));
        assert!(cyclic.contains("b"));
        assert!(!cyclic.contains("c"));
    }
}
