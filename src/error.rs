//! Error and warning types shared by the loader, graph builder and sorter.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::schema::EntityId;

/// Fatal errors raised while loading a manifest or leveling its graph.
#[derive(Error, Debug)]
pub enum ErdError {
    /// An entity definition has no usable identity
    #[error("malformed entity definition{}: {}", location_suffix(.document), .reason)]
    MalformedEntity {
        document: Option<PathBuf>,
        reason: String,
    },

    /// The dependency graph contains at least one cycle
    #[error("circular dependency detected among entities: {}", join_ids(.entities))]
    CircularDependency { entities: Vec<EntityId> },

    /// A manifest or entity document does not exist
    #[error("document not found: {}", .path.display())]
    DocumentNotFound { path: PathBuf },

    /// A manifest or entity document could not be parsed
    #[error("malformed document '{}'", .path.display())]
    MalformedDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// I/O failure other than a missing document
    #[error("failed to read '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ErdError {
    pub fn malformed_entity(document: Option<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedEntity {
            document,
            reason: reason.into(),
        }
    }

    /// Map an I/O error on `path` to `DocumentNotFound` or `Io`.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::DocumentNotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    pub fn malformed_document(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::MalformedDocument {
            path: path.into(),
            source,
        }
    }
}

fn location_suffix(document: &Option<PathBuf>) -> String {
    document
        .as_ref()
        .map(|p| format!(" in '{}'", p.display()))
        .unwrap_or_default()
}

fn join_ids(ids: &[EntityId]) -> String {
    ids.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Non-fatal issues found while building the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphWarning {
    /// An attribute references an entity outside the known set, or its
    /// reference target could not be read as an entity name
    UnresolvedReference {
        entity: EntityId,
        attribute: String,
        target: String,
    },
    /// Two definitions share the same entity name; the first one is kept
    DuplicateEntity { entity: EntityId },
}

impl fmt::Display for GraphWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphWarning::UnresolvedReference {
                entity,
                attribute,
                target,
            } => write!(
                f,
                "Unresolved reference: {}.{} -> {}",
                entity, attribute, target
            ),
            GraphWarning::DuplicateEntity { entity } => {
                write!(f, "Duplicate entity definition: {} (first kept)", entity)
            }
        }
    }
}

/// Collects warnings while a manifest is processed.
#[derive(Debug)]
pub struct WarningCollector {
    warnings: Vec<GraphWarning>,
    max_warnings: usize,
    dropped: usize,
}

impl Default for WarningCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl WarningCollector {
    pub fn new() -> Self {
        Self::with_limit(500)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            warnings: Vec::new(),
            max_warnings: limit,
            dropped: 0,
        }
    }

    /// Record a warning. Exact duplicates are ignored and anything past the
    /// limit is only counted.
    pub fn add(&mut self, warning: GraphWarning) {
        if self.warnings.contains(&warning) {
            return;
        }
        if self.warnings.len() >= self.max_warnings {
            self.dropped += 1;
            return;
        }
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[GraphWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    /// Warnings discarded after the limit was reached
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Unresolved reference targets, for quick checks in callers and tests
    pub fn unresolved_targets(&self) -> Vec<&str> {
        self.warnings
            .iter()
            .filter_map(|w| match w {
                GraphWarning::UnresolvedReference { target, .. } => Some(target.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Print a summary to stderr
    pub fn print_summary(&self) {
        if self.warnings.is_empty() {
            return;
        }

        eprintln!("\nWarnings ({}):", self.warnings.len() + self.dropped);
        for warning in &self.warnings {
            eprintln!("  ⚠ {}", warning);
        }
        if self.dropped > 0 {
            eprintln!("  ... and {} more", self.dropped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unresolved(target: &str) -> GraphWarning {
        GraphWarning::UnresolvedReference {
            entity: EntityId::new("account"),
            attribute: "parentId".to_string(),
            target: target.to_string(),
        }
    }

    #[test]
    fn test_collector_deduplicates() {
        let mut collector = WarningCollector::new();
        collector.add(unresolved("contact"));
        collector.add(unresolved("contact"));
        collector.add(unresolved("lead"));

        assert_eq!(collector.len(), 2);
        assert_eq!(collector.unresolved_targets(), vec!["contact", "lead"]);
    }

    #[test]
    fn test_collector_limit() {
        let mut collector = WarningCollector::with_limit(1);
        collector.add(unresolved("a"));
        collector.add(unresolved("b"));
        collector.add(unresolved("c"));

        assert_eq!(collector.len(), 1);
        assert_eq!(collector.dropped(), 2);
    }

    #[test]
    fn test_circular_dependency_message_lists_entities() {
        let err = ErdError::CircularDependency {
            entities: vec![EntityId::new("a"), EntityId::new("b")],
        };
        assert_eq!(
            err.to_string(),
            "circular dependency detected among entities: a, b"
        );
    }

    #[test]
    fn test_missing_file_maps_to_document_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ErdError::from_io("/tmp/missing.cdm.json", io);
        assert!(matches!(err, ErdError::DocumentNotFound { .. }));
        assert!(err.to_string().contains("missing.cdm.json"));
    }

    #[test]
    fn test_malformed_entity_message() {
        let err = ErdError::malformed_entity(None, "missing entityName");
        assert_eq!(
            err.to_string(),
            "malformed entity definition: missing entityName"
        );
    }
}
