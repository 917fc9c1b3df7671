//! Dependency-aware load planning and ERD rendering for CDM entity manifests.
//!
//! A manifest is read into normalized entity records, turned into a
//! dependency map, and leveled into a load plan whose levels can be loaded
//! in parallel. The same records feed an entity-relationship diagram.

pub mod config;
pub mod error;
pub mod graph;
pub mod json_schema;
pub mod loader;
pub mod report;
pub mod schema;
pub mod style;
