//! Test data generator for cdm-erd.
//!
//! Generates deterministic, layered CDM entity graphs whose correct load
//! plan is known up front, and writes them out as manifest folders.
//!
//! # Example
//!
//! ```rust
//! use test_data_gen::{Generator, Scale};
//!
//! let schema = Generator::new(42, Scale::Small).generate();
//! assert_eq!(schema.expected_levels().len(), Scale::Small.layers());
//! ```

pub mod generator;
pub mod manifest;

pub use generator::{GeneratedEntity, GeneratedSchema, Generator, GeneratorConfig, Scale};
pub use manifest::{entity_definition, inline_manifest, write_manifest};
