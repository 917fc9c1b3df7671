//! ERD (Entity-Relationship Diagram) generation module.
//!
//! This module provides:
//! - Entity visualization with attributes, colors and references
//! - Cycle detection using Tarjan's SCC algorithm
//! - Multiple output formats: DOT (Graphviz), Mermaid, JSON, HTML
//! - Renderer graphs for load plans and the Graphviz hand-off

pub mod analysis;
pub mod format;
pub mod render;
pub mod view;

pub use analysis::{cyclic_entities, find_cycles, Cycle};
pub use format::{
    plan_to_dot, plan_to_mermaid, to_dot, to_html, to_json, to_mermaid, Layout, OutputFormat,
    PlanFormat,
};
pub use render::{GraphvizRenderer, RenderEdge, RenderGraph, RenderNode, RenderStyle};
pub use view::{AttributeInfo, EdgeInfo, EntityInfo, ErdView};
