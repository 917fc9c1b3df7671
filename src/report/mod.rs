//! Load-plan reporting.
//!
//! Turns a leveled `LoadPlan` plus an entity color lookup into a structured
//! report, its text and JSON renderings, and a renderer graph for diagrams.

use crate::error::WarningCollector;
use crate::graph::{RenderEdge, RenderGraph, RenderNode, RenderStyle};
use crate::schema::{DependencyMap, EntityId, LoadPlan, Schema};
use crate::style::{contrasting_text_color, StyleLookup};
use schemars::JsonSchema;
use serde::Serialize;
use std::fmt::Write as _;

/// The full load plan with per-entity styling
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct PlanReport {
    pub steps: Vec<PlanStep>,
    pub stats: PlanStats,
    /// Warnings raised while building the dependency graph
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// One level of the plan
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct PlanStep {
    /// 1-based level index
    pub step: usize,
    pub entities: Vec<PlanEntry>,
}

/// One entity within a level
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct PlanEntry {
    pub entity: EntityId,
    pub color: String,
    /// Readable text color on top of `color`
    pub text_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct PlanStats {
    pub entity_count: usize,
    pub level_count: usize,
    /// Size of the widest level
    pub max_parallelism: usize,
}

impl PlanReport {
    /// Build a report; entities without a color get the lookup's default
    pub fn build(plan: &LoadPlan, styles: &dyn StyleLookup) -> Self {
        Self::build_with_default(plan, styles, styles.default_color())
    }

    /// Build a report with an explicit fallback color
    pub fn build_with_default(
        plan: &LoadPlan,
        styles: &dyn StyleLookup,
        default_color: &str,
    ) -> Self {
        let steps = plan
            .iter()
            .enumerate()
            .map(|(i, level)| PlanStep {
                step: i + 1,
                entities: level
                    .iter()
                    .map(|id| {
                        let color = styles.color(id).unwrap_or(default_color).to_string();
                        PlanEntry {
                            entity: id.clone(),
                            text_color: contrasting_text_color(&color).to_string(),
                            color,
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            steps,
            stats: PlanStats {
                entity_count: plan.entity_count(),
                level_count: plan.len(),
                max_parallelism: plan.max_parallelism(),
            },
            warnings: Vec::new(),
        }
    }

    /// Attach collected warnings
    pub fn with_warnings(mut self, warnings: &WarningCollector) -> Self {
        self.warnings = warnings.warnings().iter().map(|w| w.to_string()).collect();
        if warnings.dropped() > 0 {
            self.warnings
                .push(format!("... and {} more", warnings.dropped()));
        }
        self
    }

    /// Human-readable dependency matrix:
    ///
    /// ```text
    /// Dependency Matrix:
    /// Step 1: account, lead
    ///   - account (color: #1f77b4)
    ///   - lead (color: #FFFFFF)
    /// ```
    pub fn to_text(&self) -> String {
        let mut out = String::from("Dependency Matrix:\n");
        for step in &self.steps {
            let names: Vec<&str> = step.entities.iter().map(|e| e.entity.as_str()).collect();
            let _ = writeln!(out, "Step {}: {}", step.step, names.join(", "));
            for entry in &step.entities {
                let _ = writeln!(out, "  - {} (color: {})", entry.entity, entry.color);
            }
        }
        out
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Level (zero-based) of each entity, by position in the report
    fn level_index(&self) -> ahash::AHashMap<&str, usize> {
        self.steps
            .iter()
            .enumerate()
            .flat_map(|(i, step)| step.entities.iter().map(move |e| (e.entity.as_str(), i)))
            .collect()
    }
}

/// Build the renderer graph of a plan.
///
/// Each entity becomes one filled node ranked by its level; each dependency
/// becomes an edge from the dependency to its dependent. Labels use display
/// names from `schema` when given, otherwise the entity identity.
pub fn plan_graph(report: &PlanReport, deps: &DependencyMap, schema: Option<&Schema>) -> RenderGraph {
    let levels = report.level_index();

    let nodes = report
        .steps
        .iter()
        .enumerate()
        .flat_map(|(i, step)| step.entities.iter().map(move |entry| (i, entry)))
        .map(|(rank, entry)| RenderNode {
            id: entry.entity.to_string(),
            label: schema
                .and_then(|s| s.get(entry.entity.as_str()))
                .map(|r| r.display_name.clone())
                .unwrap_or_else(|| entry.entity.to_string()),
            style: RenderStyle {
                fill: entry.color.clone(),
                font_color: entry.text_color.clone(),
            },
            rank: Some(rank),
        })
        .collect();

    let mut edges = Vec::new();
    for (dependent, dependencies) in deps.iter() {
        if !levels.contains_key(dependent.as_str()) {
            continue;
        }
        for dependency in dependencies {
            if levels.contains_key(dependency.as_str()) {
                edges.push(RenderEdge {
                    from: dependency.to_string(),
                    to: dependent.to_string(),
                });
            }
        }
    }
    edges.sort_by(|a, b| {
        levels[a.from.as_str()]
            .cmp(&levels[b.from.as_str()])
            .then_with(|| a.from.cmp(&b.from))
            .then_with(|| a.to.cmp(&b.to))
    });

    RenderGraph { nodes, edges }
}
