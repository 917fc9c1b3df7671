//! Plan command - print the leveled load order of a manifest.

use super::graph::display_cycles;
use super::input::{self, InputArgs};
use anyhow::Result;
use cdm_erd::error::ErdError;
use cdm_erd::graph::{
    find_cycles, plan_to_dot, plan_to_mermaid, ErdView, GraphvizRenderer, Layout, PlanFormat,
};
use cdm_erd::report::{plan_graph, PlanReport};
use cdm_erd::schema::DependencyMap;
use cdm_erd::style::NoStyle;
use std::fs;
use std::path::PathBuf;

pub struct PlanOptions {
    pub input: InputArgs,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub layout: Option<String>,
    pub check: bool,
    pub render: bool,
    pub json: bool,
}

/// Run the plan command
pub fn run(opts: PlanOptions) -> Result<()> {
    let format = if opts.json {
        PlanFormat::Json
    } else if let Some(ref f) = opts.format {
        f.parse().map_err(|e| anyhow::anyhow!("{}", e))?
    } else if let Some(ref out) = opts.output {
        out.extension()
            .and_then(|e| e.to_str())
            .and_then(PlanFormat::from_extension)
            .unwrap_or_default()
    } else {
        PlanFormat::Text
    };
    let quiet = format == PlanFormat::Json;

    // Plans read top-down unless asked otherwise
    let layout = opts
        .layout
        .map(|l| l.parse::<Layout>())
        .transpose()
        .map_err(|e| anyhow::anyhow!("{}", e))?
        .unwrap_or(Layout::TB);

    if !quiet {
        eprintln!("Computing load plan...");
    }

    let mut loaded = input::load(&opts.input)?;
    let deps = DependencyMap::from_schema(&loaded.schema, &mut loaded.warnings);

    let plan = match deps.level_sort() {
        Ok(plan) => plan,
        Err(err @ ErdError::CircularDependency { .. }) => {
            eprintln!("\nError: circular dependencies detected!");
            // Self-references never block a plan
            let mut cycles = find_cycles(&ErdView::from_schema(&loaded.schema, &NoStyle));
            cycles.retain(|c| !c.is_self_reference());
            display_cycles(&cycles);
            if opts.check {
                eprintln!("\nCheck FAILED: no valid load order exists.");
                eprintln!("Use 'cdm-erd graph --cycles-only' to analyze cycles.");
            }
            loaded.warnings.print_summary();
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    if opts.check {
        eprintln!(
            "Check PASSED: {} entities can be loaded in {} steps.",
            plan.entity_count(),
            plan.len()
        );
        loaded.warnings.print_summary();
        return Ok(());
    }

    let palette = loaded.palette();
    let report = PlanReport::build(&plan, &palette).with_warnings(&loaded.warnings);

    let content = match format {
        PlanFormat::Text => report.to_text(),
        PlanFormat::Json => report.to_json(),
        PlanFormat::Dot => plan_to_dot(&plan_graph(&report, &deps, Some(&loaded.schema)), layout),
        PlanFormat::Mermaid => {
            plan_to_mermaid(&plan_graph(&report, &deps, Some(&loaded.schema)), layout)
        }
    };

    let should_render = opts.render
        || opts
            .output
            .as_deref()
            .is_some_and(GraphvizRenderer::is_render_target);

    match opts.output {
        Some(ref out_path) if should_render && format == PlanFormat::Dot => {
            GraphvizRenderer::new(&loaded.config.render.dot_path).render(&content, out_path)?;
            eprintln!("Rendered to: {}", out_path.display());
        }
        Some(ref out_path) => {
            fs::write(out_path, content.as_bytes())?;
            if !quiet {
                eprintln!("Plan written to: {}", out_path.display());
            }
        }
        None => {
            if should_render {
                anyhow::bail!("--render needs an --output path");
            }
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
        }
    }

    if !quiet {
        loaded.warnings.print_summary();
        eprintln!(
            "\nPlan: {} entities in {} steps (max {} in parallel)",
            report.stats.entity_count, report.stats.level_count, report.stats.max_parallelism
        );
    }

    Ok(())
}
