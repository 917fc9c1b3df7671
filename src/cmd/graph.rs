//! Graph command implementation for ERD generation.

use super::input::{self, InputArgs};
use anyhow::Result;
use cdm_erd::graph::{
    cyclic_entities, find_cycles, to_dot, to_html, to_json, to_mermaid, Cycle, ErdView,
    GraphvizRenderer, Layout, OutputFormat,
};
use std::fs;
use std::path::PathBuf;

pub struct GraphOptions {
    pub input: InputArgs,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub layout: Option<String>,
    pub include: Option<String>,
    pub exclude: Option<String>,
    pub entity: Option<String>,
    pub transitive: bool,
    pub reverse: bool,
    pub max_depth: Option<usize>,
    pub cycles_only: bool,
    pub render: bool,
    pub json: bool,
}

/// Run the graph command
pub fn run(opts: GraphOptions) -> Result<()> {
    let format = if opts.json {
        OutputFormat::Json
    } else if let Some(ref f) = opts.format {
        f.parse().map_err(|e| anyhow::anyhow!("{}", e))?
    } else if let Some(ref out) = opts.output {
        out.extension()
            .and_then(|e| e.to_str())
            .and_then(OutputFormat::from_extension)
            .unwrap_or(OutputFormat::Dot)
    } else {
        OutputFormat::Dot
    };
    let quiet = format == OutputFormat::Json;

    let include = input::parse_patterns(opts.include.as_deref())?;
    let exclude = input::parse_patterns(opts.exclude.as_deref())?;

    if !quiet {
        eprintln!("Generating ERD...");
    }

    let loaded = input::load(&opts.input)?;
    let layout = match opts.layout {
        Some(ref l) => l.parse::<Layout>().map_err(|e| anyhow::anyhow!("{}", e))?,
        None => loaded.config.render.layout,
    };

    if loaded.schema.is_empty() {
        if !quiet {
            eprintln!("No entities found.");
        }
        return Ok(());
    }

    let palette = loaded.palette();
    let mut view = ErdView::from_schema(&loaded.schema, &palette);

    view.filter_entities(&include);
    view.exclude_entities(&exclude);

    if let Some(ref entity) = opts.entity {
        view.focus_entity(entity, opts.transitive, opts.reverse, opts.max_depth);
    }

    let cycles = if opts.cycles_only {
        let cycles = find_cycles(&view);
        let cyclic = cyclic_entities(&view);
        view.filter_to_cyclic_entities(&cyclic);
        Some(cycles)
    } else {
        None
    };

    let title = format!("ERD - {}", loaded.source_name);
    let content = match format {
        OutputFormat::Dot => to_dot(&view, layout),
        OutputFormat::Mermaid => to_mermaid(&view),
        OutputFormat::Json => to_json(&view),
        OutputFormat::Html => to_html(&view, &title),
    };

    let should_render = opts.render
        || opts
            .output
            .as_deref()
            .is_some_and(GraphvizRenderer::is_render_target);

    match opts.output {
        Some(ref out_path) if should_render && format == OutputFormat::Dot => {
            GraphvizRenderer::new(&loaded.config.render.dot_path).render(&content, out_path)?;
            eprintln!("Rendered to: {}", out_path.display());
        }
        Some(ref out_path) => {
            fs::write(out_path, content.as_bytes())?;
            if !quiet {
                eprintln!("ERD written to: {}", out_path.display());
            }
        }
        None => {
            if should_render {
                anyhow::bail!("--render needs an --output path");
            }
            println!("{}", content);
        }
    }

    if let Some(cycles) = cycles {
        display_cycles(&cycles);
    }

    if !quiet {
        loaded.warnings.print_summary();
        eprintln!(
            "\nERD: {} entities, {} attributes, {} relationships",
            view.entity_count(),
            view.attribute_count(),
            view.edge_count()
        );
    }

    Ok(())
}

/// Display cycles in a user-friendly format
pub fn display_cycles(cycles: &[Cycle]) {
    if cycles.is_empty() {
        eprintln!("\nNo cycles detected.");
        return;
    }

    eprintln!("\nCycles detected ({}):", cycles.len());
    for (i, cycle) in cycles.iter().enumerate() {
        eprintln!("  {}. {}", i + 1, cycle.display());
    }
}
