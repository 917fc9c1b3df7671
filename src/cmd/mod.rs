mod graph;
mod input;
mod plan;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use input::InputArgs;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cdm-erd")]
#[command(version)]
#[command(
    about = "Plan dependency-ordered loads and draw ERDs for CDM entity manifests",
    long_about = None
)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an Entity-Relationship Diagram (ERD) from a manifest
    Graph {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (default: stdout; png/svg/pdf are rendered with Graphviz)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: dot, mermaid, json, html (detected from --output if omitted)
        #[arg(long)]
        format: Option<String>,

        /// Layout direction: lr (left-right) or tb (top-bottom)
        #[arg(long)]
        layout: Option<String>,

        /// Only include entities matching these glob patterns (comma-separated)
        #[arg(short, long)]
        include: Option<String>,

        /// Exclude entities matching these glob patterns (comma-separated)
        #[arg(short, long)]
        exclude: Option<String>,

        /// Focus on one entity and its neighbours
        #[arg(long)]
        entity: Option<String>,

        /// With --entity: follow everything the entity depends on
        #[arg(long, requires = "entity")]
        transitive: bool,

        /// With --entity: follow everything that depends on the entity
        #[arg(long, requires = "entity")]
        reverse: bool,

        /// With --transitive/--reverse: maximum traversal depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Only show entities that are part of reference cycles
        #[arg(long)]
        cycles_only: bool,

        /// Render DOT output through Graphviz (needs --output)
        #[arg(long)]
        render: bool,

        /// Output as JSON (same as --format json)
        #[arg(long)]
        json: bool,
    },

    /// Compute the leveled load plan of a manifest
    Plan {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (default: stdout; png/svg/pdf are rendered with Graphviz)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: text, json, dot, mermaid (detected from --output if omitted)
        #[arg(long)]
        format: Option<String>,

        /// Layout direction for dot/mermaid output: lr or tb (default: tb)
        #[arg(long)]
        layout: Option<String>,

        /// Only verify that a plan exists; exit non-zero on cycles
        #[arg(long)]
        check: bool,

        /// Render DOT output through Graphviz (needs --output)
        #[arg(long)]
        render: bool,

        /// Output as JSON (same as --format json)
        #[arg(long)]
        json: bool,
    },

    /// Print JSON Schemas of the --json outputs
    Schema {
        /// Only print the schema for this command (graph, plan)
        #[arg(short, long)]
        command: Option<String>,

        /// Write one <command>.schema.json file per schema into this directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Graph {
            input,
            output,
            format,
            layout,
            include,
            exclude,
            entity,
            transitive,
            reverse,
            max_depth,
            cycles_only,
            render,
            json,
        } => graph::run(graph::GraphOptions {
            input,
            output,
            format,
            layout,
            include,
            exclude,
            entity,
            transitive,
            reverse,
            max_depth,
            cycles_only,
            render,
            json,
        }),
        Commands::Plan {
            input,
            output,
            format,
            layout,
            check,
            render,
            json,
        } => plan::run(plan::PlanOptions {
            input,
            output,
            format,
            layout,
            check,
            render,
            json,
        }),
        Commands::Schema {
            command,
            output_dir,
        } => run_schema(command, output_dir),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "cdm-erd", &mut io::stdout());
            Ok(())
        }
    }
}

fn run_schema(command: Option<String>, output_dir: Option<PathBuf>) -> anyhow::Result<()> {
    use cdm_erd::json_schema;

    let schemas = match command {
        Some(name) => {
            let schema = json_schema::get_schema(&name).ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown command '{}'. Available: {}",
                    name,
                    json_schema::schema_names().join(", ")
                )
            })?;
            vec![(name, schema)]
        }
        None => json_schema::all_schemas()
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect(),
    };

    match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            for (name, schema) in &schemas {
                let path = dir.join(format!("{}.schema.json", name));
                std::fs::write(&path, serde_json::to_string_pretty(schema)?)?;
                eprintln!("Wrote {}", path.display());
            }
        }
        None if schemas.len() == 1 => {
            println!("{}", serde_json::to_string_pretty(&schemas[0].1)?);
        }
        None => {
            let map: serde_json::Map<String, serde_json::Value> = schemas
                .into_iter()
                .map(|(name, schema)| Ok((name, serde_json::to_value(schema)?)))
                .collect::<anyhow::Result<_>>()?;
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
    }

    Ok(())
}
