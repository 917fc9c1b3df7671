//! CLI for generating test fixtures.
//!
//! Usage:
//!   # Manifest folder with one document per entity
//!   gen-fixtures --scale small --seed 42 --output-dir fixtures/small
//!
//!   # Single manifest with inline definitions on stdout
//!   gen-fixtures --scale medium --cycle > cyclic.manifest.cdm.json

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use test_data_gen::{inline_manifest, write_manifest, Generator, GeneratorConfig, Scale};

#[derive(Parser, Debug)]
#[command(name = "gen-fixtures")]
#[command(about = "Generate CDM manifest fixtures for cdm-erd", long_about = None)]
struct Args {
    /// Scale preset: small, medium, large
    #[arg(short, long, default_value = "small")]
    scale: String,

    /// Random seed for reproducibility
    #[arg(long, default_value = "12345")]
    seed: u64,

    /// Override the number of layers
    #[arg(long)]
    layers: Option<usize>,

    /// Override the number of entities per layer
    #[arg(long)]
    width: Option<usize>,

    /// Close a reference loop so that no load plan exists
    #[arg(long)]
    cycle: bool,

    /// Write a manifest folder here instead of printing an inline manifest
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let scale: Scale = args.scale.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let mut config = GeneratorConfig::from_scale(scale);
    if let Some(layers) = args.layers {
        config.layers = layers;
    }
    if let Some(width) = args.width {
        config.entities_per_layer = width;
    }
    config.inject_cycle = args.cycle;

    let schema = Generator::with_config(args.seed, config).generate();

    match args.output_dir {
        Some(dir) => {
            let path = write_manifest(&dir, &schema)
                .with_context(|| format!("failed to write fixtures to {}", dir.display()))?;
            eprintln!(
                "Generated {} entities: {}",
                schema.entities.len(),
                path.display()
            );
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&inline_manifest(&schema))?);
        }
    }

    Ok(())
}
