//! Input loading shared by the `graph` and `plan` commands.

use anyhow::{bail, Context, Result};
use cdm_erd::config::AppConfig;
use cdm_erd::error::WarningCollector;
use cdm_erd::loader::{load_glob, DocumentLoader, FsDocumentLoader};
use cdm_erd::schema::Schema;
use cdm_erd::style::Palette;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Manifest file (*.manifest.cdm.json)
    #[arg(required_unless_present = "entities", conflicts_with = "entities")]
    pub manifest: Option<PathBuf>,

    /// Load every definition from entity documents matching this glob instead
    /// of a manifest (e.g. "model/**/*.cdm.json")
    #[arg(long)]
    pub entities: Option<String>,

    /// Configuration file (default: <config dir>/cdm-erd/config.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seed for random palette colors (overrides the config file)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Show a spinner while documents load
    #[arg(short, long)]
    pub progress: bool,
}

/// Everything a command needs after reading its input
pub struct LoadedInput {
    pub schema: Schema,
    pub warnings: WarningCollector,
    pub config: AppConfig,
    /// Short name of the input, for titles
    pub source_name: String,
}

impl LoadedInput {
    pub fn palette(&self) -> Palette {
        self.config.build_palette(self.schema.ids())
    }
}

/// Resolve configuration, then read and normalize every entity definition
pub fn load(args: &InputArgs) -> Result<LoadedInput> {
    let mut config = AppConfig::discover(args.config.as_deref())?;
    if args.seed.is_some() {
        config.palette.seed = args.seed;
    }

    let progress_bar = if args.progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("invalid progress template")?,
        );
        pb.set_message("Loading documents...");
        Some(pb)
    } else {
        None
    };

    let (definitions, source_name) = match (&args.manifest, &args.entities) {
        (Some(manifest), _) => {
            if !manifest.exists() {
                bail!("manifest does not exist: {}", manifest.display());
            }
            let mut loader = FsDocumentLoader::new();
            if let Some(ref pb) = progress_bar {
                let pb = pb.clone();
                loader = loader.with_progress(move |path| {
                    pb.set_message(format!("Loading {}", path.display()));
                    pb.tick();
                });
            }
            let definitions = loader.load_entities(manifest)?;
            let name = manifest
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("manifest")
                .to_string();
            (definitions, name)
        }
        (None, Some(pattern)) => (load_glob(pattern)?, pattern.clone()),
        (None, None) => bail!("either a manifest or --entities <glob> is required"),
    };

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    let mut warnings = WarningCollector::new();
    let schema = Schema::from_definitions(&definitions, &mut warnings)?;
    log::debug!(
        "normalized {} entities from {} definitions",
        schema.len(),
        definitions.len()
    );

    Ok(LoadedInput {
        schema,
        warnings,
        config,
        source_name,
    })
}

/// Split a comma-separated list of glob patterns
pub fn parse_patterns(list: Option<&str>) -> Result<Vec<glob::Pattern>> {
    let Some(list) = list else {
        return Ok(Vec::new());
    };
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            glob::Pattern::new(&p.to_lowercase())
                .with_context(|| format!("invalid pattern '{}'", p))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_patterns() {
        let patterns = parse_patterns(Some("Account, contact*,")).unwrap();
        assert_eq!(patterns.len(), 2);
        assert!(patterns[0].matches("account"));
        assert!(patterns[1].matches("contactpoint"));

        assert!(parse_patterns(None).unwrap().is_empty());
        assert!(parse_patterns(Some("[")).is_err());
    }
}
