//! YAML configuration for palette and renderer settings.
//!
//! Looked up from `--config`, then `<config dir>/cdm-erd/config.yaml`.

use crate::graph::Layout;
use crate::schema::EntityId;
use crate::style::{is_hex_color, ColorPicker, Palette, PaletteMode, DEFAULT_COLOR};
use ahash::AHashMap;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Palette settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub mode: PaletteMode,
    /// Seed for random mode; a fresh seed is drawn when absent
    pub seed: Option<u64>,
    /// Marker used where an entity has no color
    pub default_color: String,
    /// Explicit per-entity colors (keys are case-insensitive)
    pub colors: BTreeMap<String, String>,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            mode: PaletteMode::Hashed,
            seed: None,
            default_color: DEFAULT_COLOR.to_string(),
            colors: BTreeMap::new(),
        }
    }
}

/// Settings handed to the diagram renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub layout: Layout,
    /// Graphviz `dot` executable
    pub dot_path: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            layout: Layout::LR,
            dot_path: PathBuf::from("dot"),
        }
    }
}

/// Complete configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub palette: PaletteConfig,
    pub render: RenderConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path if given, else the user config file if it exists, else
    /// defaults
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => {
                log::debug!("using config file {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !is_hex_color(&self.palette.default_color) {
            bail!(
                "palette.default_color must be a #rrggbb color, got '{}'",
                self.palette.default_color
            );
        }
        for (entity, color) in &self.palette.colors {
            if !is_hex_color(color) {
                bail!(
                    "palette.colors.{} must be a #rrggbb color, got '{}'",
                    entity,
                    color
                );
            }
        }
        Ok(())
    }

    /// Per-entity overrides keyed by normalized identity
    pub fn color_overrides(&self) -> AHashMap<EntityId, String> {
        self.palette
            .colors
            .iter()
            .map(|(k, v)| (EntityId::new(k), v.clone()))
            .collect()
    }

    /// Build the palette for a set of entities
    pub fn build_palette<'a>(&self, ids: impl IntoIterator<Item = &'a EntityId>) -> Palette {
        let seed = self.palette.seed.unwrap_or_else(rand::random);
        let mut picker = ColorPicker::new(self.palette.mode, seed);
        Palette::assign(ids, &mut picker, &self.color_overrides())
            .with_default_color(self.palette.default_color.clone())
    }
}

/// `<config dir>/cdm-erd/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cdm-erd").join("config.yaml"))
}
