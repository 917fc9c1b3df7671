//! Entity colors for diagrams and load-plan reports.
//!
//! Colors are assigned once, up front, into a `Palette`; graph and plan code
//! only ever reads them through `StyleLookup`.

use crate::schema::EntityId;
use ahash::AHashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Fallback marker for entities without an assigned color
pub const DEFAULT_COLOR: &str = "#FFFFFF";

/// Read-only lookup from entity to display color
pub trait StyleLookup {
    fn color(&self, id: &EntityId) -> Option<&str>;

    /// Marker for entities without a color
    fn default_color(&self) -> &str {
        DEFAULT_COLOR
    }

    /// Color of an entity, or the fallback marker
    fn color_or_default<'a>(&'a self, id: &EntityId) -> &'a str {
        self.color(id).unwrap_or_else(|| self.default_color())
    }
}

/// A lookup that never has a color
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStyle;

impl StyleLookup for NoStyle {
    fn color(&self, _id: &EntityId) -> Option<&str> {
        None
    }
}

/// How colors are picked for entities that have no explicit override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteMode {
    /// Derived from a hash of the entity identity (stable across runs)
    #[default]
    Hashed,
    /// Random colors from a seeded generator
    Random,
}

impl FromStr for PaletteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hashed" | "hash" => Ok(PaletteMode::Hashed),
            "random" => Ok(PaletteMode::Random),
            _ => Err(format!(
                "Unknown palette mode: {}. Valid options: hashed, random",
                s
            )),
        }
    }
}

impl fmt::Display for PaletteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaletteMode::Hashed => write!(f, "hashed"),
            PaletteMode::Random => write!(f, "random"),
        }
    }
}

/// Produces colors for entities in assignment order
pub enum ColorPicker {
    Hashed,
    Random(StdRng),
}

impl ColorPicker {
    pub fn new(mode: PaletteMode, seed: u64) -> Self {
        match mode {
            PaletteMode::Hashed => ColorPicker::Hashed,
            PaletteMode::Random => ColorPicker::Random(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn pick(&mut self, id: &EntityId) -> String {
        match self {
            ColorPicker::Hashed => {
                let digest = Sha256::digest(id.as_str().as_bytes());
                format!("#{}", hex::encode(&digest[..3]))
            }
            ColorPicker::Random(rng) => format!("#{:06x}", rng.random_range(0..=0xFF_FFFFu32)),
        }
    }
}

/// Precomputed entity → color table
#[derive(Debug, Clone, Default)]
pub struct Palette {
    colors: AHashMap<EntityId, String>,
    default_color: Option<String>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a color to every id, in order. Overrides win over the picker;
    /// ids that already have a color keep it.
    pub fn assign<'a>(
        ids: impl IntoIterator<Item = &'a EntityId>,
        picker: &mut ColorPicker,
        overrides: &AHashMap<EntityId, String>,
    ) -> Self {
        let mut palette = Self::new();
        for id in ids {
            if palette.colors.contains_key(id) {
                continue;
            }
            let color = overrides
                .get(id)
                .cloned()
                .unwrap_or_else(|| picker.pick(id));
            palette.colors.insert(id.clone(), color);
        }
        palette
    }

    /// Replace the fallback marker for uncolored entities
    pub fn with_default_color(mut self, color: impl Into<String>) -> Self {
        self.default_color = Some(color.into());
        self
    }

    pub fn insert(&mut self, id: EntityId, color: impl Into<String>) {
        self.colors.insert(id, color.into());
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl StyleLookup for Palette {
    fn color(&self, id: &EntityId) -> Option<&str> {
        self.colors.get(id).map(String::as_str)
    }

    fn default_color(&self) -> &str {
        self.default_color.as_deref().unwrap_or(DEFAULT_COLOR)
    }
}

/// Text color readable on top of `background` (`#rrggbb`).
///
/// Light backgrounds get black text, dark ones white. Anything that is not a
/// six-digit hex color is treated as light.
pub fn contrasting_text_color(background: &str) -> &'static str {
    match parse_hex_color(background) {
        Some((r, g, b)) => {
            let luminance = (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) / 255.0;
            if luminance > 0.5 {
                "black"
            } else {
                "white"
            }
        }
        None => "black",
    }
}

fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// True for `#rrggbb` colors
pub fn is_hex_color(color: &str) -> bool {
    parse_hex_color(color).is_some()
}
