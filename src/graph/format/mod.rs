//! Output format implementations for ERD and load-plan visualization.

mod dot;
mod html;
pub(crate) mod json;
mod mermaid;
mod plan;

use sha2::{Digest, Sha256};

pub use dot::to_dot;
pub use html::to_html;
pub use json::to_json;
pub use mermaid::to_mermaid;
pub use plan::{plan_to_dot, plan_to_mermaid};
pub use json::{AttributeJson, EntityJson, ErdJson, ErdStats, RelationshipJson};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output format for ERD export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Graphviz DOT format (ERD style)
    #[default]
    Dot,
    /// Mermaid erDiagram format
    Mermaid,
    /// JSON format for programmatic use
    Json,
    /// HTML page embedding the Mermaid diagram
    Html,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot" | "graphviz" => Ok(OutputFormat::Dot),
            "mermaid" | "mmd" => Ok(OutputFormat::Mermaid),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            _ => Err(format!(
                "Unknown format: {}. Valid options: dot, mermaid, json, html",
                s
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Dot => write!(f, "dot"),
            OutputFormat::Mermaid => write!(f, "mermaid"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Html => write!(f, "html"),
        }
    }
}

impl OutputFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "dot" | "gv" => Some(OutputFormat::Dot),
            "mmd" | "mermaid" => Some(OutputFormat::Mermaid),
            "json" => Some(OutputFormat::Json),
            "html" | "htm" => Some(OutputFormat::Html),
            "png" | "svg" | "pdf" => Some(OutputFormat::Dot), // Will be rendered
            _ => None,
        }
    }
}

/// Output format for the load plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanFormat {
    /// Step-by-step dependency matrix
    #[default]
    Text,
    Json,
    /// Graphviz graph with one rank per level
    Dot,
    /// Mermaid flowchart with one subgraph per level
    Mermaid,
}

impl FromStr for PlanFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(PlanFormat::Text),
            "json" => Ok(PlanFormat::Json),
            "dot" | "graphviz" => Ok(PlanFormat::Dot),
            "mermaid" | "mmd" => Ok(PlanFormat::Mermaid),
            _ => Err(format!(
                "Unknown plan format: {}. Valid options: text, json, dot, mermaid",
                s
            )),
        }
    }
}

impl fmt::Display for PlanFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanFormat::Text => write!(f, "text"),
            PlanFormat::Json => write!(f, "json"),
            PlanFormat::Dot => write!(f, "dot"),
            PlanFormat::Mermaid => write!(f, "mermaid"),
        }
    }
}

impl PlanFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" | "text" => Some(PlanFormat::Text),
            "json" => Some(PlanFormat::Json),
            "dot" | "gv" | "png" | "svg" | "pdf" => Some(PlanFormat::Dot),
            "mmd" | "mermaid" => Some(PlanFormat::Mermaid),
            _ => None,
        }
    }
}

/// Layout direction for diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Left to right
    #[default]
    LR,
    /// Top to bottom
    TB,
}

impl Layout {
    pub fn rankdir(self) -> &'static str {
        match self {
            Layout::LR => "LR",
            Layout::TB => "TB",
        }
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lr" | "left-right" | "horizontal" => Ok(Layout::LR),
            "tb" | "td" | "top-bottom" | "top-down" | "vertical" => Ok(Layout::TB),
            _ => Err(format!("Unknown layout: {}. Valid options: lr, tb", s)),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::LR => write!(f, "lr"),
            Layout::TB => write!(f, "tb"),
        }
    }
}

/// Escape a string for use in DOT HTML labels
pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escape a string for use as a DOT node ID
pub(crate) fn escape_dot_id(s: &str) -> String {
    if !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_') {
        s.to_string()
    } else {
        format!("\"{}\"", escape_dot_string(s))
    }
}

/// Escape the body of a quoted DOT string
pub(crate) fn escape_dot_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Mermaid node IDs should be alphanumeric with underscores. A sanitized ID
/// gets a short hash of the original so that `a-b` and `a_b` stay distinct.
pub(crate) fn escape_mermaid_id(s: &str) -> String {
    let safe = sanitize_mermaid(s);
    if safe == s {
        return safe;
    }
    let digest = Sha256::digest(s.as_bytes());
    format!("{}_{}", safe, hex::encode(&digest[..4]))
}

/// Replace characters Mermaid does not accept in bare names
pub(crate) fn sanitize_mermaid(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
