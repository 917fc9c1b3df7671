//! Renderer-neutral node/edge graphs and the Graphviz hand-off.

use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Fill and font colors for one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderStyle {
    pub fill: String,
    pub font_color: String,
}

/// One node of a renderer graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderNode {
    pub id: String,
    pub label: String,
    pub style: RenderStyle,
    /// Zero-based rank group; nodes sharing a rank are drawn side by side
    pub rank: Option<usize>,
}

/// A directed edge between two node ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderEdge {
    pub from: String,
    pub to: String,
}

/// A flat graph handed to a diagram renderer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderGraph {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
}

impl RenderGraph {
    /// Rank groups in ascending rank order, each in node order.
    /// Unranked nodes are left out.
    pub fn ranks(&self) -> Vec<Vec<&RenderNode>> {
        let max_rank = self.nodes.iter().filter_map(|n| n.rank).max();
        let Some(max_rank) = max_rank else {
            return Vec::new();
        };

        let mut ranks: Vec<Vec<&RenderNode>> = vec![Vec::new(); max_rank + 1];
        for node in &self.nodes {
            if let Some(rank) = node.rank {
                ranks[rank].push(node);
            }
        }
        ranks
    }
}

/// Pipes DOT source through the Graphviz `dot` executable
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    dot_path: PathBuf,
}

impl Default for GraphvizRenderer {
    fn default() -> Self {
        Self::new("dot")
    }
}

impl GraphvizRenderer {
    pub fn new(dot_path: impl Into<PathBuf>) -> Self {
        Self {
            dot_path: dot_path.into(),
        }
    }

    pub fn dot_path(&self) -> &Path {
        &self.dot_path
    }

    /// Output paths with these extensions are rendered rather than written
    pub fn is_render_target(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| matches!(e.to_lowercase().as_str(), "png" | "svg" | "pdf"))
            .unwrap_or(false)
    }

    /// Render DOT to PNG/SVG/PDF; the image type follows the output extension
    pub fn render(&self, dot_source: &str, output_path: &Path) -> Result<()> {
        let ext = output_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png")
            .to_lowercase();

        log::debug!(
            "rendering {} with {}",
            output_path.display(),
            self.dot_path.display()
        );

        let mut child = Command::new(&self.dot_path)
            .arg(format!("-T{}", ext))
            .arg("-o")
            .arg(output_path)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    anyhow::anyhow!(
                        "Graphviz '{}' command not found. Install Graphviz, set render.dot_path, or use another --format.",
                        self.dot_path.display()
                    )
                } else {
                    anyhow::anyhow!("Failed to run {}: {}", self.dot_path.display(), e)
                }
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(dot_source.as_bytes())
                .context("failed to send DOT source to Graphviz")?;
        }

        let status = child.wait()?;
        if !status.success() {
            bail!("Graphviz dot command failed with status: {}", status);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, rank: Option<usize>) -> RenderNode {
        RenderNode {
            id: id.to_string(),
            label: id.to_string(),
            style: RenderStyle {
                fill: "#FFFFFF".to_string(),
                font_color: "black".to_string(),
            },
            rank,
        }
    }

    #[test]
    fn test_ranks_group_nodes() {
        let graph = RenderGraph {
            nodes: vec![node("a", Some(0)), node("c", Some(1)), node("b", Some(0)), node("x", None)],
            edges: vec![],
        };

        let ranks = graph.ranks();
        assert_eq!(ranks.len(), 2);
        let first: Vec<&str> = ranks[0].iter().map(|n| n.id.as_str()).collect();
        assert_eq!(first, vec!["a", "b"]);
        assert_eq!(ranks[1][0].id, "c");
    }

    #[test]
    fn test_render_target_detection() {
        assert!(GraphvizRenderer::is_render_target(Path::new("plan.SVG")));
        assert!(GraphvizRenderer::is_render_target(Path::new("out/erd.png")));
        assert!(!GraphvizRenderer::is_render_target(Path::new("erd.dot")));
        assert!(!GraphvizRenderer::is_render_target(Path::new("erd")));
    }

    #[test]
    fn test_missing_executable_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = GraphvizRenderer::new(dir.path().join("no-such-dot"));
        let err = renderer
            .render("digraph {}", &dir.path().join("out.svg"))
            .unwrap_err();
        assert!(err.to_string().contains("no-such-dot"));
    }
}
