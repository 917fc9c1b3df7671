//! DOT and Mermaid output for load-plan graphs.

use super::{escape_dot_id, escape_dot_string, escape_mermaid_id};
use crate::graph::format::Layout;
use crate::graph::render::RenderGraph;

/// Generate DOT with filled nodes; nodes of one level share a rank
pub fn plan_to_dot(graph: &RenderGraph, layout: Layout) -> String {
    let mut output = String::new();

    output.push_str("digraph LoadPlan {\n");
    output.push_str(&format!("  rankdir={};\n", layout.rankdir()));
    output.push_str("  node [shape=box, style=filled];\n\n");

    for node in &graph.nodes {
        output.push_str(&format!(
            "  {} [label=\"{}\", fillcolor=\"{}\", fontcolor=\"{}\"];\n",
            escape_dot_id(&node.id),
            escape_dot_string(&node.label),
            escape_dot_string(&node.style.fill),
            node.style.font_color
        ));
    }

    let ranks = graph.ranks();
    if !ranks.is_empty() {
        output.push('\n');
    }
    for rank in ranks.iter().filter(|r| r.len() > 1) {
        let ids: Vec<String> = rank.iter().map(|n| escape_dot_id(&n.id)).collect();
        output.push_str(&format!("  {{ rank=same; {}; }}\n", ids.join("; ")));
    }

    if !graph.edges.is_empty() {
        output.push('\n');
    }
    for edge in &graph.edges {
        output.push_str(&format!(
            "  {} -> {};\n",
            escape_dot_id(&edge.from),
            escape_dot_id(&edge.to)
        ));
    }

    output.push_str("}\n");
    output
}

/// Generate a Mermaid flowchart with one subgraph per level
pub fn plan_to_mermaid(graph: &RenderGraph, layout: Layout) -> String {
    let mut output = String::new();

    output.push_str(&format!("flowchart {}\n", layout.rankdir()));

    for (i, rank) in graph.ranks().iter().enumerate() {
        output.push_str(&format!("    subgraph step_{}[\"Step {}\"]\n", i + 1, i + 1));
        for node in rank {
            output.push_str(&format!(
                "        {}[\"{}\"]\n",
                escape_mermaid_id(&node.id),
                node.label.replace('"', "'")
            ));
        }
        output.push_str("    end\n");
    }

    for node in graph.nodes.iter().filter(|n| n.rank.is_none()) {
        output.push_str(&format!(
            "    {}[\"{}\"]\n",
            escape_mermaid_id(&node.id),
            node.label.replace('"', "'")
        ));
    }

    for edge in &graph.edges {
        output.push_str(&format!(
            "    {} --> {}\n",
            escape_mermaid_id(&edge.from),
            escape_mermaid_id(&edge.to)
        ));
    }

    for node in &graph.nodes {
        output.push_str(&format!(
            "    style {} fill:{},color:{}\n",
            escape_mermaid_id(&node.id),
            node.style.fill,
            node.style.font_color
        ));
    }

    output
}
