//! Graphviz DOT format output for ERD diagrams.

use super::{escape_dot_id, escape_dot_string, escape_html};
use crate::graph::format::Layout;
use crate::graph::view::{EntityInfo, ErdView};
use crate::style::contrasting_text_color;

/// Generate DOT output with one colored, table-shaped node per entity
pub fn to_dot(view: &ErdView, layout: Layout) -> String {
    let mut output = String::new();

    output.push_str("digraph ERD {\n");
    output.push_str("  graph [pad=\"0.5\", nodesep=\"1\", ranksep=\"2\"];\n");
    output.push_str(&format!("  rankdir={};\n", layout.rankdir()));
    output.push_str("  node [shape=box, margin=0];\n\n");

    for entity in view.sorted_entities() {
        let tooltip = entity
            .description
            .as_deref()
            .map(|d| format!(", tooltip=\"{}\"", escape_dot_string(d)))
            .unwrap_or_default();
        output.push_str(&format!(
            "  {} [label=<{}>{}];\n",
            escape_dot_id(&entity.id),
            generate_entity_label(entity),
            tooltip
        ));
    }

    if !view.edges.is_empty() {
        output.push('\n');
    }

    for edge in &view.edges {
        output.push_str(&format!(
            "  {} -> {} [label=\"{}\"];\n",
            escape_dot_id(&edge.from_entity),
            escape_dot_id(&edge.to_entity),
            escape_dot_string(&edge.from_attribute)
        ));
    }

    output.push_str("}\n");
    output
}

/// HTML-like label: colored header, a divider, then one row per attribute.
/// Reference rows are painted with the referenced entity's color.
fn generate_entity_label(entity: &EntityInfo) -> String {
    let mut html = String::new();
    let header_text = contrasting_text_color(&entity.color);

    html.push_str(&format!(
        "<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\" BGCOLOR=\"{}\">",
        entity.color
    ));
    html.push_str(&format!(
        "<TR><TD><B><FONT COLOR=\"{}\">{}</FONT></B></TD></TR>",
        header_text,
        escape_html(&entity.display_name)
    ));
    html.push_str("<TR><TD HEIGHT=\"1\" BGCOLOR=\"black\"></TD></TR>");

    for attr in &entity.attributes {
        if attr.is_reference() {
            html.push_str(&format!(
                "<TR><TD BGCOLOR=\"{}\"><FONT COLOR=\"{}\">{}</FONT></TD></TR>",
                attr.color,
                contrasting_text_color(&attr.color),
                escape_html(&attr.name)
            ));
        } else {
            html.push_str(&format!(
                "<TR><TD><FONT COLOR=\"{}\">{}</FONT></TD></TR>",
                header_text,
                escape_html(&attr.name)
            ));
        }
    }

    html.push_str("</TABLE>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::view::test_support::sample_view;

    #[test]
    fn test_dot_contains_entity_structure() {
        let view = sample_view();
        let output = to_dot(&view, Layout::LR);

        assert!(output.contains("digraph ERD"));
        assert!(output.contains("rankdir=LR"));
        assert!(output.contains("BGCOLOR=\"#000080\""));
        assert!(output.contains("<FONT COLOR=\"white\">Account</FONT>"));
        assert!(output.contains("<FONT COLOR=\"black\">Contact</FONT>"));
    }

    #[test]
    fn test_dot_reference_rows_use_target_color() {
        let view = sample_view();
        let output = to_dot(&view, Layout::TB);

        assert!(output.contains("rankdir=TB"));
        // contact.accountId is painted like account
        assert!(output
            .contains("<TD BGCOLOR=\"#000080\"><FONT COLOR=\"white\">accountId</FONT></TD>"));
    }

    #[test]
    fn test_dot_contains_edges() {
        let view = sample_view();
        let output = to_dot(&view, Layout::LR);

        assert!(output.contains("contact -> account [label=\"accountId\"]"));
        assert!(output.contains("category -> category [label=\"parentId\"]"));
        assert!(!output.contains("systemuser"));
    }
}
