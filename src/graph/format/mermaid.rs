//! Mermaid erDiagram format output.

use super::{escape_mermaid_id, sanitize_mermaid};
use crate::graph::view::ErdView;

/// Entity attributes carry no data type in the model, so every row is
/// rendered with this placeholder type.
const ATTRIBUTE_TYPE: &str = "attr";

/// Generate Mermaid erDiagram from a graph view
pub fn to_mermaid(view: &ErdView) -> String {
    let mut output = String::new();

    output.push_str("erDiagram\n");

    for entity in view.sorted_entities() {
        let safe_name = escape_mermaid_id(&entity.id);
        output.push_str(&format!(
            "    {}[\"{}\"] {{\n",
            safe_name,
            entity.display_name.replace('"', "'")
        ));

        for attr in &entity.attributes {
            let attr_name = sanitize_mermaid(&attr.name);
            if attr.is_reference() {
                output.push_str(&format!("        {} {} FK\n", ATTRIBUTE_TYPE, attr_name));
            } else {
                output.push_str(&format!("        {} {}\n", ATTRIBUTE_TYPE, attr_name));
            }
        }

        output.push_str("    }\n");
    }

    if !view.edges.is_empty() {
        output.push('\n');
    }

    // Many rows of the referencing entity point at one row of the target
    for edge in &view.edges {
        output.push_str(&format!(
            "    {} }}o--|| {} : \"{}\"\n",
            escape_mermaid_id(&edge.from_entity),
            escape_mermaid_id(&edge.to_entity),
            edge.from_attribute.replace('"', "'")
        ));
    }

    output
}
