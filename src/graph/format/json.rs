//! JSON format output for ERD data.

use crate::graph::view::ErdView;
use schemars::JsonSchema;
use serde::Serialize;

/// JSON representation of the ERD
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErdJson {
    pub entities: Vec<EntityJson>,
    pub relationships: Vec<RelationshipJson>,
    pub stats: ErdStats,
}

/// JSON representation of an entity with its attributes
#[derive(Debug, Serialize, JsonSchema)]
pub struct EntityJson {
    pub name: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    pub attributes: Vec<AttributeJson>,
}

/// JSON representation of an attribute
#[derive(Debug, Serialize, JsonSchema)]
pub struct AttributeJson {
    pub name: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
}

/// JSON representation of a relationship
#[derive(Debug, Serialize, JsonSchema)]
pub struct RelationshipJson {
    pub from_entity: String,
    pub from_attribute: String,
    pub to_entity: String,
}

/// ERD statistics
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErdStats {
    pub entity_count: usize,
    pub attribute_count: usize,
    pub relationship_count: usize,
}

/// Generate JSON output from a graph view
pub fn to_json(view: &ErdView) -> String {
    let erd = build_erd_json(view);
    serde_json::to_string_pretty(&erd).unwrap_or_else(|_| "{}".to_string())
}

/// Build the JSON structure
pub fn build_erd_json(view: &ErdView) -> ErdJson {
    let entities: Vec<EntityJson> = view
        .sorted_entities()
        .into_iter()
        .map(|entity| EntityJson {
            name: entity.id.clone(),
            display_name: entity.display_name.clone(),
            description: entity.description.clone(),
            color: entity.color.clone(),
            attributes: entity
                .attributes
                .iter()
                .map(|attr| AttributeJson {
                    name: attr.name.clone(),
                    color: attr.color.clone(),
                    references: attr.references.clone(),
                })
                .collect(),
        })
        .collect();

    let relationships = view
        .edges
        .iter()
        .map(|e| RelationshipJson {
            from_entity: e.from_entity.clone(),
            from_attribute: e.from_attribute.clone(),
            to_entity: e.to_entity.clone(),
        })
        .collect();

    ErdJson {
        entities,
        relationships,
        stats: ErdStats {
            entity_count: view.entity_count(),
            attribute_count: view.attribute_count(),
            relationship_count: view.edge_count(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::view::test_support::sample_view;

    #[test]
    fn test_json_output() {
        let output = to_json(&sample_view());
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["stats"]["entity_count"], 4);
        assert_eq!(parsed["stats"]["attribute_count"], 7);
        assert_eq!(parsed["stats"]["relationship_count"], 4);

        let entities = parsed["entities"].as_array().unwrap();
        assert_eq!(entities[0]["name"], "account");
        assert_eq!(entities[0]["color"], "#000080");
    }

    #[test]
    fn test_json_attribute_references() {
        let erd = build_erd_json(&sample_view());
        let contact = erd.entities.iter().find(|e| e.name == "contact").unwrap();

        assert!(contact.attributes[0].references.is_none());
        assert_eq!(contact.attributes[1].references.as_deref(), Some("account"));
        assert_eq!(contact.attributes[1].color, "#000080");
    }
}
