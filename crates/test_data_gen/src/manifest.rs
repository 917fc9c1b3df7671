//! CDM JSON output for generated graphs.

use crate::generator::{GeneratedEntity, GeneratedSchema};
use serde_json::{json, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// CDM definition of one entity: a scalar `name` attribute plus one entity
/// attribute per reference. Reference shapes alternate between a plain
/// `source` string and an object carrying `entityName`.
pub fn entity_definition(entity: &GeneratedEntity) -> Value {
    let mut members = vec![json!({ "name": "name", "dataFormat": "String" })];

    for (i, target) in entity.references.iter().enumerate() {
        let source = if i % 2 == 0 {
            json!(target)
        } else {
            json!({ "entityName": target })
        };
        members.push(json!({
            "name": format!("{}Id{}", lower_first(target), i),
            "entity": { "source": source }
        }));
    }

    json!({
        "entityName": entity.name,
        "displayName": entity.name,
        "description": format!("Generated entity on layer {}", entity.layer),
        "hasAttributes": [
            {
                "attributeGroupReference": {
                    "attributeGroupName": "attributesAddedAtThisScope",
                    "members": members
                }
            }
        ]
    })
}

/// One manifest document with every definition inline
pub fn inline_manifest(schema: &GeneratedSchema) -> Value {
    json!({
        "manifestName": "generated",
        "definitions": schema.entities.iter().map(entity_definition).collect::<Vec<_>>()
    })
}

/// Write one `<Name>.cdm.json` per entity under `dir/entities/` plus
/// `dir/default.manifest.cdm.json` declaring them. Returns the manifest path.
pub fn write_manifest(dir: &Path, schema: &GeneratedSchema) -> io::Result<PathBuf> {
    let entity_dir = dir.join("entities");
    fs::create_dir_all(&entity_dir)?;

    let mut declarations = Vec::with_capacity(schema.entities.len());
    for entity in &schema.entities {
        let file_name = format!("{}.cdm.json", entity.name);
        let document = json!({
            "jsonSchemaSemanticVersion": "1.0.0",
            "definitions": [entity_definition(entity)]
        });
        write_json(&entity_dir.join(&file_name), &document)?;
        declarations.push(json!({
            "type": "LocalEntity",
            "entityName": entity.name,
            "entityPath": format!("entities/{}/{}", file_name, entity.name)
        }));
    }

    let manifest = json!({
        "manifestName": "default",
        "entities": declarations
    });
    let path = dir.join("default.manifest.cdm.json");
    write_json(&path, &manifest)?;
    Ok(path)
}

fn write_json(path: &Path, value: &Value) -> io::Result<()> {
    let content = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    fs::write(path, content)
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
