//! Raw CDM entity definitions and their normalization into `EntityRecord`s.
//!
//! The raw types mirror the JSON shape of `*.cdm.json` documents loosely:
//! unknown fields are ignored and most fields are optional, so that one odd
//! attribute does not reject a whole document.

use super::{AttributeRef, AttributeTarget, EntityId, EntityRecord};
use crate::error::ErdError;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

/// One entity definition as found in a `definitions` array
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntityDefinition {
    pub entity_name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub has_attributes: Vec<RawAttributeEntry>,
}

/// An entry of `hasAttributes`: either an attribute group or a bare member
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAttributeEntry {
    Group {
        #[serde(rename = "attributeGroupReference")]
        attribute_group_reference: RawGroupReference,
    },
    Member(RawMember),
}

/// `attributeGroupReference`: inline members, or a path to a group defined
/// elsewhere (which contributes no attributes here)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawGroupReference {
    Inline {
        #[serde(default)]
        members: Vec<RawMember>,
    },
    Path(String),
}

/// A member of an attribute group. Attribute objects stay untyped so that
/// one odd field does not hide the rest of the member.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawMember {
    Attribute(Map<String, Value>),
    Named(String),
    Other(Value),
}

/// Normalize one raw definition. Fails with `MalformedEntity` when the
/// definition has no non-empty `entityName`.
pub fn normalize_definition(
    definition: &RawEntityDefinition,
    document: Option<&Path>,
) -> Result<EntityRecord, ErdError> {
    let name = definition
        .entity_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            ErdError::malformed_entity(
                document.map(Path::to_path_buf),
                "definition is missing 'entityName'",
            )
        })?;

    let display_name = definition
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(name)
        .to_string();

    let description = definition
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    let mut attributes = Vec::new();
    for entry in &definition.has_attributes {
        match entry {
            RawAttributeEntry::Group {
                attribute_group_reference: RawGroupReference::Inline { members },
            } => {
                attributes.extend(members.iter().filter_map(normalize_member));
            }
            RawAttributeEntry::Group { .. } => {}
            RawAttributeEntry::Member(member) => {
                attributes.extend(normalize_member(member));
            }
        }
    }

    Ok(EntityRecord {
        id: EntityId::new(name),
        display_name,
        description,
        attributes,
    })
}

fn normalize_member(member: &RawMember) -> Option<AttributeRef> {
    match member {
        RawMember::Attribute(attr) => {
            let name = attr.get("name").map(attribute_name).unwrap_or_default();
            let target = attr.get("entity").and_then(normalize_reference);
            if name.is_empty() && target.is_none() {
                return None;
            }
            Some(AttributeRef { name, target })
        }
        RawMember::Named(name) if !name.trim().is_empty() => {
            Some(AttributeRef::scalar(name.trim()))
        }
        _ => None,
    }
}

/// Strings are trimmed; other scalars keep their JSON text
fn attribute_name(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Read the `entity` field of an attribute: an object carrying `source`, or
/// a path string. Anything else is an unresolvable reference.
fn normalize_reference(reference: &Value) -> Option<AttributeTarget> {
    match reference {
        Value::Null => None,
        Value::Object(map) => match map.get("source") {
            None | Some(Value::Null) => None,
            Some(source) => Some(
                source_entity_name(source)
                    .map(|name| AttributeTarget::Entity(EntityId::new(name)))
                    .unwrap_or_else(|| AttributeTarget::Unresolvable(preview(source))),
            ),
        },
        Value::String(path) => Some(
            entity_name_from_path(path)
                .map(|name| AttributeTarget::Entity(EntityId::new(name)))
                .unwrap_or_else(|| AttributeTarget::Unresolvable(path.clone())),
        ),
        other => Some(AttributeTarget::Unresolvable(preview(other))),
    }
}

/// Extract the referenced entity name from an `entity.source` value.
///
/// Strings are used directly; objects yield their `entityName`, falling back
/// to their own `source`.
pub fn source_entity_name(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => entity_name_from_path(s),
        Value::Object(map) => map
            .get("entityName")
            .and_then(Value::as_str)
            .or_else(|| map.get("source").and_then(Value::as_str))
            .and_then(entity_name_from_path),
        _ => None,
    }
}

/// `"Account.cdm.json/Account"` and `"Account"` both name `Account`.
fn entity_name_from_path(raw: &str) -> Option<&str> {
    let name = raw.rsplit('/').next().unwrap_or(raw).trim();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn preview(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() > 60 {
        let cut: String = text.chars().take(57).collect();
        format!("{}...", cut)
    } else {
        text
    }
}
