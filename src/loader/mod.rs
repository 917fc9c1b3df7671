//! Filesystem loader for CDM manifests and entity documents.
//!
//! A manifest can carry entity definitions inline (`definitions`), declare
//! entities stored in separate documents (`entities[].entityPath`), and pull
//! in nested manifests (`subManifests[].definition`). All paths are relative
//! to the document that mentions them.

use crate::error::ErdError;
use crate::schema::{LoadedDefinition, RawEntityDefinition};
use ahash::{AHashMap, AHashSet};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Source of raw entity definitions for one manifest
pub trait DocumentLoader {
    fn load_entities(&self, manifest: &Path) -> Result<Vec<LoadedDefinition>, ErdError>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    #[serde(default)]
    definitions: Vec<RawEntityDefinition>,
    #[serde(default)]
    entities: Vec<RawEntityDeclaration>,
    #[serde(default)]
    sub_manifests: Vec<RawSubManifest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntityDeclaration {
    entity_name: Option<String>,
    entity_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubManifest {
    manifest_name: Option<String>,
    definition: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEntityDocument {
    #[serde(default)]
    definitions: Vec<RawEntityDefinition>,
}

/// Reads manifests and entity documents from disk
#[derive(Default)]
pub struct FsDocumentLoader {
    on_document: Option<Box<dyn Fn(&Path)>>,
}

impl FsDocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `callback` after each document is read
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Path) + 'static,
    {
        self.on_document = Some(Box::new(callback));
        self
    }

    fn read_json<T: for<'de> Deserialize<'de>>(&self, path: &Path) -> Result<T, ErdError> {
        let content = fs::read_to_string(path).map_err(|e| ErdError::from_io(path, e))?;
        let parsed =
            serde_json::from_str(&content).map_err(|e| ErdError::malformed_document(path, e))?;
        log::debug!("read {}", path.display());
        if let Some(ref callback) = self.on_document {
            callback(path);
        }
        Ok(parsed)
    }

    fn load_manifest(
        &self,
        path: &Path,
        visited: &mut AHashSet<PathBuf>,
        documents: &mut AHashMap<PathBuf, RawEntityDocument>,
        out: &mut Vec<LoadedDefinition>,
    ) -> Result<(), ErdError> {
        let key = canonical_key(path);
        if !visited.insert(key) {
            log::debug!("manifest {} already loaded, skipping", path.display());
            return Ok(());
        }

        let manifest: RawManifest = self.read_json(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));

        out.extend(
            manifest
                .definitions
                .into_iter()
                .map(|d| LoadedDefinition::new(d, path)),
        );

        for declaration in &manifest.entities {
            let entity_path = declaration.entity_path.as_deref().ok_or_else(|| {
                ErdError::malformed_entity(
                    Some(path.to_path_buf()),
                    format!(
                        "entity declaration '{}' has no 'entityPath'",
                        declaration.entity_name.as_deref().unwrap_or("?")
                    ),
                )
            })?;
            let (document, name) = split_entity_path(entity_path);
            let name = name.or(declaration.entity_name.as_deref());
            let document_path = base.join(document);

            if !documents.contains_key(&document_path) {
                let parsed: RawEntityDocument = self.read_json(&document_path)?;
                documents.insert(document_path.clone(), parsed);
            }
            let doc = &documents[&document_path];
            let definition = pick_definition(&doc.definitions, name).ok_or_else(|| {
                ErdError::malformed_entity(
                    Some(document_path.clone()),
                    "entity document has no definitions",
                )
            })?;
            out.push(LoadedDefinition::new(definition.clone(), &document_path));
        }

        for sub in &manifest.sub_manifests {
            match sub.definition.as_deref() {
                Some(definition) => {
                    let (document, _) = split_entity_path(definition);
                    self.load_manifest(&base.join(document), visited, documents, out)?;
                }
                None => log::warn!(
                    "sub-manifest '{}' in {} has no definition path",
                    sub.manifest_name.as_deref().unwrap_or("?"),
                    path.display()
                ),
            }
        }

        Ok(())
    }
}

impl DocumentLoader for FsDocumentLoader {
    fn load_entities(&self, manifest: &Path) -> Result<Vec<LoadedDefinition>, ErdError> {
        let mut out = Vec::new();
        let mut visited = AHashSet::new();
        let mut documents = AHashMap::new();
        self.load_manifest(manifest, &mut visited, &mut documents, &mut out)?;
        log::debug!(
            "loaded {} definitions from {} documents",
            out.len(),
            documents.len() + visited.len()
        );
        Ok(out)
    }
}

/// Load every definition of every entity document matching a glob pattern,
/// in path order.
pub fn load_glob(pattern: &str) -> anyhow::Result<Vec<LoadedDefinition>> {
    let mut paths: Vec<PathBuf> = glob::glob(pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    if paths.is_empty() {
        anyhow::bail!("no entity documents match pattern: {}", pattern);
    }

    let loader = FsDocumentLoader::new();
    let mut out = Vec::new();
    for path in &paths {
        let doc: RawEntityDocument = loader.read_json(path)?;
        out.extend(
            doc.definitions
                .into_iter()
                .map(|d| LoadedDefinition::new(d, path)),
        );
    }
    Ok(out)
}

/// `"folder/Account.cdm.json/Account"` → (`"folder/Account.cdm.json"`, `Some("Account")`).
///
/// A path whose last segment looks like a JSON file has no entity name.
fn split_entity_path(raw: &str) -> (&str, Option<&str>) {
    let raw = raw.strip_prefix("local:").unwrap_or(raw);
    let raw = raw.trim_start_matches('/');
    if raw.ends_with(".json") {
        return (raw, None);
    }
    match raw.rsplit_once('/') {
        Some((document, name)) if !name.is_empty() => (document, Some(name)),
        _ => (raw, None),
    }
}

/// The definition named `name` (case-insensitive), else the first one
fn pick_definition<'a>(
    definitions: &'a [RawEntityDefinition],
    name: Option<&str>,
) -> Option<&'a RawEntityDefinition> {
    name.and_then(|name| {
        definitions.iter().find(|d| {
            d.entity_name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
    })
    .or_else(|| definitions.first())
}

fn canonical_key(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
