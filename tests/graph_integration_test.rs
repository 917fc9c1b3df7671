//! Integration tests for the graph command (ERD generation).

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

fn get_binary_path() -> String {
    std::env::var("CARGO_BIN_EXE_cdm-erd").unwrap_or_else(|_| "target/debug/cdm-erd".to_string())
}

/// account <- contact <- opportunity, a self-referencing category, and a
/// reference to an entity nobody defines
fn create_test_manifest(dir: &TempDir) -> PathBuf {
    let entities = dir.path().join("entities");
    fs::create_dir_all(&entities).unwrap();

    fs::write(
        entities.join("Account.cdm.json"),
        r##"{
  "definitions": [{
    "entityName": "Account",
    "displayName": "Account",
    "description": "Business customer",
    "hasAttributes": [{
      "attributeGroupReference": {
        "members": [
          { "name": "name" },
          { "name": "ownerId", "entity": { "source": "SystemUser" } }
        ]
      }
    }]
  }]
}"##,
    )
    .unwrap();

    fs::write(
        entities.join("Contact.cdm.json"),
        r##"{
  "definitions": [{
    "entityName": "Contact",
    "hasAttributes": [{
      "attributeGroupReference": {
        "members": [
          "fullName",
          { "name": "accountId", "entity": { "source": { "entityName": "Account" } } }
        ]
      }
    }]
  }]
}"##,
    )
    .unwrap();

    let manifest = dir.path().join("default.manifest.cdm.json");
    fs::write(
        &manifest,
        r##"{
  "manifestName": "default",
  "definitions": [
    {
      "entityName": "Opportunity",
      "hasAttributes": [{
        "attributeGroupReference": {
          "members": [
            { "name": "contactId", "entity": { "source": "Contact" } },
            { "name": "accountId", "entity": { "source": "account" } }
          ]
        }
      }]
    },
    {
      "entityName": "Category",
      "hasAttributes": [{
        "attributeGroupReference": {
          "members": [{ "name": "parentId", "entity": { "source": "Category" } }]
        }
      }]
    }
  ],
  "entities": [
    { "entityName": "Account", "entityPath": "entities/Account.cdm.json/Account" },
    { "entityName": "Contact", "entityPath": "local:/entities/Contact.cdm.json/Contact" }
  ]
}"##,
    )
    .unwrap();

    manifest
}

fn write_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("config.yaml");
    fs::write(
        &path,
        r##"
palette:
  mode: hashed
  colors:
    account: "#000080"
    contact: "#ffff00"
"##,
    )
    .unwrap();
    path
}

fn run_graph(dir: &TempDir, extra: &[&str]) -> std::process::Output {
    let manifest = create_test_manifest(dir);
    let config = write_config(dir);
    Command::new(get_binary_path())
        .arg("graph")
        .arg(&manifest)
        .arg("--config")
        .arg(&config)
        .args(extra)
        .output()
        .unwrap()
}

#[test]
fn test_graph_dot_output() {
    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("erd.dot");
    let output = run_graph(&dir, &["-o", output_path.to_str().unwrap()]);

    assert!(output.status.success());
    let content = fs::read_to_string(&output_path).unwrap();
    assert!(content.contains("digraph ERD"));
    assert!(content.contains("contact -> account [label=\"accountId\"]"));
    assert!(content.contains("opportunity -> contact [label=\"contactId\"]"));
    assert!(content.contains("category -> category [label=\"parentId\"]"));
    assert!(content.contains("BGCOLOR=\"#000080\""));
    assert!(content.contains("tooltip=\"Business customer\""));
    assert!(!content.contains("systemuser ->"));
}

#[test]
fn test_graph_mermaid_output() {
    let dir = TempDir::new().unwrap();
    let output = run_graph(&dir, &["--format", "mermaid"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("erDiagram"));
    assert!(stdout.contains("contact }o--|| account : \"accountId\""));
    assert!(stdout.contains("attr accountId FK"));
}

#[test]
fn test_graph_json_output() {
    let dir = TempDir::new().unwrap();
    let output = run_graph(&dir, &["--json"]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stats"]["entity_count"], 4);
    assert_eq!(json["stats"]["relationship_count"], 4);

    let account = json["entities"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["name"] == "account")
        .unwrap();
    assert_eq!(account["color"], "#000080");
    assert_eq!(account["description"], "Business customer");
}

#[test]
fn test_graph_html_from_extension() {
    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("erd.html");
    let output = run_graph(&dir, &["-o", output_path.to_str().unwrap()]);

    assert!(output.status.success());
    let content = fs::read_to_string(&output_path).unwrap();
    assert!(content.contains("<!DOCTYPE html>"));
    assert!(content.contains("ERD - default.manifest.cdm.json"));
    assert!(content.contains("erDiagram"));
}

#[test]
fn test_graph_focus_entity() {
    let dir = TempDir::new().unwrap();
    let output = run_graph(&dir, &["--json", "--entity", "Contact"]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = json["entities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["account", "contact", "opportunity"]);
}

#[test]
fn test_graph_exclude_patterns() {
    let dir = TempDir::new().unwrap();
    let output = run_graph(&dir, &["--json", "--exclude", "cat*,Opportunity"]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stats"]["entity_count"], 2);
    assert_eq!(json["stats"]["relationship_count"], 1);
}

#[test]
fn test_graph_include_patterns() {
    let dir = TempDir::new().unwrap();
    let output = run_graph(&dir, &["--json", "--include", "account,contact"]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stats"]["entity_count"], 2);
    assert_eq!(json["stats"]["relationship_count"], 1);

    let short = run_graph(&dir, &["--json", "-i", "cat*"]);
    let json: serde_json::Value = serde_json::from_slice(&short.stdout).unwrap();
    assert_eq!(json["entities"][0]["name"], "category");
}

#[test]
fn test_graph_cycles_only() {
    let dir = TempDir::new().unwrap();
    let output = run_graph(&dir, &["--format", "mermaid", "--cycles-only"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("category"));
    assert!(!stdout.contains("account"));
    assert!(stderr.contains("category -> category (self-reference)"));
}

#[test]
fn test_graph_missing_manifest() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(get_binary_path())
        .args(["graph", dir.path().join("nope.json").to_str().unwrap()])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("manifest does not exist"));
}

#[test]
fn test_graph_render_missing_graphviz() {
    let dir = TempDir::new().unwrap();
    let manifest = create_test_manifest(&dir);
    let config = dir.path().join("config.yaml");
    fs::write(&config, "render:\n  dot_path: /nonexistent/graphviz/dot\n").unwrap();
    let output_path = dir.path().join("erd.svg");

    let output = Command::new(get_binary_path())
        .arg("graph")
        .arg(&manifest)
        .arg("--config")
        .arg(&config)
        .arg("-o")
        .arg(&output_path)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}
