//! Library-level tests for normalization, graph building and leveling.

use cdm_erd::error::{ErdError, GraphWarning, WarningCollector};
use cdm_erd::loader::{DocumentLoader, FsDocumentLoader};
use cdm_erd::report::PlanReport;
use cdm_erd::schema::{
    level_sort, normalize_definition, DependencyMap, LoadedDefinition, RawEntityDefinition,
    Schema,
};
use cdm_erd::style::{NoStyle, Palette};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn pairs(input: &[(&str, &[&str])]) -> (DependencyMap, WarningCollector) {
    let mut warnings = WarningCollector::new();
    let map = DependencyMap::from_pairs(
        input.iter().map(|(k, v)| (*k, v.iter().copied())),
        &mut warnings,
    );
    (map, warnings)
}

fn definition(json: &str) -> RawEntityDefinition {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_chain_levels() {
    let (map, _) = pairs(&[("A", &[]), ("B", &["A"]), ("C", &["A", "B"])]);
    let plan = level_sort(&map).unwrap();
    assert_eq!(plan.to_names(), vec![vec!["a"], vec!["b"], vec!["c"]]);
}

#[test]
fn test_two_roots_share_a_level() {
    let (map, _) = pairs(&[("C", &["A", "B"]), ("B", &[]), ("A", &[])]);
    let plan = level_sort(&map).unwrap();
    assert_eq!(plan.to_names(), vec![vec!["a", "b"], vec!["c"]]);
    assert_eq!(plan.max_parallelism(), 2);
}

#[test]
fn test_mutual_reference_is_circular() {
    let (map, _) = pairs(&[("A", &["B"]), ("B", &["A"])]);
    match level_sort(&map) {
        Err(ErdError::CircularDependency { entities }) => {
            let names: Vec<&str> = entities.iter().map(|e| e.as_str()).collect();
            assert_eq!(names, vec!["a", "b"]);
        }
        other => panic!("expected a circular dependency, got {:?}", other),
    }
}

#[test]
fn test_self_reference_is_neutral() {
    let (map, warnings) = pairs(&[("A", &["A"])]);
    assert!(warnings.is_empty());
    assert_eq!(level_sort(&map).unwrap().to_names(), vec![vec!["a"]]);
}

#[test]
fn test_unknown_reference_warns() {
    let (map, warnings) = pairs(&[("A", &["X"])]);
    assert_eq!(warnings.unresolved_targets(), vec!["x"]);
    assert_eq!(level_sort(&map).unwrap().to_names(), vec![vec!["a"]]);
}

#[test]
fn test_normalization_flattens_nested_references() {
    let def = definition(
        r#"{
          "entityName": "Contact",
          "hasAttributes": [
            { "attributeGroupReference": { "members": [
              "fullName",
              { "name": "accountId", "entity": { "source": "Account" } },
              { "name": "parentId", "entity": { "source": { "entityName": "Contact" } } },
              { "name": "ownerId", "entity": { "source": { "source": "core/SystemUser" } } },
              { "name": "brokenId", "entity": { "source": 42 } }
            ]}}
          ]
        }"#,
    );
    let record = normalize_definition(&def, None).unwrap();

    assert_eq!(record.id.as_str(), "contact");
    assert_eq!(record.display_name, "Contact");
    assert_eq!(record.attributes.len(), 5);
    assert!(!record.attributes[0].is_reference());
    assert_eq!(record.attributes[1].target_entity().unwrap().as_str(), "account");
    assert!(record.has_self_reference());
    assert_eq!(record.attributes[3].target_entity().unwrap().as_str(), "systemuser");
    // present but unreadable: a reference with no usable target
    assert!(record.attributes[4].is_reference());
    assert!(record.attributes[4].target_entity().is_none());

    let mut warnings = WarningCollector::new();
    let schema = Schema::from_records(vec![record], &mut warnings);
    let map = DependencyMap::from_schema(&schema, &mut warnings);
    assert_eq!(map.edge_count(), 0);
    assert_eq!(warnings.len(), 3);
    assert!(warnings.warnings().iter().all(|w| matches!(
        w,
        GraphWarning::UnresolvedReference { .. }
    )));
}

#[test]
fn test_mistyped_attribute_fields_still_order_the_plan() {
    let account = definition(r#"{ "entityName": "Account" }"#);
    let policy = definition(
        r#"{
            "entityName": "Policy",
            "hasAttributes": [
                { "attributeGroupReference": { "members": [
                    { "name": 7, "entity": { "source": "Account" } },
                    { "name": "brokerId", "entity": 42 }
                ] } }
            ]
        }"#,
    );
    let defs = vec![
        LoadedDefinition::new(policy, Path::new("policy.cdm.json")),
        LoadedDefinition::new(account, Path::new("account.cdm.json")),
    ];

    let mut warnings = WarningCollector::new();
    let schema = Schema::from_definitions(&defs, &mut warnings).unwrap();
    let map = DependencyMap::from_schema(&schema, &mut warnings);

    assert_eq!(map.edge_count(), 1);
    assert_eq!(
        level_sort(&map).unwrap().to_names(),
        vec![vec!["account"], vec!["policy"]]
    );
    assert_eq!(warnings.unresolved_targets(), vec!["42"]);
}

#[test]
fn test_missing_entity_name_is_malformed() {
    let def = definition(r#"{ "displayName": "Nameless" }"#);
    let err = normalize_definition(&def, Some(Path::new("model/nameless.cdm.json"))).unwrap_err();
    assert!(matches!(err, ErdError::MalformedEntity { .. }));
    assert!(err.to_string().contains("nameless.cdm.json"));

    let defs = vec![LoadedDefinition::new(def, Path::new("model/nameless.cdm.json"))];
    assert!(Schema::from_definitions(&defs, &mut WarningCollector::new()).is_err());
}

#[test]
fn test_duplicate_definitions_keep_first() {
    let first = definition(r#"{ "entityName": "Account", "displayName": "First" }"#);
    let second = definition(r#"{ "entityName": "ACCOUNT", "displayName": "Second" }"#);
    let defs = vec![
        LoadedDefinition::new(first, Path::new("a.cdm.json")),
        LoadedDefinition::new(second, Path::new("b.cdm.json")),
    ];

    let mut warnings = WarningCollector::new();
    let schema = Schema::from_definitions(&defs, &mut warnings).unwrap();
    assert_eq!(schema.len(), 1);
    assert_eq!(schema.get("account").unwrap().display_name, "First");
    assert!(matches!(
        warnings.warnings()[0],
        GraphWarning::DuplicateEntity { .. }
    ));
}

#[test]
fn test_manifest_to_report_end_to_end() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("sales")).unwrap();
    fs::write(
        dir.path().join("sales/Order.cdm.json"),
        r#"{ "definitions": [
            { "entityName": "Order", "hasAttributes": [
              { "attributeGroupReference": { "members": [
                { "name": "customerId", "entity": { "source": "Customer" } }
              ]}}
            ]}
        ]}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("sales/sales.manifest.cdm.json"),
        r#"{ "entities": [ { "entityName": "Order", "entityPath": "Order.cdm.json/Order" } ] }"#,
    )
    .unwrap();
    let root = dir.path().join("root.manifest.cdm.json");
    fs::write(
        &root,
        r#"{
          "definitions": [ { "entityName": "Customer" } ],
          "subManifests": [ { "manifestName": "sales", "definition": "sales/sales.manifest.cdm.json" } ]
        }"#,
    )
    .unwrap();

    let definitions = FsDocumentLoader::new().load_entities(&root).unwrap();
    let mut warnings = WarningCollector::new();
    let schema = Schema::from_definitions(&definitions, &mut warnings).unwrap();
    let map = DependencyMap::from_schema(&schema, &mut warnings);
    let plan = map.level_sort().unwrap();

    let mut palette = Palette::new();
    palette.insert("customer".into(), "#000000");
    let report = PlanReport::build(&plan, &palette);

    assert!(warnings.is_empty());
    assert_eq!(
        report.to_text(),
        "Dependency Matrix:\nStep 1: customer\n  - customer (color: #000000)\nStep 2: order\n  - order (color: #FFFFFF)\n"
    );
    assert_eq!(report.steps[0].entities[0].text_color, "white");
    assert_eq!(PlanReport::build(&plan, &NoStyle).steps[0].entities[0].color, "#FFFFFF");
}
