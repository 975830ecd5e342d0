//! Integration tests for the core service: registry, index, retrieval, and
//! code synthesis working together through the embedding seam.

mod common;

use common::HashEmbedder;
use conjure::registry::{Capability, ParamType, ParameterSchema, ParameterSpec};
use conjure::{ActionRegistry, ActionService, AppError};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn open_service(data_dir: &Path) -> ActionService {
    ActionService::initialize(
        Arc::new(HashEmbedder::new()),
        ActionRegistry::with_builtins(),
        data_dir.join("vectors.bin"),
        data_dir.join("records.json"),
    )
    .expect("service initialization failed")
}

fn capability(name: &str) -> Capability {
    Capability {
        name: name.to_string(),
        module: "automations".to_string(),
        doc: String::new(),
        signature: Vec::new(),
    }
}

fn overrides(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn test_every_builtin_is_self_retrievable() {
    let dir = tempdir().unwrap();
    let service = open_service(dir.path());

    let catalog: Vec<(String, String)> = service
        .index()
        .records()
        .iter()
        .map(|r| (r.name.clone(), r.description.clone()))
        .collect();

    for (name, description) in catalog {
        let results = service.retrieve(&description, 3).unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert!(
            names.contains(&name.as_str()),
            "querying with its own description should return '{}', got {:?}",
            name,
            names
        );
    }
}

#[test]
fn test_index_parity_after_registrations() {
    let dir = tempdir().unwrap();
    let mut service = open_service(dir.path());

    for i in 0..4 {
        service
            .register(capability(&format!("custom_{i}")), None, None, None)
            .unwrap();
        assert_eq!(service.index().vector_count(), service.index().len());
    }
}

#[test]
fn test_reopen_loads_persisted_state_including_custom_actions() {
    let dir = tempdir().unwrap();
    let mut service = open_service(dir.path());
    service
        .register(
            capability("water_plants"),
            None,
            Some("start the greenhouse irrigation pumps".to_string()),
            None,
        )
        .unwrap();
    let count = service.index().len();

    let query = "start the greenhouse irrigation pumps";
    let before: Vec<String> = service
        .retrieve(query, 3)
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    drop(service);

    let reopened = open_service(dir.path());
    assert_eq!(reopened.index().len(), count);
    let after: Vec<String> = reopened
        .retrieve(query, 3)
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_get_time_scenario() {
    let dir = tempdir().unwrap();
    let mut service = open_service(dir.path());

    service
        .register(
            capability("get_time"),
            None,
            Some("returns current ISO-8601 timestamp".to_string()),
            None,
        )
        .unwrap();

    let results = service.retrieve("what time is it right now", 3).unwrap();
    let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
    assert!(
        names.contains(&"get_time"),
        "expected get_time in top 3, got {:?}",
        names
    );

    let code = service.generate("get_time", &Map::new()).unwrap();
    assert!(code.contains("from automations import get_time"));
    assert!(code.contains("result = get_time()"));
    assert!(code.contains("try:"));
    assert!(code.contains("except Exception as exc:"));
    assert!(code.contains("raise"));
}

#[test]
fn test_open_url_scenario() {
    let dir = tempdir().unwrap();
    let mut service = open_service(dir.path());

    let schema = ParameterSchema::from([(
        "url".to_string(),
        ParameterSpec::required(ParamType::Str, "URL to open"),
    )]);
    service
        .register(
            capability("open_url"),
            None,
            Some("open a URL in the default browser".to_string()),
            Some(schema),
        )
        .unwrap();

    // Required parameter without an override: the argument is omitted and
    // validation is deferred to execution time.
    let bare = service.generate("open_url", &Map::new()).unwrap();
    assert!(bare.contains("result = open_url()"));

    let with_url = service
        .generate("open_url", &overrides(&[("url", json!("https://example.com"))]))
        .unwrap();
    assert!(with_url.contains("open_url(url='https://example.com')"));
}

#[test]
fn test_generate_unknown_action_is_not_found() {
    let dir = tempdir().unwrap();
    let service = open_service(dir.path());

    let err = service.generate("nonexistent", &Map::new()).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn test_generate_is_deterministic_across_calls() {
    let dir = tempdir().unwrap();
    let service = open_service(dir.path());

    let args = overrides(&[("url", json!("https://example.com"))]);
    let first = service.generate("open_chrome", &args).unwrap();
    let second = service.generate("open_chrome", &args).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_custom_action_overrides_builtin_everywhere() {
    let dir = tempdir().unwrap();
    let mut service = open_service(dir.path());
    let merged_before = service.registry().len();

    service
        .register(
            Capability {
                name: "open_calculator".to_string(),
                module: "custom_tools".to_string(),
                doc: String::new(),
                signature: Vec::new(),
            },
            None,
            Some("launch the scientific graphing calculator workspace".to_string()),
            None,
        )
        .unwrap();

    // Merged view replaces the built-in instead of growing.
    assert_eq!(service.registry().len(), merged_before);

    // Generation references the replacement module.
    let code = service.generate("open_calculator", &Map::new()).unwrap();
    assert!(code.contains("from custom_tools import open_calculator"));

    // Retrieval on the replacement's wording surfaces the replacement
    // snapshot, and its name resolves to the custom entry.
    let results = service
        .retrieve("launch the scientific graphing calculator workspace", 1)
        .unwrap();
    assert_eq!(results[0].name, "open_calculator");
    assert_eq!(
        results[0].description,
        "launch the scientific graphing calculator workspace"
    );
}

#[test]
fn test_retrieve_on_empty_catalog_returns_empty_list() {
    let dir = tempdir().unwrap();
    let service = ActionService::initialize(
        Arc::new(HashEmbedder::new()),
        ActionRegistry::empty(),
        dir.path().join("vectors.bin"),
        dir.path().join("records.json"),
    )
    .unwrap();

    let results = service.retrieve("anything at all", 3).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_retrieval_distances_ascend() {
    let dir = tempdir().unwrap();
    let service = open_service(dir.path());

    let results = service
        .retrieve("Get current CPU usage statistics", 5)
        .unwrap();
    assert!(!results.is_empty());
    for pair in results.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
    assert!(results.iter().all(|r| r.distance >= 0.0));
}
