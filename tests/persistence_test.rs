use std::path::PathBuf;

use argon_scene::{DocumentConfig, DocumentError, region::ModelSource};
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::common::test_utils::{heart_document, live_document, to_text};
mod common;

#[test]
fn should_resolve_model_files_against_document_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("heart.json");
    std::fs::write(&path, to_text(&heart_document())).unwrap();
    let mut document = live_document();

    document.load(&path).unwrap();

    let tree = document.root_region().unwrap();
    let ventricle = tree.find_region("heart/left_ventricle").unwrap();
    assert_eq!(
        tree.region(ventricle).unwrap().sources(),
        &[ModelSource::file(dir.path().join("lv.exfile"))]
    );
}

#[test]
fn should_write_model_files_relative_to_document_directory() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("heart.json");
    let copy = dir.path().join("copy.json");
    std::fs::write(&source, to_text(&heart_document())).unwrap();
    let mut document = live_document();
    document.load(&source).unwrap();

    document.save(&copy).unwrap();

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&copy).unwrap()).unwrap();
    assert_eq!(
        written["RootRegion"]["ChildRegions"][0]["ChildRegions"][0]["Model"]["Sources"][0],
        serde_json::json!({ "Type": "FILE", "FileName": "lv.exfile" })
    );

    let mut reloaded = live_document();
    reloaded.load(&copy).unwrap();
    assert_eq!(reloaded.serialize(None).unwrap(), document.serialize(None).unwrap());
}

#[test]
fn should_keep_files_outside_base_path_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut document = live_document();
    let outside = PathBuf::from("/data/shared/torso.exfile");
    document
        .edit_regions(|tree, _| tree.add_source(tree.root(), ModelSource::file(&outside)))
        .unwrap()
        .unwrap();

    document.save(dir.path().join("torso.json")).unwrap();

    let text = document.serialize(Some(dir.path())).unwrap();
    let written: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        written["RootRegion"]["Model"]["Sources"][0]["FileName"],
        Value::from("/data/shared/torso.exfile")
    );
}

#[test]
fn should_report_missing_document_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut document = live_document();

    let err = document.load(dir.path().join("missing.json")).unwrap_err();

    assert!(matches!(err, DocumentError::Io(_)));
    assert!(!err.is_document_error());
}

#[test]
fn should_read_partial_configuration() {
    let config = DocumentConfig::from_json(r#"{ "ContextName": "Lung" }"#).unwrap();

    assert_eq!(
        config,
        DocumentConfig {
            context_name: "Lung".to_string(),
            ..DocumentConfig::default()
        }
    );
}

#[test]
fn should_read_configuration_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("argon.json");
    std::fs::write(&path, r#"{ "BackgroundColour": [0.2, 0.2, 0.2] }"#).unwrap();

    let config = DocumentConfig::from_file(&path).unwrap();

    assert_eq!(config.background_colour, [0.2, 0.2, 0.2]);
    assert_eq!(config.default_surface_material, "white");
}

#[test]
fn should_reject_unreadable_configuration() {
    let dir = tempfile::tempdir().unwrap();

    assert!(DocumentConfig::from_file(dir.path().join("missing.json")).is_err());
    assert!(DocumentConfig::from_json(r#"{ "BackgroundColour": "grey" }"#).is_err());
}
