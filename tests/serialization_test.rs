use argon_scene::{
    Deg, DocumentError, EngineError, Point3, Section, Version,
    document::{PRODUCT_NAME, VERSION_KEY, apply_order},
    region::{Graphics, GraphicsType},
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::common::test_utils::{heart_document, live_document, snapshot, to_text};
mod common;

fn top_level_keys(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| line.starts_with("  \""))
        .filter_map(|line| line.trim_start().split('"').nth(1))
        .map(str::to_string)
        .collect()
}

#[test]
fn should_write_fresh_document_with_all_sections() {
    let document = live_document();

    let text = document.serialize(None).unwrap();

    assert!(text.starts_with("{\n  \"Materials\": {"));
    assert_eq!(
        top_level_keys(&text),
        vec![
            "Materials",
            "OpenCMISS-Argon Version",
            "RootRegion",
            "Sceneviewer",
            "Spectrums",
            "Tessellations",
        ]
    );
    let written: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(written[VERSION_KEY], serde_json::to_value(Version::CURRENT).unwrap());
    assert_eq!(written["RootRegion"], json!({}));
    for section in ["Materials", "Sceneviewer", "Spectrums", "Tessellations"] {
        assert!(written[section].is_object(), "{section}");
    }
}

#[test]
fn should_not_change_state_when_serializing() {
    let document = live_document();
    let default_region = document.context().unwrap().default_region();

    let first = document.serialize(None).unwrap();
    let second = document.serialize(None).unwrap();

    assert_eq!(first, second);
    assert_eq!(document.context().unwrap().default_region(), default_region);
}

#[test]
fn should_read_back_what_was_written() {
    let mut original = live_document();
    original.deserialize(&to_text(&heart_document())).unwrap();
    original
        .edit_regions(|tree, ctx| {
            let kidney = tree.create_child(ctx, tree.root(), "kidney")?;
            tree.add_graphics(ctx, kidney, Graphics::new(GraphicsType::Lines).with_material("gold"))
        })
        .unwrap()
        .unwrap();
    original.sceneviewer_mut().unwrap().eye_position = Point3::new(3.0, 4.0, 5.0);
    let written = original.serialize(None).unwrap();

    let mut copy = live_document();
    copy.deserialize(&written).unwrap();

    assert_eq!(copy.serialize(None).unwrap(), written);
}

#[test]
fn should_apply_every_section() {
    let mut document = live_document();

    document.deserialize(&to_text(&heart_document())).unwrap();

    let context = document.context().unwrap();
    assert!(context.materials.find_material_by_name("copper").is_some());
    assert_eq!(context.spectrums.default_spectrum().name, "pressure");
    assert_eq!(
        context
            .tessellations
            .find_tessellation_by_name("fine")
            .map(|t| t.circle_divisions),
        Some(24)
    );
    let viewer = document.sceneviewer().unwrap();
    assert_eq!(viewer.eye_position, Point3::new(0.0, -10.0, 0.0));
    assert_eq!(viewer.view_angle, Deg(30.0));

    let tree = document.root_region().unwrap();
    assert_eq!(tree.region_count(), 4);
    let heart = tree.find_region("heart").unwrap();
    assert_eq!(
        tree.region(heart).unwrap().graphics()[0].material.as_deref(),
        Some("copper")
    );
    assert!(tree.find_region("heart/left_ventricle").is_some());
    assert!(tree.find_region("lungs").is_some());
}

#[test]
fn should_apply_sections_in_fixed_order() {
    assert_eq!(
        apply_order().collect::<Vec<_>>(),
        vec![
            Section::Tessellations,
            Section::Spectrums,
            Section::Materials,
            Section::Sceneviewer,
            Section::Materials,
            Section::RootRegion,
        ]
    );
}

#[test]
fn should_reject_newer_version_without_changes() {
    let mut document = live_document();
    let before = document.serialize(None).unwrap();
    let default_region = document.context().unwrap().default_region();

    let err = document
        .deserialize(r#"{"OpenCMISS-Argon Version":[999,0,0],"RootRegion":{}}"#)
        .unwrap_err();

    match &err {
        DocumentError::UnsupportedVersion { found, supported } => {
            assert_eq!(*found, Version::new(999, 0, 0));
            assert_eq!(*supported, Version::CURRENT);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains("Please update your application"));
    assert!(err.is_document_error());
    assert_eq!(document.serialize(None).unwrap(), before);
    assert_eq!(document.context().unwrap().default_region(), default_region);
}

#[test]
fn should_accept_older_version() {
    let mut document = live_document();

    document
        .deserialize(
            r#"{"OpenCMISS-Argon Version":[0,0,0],"RootRegion":{"ChildRegions":[{"Name":"a"}]}}"#,
        )
        .unwrap();

    assert!(document.root_region().unwrap().find_region("a").is_some());
}

#[test]
fn should_read_documents_written_by_the_desktop_application() {
    let mut document = live_document();

    document
        .deserialize(
            r#"{"OpenCMISS-Argon Version":[0,0,1],"RootRegion":{"ChildRegions":[{"Name":"b"}]}}"#,
        )
        .unwrap();

    assert_eq!(VERSION_KEY, format!("{PRODUCT_NAME} Version"));
    assert!(document.root_region().unwrap().find_region("b").is_some());
    assert!(snapshot(&document).get("OpenCMISS-Argon Version").is_some());
}

#[test]
fn should_reject_document_without_root_region() {
    let mut document = live_document();
    let mut text = heart_document();
    text.as_object_mut().unwrap().remove("RootRegion");

    let err = document.deserialize(&to_text(&text)).unwrap_err();

    assert!(matches!(err, DocumentError::InvalidDocument(ref key) if key == "RootRegion"));
    assert!(err.is_document_error());
    let context = document.context().unwrap();
    assert!(context.materials.find_material_by_name("copper").is_none());
    assert!(context.tessellations.find_tessellation_by_name("fine").is_none());
}

#[test]
fn should_reject_document_without_version() {
    let mut document = live_document();

    let err = document.deserialize(r#"{"RootRegion":{}}"#).unwrap_err();

    assert!(matches!(err, DocumentError::InvalidDocument(ref key) if key == VERSION_KEY));
}

#[test]
fn should_reject_document_that_is_not_an_object() {
    let mut document = live_document();

    let err = document.deserialize("[1, 2, 3]").unwrap_err();

    assert!(matches!(err, DocumentError::InvalidDocument(_)));
}

#[test]
fn should_report_malformed_text() {
    let mut document = live_document();

    assert!(matches!(
        document.deserialize("{\"OpenCMISS-Argon Version\": [0, 1"),
        Err(DocumentError::Malformed(_))
    ));
    assert!(matches!(
        document.deserialize(r#"{"OpenCMISS-Argon Version":"latest","RootRegion":{}}"#),
        Err(DocumentError::Malformed(_))
    ));
}

#[test]
fn should_accept_document_with_only_root_region() {
    let mut document = live_document();
    let materials = snapshot(&document)["Materials"].clone();

    document
        .deserialize(&to_text(&json!({
            VERSION_KEY: Version::CURRENT,
            "RootRegion": { "Name": "ignored", "ChildRegions": [{ "Name": "liver" }] }
        })))
        .unwrap();

    let tree = document.root_region().unwrap();
    assert_eq!(tree.root_region().name(), None);
    assert!(tree.find_region("liver").is_some());
    assert_eq!(snapshot(&document)["Materials"], materials);
}

#[test]
fn should_keep_earlier_sections_when_a_later_one_fails() {
    let mut document = live_document();
    let mut text = heart_document();
    text["Materials"]["DefaultMaterial"] = json!("nonexistent");

    let err = document.deserialize(&to_text(&text)).unwrap_err();

    assert!(matches!(
        err,
        DocumentError::Section {
            section: Section::Materials,
            source: EngineError::UnknownMaterial(ref name),
        } if name == "nonexistent"
    ));
    assert!(err.is_document_error());
    let context = document.context().unwrap();
    assert!(context.tessellations.find_tessellation_by_name("fine").is_some());
    assert_eq!(context.spectrums.default_spectrum().name, "pressure");
    assert!(context.materials.find_material_by_name("copper").is_none());
    assert_eq!(
        document.sceneviewer().unwrap().eye_position,
        Point3::new(0.0, 0.0, 5.0)
    );
    assert_eq!(document.root_region().unwrap().region_count(), 1);
}

#[test]
fn should_leave_region_tree_alone_when_graphics_are_unresolved() {
    let mut document = live_document();
    let default_region = document.context().unwrap().default_region();
    let mut text = heart_document();
    text["RootRegion"]["ChildRegions"][0]["Scene"]["Graphics"][0]["Material"] = json!("unobtainium");

    let err = document.deserialize(&to_text(&text)).unwrap_err();

    assert!(matches!(
        err,
        DocumentError::Section {
            section: Section::RootRegion,
            source: EngineError::UnknownMaterial(_),
        }
    ));
    let context = document.context().unwrap();
    assert!(context.materials.find_material_by_name("copper").is_some());
    assert_eq!(context.default_region(), default_region);
    assert_eq!(document.root_region().unwrap().region_count(), 1);
}

#[test]
fn should_reject_duplicate_child_names() {
    let mut document = live_document();

    let err = document
        .deserialize(&to_text(&json!({
            VERSION_KEY: Version::CURRENT,
            "RootRegion": { "ChildRegions": [{ "Name": "a" }, { "Name": "a" }] }
        })))
        .unwrap_err();

    assert!(matches!(
        err,
        DocumentError::Section {
            section: Section::RootRegion,
            source: EngineError::DuplicateRegionName(_),
        }
    ));
    assert_eq!(document.root_region().unwrap().region_count(), 1);
}

#[test]
fn should_keep_viewer_when_its_section_is_invalid() {
    let mut document = live_document();
    let viewer = document.sceneviewer().unwrap().clone();

    let err = document
        .deserialize(&to_text(&json!({
            VERSION_KEY: Version::CURRENT,
            "Sceneviewer": { "EyePosition": [1.0, 2.0, 3.0], "LookatPosition": [1.0, 2.0, 3.0] },
            "RootRegion": {}
        })))
        .unwrap_err();

    assert!(matches!(
        err,
        DocumentError::Section {
            section: Section::Sceneviewer,
            source: EngineError::InvalidViewer(_),
        }
    ));
    assert_eq!(*document.sceneviewer().unwrap(), viewer);
}

#[test]
fn should_read_materials_idempotently_in_one_batch() {
    let mut document = live_document();
    let notifications = document.context().unwrap().materials.change_notifications();

    document.deserialize(&to_text(&heart_document())).unwrap();
    let first = snapshot(&document)["Materials"].clone();

    // the materials section is applied twice, one notification each
    assert_eq!(
        document.context().unwrap().materials.change_notifications(),
        notifications + 2
    );

    document.deserialize(&to_text(&heart_document())).unwrap();
    assert_eq!(snapshot(&document)["Materials"], first);
}
