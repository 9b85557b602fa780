#![allow(dead_code)]

use argon_scene::{Document, Version, document::VERSION_KEY};
use serde_json::{Value, json};

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A freshly initialised document with the default configuration.
pub(crate) fn live_document() -> Document {
    init_logger();
    let mut document = Document::new();
    document
        .initialise()
        .expect("failed to initialise document");
    document
}

/// A document using every section: custom resources, a moved camera and a
/// small region hierarchy whose graphics refer to those resources.
pub(crate) fn heart_document() -> Value {
    json!({
        VERSION_KEY: Version::CURRENT,
        "Materials": {
            "Materials": [
                { "Name": "copper", "Ambient": [0.4, 0.2, 0.1], "Diffuse": [0.7, 0.4, 0.2] }
            ]
        },
        "Spectrums": {
            "Spectrums": [
                {
                    "Name": "pressure",
                    "Components": [
                        { "RangeMinimum": 0.0, "RangeMaximum": 120.0, "ColourMappingType": "WHITE_TO_RED" }
                    ]
                }
            ],
            "DefaultSpectrum": "pressure"
        },
        "Tessellations": {
            "Tessellations": [
                { "Name": "fine", "MinimumDivisions": [4], "RefinementFactors": [8], "CircleDivisions": 24 }
            ]
        },
        "Sceneviewer": {
            "EyePosition": [0.0, -10.0, 0.0],
            "LookatPosition": [0.0, 0.0, 0.0],
            "UpVector": [0.0, 0.0, 1.0],
            "ViewAngle": 30.0
        },
        "RootRegion": {
            "ChildRegions": [
                {
                    "Name": "heart",
                    "Scene": {
                        "Graphics": [
                            { "Type": "SURFACES", "Material": "copper", "Spectrum": "pressure", "Tessellation": "fine" }
                        ]
                    },
                    "ChildRegions": [
                        {
                            "Name": "left_ventricle",
                            "Model": { "Sources": [ { "Type": "FILE", "FileName": "lv.exfile" } ] }
                        }
                    ]
                },
                { "Name": "lungs" }
            ]
        }
    })
}

pub(crate) fn to_text(document: &Value) -> String {
    serde_json::to_string_pretty(document).expect("failed to write fixture")
}

/// Serializes `document` and parses the result back into JSON.
pub(crate) fn snapshot(document: &Document) -> Value {
    let text = document.serialize(None).expect("failed to serialize");
    serde_json::from_str(&text).expect("serialized document is not JSON")
}
