//! Configuration applied to a freshly created visualisation context.
//!
//! The engine's defaults (background colour, default material colour, which
//! material surfaces fall back to) are set from a [`DocumentConfig`] once,
//! during [`crate::document::Document::initialise`]. Nothing else in the crate
//! relies on implicit engine defaults.

use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;

/// Settings for [`crate::document::Document::initialise`].
///
/// Can be read from JSON with PascalCase keys; missing keys keep their
/// default value.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DocumentConfig {
    /// Name given to the visualisation context.
    pub context_name: String,
    /// Default scene viewer background.
    pub background_colour: [f64; 3],
    /// Ambient and diffuse colour of the engine's default material.
    pub default_material_colour: [f64; 3],
    /// Material used by surfaces that do not name one.
    pub default_surface_material: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            context_name: "Argon".to_string(),
            background_colour: [1.0, 1.0, 1.0],
            // lines and points default to black
            default_material_colour: [0.0, 0.0, 0.0],
            default_surface_material: "white".to_string(),
        }
    }
}

impl DocumentConfig {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config = serde_json::from_str(text).context("invalid document configuration")?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read configuration {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }
}
