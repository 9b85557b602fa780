//! Spectrums map field values to colours.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{context::ChangeBatch, error::EngineError};

pub const DEFAULT_SPECTRUM: &str = "default";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColourMapping {
    Rainbow,
    Red,
    Green,
    Blue,
    WhiteToBlue,
    WhiteToRed,
    Monochrome,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpectrumComponent {
    #[serde(default)]
    pub range_minimum: f64,
    #[serde(default = "unit")]
    pub range_maximum: f64,
    #[serde(default = "rainbow")]
    pub colour_mapping_type: ColourMapping,
    #[serde(default)]
    pub reverse: bool,
}

fn unit() -> f64 {
    1.0
}

fn rainbow() -> ColourMapping {
    ColourMapping::Rainbow
}

impl Default for SpectrumComponent {
    fn default() -> Self {
        Self {
            range_minimum: 0.0,
            range_maximum: unit(),
            colour_mapping_type: rainbow(),
            reverse: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Spectrum {
    pub name: String,
    #[serde(default)]
    pub components: Vec<SpectrumComponent>,
    #[serde(default)]
    pub managed: bool,
}

impl Spectrum {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            components: vec![SpectrumComponent::default()],
            managed: false,
        }
    }

    /// Overall data range covered by the components, if any.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.components.iter().fold(None, |range, component| {
            let (min, max) = range.unwrap_or((component.range_minimum, component.range_maximum));
            Some((min.min(component.range_minimum), max.max(component.range_maximum)))
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SpectrumsDescription {
    #[serde(default)]
    spectrums: Vec<Spectrum>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_spectrum: Option<String>,
}

#[derive(Debug)]
pub struct SpectrumModule {
    spectrums: BTreeMap<String, Spectrum>,
    default_spectrum: String,
    changes: ChangeBatch,
}

impl Default for SpectrumModule {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumModule {
    pub fn new() -> Self {
        let mut default = Spectrum::new(DEFAULT_SPECTRUM);
        default.managed = true;
        let mut spectrums = BTreeMap::new();
        spectrums.insert(default.name.clone(), default);
        Self {
            spectrums,
            default_spectrum: DEFAULT_SPECTRUM.to_string(),
            changes: ChangeBatch::default(),
        }
    }

    pub fn begin_change(&mut self) {
        self.changes.begin();
    }

    pub fn end_change(&mut self) {
        self.changes.end();
    }

    pub fn define(&mut self, spectrum: Spectrum) {
        self.spectrums.insert(spectrum.name.clone(), spectrum);
        self.changes.changed();
    }

    pub fn find_spectrum_by_name(&self, name: &str) -> Option<&Spectrum> {
        self.spectrums.get(name)
    }

    pub fn spectrums(&self) -> impl Iterator<Item = &Spectrum> {
        self.spectrums.values()
    }

    pub fn default_spectrum(&self) -> &Spectrum {
        &self.spectrums[&self.default_spectrum]
    }

    pub fn set_default_spectrum(&mut self, name: &str) -> Result<(), EngineError> {
        if !self.spectrums.contains_key(name) {
            return Err(EngineError::UnknownSpectrum(name.to_string()));
        }
        self.default_spectrum = name.to_string();
        self.changes.changed();
        Ok(())
    }

    pub fn write_description(&self) -> Result<Value, EngineError> {
        let description = SpectrumsDescription {
            spectrums: self.spectrums.values().cloned().collect(),
            default_spectrum: Some(self.default_spectrum.clone()),
        };
        Ok(serde_json::to_value(description)?)
    }

    pub fn read_description(&mut self, description: &Value) -> Result<(), EngineError> {
        let description: SpectrumsDescription = serde_json::from_value(description.clone())?;
        if let Some(name) = &description.default_spectrum {
            let known = self.spectrums.contains_key(name)
                || description.spectrums.iter().any(|s| &s.name == name);
            if !known {
                return Err(EngineError::UnknownSpectrum(name.clone()));
            }
        }

        self.begin_change();
        for spectrum in description.spectrums {
            self.define(spectrum);
        }
        if let Some(name) = description.default_spectrum {
            self.default_spectrum = name;
            self.changes.changed();
        }
        self.end_change();
        Ok(())
    }
}
