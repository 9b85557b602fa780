//! Tessellations control how finely curved elements are drawn.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{context::ChangeBatch, error::EngineError};

pub const DEFAULT_TESSELLATION: &str = "default";
pub const DEFAULT_POINTS_TESSELLATION: &str = "default_points";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tessellation {
    pub name: String,
    #[serde(default = "single")]
    pub minimum_divisions: Vec<u32>,
    #[serde(default = "single")]
    pub refinement_factors: Vec<u32>,
    #[serde(default = "circle")]
    pub circle_divisions: u32,
    #[serde(default)]
    pub managed: bool,
}

fn single() -> Vec<u32> {
    vec![1]
}

fn circle() -> u32 {
    12
}

impl Tessellation {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            minimum_divisions: single(),
            refinement_factors: single(),
            circle_divisions: circle(),
            managed: false,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TessellationsDescription {
    #[serde(default)]
    tessellations: Vec<Tessellation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_tessellation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_points_tessellation: Option<String>,
}

#[derive(Debug)]
pub struct TessellationModule {
    tessellations: BTreeMap<String, Tessellation>,
    default_tessellation: String,
    default_points_tessellation: String,
    changes: ChangeBatch,
}

impl Default for TessellationModule {
    fn default() -> Self {
        Self::new()
    }
}

impl TessellationModule {
    pub fn new() -> Self {
        let default = Tessellation {
            refinement_factors: vec![4],
            managed: true,
            ..Tessellation::new(DEFAULT_TESSELLATION)
        };
        let points = Tessellation {
            managed: true,
            ..Tessellation::new(DEFAULT_POINTS_TESSELLATION)
        };
        let tessellations = [default, points]
            .into_iter()
            .map(|t| (t.name.clone(), t))
            .collect();
        Self {
            tessellations,
            default_tessellation: DEFAULT_TESSELLATION.to_string(),
            default_points_tessellation: DEFAULT_POINTS_TESSELLATION.to_string(),
            changes: ChangeBatch::default(),
        }
    }

    pub fn begin_change(&mut self) {
        self.changes.begin();
    }

    pub fn end_change(&mut self) {
        self.changes.end();
    }

    pub fn define(&mut self, tessellation: Tessellation) {
        self.tessellations.insert(tessellation.name.clone(), tessellation);
        self.changes.changed();
    }

    pub fn find_tessellation_by_name(&self, name: &str) -> Option<&Tessellation> {
        self.tessellations.get(name)
    }

    pub fn tessellations(&self) -> impl Iterator<Item = &Tessellation> {
        self.tessellations.values()
    }

    pub fn default_tessellation(&self) -> &Tessellation {
        &self.tessellations[&self.default_tessellation]
    }

    pub fn default_points_tessellation(&self) -> &Tessellation {
        &self.tessellations[&self.default_points_tessellation]
    }

    pub fn write_description(&self) -> Result<Value, EngineError> {
        let description = TessellationsDescription {
            tessellations: self.tessellations.values().cloned().collect(),
            default_tessellation: Some(self.default_tessellation.clone()),
            default_points_tessellation: Some(self.default_points_tessellation.clone()),
        };
        Ok(serde_json::to_value(description)?)
    }

    pub fn read_description(&mut self, description: &Value) -> Result<(), EngineError> {
        let description: TessellationsDescription = serde_json::from_value(description.clone())?;
        for name in [
            &description.default_tessellation,
            &description.default_points_tessellation,
        ]
        .into_iter()
        .flatten()
        {
            let known = self.tessellations.contains_key(name)
                || description.tessellations.iter().any(|t| &t.name == name);
            if !known {
                return Err(EngineError::UnknownTessellation(name.clone()));
            }
        }

        self.begin_change();
        for tessellation in description.tessellations {
            self.define(tessellation);
        }
        if let Some(name) = description.default_tessellation {
            self.default_tessellation = name;
            self.changes.changed();
        }
        if let Some(name) = description.default_points_tessellation {
            self.default_points_tessellation = name;
            self.changes.changed();
        }
        self.end_change();
        Ok(())
    }
}
