//! Materials and the material module of a context.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{context::ChangeBatch, error::EngineError};

/// Name of the material every module starts with.
pub const DEFAULT_MATERIAL: &str = "default";

/// Surface colour and lighting response of graphics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Material {
    pub name: String,
    #[serde(default = "white")]
    pub ambient: [f64; 3],
    #[serde(default = "white")]
    pub diffuse: [f64; 3],
    #[serde(default)]
    pub emission: [f64; 3],
    #[serde(default)]
    pub specular: [f64; 3],
    #[serde(default = "opaque")]
    pub alpha: f64,
    #[serde(default)]
    pub shininess: f64,
    #[serde(default)]
    pub managed: bool,
}

fn white() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

fn opaque() -> f64 {
    1.0
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ambient: white(),
            diffuse: white(),
            emission: [0.0; 3],
            specular: [0.0; 3],
            alpha: opaque(),
            shininess: 0.0,
            managed: false,
        }
    }

    fn standard(
        name: &str,
        ambient: [f64; 3],
        diffuse: [f64; 3],
        specular: [f64; 3],
        shininess: f64,
    ) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            shininess,
            managed: true,
            ..Self::new(name)
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MaterialsDescription {
    #[serde(default)]
    materials: Vec<Material>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_surface_material: Option<String>,
}

/// All materials of one context, keyed by name.
#[derive(Debug)]
pub struct MaterialModule {
    materials: BTreeMap<String, Material>,
    default_material: String,
    default_surface_material: Option<String>,
    changes: ChangeBatch,
}

impl Default for MaterialModule {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialModule {
    pub fn new() -> Self {
        let mut default = Material::new(DEFAULT_MATERIAL);
        default.managed = true;
        let mut materials = BTreeMap::new();
        materials.insert(default.name.clone(), default);
        Self {
            materials,
            default_material: DEFAULT_MATERIAL.to_string(),
            default_surface_material: None,
            changes: ChangeBatch::default(),
        }
    }

    pub fn begin_change(&mut self) {
        self.changes.begin();
    }

    pub fn end_change(&mut self) {
        self.changes.end();
    }

    pub fn change_notifications(&self) -> u64 {
        self.changes.notifications()
    }

    /// Defines the standard palette of managed materials, replacing any
    /// material already using one of their names.
    pub fn define_standard_materials(&mut self) {
        self.begin_change();
        for material in standard_materials() {
            self.define(material);
        }
        self.end_change();
    }

    /// Adds `material`, replacing an existing material of the same name.
    pub fn define(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
        self.changes.changed();
    }

    pub fn find_material_by_name(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn default_material(&self) -> &Material {
        // the default name always refers to a defined material
        &self.materials[&self.default_material]
    }

    pub fn set_default_material(&mut self, name: &str) -> Result<(), EngineError> {
        self.require(name)?;
        self.default_material = name.to_string();
        self.changes.changed();
        Ok(())
    }

    /// Sets ambient and diffuse colour of the current default material.
    pub fn set_default_material_colour(&mut self, colour: [f64; 3]) {
        if let Some(material) = self.materials.get_mut(&self.default_material) {
            material.ambient = colour;
            material.diffuse = colour;
            self.changes.changed();
        }
    }

    pub fn default_surface_material(&self) -> Option<&Material> {
        self.default_surface_material
            .as_deref()
            .and_then(|name| self.materials.get(name))
    }

    pub fn set_default_surface_material(&mut self, name: &str) -> Result<(), EngineError> {
        self.require(name)?;
        self.default_surface_material = Some(name.to_string());
        self.changes.changed();
        Ok(())
    }

    pub fn write_description(&self) -> Result<Value, EngineError> {
        let description = MaterialsDescription {
            materials: self.materials.values().cloned().collect(),
            default_material: Some(self.default_material.clone()),
            default_surface_material: self.default_surface_material.clone(),
        };
        Ok(serde_json::to_value(description)?)
    }

    /// Defines or replaces every material of `description` and applies the
    /// named defaults. Nothing changes unless the whole description is valid.
    pub fn read_description(&mut self, description: &Value) -> Result<(), EngineError> {
        let description: MaterialsDescription = serde_json::from_value(description.clone())?;
        let known = |name: &str| {
            self.materials.contains_key(name)
                || description.materials.iter().any(|m| m.name == name)
        };
        for name in [&description.default_material, &description.default_surface_material]
            .into_iter()
            .flatten()
        {
            if !known(name) {
                return Err(EngineError::UnknownMaterial(name.clone()));
            }
        }

        self.begin_change();
        for material in description.materials {
            self.define(material);
        }
        if let Some(name) = description.default_material {
            self.default_material = name;
            self.changes.changed();
        }
        if let Some(name) = description.default_surface_material {
            self.default_surface_material = Some(name);
            self.changes.changed();
        }
        self.end_change();
        Ok(())
    }

    fn require(&self, name: &str) -> Result<(), EngineError> {
        if self.materials.contains_key(name) {
            Ok(())
        } else {
            Err(EngineError::UnknownMaterial(name.to_string()))
        }
    }
}

fn standard_materials() -> Vec<Material> {
    vec![
        Material::standard("black", [0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.3, 0.3, 0.3], 0.2),
        Material::standard("blue", [0.0, 0.0, 0.5], [0.0, 0.0, 1.0], [0.2, 0.2, 0.2], 0.2),
        Material::standard("bone", [0.7, 0.7, 0.6], [0.9, 0.9, 0.7], [0.1, 0.1, 0.1], 0.2),
        Material::standard("brown", [0.25, 0.15, 0.05], [0.5, 0.3, 0.1], [0.1, 0.1, 0.1], 0.2),
        Material::standard("gold", [1.0, 0.4, 0.0], [1.0, 0.7, 0.0], [0.5, 0.5, 0.5], 0.3),
        Material::standard("green", [0.0, 0.5, 0.0], [0.0, 1.0, 0.0], [0.2, 0.2, 0.2], 0.1),
        Material::standard("grey50", [0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.2, 0.2, 0.2], 0.2),
        Material::standard("muscle", [0.4, 0.14, 0.11], [0.5, 0.12, 0.1], [0.3, 0.5, 0.5], 0.2),
        Material::standard("orange", [0.5, 0.25, 0.0], [1.0, 0.5, 0.0], [0.2, 0.2, 0.2], 0.2),
        Material::standard("red", [0.5, 0.0, 0.0], [1.0, 0.0, 0.0], [0.2, 0.2, 0.2], 0.2),
        Material::standard("silver", [0.4, 0.4, 0.4], [0.7, 0.7, 0.7], [0.5, 0.5, 0.5], 0.3),
        Material::standard("tissue", [0.9, 0.7, 0.5], [0.9, 0.7, 0.5], [0.2, 0.2, 0.3], 0.2),
        Material::standard("white", [1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [0.0, 0.0, 0.0], 0.0),
        Material::standard("yellow", [0.5, 0.5, 0.0], [0.9, 0.9, 0.0], [0.1, 0.1, 0.1], 0.2),
    ]
}
