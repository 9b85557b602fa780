//! The document's region hierarchy.
//!
//! Regions live in a generational arena owned by [`RegionTree`]. Children are
//! stored as ordered lists of [`RegionId`]s, the parent as a plain id, so the
//! tree holds no reference cycles. Each region is bound to a node of the context's scene
//! graph; the engine owns the node, the region only remembers its id.
//!
//! Every mutation is announced as a [`RegionChange`] on the channels handed
//! out by [`RegionTree::connect_region_change`].

use std::path::{Path, PathBuf};

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    context::{Context, ContextId},
    data_structures::{
        arena::{Arena, ArenaIndex},
        material::Material,
        scene_graph::NodeId,
    },
    error::EngineError,
};

/// Identity of a region within its tree. An id stops resolving once its
/// region is removed, even after the slot is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(ArenaIndex);

/// Notification that `region` changed. `tree_changed` is set when the
/// structure below `region` changed or its engine objects were rebuilt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionChange {
    pub region: RegionId,
    pub tree_changed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GraphicsType {
    Points,
    Lines,
    Surfaces,
    Contours,
    Streamlines,
}

/// A graphics item drawn for a region. Resources are referenced by name and
/// must exist in the context when the graphics is added.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Graphics {
    #[serde(rename = "Type")]
    pub kind: GraphicsType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectrum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tessellation: Option<String>,
}

impl Graphics {
    pub fn new(kind: GraphicsType) -> Self {
        Self {
            kind,
            name: None,
            material: None,
            spectrum: None,
            tessellation: None,
        }
    }

    pub fn with_material(mut self, material: &str) -> Self {
        self.material = Some(material.to_string());
        self
    }

    pub fn with_spectrum(mut self, spectrum: &str) -> Self {
        self.spectrum = Some(spectrum.to_string());
        self
    }

    pub fn with_tessellation(mut self, tessellation: &str) -> Self {
        self.tessellation = Some(tessellation.to_string());
        self
    }

    /// The material these graphics are drawn with: the named one, otherwise
    /// the default surface material for surfaces and the default material
    /// for everything else.
    pub fn material_in<'a>(&self, ctx: &'a Context) -> Option<&'a Material> {
        let materials = &ctx.materials;
        match (&self.material, self.kind) {
            (Some(name), _) => materials.find_material_by_name(name),
            (None, GraphicsType::Surfaces) => materials
                .default_surface_material()
                .or_else(|| Some(materials.default_material())),
            (None, _) => Some(materials.default_material()),
        }
    }

    /// Checks that every referenced resource exists in `ctx`.
    fn resolve(&self, ctx: &Context) -> Result<(), EngineError> {
        if let Some(name) = &self.material {
            if ctx.materials.find_material_by_name(name).is_none() {
                return Err(EngineError::UnknownMaterial(name.clone()));
            }
        }
        if let Some(name) = &self.spectrum {
            if ctx.spectrums.find_spectrum_by_name(name).is_none() {
                return Err(EngineError::UnknownSpectrum(name.clone()));
            }
        }
        if let Some(name) = &self.tessellation {
            if ctx.tessellations.find_tessellation_by_name(name).is_none() {
                return Err(EngineError::UnknownTessellation(name.clone()));
            }
        }
        Ok(())
    }
}

/// Where a region's model data is read from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelSource {
    File {
        #[serde(rename = "FileName")]
        file_name: PathBuf,
    },
}

impl ModelSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File {
            file_name: path.into(),
        }
    }

    fn relative_to(&self, base_path: Option<&Path>) -> Self {
        match (self, base_path) {
            (Self::File { file_name }, Some(base)) => match file_name.strip_prefix(base) {
                Ok(relative) => Self::file(relative),
                Err(_) => self.clone(),
            },
            _ => self.clone(),
        }
    }

    fn resolved_against(self, base_path: Option<&Path>) -> Self {
        match (self, base_path) {
            (Self::File { file_name }, Some(base)) if file_name.is_relative() => {
                Self::file(base.join(file_name))
            }
            (source, _) => source,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ModelDescription {
    #[serde(default)]
    sources: Vec<ModelSource>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SceneDescription {
    #[serde(default)]
    graphics: Vec<Graphics>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RegionDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model: Option<ModelDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scene: Option<SceneDescription>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    child_regions: Vec<RegionDescription>,
}

impl RegionDescription {
    fn validate(&self, ctx: &Context, path: &str) -> Result<(), EngineError> {
        if let Some(scene) = &self.scene {
            for graphics in &scene.graphics {
                graphics.resolve(ctx)?;
            }
        }
        let mut names: Vec<&str> = Vec::with_capacity(self.child_regions.len());
        for child in &self.child_regions {
            let name = match child.name.as_deref() {
                Some(name) if !name.is_empty() => name,
                _ => {
                    return Err(invalid_description(format!(
                        "child region of '{}' has no name",
                        path
                    )));
                }
            };
            if names.contains(&name) {
                return Err(EngineError::DuplicateRegionName(format!("{}/{}", path, name)));
            }
            names.push(name);
            child.validate(ctx, &format!("{}/{}", path, name))?;
        }
        Ok(())
    }
}

fn invalid_description(message: String) -> EngineError {
    EngineError::InvalidDescription(<serde_json::Error as serde::de::Error>::custom(message))
}

/// A named node of the region hierarchy. Only the root has no name and no
/// parent.
#[derive(Clone, Debug)]
pub struct Region {
    name: Option<String>,
    scene_node: NodeId,
    parent: Option<RegionId>,
    children: Vec<RegionId>,
    sources: Vec<ModelSource>,
    graphics: Vec<Graphics>,
}

impl Region {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The engine node this region is bound to.
    pub fn scene_node(&self) -> NodeId {
        self.scene_node
    }

    pub fn parent(&self) -> Option<RegionId> {
        self.parent
    }

    pub fn children(&self) -> &[RegionId] {
        &self.children
    }

    pub fn sources(&self) -> &[ModelSource] {
        &self.sources
    }

    pub fn graphics(&self) -> &[Graphics] {
        &self.graphics
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[derive(Debug)]
pub struct RegionTree {
    context: ContextId,
    regions: Arena<Region>,
    root: RegionId,
    listeners: Vec<UnboundedSender<RegionChange>>,
}

impl RegionTree {
    /// Creates a tree whose root is bound to the context's default region.
    pub fn new(ctx: &Context) -> Self {
        let root = Region {
            name: None,
            scene_node: ctx.default_region(),
            parent: None,
            children: Vec::new(),
            sources: Vec::new(),
            graphics: Vec::new(),
        };
        let mut regions = Arena::default();
        let root = RegionId(regions.insert(root));
        Self {
            context: ctx.id(),
            regions,
            root,
            listeners: Vec::new(),
        }
    }

    pub fn context_id(&self) -> ContextId {
        self.context
    }

    pub fn root(&self) -> RegionId {
        self.root
    }

    pub fn root_region(&self) -> &Region {
        match self.region(self.root) {
            Some(region) => region,
            None => unreachable!("the root region is never removed"),
        }
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.0)
    }

    /// Number of regions, root included.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Number of region slots allocated, including free ones.
    pub fn capacity(&self) -> usize {
        self.regions.capacity()
    }

    pub fn find_child(&self, parent: RegionId, name: &str) -> Option<RegionId> {
        self.region(parent)?
            .children
            .iter()
            .copied()
            .find(|child| self.region(*child).and_then(Region::name) == Some(name))
    }

    /// Looks a region up by its `/` separated path from the root.
    pub fn find_region(&self, path: &str) -> Option<RegionId> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self.root, |region, name| self.find_child(region, name))
    }

    /// Subscribes to change notifications of every region in the tree.
    pub fn connect_region_change(&mut self) -> UnboundedReceiver<RegionChange> {
        let (sender, receiver) = mpsc::unbounded();
        self.listeners.push(sender);
        receiver
    }

    /// Sends a change notification to every subscriber.
    pub fn inform_region_change(&mut self, region: RegionId, tree_changed: bool) {
        let change = RegionChange {
            region,
            tree_changed,
        };
        self.listeners
            .retain(|listener| listener.unbounded_send(change).is_ok());
    }

    pub fn create_child(
        &mut self,
        ctx: &mut Context,
        parent: RegionId,
        name: &str,
    ) -> Result<RegionId, EngineError> {
        ctx.check_scope(self.context)?;
        if name.is_empty() {
            return Err(invalid_description("region names cannot be empty".to_string()));
        }
        let parent_node = self.existing(parent)?.scene_node;
        if self.find_child(parent, name).is_some() {
            return Err(EngineError::DuplicateRegionName(name.to_string()));
        }
        let scene_node = ctx
            .scene_graph
            .create_child(parent_node, name)
            .ok_or(EngineError::InvalidRegion(parent))?;
        let child = self.insert(Region {
            name: Some(name.to_string()),
            scene_node,
            parent: Some(parent),
            children: Vec::new(),
            sources: Vec::new(),
            graphics: Vec::new(),
        });
        self.existing_mut(parent)?.children.push(child);
        self.inform_region_change(parent, true);
        Ok(child)
    }

    /// Removes a non-root region, its descendants and their scene nodes.
    pub fn remove_region(
        &mut self,
        ctx: &mut Context,
        region: RegionId,
    ) -> Result<(), EngineError> {
        ctx.check_scope(self.context)?;
        let Some(parent) = self.existing(region)?.parent else {
            return Err(EngineError::InvalidRegion(region));
        };
        let scene_node = self.existing(region)?.scene_node;
        ctx.scene_graph.remove_subtree(scene_node);
        self.existing_mut(parent)?.children.retain(|child| *child != region);
        self.discard_subtree(region);
        self.inform_region_change(parent, true);
        Ok(())
    }

    pub fn rename(
        &mut self,
        ctx: &mut Context,
        region: RegionId,
        name: &str,
    ) -> Result<(), EngineError> {
        ctx.check_scope(self.context)?;
        let Some(parent) = self.existing(region)?.parent else {
            return Err(EngineError::RootRegionName);
        };
        if name.is_empty() {
            return Err(invalid_description("region names cannot be empty".to_string()));
        }
        if let Some(sibling) = self.find_child(parent, name) {
            if sibling != region {
                return Err(EngineError::DuplicateRegionName(name.to_string()));
            }
        }
        let node = self.existing_mut(region)?;
        node.name = Some(name.to_string());
        let scene_node = node.scene_node;
        ctx.scene_graph.rename(scene_node, name);
        self.inform_region_change(region, false);
        Ok(())
    }

    pub fn add_source(&mut self, region: RegionId, source: ModelSource) -> Result<(), EngineError> {
        self.existing_mut(region)?.sources.push(source);
        self.inform_region_change(region, false);
        Ok(())
    }

    pub fn add_graphics(
        &mut self,
        ctx: &Context,
        region: RegionId,
        graphics: Graphics,
    ) -> Result<(), EngineError> {
        ctx.check_scope(self.context)?;
        graphics.resolve(ctx)?;
        self.existing_mut(region)?.graphics.push(graphics);
        self.inform_region_change(region, false);
        Ok(())
    }

    pub fn clear_graphics(&mut self, region: RegionId) -> Result<(), EngineError> {
        self.existing_mut(region)?.graphics.clear();
        self.inform_region_change(region, false);
        Ok(())
    }

    /// Describes the whole tree. Model files below `base_path` are written
    /// relative to it.
    pub fn serialize(&self, ctx: &Context, base_path: Option<&Path>) -> Result<Value, EngineError> {
        ctx.check_scope(self.context)?;
        let description = self.describe(self.root, base_path)?;
        Ok(serde_json::to_value(description)?)
    }

    /// Replaces the whole tree with `blob`.
    ///
    /// The description is parsed and every graphics reference resolved
    /// against `ctx` before anything changes. The root keeps its
    /// [`RegionId`] but is bound to a newly created scene node, the old
    /// scene nodes are removed, and `(root, true)` is announced. Relative
    /// model files are resolved against `base_path`.
    pub fn deserialize(
        &mut self,
        ctx: &mut Context,
        blob: &Value,
        base_path: Option<&Path>,
    ) -> Result<(), EngineError> {
        ctx.check_scope(self.context)?;
        let description: RegionDescription = serde_json::from_value(blob.clone())?;
        if let Some(name) = &description.name {
            log::warn!("ignoring name '{}' given to the root region", name);
        }
        description.validate(ctx, "")?;

        ctx.scene_graph.begin_hierarchical_change();
        let old_node = self.root_region().scene_node;
        let children = self.root_region().children.clone();
        for child in children {
            self.discard_subtree(child);
        }
        let new_node = ctx.scene_graph.create_root();
        ctx.scene_graph.remove_subtree(old_node);
        let root = self.existing_mut(self.root)?;
        root.scene_node = new_node;
        root.children.clear();
        let result = self.build(ctx, self.root, description, base_path);
        ctx.scene_graph.end_hierarchical_change();
        result?;

        log::debug!(
            "rebuilt region tree with {} regions in context '{}'",
            self.region_count(),
            ctx.name()
        );
        self.inform_region_change(self.root, true);
        Ok(())
    }

    /// Drops every region below the root together with their scene nodes and
    /// closes all change subscriptions.
    pub fn free_contents(&mut self, ctx: &mut Context) {
        if ctx.check_scope(self.context).is_err() {
            log::warn!("region tree freed with a foreign context; scene nodes are left alone");
        } else {
            for child in self.root_region().children.clone() {
                if let Some(region) = self.region(child) {
                    ctx.scene_graph.remove_subtree(region.scene_node);
                }
            }
        }
        for child in self.root_region().children.clone() {
            self.discard_subtree(child);
        }
        if let Some(root) = self.regions.get_mut(self.root.0) {
            root.children.clear();
            root.sources.clear();
            root.graphics.clear();
        }
        self.listeners.clear();
    }

    fn build(
        &mut self,
        ctx: &mut Context,
        region: RegionId,
        description: RegionDescription,
        base_path: Option<&Path>,
    ) -> Result<(), EngineError> {
        let parent_node = {
            let target = self.existing_mut(region)?;
            target.sources = description
                .model
                .map(|model| {
                    model
                        .sources
                        .into_iter()
                        .map(|source| source.resolved_against(base_path))
                        .collect()
                })
                .unwrap_or_default();
            target.graphics = description
                .scene
                .map(|scene| scene.graphics)
                .unwrap_or_default();
            target.scene_node
        };
        for child_description in description.child_regions {
            let name = child_description.name.clone().unwrap_or_default();
            let scene_node = ctx
                .scene_graph
                .create_child(parent_node, &name)
                .ok_or(EngineError::InvalidRegion(region))?;
            let child = self.insert(Region {
                name: Some(name),
                scene_node,
                parent: Some(region),
                children: Vec::new(),
                sources: Vec::new(),
                graphics: Vec::new(),
            });
            self.existing_mut(region)?.children.push(child);
            self.build(ctx, child, child_description, base_path)?;
        }
        Ok(())
    }

    fn describe(
        &self,
        region: RegionId,
        base_path: Option<&Path>,
    ) -> Result<RegionDescription, EngineError> {
        let node = self.existing(region)?;
        let model = (!node.sources.is_empty()).then(|| ModelDescription {
            sources: node
                .sources
                .iter()
                .map(|source| source.relative_to(base_path))
                .collect(),
        });
        let scene = (!node.graphics.is_empty()).then(|| SceneDescription {
            graphics: node.graphics.clone(),
        });
        let child_regions = node
            .children
            .iter()
            .map(|child| self.describe(*child, base_path))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RegionDescription {
            name: node.name.clone(),
            model,
            scene,
            child_regions,
        })
    }

    fn insert(&mut self, region: Region) -> RegionId {
        RegionId(self.regions.insert(region))
    }

    /// Forgets `region` and its descendants. Scene nodes are not touched.
    fn discard_subtree(&mut self, region: RegionId) {
        let mut pending = vec![region];
        while let Some(id) = pending.pop() {
            if let Some(removed) = self.regions.remove(id.0) {
                pending.extend(removed.children);
            }
        }
    }

    fn existing(&self, region: RegionId) -> Result<&Region, EngineError> {
        self.region(region).ok_or(EngineError::InvalidRegion(region))
    }

    fn existing_mut(&mut self, region: RegionId) -> Result<&mut Region, EngineError> {
        self.regions
            .get_mut(region.0)
            .ok_or(EngineError::InvalidRegion(region))
    }
}
