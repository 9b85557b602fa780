use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    data_structures::{
        glyph::GlyphModule, material::MaterialModule, scene_graph::{NodeId, SceneGraph},
        sceneviewer::SceneviewerModule, spectrum::SpectrumModule,
        tessellation::TessellationModule,
    },
    error::EngineError,
};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Context`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

/// A visualisation context: one in-memory engine instance.
///
/// The context owns the scene graph and the modules holding materials,
/// spectrums, tessellations, glyphs and scene viewer defaults. Objects built
/// on top of a context remember its [`ContextId`] and are handed the context
/// on every call.
#[derive(Debug)]
pub struct Context {
    id: ContextId,
    name: String,
    default_region: NodeId,
    pub scene_graph: SceneGraph,
    pub materials: MaterialModule,
    pub spectrums: SpectrumModule,
    pub tessellations: TessellationModule,
    pub glyphs: GlyphModule,
    pub sceneviewers: SceneviewerModule,
}

impl Context {
    pub fn new(name: &str) -> Self {
        let id = ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed));
        let mut scene_graph = SceneGraph::new();
        let default_region = scene_graph.create_root();
        log::debug!("created context '{}' ({:?})", name, id);
        Self {
            id,
            name: name.to_string(),
            default_region,
            scene_graph,
            materials: MaterialModule::new(),
            spectrums: SpectrumModule::new(),
            tessellations: TessellationModule::new(),
            glyphs: GlyphModule::new(),
            sceneviewers: SceneviewerModule::new(),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The scene-graph node new scene viewers and tools start from.
    pub fn default_region(&self) -> NodeId {
        self.default_region
    }

    pub fn set_default_region(&mut self, node: NodeId) {
        if !self.scene_graph.contains(node) {
            log::warn!("default region of '{}' set to removed node {:?}", self.name, node);
        }
        self.default_region = node;
    }

    /// Fails unless `owner` is this context.
    pub fn check_scope(&self, owner: ContextId) -> Result<(), EngineError> {
        if owner == self.id {
            Ok(())
        } else {
            Err(EngineError::ForeignContext {
                expected: owner,
                found: self.id,
            })
        }
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        log::debug!(
            "destroying context '{}' with {} scene nodes",
            self.name,
            self.scene_graph.len()
        );
    }
}

/// Coalesces change notifications between `begin` and the matching `end`.
///
/// Brackets nest; only the outermost `end` emits the single pending
/// notification.
#[derive(Debug, Default)]
pub struct ChangeBatch {
    depth: u32,
    pending: bool,
    notifications: u64,
}

impl ChangeBatch {
    pub fn begin(&mut self) {
        self.depth += 1;
    }

    pub fn end(&mut self) {
        match self.depth {
            0 => log::warn!("end of change without a matching begin"),
            1 => {
                self.depth = 0;
                if self.pending {
                    self.pending = false;
                    self.notifications += 1;
                }
            }
            _ => self.depth -= 1,
        }
    }

    pub fn changed(&mut self) {
        if self.depth > 0 {
            self.pending = true;
        } else {
            self.notifications += 1;
        }
    }

    pub fn is_batching(&self) -> bool {
        self.depth > 0
    }

    /// Number of notifications sent so far.
    pub fn notifications(&self) -> u64 {
        self.notifications
    }
}
