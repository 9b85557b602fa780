//! Documents: the live visualisation context plus everything persisted with it.
//!
//! A [`Document`] is either uninitialised or live. [`Document::initialise`]
//! creates the context and its collaborators (region tree, the three resource
//! registries and the viewer state); [`Document::free`] releases them again,
//! region tree first. Only a live document can be serialized or deserialized.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "Materials": { ... },
//!   "OpenCMISS-Argon Version": [0, 1, 0],
//!   "RootRegion": { ... },
//!   "Sceneviewer": { ... },
//!   "Spectrums": { ... },
//!   "Tessellations": { ... }
//! }
//! ```
//!
//! Keys are sorted and indented by two spaces. When reading, every section
//! except `RootRegion` may be omitted.

use std::{fmt, path::Path};

use futures::channel::mpsc::UnboundedReceiver;
use instant::Instant;
use serde_json::{Map, Value};

use crate::{
    config::DocumentConfig,
    context::Context,
    error::{DocumentError, EngineError, Result},
    region::{RegionChange, RegionTree},
    resources::{Materials, Spectrums, Tessellations},
    version::Version,
    viewer::ViewerState,
};

pub const PRODUCT_NAME: &str = "OpenCMISS-Argon";

/// Top-level key holding the [`Version`] of the writing application.
pub const VERSION_KEY: &str = "OpenCMISS-Argon Version";

/// A top-level section of a serialized document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    RootRegion,
    Spectrums,
    Materials,
    Tessellations,
    Sceneviewer,
}

impl Section {
    pub const fn key(self) -> &'static str {
        match self {
            Section::RootRegion => "RootRegion",
            Section::Spectrums => "Spectrums",
            Section::Materials => "Materials",
            Section::Tessellations => "Tessellations",
            Section::Sceneviewer => "Sceneviewer",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

type ApplyFn = fn(&mut Live, &Value, Option<&Path>) -> Result<(), EngineError>;

/// Order in which [`Document::deserialize`] applies sections.
///
/// Resources come before the region tree because region graphics resolve
/// them by name while the tree is built. Materials are applied a second
/// time after the scene viewer; reading a materials section is idempotent.
const APPLY_ORDER: [(Section, ApplyFn); 6] = [
    (Section::Tessellations, apply_tessellations as ApplyFn),
    (Section::Spectrums, apply_spectrums as ApplyFn),
    (Section::Materials, apply_materials as ApplyFn),
    (Section::Sceneviewer, apply_sceneviewer as ApplyFn),
    (Section::Materials, apply_materials as ApplyFn),
    (Section::RootRegion, apply_root_region as ApplyFn),
];

/// The sections in the order they are applied when deserializing.
pub fn apply_order() -> impl Iterator<Item = Section> {
    APPLY_ORDER.into_iter().map(|(section, _)| section)
}

fn apply_tessellations(
    live: &mut Live,
    blob: &Value,
    _: Option<&Path>,
) -> Result<(), EngineError> {
    live.tessellations.deserialize(&mut live.context, blob)
}

fn apply_spectrums(
    live: &mut Live,
    blob: &Value,
    _: Option<&Path>,
) -> Result<(), EngineError> {
    live.spectrums.deserialize(&mut live.context, blob)
}

fn apply_materials(
    live: &mut Live,
    blob: &Value,
    _: Option<&Path>,
) -> Result<(), EngineError> {
    live.materials.deserialize(&mut live.context, blob)
}

fn apply_sceneviewer(
    live: &mut Live,
    blob: &Value,
    _: Option<&Path>,
) -> Result<(), EngineError> {
    live.viewer.deserialize(&live.context, blob)
}

fn apply_root_region(
    live: &mut Live,
    blob: &Value,
    base_path: Option<&Path>,
) -> Result<(), EngineError> {
    live.root_region.deserialize(&mut live.context, blob, base_path)
}

/// Everything a live document owns. Fields are listed in release order.
#[derive(Debug)]
struct Live {
    root_region: RegionTree,
    region_changes: UnboundedReceiver<RegionChange>,
    viewer: ViewerState,
    tessellations: Tessellations,
    spectrums: Spectrums,
    materials: Materials,
    context: Context,
}

impl Live {
    /// Handles every queued region change. Returns how many were queued.
    fn process_region_changes(&mut self) -> usize {
        let mut count = 0;
        while let Ok(change) = self.region_changes.try_recv() {
            self.region_change(change);
            count += 1;
        }
        count
    }

    /// A structural change of the root may have replaced its scene node; the
    /// context's default region must follow it.
    fn region_change(&mut self, change: RegionChange) {
        if change.tree_changed && change.region == self.root_region.root() {
            let scene_node = self.root_region.root_region().scene_node();
            log::debug!("root region rebuilt; default region is now {:?}", scene_node);
            self.context.set_default_region(scene_node);
        }
    }

    fn release(self) {
        let Live {
            mut root_region,
            region_changes,
            viewer,
            tessellations,
            spectrums,
            materials,
            mut context,
        } = self;
        // scene nodes go before anything they may refer to
        root_region.free_contents(&mut context);
        drop(region_changes);
        drop(root_region);
        drop(viewer);
        drop(tessellations);
        drop(spectrums);
        drop(materials);
        log::info!("freed document context '{}'", context.name());
        drop(context);
    }
}

/// A persisted visualisation scene.
#[derive(Debug, Default)]
pub struct Document {
    config: DocumentConfig,
    live: Option<Live>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DocumentConfig) -> Self {
        Self { config, live: None }
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// Creates the visualisation context and all collaborators.
    ///
    /// The configuration is applied to the new context here: scene viewer
    /// background, the standard materials with a default material coloured
    /// `default_material_colour` and surfaces defaulting to
    /// `default_surface_material`, and the standard glyphs. On failure the
    /// document stays uninitialised.
    pub fn initialise(&mut self) -> Result<()> {
        if self.live.is_some() {
            return Err(DocumentError::AlreadyInitialized);
        }
        let config = &self.config;
        let mut context = Context::new(&config.context_name);
        context
            .sceneviewers
            .set_default_background_colour(config.background_colour);

        context.materials.begin_change();
        context.materials.define_standard_materials();
        context
            .materials
            .set_default_material_colour(config.default_material_colour);
        let surface = context
            .materials
            .set_default_surface_material(&config.default_surface_material);
        context.materials.end_change();
        surface?;
        context.glyphs.define_standard_glyphs();

        let mut root_region = RegionTree::new(&context);
        let region_changes = root_region.connect_region_change();
        let live = Live {
            root_region,
            region_changes,
            viewer: ViewerState::new(&context),
            tessellations: Tessellations::new(&context),
            spectrums: Spectrums::new(&context),
            materials: Materials::new(&context),
            context,
        };
        log::info!("initialised {} document context '{}'", PRODUCT_NAME, live.context.name());
        self.live = Some(live);
        Ok(())
    }

    /// Releases the context and all collaborators.
    ///
    /// Freeing an uninitialised document fails with
    /// [`DocumentError::NotInitialized`].
    pub fn free(&mut self) -> Result<()> {
        let live = self.live.take().ok_or(DocumentError::NotInitialized)?;
        live.release();
        Ok(())
    }

    pub fn context(&self) -> Result<&Context> {
        Ok(&self.live()?.context)
    }

    pub fn root_region(&self) -> Result<&RegionTree> {
        Ok(&self.live()?.root_region)
    }

    pub fn spectrums(&self) -> Result<&Spectrums> {
        Ok(&self.live()?.spectrums)
    }

    pub fn materials(&self) -> Result<&Materials> {
        Ok(&self.live()?.materials)
    }

    pub fn tessellations(&self) -> Result<&Tessellations> {
        Ok(&self.live()?.tessellations)
    }

    pub fn sceneviewer(&self) -> Result<&ViewerState> {
        Ok(&self.live()?.viewer)
    }

    pub fn sceneviewer_mut(&mut self) -> Result<&mut ViewerState> {
        Ok(&mut self.live_mut()?.viewer)
    }

    /// Runs `edit` on the region tree and then handles the region changes it
    /// caused.
    pub fn edit_regions<R>(
        &mut self,
        edit: impl FnOnce(&mut RegionTree, &mut Context) -> R,
    ) -> Result<R> {
        let live = self.live_mut()?;
        let result = edit(&mut live.root_region, &mut live.context);
        live.process_region_changes();
        Ok(result)
    }

    /// Handles queued region changes; returns how many there were.
    pub fn process_region_changes(&mut self) -> Result<usize> {
        Ok(self.live_mut()?.process_region_changes())
    }

    /// Writes the whole document as pretty-printed JSON. Model files below
    /// `base_path` are written relative to it.
    pub fn serialize(&self, base_path: Option<&Path>) -> Result<String> {
        let live = self.live()?;
        let ctx = &live.context;
        let sections = [
            (Section::Spectrums, live.spectrums.serialize(ctx)),
            (Section::Materials, live.materials.serialize(ctx)),
            (Section::Tessellations, live.tessellations.serialize(ctx)),
            (Section::RootRegion, live.root_region.serialize(ctx, base_path)),
            (Section::Sceneviewer, live.viewer.serialize(ctx)),
        ];

        let mut document = Map::new();
        document.insert(VERSION_KEY.to_string(), serde_json::to_value(Version::CURRENT)?);
        for (section, blob) in sections {
            document.insert(section.key().to_string(), blob?);
        }
        Ok(serde_json::to_string_pretty(&Value::Object(document))?)
    }

    /// Reads a document produced by [`Document::serialize`].
    ///
    /// The version header and the presence of `RootRegion` are checked before
    /// any section is applied. Sections are then applied one after another;
    /// if one fails, the ones before it stay applied and the document should
    /// be freed and initialised again.
    pub fn deserialize(&mut self, text: &str) -> Result<()> {
        self.deserialize_relative_to(text, None)
    }

    /// Like [`Document::deserialize`], resolving relative model files against
    /// `base_path`.
    pub fn deserialize_relative_to(&mut self, text: &str, base_path: Option<&Path>) -> Result<()> {
        let live = self.live_mut()?;
        let start = Instant::now();

        let document: Value = serde_json::from_str(text)?;
        let Value::Object(sections) = document else {
            return Err(DocumentError::InvalidDocument(VERSION_KEY.to_string()));
        };
        let Some(version) = sections.get(VERSION_KEY) else {
            return Err(DocumentError::InvalidDocument(VERSION_KEY.to_string()));
        };
        if !sections.contains_key(Section::RootRegion.key()) {
            return Err(DocumentError::InvalidDocument(
                Section::RootRegion.key().to_string(),
            ));
        }
        let version: Version = serde_json::from_value(version.clone())?;
        if !version.is_supported() {
            return Err(DocumentError::UnsupportedVersion {
                found: version,
                supported: Version::CURRENT,
            });
        }
        if version < Version::CURRENT {
            log::debug!("reading document version {} with {}", version, Version::CURRENT);
        }

        // No change bracket encloses the whole load: graphics resolve their
        // resources while the region tree is built, so every section has to
        // be visible as soon as it is applied.
        for (section, apply) in APPLY_ORDER {
            let Some(blob) = sections.get(section.key()) else {
                continue;
            };
            apply(live, blob, base_path)
                .map_err(|source| DocumentError::Section { section, source })?;
        }
        let changes = live.process_region_changes();
        log::debug!(
            "deserialized document in {:?} ({} region changes)",
            start.elapsed(),
            changes
        );
        Ok(())
    }

    /// Serializes into `path`, writing model files relative to its directory.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.serialize(path.parent())?;
        std::fs::write(path, text)?;
        log::info!("saved document to {}", path.display());
        Ok(())
    }

    /// Deserializes `path`, resolving relative model files against its
    /// directory.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        self.deserialize_relative_to(&text, path.parent())?;
        log::info!("loaded document from {}", path.display());
        Ok(())
    }

    fn live(&self) -> Result<&Live> {
        self.live.as_ref().ok_or(DocumentError::NotInitialized)
    }

    fn live_mut(&mut self) -> Result<&mut Live> {
        self.live.as_mut().ok_or(DocumentError::NotInitialized)
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        if let Some(live) = self.live.take() {
            live.release();
        }
    }
}
