//! Engine data structures: scene graph nodes and the resource modules of a
//! visualisation context.
//!
//! - `arena` is the generational slot storage behind scene nodes and regions
//! - `scene_graph` holds the hierarchical scene nodes regions are bound to
//! - `material` contains material definitions and the material module
//! - `spectrum` contains colour spectrums for mapping field values
//! - `tessellation` controls the resolution curved elements are drawn at
//! - `glyph` lists the glyphs point graphics can use
//! - `sceneviewer` holds scene viewer defaults

pub mod arena;
pub mod glyph;
pub mod material;
pub mod scene_graph;
pub mod sceneviewer;
pub mod spectrum;
pub mod tessellation;
