//! argon-scene
//!
//! Versioned JSON documents for 3D visualisation scenes. A document owns a
//! visualisation context (a small in-memory scene-graph engine), a tree of
//! named regions bound to the context's scene graph, registries of shared
//! materials, spectrums and tessellations, and the scene viewer state. It can
//! be initialised, freed, and written to or read from one JSON document.
//!
//! High-level modules
//! - `config`: settings applied to a new context during initialisation
//! - `context`: the visualisation context and its change batching
//! - `data_structures`: scene graph nodes and the context's resource modules
//! - `document`: document lifecycle and the serialization protocol
//! - `error`: document and engine errors
//! - `region`: the region tree and its change notifications
//! - `resources`: document-level registries of materials, spectrums and tessellations
//! - `version`: the document version triple
//! - `viewer`: camera and viewport state
//!

pub mod config;
pub mod context;
pub mod data_structures;
pub mod document;
pub mod error;
pub mod region;
pub mod resources;
pub mod version;
pub mod viewer;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::{Deg, Point3, Vector3};
pub use config::DocumentConfig;
pub use document::{Document, Section};
pub use error::{DocumentError, EngineError};
pub use version::Version;
