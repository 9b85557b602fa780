//! Error types for documents and the in-memory engine.
//!
//! [`EngineError`] is what the visualisation context and the document
//! collaborators report. [`DocumentError`] is the single category callers of
//! [`crate::document::Document`] match on.

use thiserror::Error;

use crate::{
    context::ContextId,
    document::Section,
    region::RegionId,
    version::Version,
};

/// Failures raised by the visualisation context and its collaborators.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("object belongs to context {expected:?} but was used with context {found:?}")]
    ForeignContext { expected: ContextId, found: ContextId },

    #[error("invalid description: {0}")]
    InvalidDescription(#[from] serde_json::Error),

    #[error("material '{0}' not found")]
    UnknownMaterial(String),

    #[error("spectrum '{0}' not found")]
    UnknownSpectrum(String),

    #[error("tessellation '{0}' not found")]
    UnknownTessellation(String),

    #[error("invalid scene viewer state: {0}")]
    InvalidViewer(String),

    #[error("region '{0}' already has a child with this name")]
    DuplicateRegionName(String),

    #[error("region {0:?} does not exist")]
    InvalidRegion(RegionId),

    #[error("the root region cannot be named")]
    RootRegionName,
}

/// Failures raised by [`crate::document::Document`].
///
/// Everything for which [`DocumentError::is_document_error`] returns `true`
/// means "the document text is bad". After such an error from `deserialize`
/// the document may be partially updated and should be freed and
/// re-initialised.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid document: missing \"{0}\"")]
    InvalidDocument(String),

    #[error(
        "Document version {found} is greater than this version ({supported}). Please update your application."
    )]
    UnsupportedVersion { found: Version, supported: Version },

    #[error("Malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Malformed \"{section}\" section: {source}")]
    Section {
        section: Section,
        #[source]
        source: EngineError,
    },

    #[error("Document is already initialised")]
    AlreadyInitialized,

    #[error("Document is not initialised")]
    NotInitialized,

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Document I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl DocumentError {
    /// Whether the error is caused by the document contents rather than by
    /// misuse of the API.
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDocument(_)
                | Self::UnsupportedVersion { .. }
                | Self::Malformed(_)
                | Self::Section { .. }
        )
    }
}

pub type Result<T, E = DocumentError> = std::result::Result<T, E>;
