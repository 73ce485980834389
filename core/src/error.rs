//! Error types for extraction and the native lifecycle

use crate::authoring::PropertyKind;
use crate::registry::InstanceHandle;

/// Failure while reading authoring data into model records.
///
/// All variants are fatal for the emitter being assembled: no partial
/// state is ever returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractError {
    #[error("property not found: {path}")]
    PropertyNotFound { path: String },

    #[error("property {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: PropertyKind,
        found: PropertyKind,
    },

    #[error("property {path}: count {count} outside 0..={max}")]
    CountMismatch { path: String, count: i32, max: i32 },

    #[error("unsupported authoring schema version {found} (supported: {supported})")]
    SchemaVersion { found: u32, supported: u32 },
}

/// Lifecycle call issued out of order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequencingViolation {
    #[error("instance has not been created")]
    NotCreated,

    #[error("instance has already been created as {0}")]
    AlreadyCreated(InstanceHandle),

    #[error("instance has been destroyed")]
    Destroyed,

    #[error("stale handle {0}: instance was destroyed")]
    StaleHandle(InstanceHandle),

    #[error("render for {handle} before its update in frame {frame}")]
    RenderBeforeUpdate { handle: InstanceHandle, frame: u64 },

    #[error("destroy for {0} while still scheduled in the frame loop")]
    DestroyWhileScheduled(InstanceHandle),
}

/// Failure at the native boundary or in instance bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("handle {0} does not name a registry slot")]
    InvalidIndex(InstanceHandle),

    #[error(transparent)]
    Sequencing(#[from] SequencingViolation),

    #[error("native engine refused to create a particle system (returned {index})")]
    CreateFailed { index: i32 },

    #[error("native engine returned index {index}, which is already live")]
    DuplicateIndex { index: i32 },

    #[error("instance capacity of {max} reached")]
    CapacityExceeded { max: usize },

    #[error("a native engine is already started in this process")]
    AlreadyStarted,

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[cfg(feature = "dylib")]
    #[error("native library {path}: {source}")]
    Library {
        path: String,
        #[source]
        source: libloading::Error,
    },
}

impl BridgeError {
    /// Whether this error came from misordered calls rather than the engine.
    pub fn is_sequencing(&self) -> bool {
        matches!(self, Self::Sequencing(_))
    }
}
