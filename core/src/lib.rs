//! fxbridge core - authoring-to-native particle bridge
//!
//! This crate turns an authoring-side particle effect description into the
//! flat [`ParticleInitState`] record a native particle engine consumes, and
//! drives the per-instance lifecycle and per-frame protocol with that engine.
//!
//! # Architecture
//!
//! - [`authoring`] - [`AuthoringSource`] and the JSON-backed [`PropertyTree`]
//! - [`schema`] - the versioned mapping from logical fields to property paths
//! - [`extract`] - curve and gradient extraction
//! - [`assemble`] - [`StateAssembler`], one emitter's full configuration
//! - [`abi`] - `#[repr(C)]` views handed across the native boundary
//! - [`native`] - the [`NativeEngine`] trait, headless and shared-library engines
//! - [`context`] - [`NativeContext`], explicit startup/shutdown ownership
//! - [`registry`] - generational [`InstanceRegistry`]
//! - [`bridge`] / [`render`] - per-frame update submission and render dispatch
//! - [`emitter`] / [`runtime`] - the owning entity and the cooperative frame loop

pub mod abi;
pub mod assemble;
pub mod authoring;
pub mod bridge;
pub mod config;
pub mod context;
pub mod emitter;
pub mod error;
pub mod extract;
pub mod native;
pub mod registry;
pub mod render;
pub mod runtime;
pub mod schema;
#[cfg(test)]
pub(crate) mod test_utils;

pub use fxbridge_shared::{
    AlphaKey, ColorKey, ColorRgba32, Curve, FrameData, Gradient, KeyFrame, Matrix4x4,
    ParticleInitState, ShapeModuleData, SubCurve, SubGradient, UpdateData,
};

pub use assemble::StateAssembler;
pub use authoring::{AuthoringSource, PropertyKind, PropertyTree, PropertyValue};
pub use bridge::{FrameUpdateBridge, to_native};
pub use config::{BridgeConfig, ExtractionConfig, LoggingConfig, RuntimeConfig};
pub use context::NativeContext;
pub use emitter::{EmitterLifecycle, ParticleEmitter};
pub use error::{BridgeError, ExtractError, SequencingViolation};
pub use extract::{extract_curve, extract_gradient};
pub use native::{
    EngineCall, HeadlessEngine, LogSink, NativeEngine, NullSink, RenderRole, SharedLogSink,
    TracingSink,
};
#[cfg(feature = "dylib")]
pub use native::NativeLibrary;
pub use registry::{InstanceHandle, InstanceRegistry};
pub use render::{DrawState, NullDrawState, RenderDispatcher};
pub use runtime::{EmitterId, FrameLoop, FrameReport};
pub use schema::{CurvePath, GradientPath, PropertyPath, SCHEMA_VERSION};
