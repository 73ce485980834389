//! Shared data model for fxbridge.
//!
//! These are the flattened, fixed-shape records that carry one emitter's
//! configuration from the authoring side to the native particle engine.
//! Everything here is plain data: extraction lives in `fxbridge-core`.
//!
//! # Layout
//!
//! - [`curve`] - keyframes, min/max sub-curves and [`Curve`]
//! - [`gradient`] - color/alpha keys and the min/max [`Gradient`]
//! - [`shape`] - emitter shape parameters
//! - [`state`] - the aggregate [`ParticleInitState`], per-frame [`FrameData`] and [`UpdateData`]
//! - [`codes`] - typed views over the raw integer codes the engine understands
//! - [`math`] - POD 4x4 matrix used on the wire

pub mod codes;
pub mod color;
pub mod curve;
pub mod error;
pub mod gradient;
pub mod math;
mod sequence;
pub mod shape;
pub mod state;

pub use codes::{MinMaxCurveState, MinMaxGradientState, ShapeType, WrapMode};
pub use color::ColorRgba32;
pub use curve::{Curve, KeyFrame, MAX_CURVE_KEYS, SubCurve};
pub use error::ModelError;
pub use gradient::{AlphaKey, ColorKey, Gradient, MAX_GRADIENT_KEYS, SubGradient};
pub use math::Matrix4x4;
pub use shape::ShapeModuleData;
pub use state::{FrameData, ParticleInitState, UpdateData};
