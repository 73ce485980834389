//! Keyframed min/max curves
//!
//! A [`Curve`] is two piecewise keyframe sequences (min and max) plus a
//! `min_max_state` code selecting how they combine with `scalar`. Evaluation
//! happens on the native side; this module only carries the data.

use bitcode::{Decode, Encode};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::codes::{MinMaxCurveState, WrapMode};
use crate::error::ModelError;
use crate::sequence;

/// Largest keyframe count accepted per sub-curve.
pub const MAX_CURVE_KEYS: i32 = 1024;

/// One control point of a curve (16 bytes, POD).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize, Encode, Decode,
)]
#[repr(C)]
pub struct KeyFrame {
    pub time: f32,
    pub value: f32,
    pub in_slope: f32,
    pub out_slope: f32,
}

impl KeyFrame {
    pub const fn new(time: f32, value: f32, in_slope: f32, out_slope: f32) -> Self {
        Self {
            time,
            value,
            in_slope,
            out_slope,
        }
    }

    /// Keyframe with flat tangents.
    pub const fn flat(time: f32, value: f32) -> Self {
        Self::new(time, value, 0.0, 0.0)
    }
}

/// A keyframe sequence with its extrapolation codes.
///
/// The keyframe count is derived from the stored sequence, and zero keyframes
/// are always stored as an absent sequence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct SubCurve {
    #[serde(default, deserialize_with = "sequence::deserialize")]
    key_frames: Option<Vec<KeyFrame>>,
    pub pre_infinity: i32,
    pub post_infinity: i32,
}

impl SubCurve {
    pub fn new(key_frames: Vec<KeyFrame>, pre_infinity: i32, post_infinity: i32) -> Self {
        Self {
            key_frames: sequence::from_vec(key_frames),
            pre_infinity,
            post_infinity,
        }
    }

    /// Build from an explicit wire count and sequence, rejecting any drift.
    pub fn from_raw_parts(
        key_frame_count: i32,
        key_frames: Option<Vec<KeyFrame>>,
        pre_infinity: i32,
        post_infinity: i32,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            key_frames: sequence::from_raw_parts("key_frames", key_frame_count, key_frames)?,
            pre_infinity,
            post_infinity,
        })
    }

    pub fn key_frame_count(&self) -> i32 {
        sequence::count(&self.key_frames)
    }

    /// The keyframes, `None` when the count is zero.
    pub fn key_frames(&self) -> Option<&[KeyFrame]> {
        self.key_frames.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.key_frames.is_none()
    }

    pub(crate) fn is_canonical(&self) -> bool {
        sequence::is_canonical(&self.key_frames)
    }

    pub fn pre_wrap(&self) -> Option<WrapMode> {
        WrapMode::from_code(self.pre_infinity)
    }

    pub fn post_wrap(&self) -> Option<WrapMode> {
        WrapMode::from_code(self.post_infinity)
    }

    /// Scale every keyframe value and both tangents by `factor`.
    pub fn scale_values(&mut self, factor: f32) {
        for key in self.key_frames.iter_mut().flatten() {
            key.value *= factor;
            key.in_slope *= factor;
            key.out_slope *= factor;
        }
    }
}

/// A min/max curve as consumed by the native modules.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Curve {
    /// Raw [`MinMaxCurveState`] code, preserved even when unknown.
    pub min_max_state: i32,
    pub scalar: f32,
    pub min_curve: SubCurve,
    pub max_curve: SubCurve,
}

impl Curve {
    /// Constant curve (scalar mode, no keyframes).
    pub fn constant(scalar: f32) -> Self {
        Self {
            min_max_state: MinMaxCurveState::Scalar.code(),
            scalar,
            ..Self::default()
        }
    }

    pub fn state(&self) -> Option<MinMaxCurveState> {
        MinMaxCurveState::from_code(self.min_max_state)
    }

    pub(crate) fn is_canonical(&self) -> bool {
        self.min_curve.is_canonical() && self.max_curve.is_canonical()
    }

    /// Scale the value the native engine evaluates by `factor`, once.
    ///
    /// The engine multiplies keyframes by `scalar` in every keyed mode, so
    /// only `scalar` changes there. In scalar mode the keyframes are not
    /// sampled and are scaled alongside it. Unit conversion is the caller's
    /// responsibility; this never tracks whether it has been applied before.
    pub fn scale_output(&mut self, factor: f32) {
        self.scalar *= factor;
        if self.state() == Some(MinMaxCurveState::Scalar) {
            self.min_curve.scale_values(factor);
            self.max_curve.scale_values(factor);
        }
    }
}
