//! Min/max color gradients
//!
//! Color keys and alpha keys are independent sequences: a gradient may have
//! three color stops and a single alpha stop. Key times are 16-bit normalized
//! words (`0..=65535` maps to `0.0..=1.0`) carried in an `i32`.

use bitcode::{Decode, Encode};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::codes::MinMaxGradientState;
use crate::color::ColorRgba32;
use crate::error::ModelError;
use crate::sequence;

/// Maximum color keys and alpha keys per sub-gradient on the native side.
pub const MAX_GRADIENT_KEYS: i32 = 8;

/// Largest normalized key time.
pub const MAX_KEY_TIME: i32 = u16::MAX as i32;

/// Convert a normalized key time word to `0.0..=1.0`.
pub fn normalized_key_time(time: i32) -> f32 {
    time.clamp(0, MAX_KEY_TIME) as f32 / MAX_KEY_TIME as f32
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize, Encode, Decode,
)]
#[repr(C)]
pub struct ColorKey {
    /// Packed RGBA, see [`ColorRgba32`].
    pub color: i32,
    pub time: i32,
}

impl ColorKey {
    pub fn new(color: ColorRgba32, time: i32) -> Self {
        Self {
            color: color.code(),
            time,
        }
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize, Encode, Decode,
)]
#[repr(C)]
pub struct AlphaKey {
    pub alpha: i32,
    pub time: i32,
}

impl AlphaKey {
    pub const fn new(alpha: i32, time: i32) -> Self {
        Self { alpha, time }
    }
}

/// One gradient: color keys and alpha keys, each with its own count.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct SubGradient {
    #[serde(default, deserialize_with = "sequence::deserialize")]
    color_keys: Option<Vec<ColorKey>>,
    #[serde(default, deserialize_with = "sequence::deserialize")]
    alpha_keys: Option<Vec<AlphaKey>>,
}

impl SubGradient {
    pub fn new(color_keys: Vec<ColorKey>, alpha_keys: Vec<AlphaKey>) -> Self {
        Self {
            color_keys: sequence::from_vec(color_keys),
            alpha_keys: sequence::from_vec(alpha_keys),
        }
    }

    /// Build from explicit wire counts, rejecting any drift.
    pub fn from_raw_parts(
        color_key_count: i32,
        color_keys: Option<Vec<ColorKey>>,
        alpha_key_count: i32,
        alpha_keys: Option<Vec<AlphaKey>>,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            color_keys: sequence::from_raw_parts("color_keys", color_key_count, color_keys)?,
            alpha_keys: sequence::from_raw_parts("alpha_keys", alpha_key_count, alpha_keys)?,
        })
    }

    pub fn color_key_count(&self) -> i32 {
        sequence::count(&self.color_keys)
    }

    pub fn color_keys(&self) -> Option<&[ColorKey]> {
        self.color_keys.as_deref()
    }

    pub fn alpha_key_count(&self) -> i32 {
        sequence::count(&self.alpha_keys)
    }

    pub fn alpha_keys(&self) -> Option<&[AlphaKey]> {
        self.alpha_keys.as_deref()
    }
}

/// Min/max gradient as consumed by the color module.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Gradient {
    pub max_gradient: SubGradient,
    pub min_gradient: SubGradient,
    pub min_color: i32,
    pub max_color: i32,
    /// Raw [`MinMaxGradientState`] code, preserved even when unknown.
    pub min_max_state: i32,
}

impl Default for Gradient {
    /// Matches the native default: opaque white, constant color mode.
    fn default() -> Self {
        Self {
            max_gradient: SubGradient::default(),
            min_gradient: SubGradient::default(),
            min_color: ColorRgba32::WHITE.code(),
            max_color: ColorRgba32::WHITE.code(),
            min_max_state: MinMaxGradientState::Color.code(),
        }
    }
}

impl Gradient {
    pub fn state(&self) -> Option<MinMaxGradientState> {
        MinMaxGradientState::from_code(self.min_max_state)
    }

    pub(crate) fn is_canonical(&self) -> bool {
        [&self.max_gradient, &self.min_gradient].into_iter().all(|sub| {
            sequence::is_canonical(&sub.color_keys) && sequence::is_canonical(&sub.alpha_keys)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_eight_bytes() {
        assert_eq!(std::mem::size_of::<ColorKey>(), 8);
        assert_eq!(std::mem::size_of::<AlphaKey>(), 8);
    }

    #[test]
    fn test_color_and_alpha_counts_are_independent() {
        let sub = SubGradient::new(
            vec![
                ColorKey::new(ColorRgba32::WHITE, 0),
                ColorKey::new(ColorRgba32::new(255, 0, 0, 255), MAX_KEY_TIME),
            ],
            Vec::new(),
        );
        assert_eq!(sub.color_key_count(), 2);
        assert_eq!(sub.alpha_key_count(), 0);
        assert!(sub.alpha_keys().is_none());
    }

    #[test]
    fn test_raw_parts_reports_the_drifting_field() {
        let err = SubGradient::from_raw_parts(0, None, 2, Some(vec![AlphaKey::new(255, 0)]))
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::CountMismatch {
                field: "alpha_keys",
                count: 2,
                len: 1
            }
        );
    }

    // ========================================================================
    // Empty sequences
    // ========================================================================

    #[test]
    fn test_deserialized_empty_keys_are_absent() {
        let sub: SubGradient =
            serde_json::from_str(r#"{"color_keys":[{"color":-1,"time":0}],"alpha_keys":[]}"#)
                .unwrap();
        assert_eq!(sub.color_key_count(), 1);
        assert_eq!(sub.alpha_key_count(), 0);
        assert!(sub.alpha_keys().is_none());
    }

    #[test]
    fn test_canonical_decode_rejects_present_empty_keys() {
        let mut state = crate::ParticleInitState::default();
        state.color_module_gradient.min_gradient = SubGradient {
            color_keys: None,
            alpha_keys: Some(Vec::new()),
        };
        assert_eq!(
            crate::ParticleInitState::from_canonical_bytes(&state.canonical_bytes()),
            None
        );
    }

    #[test]
    fn test_key_time_normalization() {
        assert_eq!(normalized_key_time(0), 0.0);
        assert_eq!(normalized_key_time(MAX_KEY_TIME), 1.0);
        assert_eq!(normalized_key_time(-5), 0.0);
        assert_eq!(normalized_key_time(100_000), 1.0);
    }

    #[test]
    fn test_default_gradient_is_white_constant() {
        let g = Gradient::default();
        assert_eq!(g.state(), Some(MinMaxGradientState::Color));
        assert_eq!(ColorRgba32::from_code(g.max_color), ColorRgba32::WHITE);
    }
}
