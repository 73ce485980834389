//! Emitter initialization state and per-frame update record

use bitcode::{Decode, Encode};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::curve::Curve;
use crate::gradient::Gradient;
use crate::math::Matrix4x4;
use crate::shape::ShapeModuleData;

/// Full configuration of one emitter, as handed to the native engine on
/// creation.
///
/// Field order here is the wire order. Every module sub-record is present
/// even when its enable flag is off; disabled modules carry defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct ParticleInitState {
    pub looping: bool,
    pub prewarm: bool,
    pub random_seed: i32,
    pub play_on_awake: bool,
    pub start_delay: f32,
    pub speed: f32,
    pub length_in_sec: f32,
    pub use_local_space: bool,
    pub max_num_particles: i32,
    pub emission_rate: f32,

    pub init_module_lifetime: Curve,
    pub init_module_speed: Curve,
    pub init_module_size: Curve,
    pub init_module_rotation: Curve,

    pub rotation_module_enable: bool,
    pub rotation_module_curve: Curve,

    pub size_module_enable: bool,
    pub size_module_curve: Curve,

    pub shape_module_enable: bool,
    pub shape_module_data: ShapeModuleData,

    pub color_module_enable: bool,
    pub color_module_gradient: Gradient,
}

impl Default for ParticleInitState {
    /// Native constructor defaults. Particle counts and module contents are
    /// left at zero: they always come from authoring data.
    fn default() -> Self {
        Self {
            looping: true,
            prewarm: false,
            random_seed: 0,
            play_on_awake: true,
            start_delay: 0.0,
            speed: 1.0,
            length_in_sec: 5.0,
            use_local_space: true,
            max_num_particles: 0,
            emission_rate: 0.0,
            init_module_lifetime: Curve::default(),
            init_module_speed: Curve::default(),
            init_module_size: Curve::default(),
            init_module_rotation: Curve::default(),
            rotation_module_enable: false,
            rotation_module_curve: Curve::default(),
            size_module_enable: false,
            size_module_curve: Curve::default(),
            shape_module_enable: false,
            shape_module_data: ShapeModuleData::default(),
            color_module_enable: false,
            color_module_gradient: Gradient::default(),
        }
    }
}

impl ParticleInitState {
    /// Canonical binary encoding (field order, little-endian floats by bit pattern).
    pub fn canonical_bytes(&self) -> Vec<u8> {
        bitcode::encode(self)
    }

    /// xxHash3 of [`Self::canonical_bytes`].
    ///
    /// Two states with equal checksums are bitwise identical for all
    /// practical purposes; used to tag instances in logs and to detect
    /// unintended drift between assemblies.
    pub fn checksum(&self) -> u64 {
        xxhash_rust::xxh3::xxh3_64(&self.canonical_bytes())
    }

    /// Decode a state produced by [`Self::canonical_bytes`].
    ///
    /// Rejects encodings that carry a present but empty sequence.
    pub fn from_canonical_bytes(bytes: &[u8]) -> Option<Self> {
        let state: Self = bitcode::decode(bytes).ok()?;
        let curves = [
            &state.init_module_lifetime,
            &state.init_module_speed,
            &state.init_module_size,
            &state.init_module_rotation,
            &state.rotation_module_curve,
            &state.size_module_curve,
        ];
        let canonical = curves.into_iter().all(Curve::is_canonical)
            && state.color_module_gradient.is_canonical();
        canonical.then_some(state)
    }
}

/// Per-frame transform submission for one instance (68 bytes, POD).
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct UpdateData {
    pub world_matrix: Matrix4x4,
    /// Native instance index returned by creation.
    pub index: i32,
}

impl UpdateData {
    pub const fn new(index: i32, world_matrix: Matrix4x4) -> Self {
        Self {
            world_matrix,
            index,
        }
    }
}

/// Per-frame global submission: clock and camera (72 bytes, POD).
///
/// Sent once per frame, before any instance update.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct FrameData {
    /// Seconds since the host started.
    pub frame_time: f32,
    /// Seconds since the previous frame.
    pub delta_time: f32,
    /// World-to-camera transform.
    pub view_matrix: Matrix4x4,
}

impl Default for FrameData {
    fn default() -> Self {
        Self::new(0.0, 0.0, Matrix4x4::IDENTITY)
    }
}

impl FrameData {
    pub const fn new(frame_time: f32, delta_time: f32, view_matrix: Matrix4x4) -> Self {
        Self {
            frame_time,
            delta_time,
            view_matrix,
        }
    }

    /// Next frame of a fixed-step clock.
    pub fn advance(&self, delta_time: f32) -> Self {
        Self {
            frame_time: self.frame_time + delta_time,
            delta_time,
            ..*self
        }
    }
}
