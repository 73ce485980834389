//! Emitter state assembly
//!
//! [`StateAssembler`] reads every module of one emitter through the
//! extractors and returns a complete [`ParticleInitState`]. The authoring
//! to native size conversion happens here and nowhere else.

use fxbridge_shared::{ParticleInitState, ShapeModuleData, ShapeType};
use tracing::{debug, warn};

use crate::authoring::AuthoringSource;
use crate::config::{DEFAULT_SIZE_SCALE, ExtractionConfig};
use crate::error::ExtractError;
use crate::extract::{extract_curve, extract_gradient};
use crate::schema::{
    self, CurveProperty, EmitterField, ModuleFlag, SCHEMA_VERSION, ShapeField,
};

/// Builds [`ParticleInitState`] records from authoring sources.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateAssembler {
    size_scale: f32,
}

impl Default for StateAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE_SCALE)
    }
}

impl StateAssembler {
    /// `size_scale` converts authoring size units to native units.
    pub fn new(size_scale: f32) -> Self {
        Self { size_scale }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.size_scale)
    }

    pub fn size_scale(&self) -> f32 {
        self.size_scale
    }

    /// Assemble one emitter.
    ///
    /// Reads happen in wire order and stop at the first error. The result
    /// depends only on `source` and the scale, so assembling the same source
    /// twice yields bitwise identical states.
    pub fn assemble<S: AuthoringSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<ParticleInitState, ExtractError> {
        if let Some(found) = source.schema_version()
            && found != SCHEMA_VERSION
        {
            return Err(ExtractError::SchemaVersion {
                found,
                supported: SCHEMA_VERSION,
            });
        }

        let bool_field = |f: EmitterField| source.read_bool(&f.path());
        let int_field = |f: EmitterField| source.read_i32(&f.path());
        let float_field = |f: EmitterField| source.read_f32(&f.path());
        let curve = |c: CurveProperty| extract_curve(source, &c.path());
        let enabled = |m: ModuleFlag| source.read_bool(&m.path());

        let mut state = ParticleInitState {
            looping: bool_field(EmitterField::Looping)?,
            prewarm: bool_field(EmitterField::Prewarm)?,
            random_seed: int_field(EmitterField::RandomSeed)?,
            play_on_awake: bool_field(EmitterField::PlayOnAwake)?,
            start_delay: float_field(EmitterField::StartDelay)?,
            speed: float_field(EmitterField::Speed)?,
            length_in_sec: float_field(EmitterField::LengthInSec)?,
            use_local_space: bool_field(EmitterField::MoveWithTransform)?,
            max_num_particles: int_field(EmitterField::MaxNumParticles)?,
            emission_rate: float_field(EmitterField::EmissionRate)?,

            init_module_lifetime: curve(CurveProperty::StartLifetime)?,
            init_module_speed: curve(CurveProperty::StartSpeed)?,
            init_module_size: curve(CurveProperty::StartSize)?,
            init_module_rotation: curve(CurveProperty::StartRotation)?,

            rotation_module_enable: enabled(ModuleFlag::Rotation)?,
            rotation_module_curve: curve(CurveProperty::RotationOverLifetime)?,

            size_module_enable: enabled(ModuleFlag::Size)?,
            size_module_curve: curve(CurveProperty::SizeOverLifetime)?,

            shape_module_enable: enabled(ModuleFlag::Shape)?,
            shape_module_data: read_shape(source)?,

            color_module_enable: enabled(ModuleFlag::Color)?,
            color_module_gradient: extract_gradient(source, &schema::color_gradient())?,
        };

        self.apply_unit_scale(&mut state);

        if state.shape_module_enable
            && let Some(shape) = state.shape_module_data.shape()
            && shape.is_mesh_based()
        {
            warn!(?shape, "mesh-based emitter shapes are not sampled by the native engine");
        }

        debug!(
            checksum = format_args!("{:016x}", state.checksum()),
            max_particles = state.max_num_particles,
            "assembled emitter state"
        );
        Ok(state)
    }

    /// The single place authoring sizes become native sizes.
    fn apply_unit_scale(&self, state: &mut ParticleInitState) {
        state.init_module_size.scale_output(self.size_scale);
        state.shape_module_data.radius *= self.size_scale;
    }
}

fn read_shape<S: AuthoringSource + ?Sized>(source: &S) -> Result<ShapeModuleData, ExtractError> {
    let float = |f: ShapeField| source.read_f32(&f.path());
    let shape = ShapeModuleData {
        shape_type: source.read_i32(&ShapeField::Type.path())?,
        radius: float(ShapeField::Radius)?,
        length: float(ShapeField::Length)?,
        angle: float(ShapeField::Angle)?,
        box_x: float(ShapeField::BoxX)?,
        box_y: float(ShapeField::BoxY)?,
        box_z: float(ShapeField::BoxZ)?,
        random_direction: source.read_bool(&ShapeField::RandomDirection.path())?,
    };
    if ShapeType::from_code(shape.shape_type).is_none() {
        warn!(code = shape.shape_type, "unknown emitter shape");
    }
    Ok(shape)
}
