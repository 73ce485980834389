//! Shared test utilities for unit tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use fxbridge_shared::{
    AlphaKey, ColorKey, ColorRgba32, Curve, FrameData, Gradient, KeyFrame, MinMaxCurveState,
    MinMaxGradientState, ParticleInitState, ShapeType, SubCurve, SubGradient, UpdateData,
    WrapMode,
};

use crate::abi::ParticleInitStateAbi;
use crate::authoring::PropertyTree;
use crate::config::RuntimeConfig;
use crate::context::NativeContext;
use crate::error::BridgeError;
use crate::native::{
    EngineCall, HeadlessEngine, LogSink, NativeEngine, NullSink, RenderRole, SharedLogSink,
};
use crate::render::DrawState;
use crate::schema::{self, CurveProperty, EmitterField, ModuleFlag, SCHEMA_VERSION, ShapeField};

// ============================================================================
// Authoring fixtures
// ============================================================================

/// Authored start-size curve: three keys with non-zero tangents.
pub fn start_size_fixture() -> Curve {
    let clamp = WrapMode::Clamp.code();
    Curve {
        min_max_state: MinMaxCurveState::Curve.code(),
        scalar: 2.0,
        max_curve: SubCurve::new(
            vec![
                KeyFrame::new(0.0, 1.0, 0.0, 2.0),
                KeyFrame::new(0.5, 4.0, 1.5, -1.5),
                KeyFrame::new(1.0, 0.5, -3.0, 0.0),
            ],
            clamp,
            clamp,
        ),
        min_curve: SubCurve::default(),
    }
}

fn color_fixture() -> Gradient {
    Gradient {
        max_gradient: SubGradient::new(
            vec![
                ColorKey::new(ColorRgba32::new(255, 200, 40, 255), 0),
                ColorKey::new(ColorRgba32::new(120, 20, 0, 255), 65535),
            ],
            Vec::new(),
        ),
        min_gradient: SubGradient::default(),
        min_color: ColorRgba32::WHITE.code(),
        max_color: ColorRgba32::WHITE.code(),
        min_max_state: MinMaxGradientState::Gradient.code(),
    }
}

/// A complete emitter as an authoring tool would export it.
pub fn authoring_fixture() -> PropertyTree {
    let mut tree = PropertyTree::new();
    tree.set_schema_version(Some(SCHEMA_VERSION));

    tree.set(&EmitterField::Looping.path(), true)
        .set(&EmitterField::Prewarm.path(), false)
        .set(&EmitterField::RandomSeed.path(), 1234)
        .set(&EmitterField::PlayOnAwake.path(), true)
        .set(&EmitterField::StartDelay.path(), 0.0f32)
        .set(&EmitterField::Speed.path(), 1.0f32)
        .set(&EmitterField::LengthInSec.path(), 2.5f32)
        .set(&EmitterField::MoveWithTransform.path(), false)
        .set(&EmitterField::MaxNumParticles.path(), 256)
        .set(&EmitterField::EmissionRate.path(), 40.0f32);

    tree.set_curve(&CurveProperty::StartLifetime.path(), &Curve::constant(3.0))
        .set_curve(&CurveProperty::StartSpeed.path(), &Curve::constant(5.0))
        .set_curve(&CurveProperty::StartSize.path(), &start_size_fixture())
        .set_curve(&CurveProperty::StartRotation.path(), &Curve::constant(0.0))
        .set_curve(
            &CurveProperty::RotationOverLifetime.path(),
            &Curve::constant(0.785),
        )
        .set_curve(
            &CurveProperty::SizeOverLifetime.path(),
            &Curve {
                min_max_state: MinMaxCurveState::Curve.code(),
                scalar: 1.0,
                max_curve: SubCurve::new(
                    vec![KeyFrame::flat(0.0, 1.0), KeyFrame::flat(1.0, 0.0)],
                    WrapMode::Clamp.code(),
                    WrapMode::Clamp.code(),
                ),
                min_curve: SubCurve::default(),
            },
        );

    tree.set(&ModuleFlag::Rotation.path(), true)
        .set(&ModuleFlag::Size.path(), false)
        .set(&ModuleFlag::Shape.path(), true)
        .set(&ModuleFlag::Color.path(), true);

    tree.set(&ShapeField::Type.path(), ShapeType::Cone.code())
        .set(&ShapeField::Radius.path(), 2.0f32)
        .set(&ShapeField::Length.path(), 5.0f32)
        .set(&ShapeField::Angle.path(), 25.0f32)
        .set(&ShapeField::BoxX.path(), 1.0f32)
        .set(&ShapeField::BoxY.path(), 1.0f32)
        .set(&ShapeField::BoxZ.path(), 1.0f32)
        .set(&ShapeField::RandomDirection.path(), false);

    tree.set_gradient(&schema::color_gradient(), &color_fixture());
    tree
}

/// An assembled state with keyframes and color keys in play.
pub fn sample_state() -> ParticleInitState {
    ParticleInitState {
        random_seed: 7,
        max_num_particles: 64,
        emission_rate: 12.0,
        init_module_size: start_size_fixture(),
        init_module_lifetime: Curve {
            min_max_state: MinMaxCurveState::TwoCurves.code(),
            scalar: 1.0,
            max_curve: SubCurve::new(vec![KeyFrame::flat(0.0, 2.0)], 2, 2),
            min_curve: SubCurve::new(vec![KeyFrame::flat(0.0, 1.0)], 2, 2),
        },
        color_module_enable: true,
        color_module_gradient: Gradient {
            max_gradient: SubGradient::new(
                vec![ColorKey::new(ColorRgba32::WHITE, 0)],
                vec![AlphaKey::new(255, 0), AlphaKey::new(0, 65535)],
            ),
            ..color_fixture()
        },
        ..ParticleInitState::default()
    }
}

// ============================================================================
// Native test doubles
// ============================================================================

/// Log sink that keeps every line.
#[derive(Debug, Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl LogSink for CollectingSink {
    fn log(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_owned());
        }
    }
}

/// Draw state that counts how often it was bound.
#[derive(Debug, Default)]
pub struct CountingDrawState {
    pub binds: u32,
}

impl DrawState for CountingDrawState {
    fn ensure_bound(&mut self) {
        self.binds += 1;
    }
}

/// A started headless engine in a context, recording every call.
pub fn headless_context(max_instances: usize) -> NativeContext<HeadlessEngine> {
    let config = RuntimeConfig { max_instances };
    NativeContext::startup(HeadlessEngine::recording(), &config, Arc::new(NullSink)).unwrap()
}

/// Engine whose create results are scripted and whose call log outlives it.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    create_results: VecDeque<i32>,
    next_index: i32,
    destroyed: Vec<i32>,
    log: Arc<Mutex<Vec<EngineCall>>>,
}

impl ScriptedEngine {
    /// Return `results` from successive creates, then count up from zero.
    pub fn with_create_results(results: impl IntoIterator<Item = i32>) -> Self {
        Self {
            create_results: results.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn call_log(&self) -> Arc<Mutex<Vec<EngineCall>>> {
        Arc::clone(&self.log)
    }

    pub fn destroyed(&self) -> &[i32] {
        &self.destroyed
    }

    fn record(&self, call: EngineCall) {
        self.log.lock().unwrap().push(call);
    }
}

impl NativeEngine for ScriptedEngine {
    fn startup(&mut self) -> Result<(), BridgeError> {
        self.record(EngineCall::Startup);
        Ok(())
    }

    fn link_debug(&mut self, _sink: SharedLogSink) {}

    fn shutdown(&mut self) {
        self.record(EngineCall::Shutdown);
    }

    fn create_particle_system(&mut self, init_state: &ParticleInitStateAbi<'_>) -> i32 {
        let state = unsafe { init_state.copy_out() }.unwrap();
        let index = self.create_results.pop_front().unwrap_or_else(|| {
            let index = self.next_index;
            self.next_index += 1;
            index
        });
        self.record(EngineCall::Create {
            index,
            checksum: state.checksum(),
        });
        index
    }

    fn update_frame(&mut self, frame_data: &FrameData) {
        self.record(EngineCall::Frame(*frame_data));
    }

    fn update_particle_system(&mut self, update_data: &UpdateData) {
        self.record(EngineCall::Update {
            index: update_data.index,
            world_matrix: update_data.world_matrix,
        });
    }

    fn render(&mut self, index: i32, role: RenderRole) {
        self.record(EngineCall::Render { index, role });
    }

    fn set_active(&mut self, index: i32, active: bool) {
        self.record(EngineCall::SetActive { index, active });
    }

    fn destroy_particle_system(&mut self, index: i32) {
        self.destroyed.push(index);
        self.record(EngineCall::Destroy { index });
    }
}
