//! Headless native engine
//!
//! An in-process engine that honours the native call contract without
//! rendering anything. It copies every created state out of its view
//! (validating each `(count, pointer)` pair), tracks per-instance activity
//! and transforms, checks render batch roles, and records every call for
//! inspection. Contract breaches are reported through the linked log sink,
//! the same way a real engine reports them.

use std::fmt;

use fxbridge_shared::{FrameData, Matrix4x4, ParticleInitState, UpdateData};
use hashbrown::HashMap;

use super::{NativeEngine, RenderRole, SharedLogSink};
use crate::abi::ParticleInitStateAbi;
use crate::error::BridgeError;

/// One call received by a [`HeadlessEngine`].
#[derive(Clone, Debug, PartialEq)]
pub enum EngineCall {
    Startup,
    Shutdown,
    Create { index: i32, checksum: u64 },
    Frame(FrameData),
    Update { index: i32, world_matrix: Matrix4x4 },
    Render { index: i32, role: RenderRole },
    SetActive { index: i32, active: bool },
    Destroy { index: i32 },
}

/// Engine-side copy of one live instance.
#[derive(Clone, Debug)]
pub struct HeadlessInstance {
    pub state: ParticleInitState,
    pub active: bool,
    pub world_matrix: Matrix4x4,
    pub updates: u64,
    pub renders: u64,
}

/// In-process engine honouring the native contract.
#[derive(Default)]
pub struct HeadlessEngine {
    started: bool,
    sink: Option<SharedLogSink>,
    instances: HashMap<i32, HeadlessInstance>,
    free_indices: Vec<i32>,
    next_index: i32,
    frame: FrameData,
    frames: u64,
    batch_open: bool,
    record_calls: bool,
    calls: Vec<EngineCall>,
    violations: u64,
}

impl fmt::Debug for HeadlessEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessEngine")
            .field("started", &self.started)
            .field("instances", &self.instances.len())
            .field("calls", &self.calls.len())
            .field("violations", &self.violations)
            .finish()
    }
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that keeps a log of every call it receives.
    pub fn recording() -> Self {
        Self {
            record_calls: true,
            ..Self::default()
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn instance(&self, index: i32) -> Option<&HeadlessInstance> {
        self.instances.get(&index)
    }

    pub fn live_count(&self) -> usize {
        self.instances.len()
    }

    /// Clock and camera from the latest frame update.
    pub fn frame(&self) -> &FrameData {
        &self.frame
    }

    /// Frame updates received since startup.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Calls received so far (empty unless built with [`Self::recording`]).
    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    /// Contract breaches observed so far.
    pub fn violations(&self) -> u64 {
        self.violations
    }

    fn record(&mut self, call: EngineCall) {
        if self.record_calls {
            self.calls.push(call);
        }
    }

    fn log(&self, args: fmt::Arguments<'_>) {
        if let Some(sink) = &self.sink {
            sink.log(&args.to_string());
        }
    }

    fn violation(&mut self, args: fmt::Arguments<'_>) {
        self.violations += 1;
        self.log(args);
    }

    fn allocate_index(&mut self) -> i32 {
        match self.free_indices.pop() {
            Some(index) => index,
            None => {
                let index = self.next_index;
                self.next_index += 1;
                index
            }
        }
    }
}

impl NativeEngine for HeadlessEngine {
    fn startup(&mut self) -> Result<(), BridgeError> {
        if self.started {
            return Err(BridgeError::AlreadyStarted);
        }
        self.started = true;
        self.record(EngineCall::Startup);
        Ok(())
    }

    fn link_debug(&mut self, sink: SharedLogSink) {
        self.sink = Some(sink);
        self.log(format_args!("headless engine linked"));
    }

    fn shutdown(&mut self) {
        if !self.instances.is_empty() {
            let live = self.instances.len();
            self.log(format_args!("shutdown releasing {live} live instance(s)"));
        }
        self.instances.clear();
        self.free_indices.clear();
        self.next_index = 0;
        self.frame = FrameData::default();
        self.frames = 0;
        self.started = false;
        self.record(EngineCall::Shutdown);
    }

    fn create_particle_system(&mut self, init_state: &ParticleInitStateAbi<'_>) -> i32 {
        if !self.started {
            self.violation(format_args!("create before startup"));
            return -1;
        }

        // SAFETY: the view borrows an owned state for the duration of this call
        let state = match unsafe { init_state.copy_out() } {
            Ok(state) => state,
            Err(e) => {
                self.violation(format_args!("rejected init state: {e}"));
                return -1;
            }
        };

        let index = self.allocate_index();
        let checksum = state.checksum();
        self.instances.insert(
            index,
            HeadlessInstance {
                state,
                active: true,
                world_matrix: Matrix4x4::IDENTITY,
                updates: 0,
                renders: 0,
            },
        );
        self.record(EngineCall::Create { index, checksum });
        index
    }

    fn update_frame(&mut self, frame_data: &FrameData) {
        self.record(EngineCall::Frame(*frame_data));
        if !self.started {
            self.violation(format_args!("frame update before startup"));
            return;
        }
        if frame_data.delta_time < 0.0 {
            let delta = frame_data.delta_time;
            self.log(format_args!("negative frame delta {delta}"));
        }
        self.frame = *frame_data;
        self.frames += 1;
    }

    fn update_particle_system(&mut self, update_data: &UpdateData) {
        let UpdateData {
            world_matrix,
            index,
        } = *update_data;
        self.record(EngineCall::Update {
            index,
            world_matrix,
        });
        match self.instances.get_mut(&index) {
            Some(instance) => {
                instance.world_matrix = world_matrix;
                instance.updates += 1;
            }
            None => self.violation(format_args!("update for unknown index {index}")),
        }
    }

    fn render(&mut self, index: i32, role: RenderRole) {
        self.record(EngineCall::Render { index, role });

        if role.contains(RenderRole::FIRST) {
            if self.batch_open {
                self.violation(format_args!("render batch reopened at index {index}"));
            }
            self.batch_open = true;
        } else if !self.batch_open {
            self.violation(format_args!("render {role:?} outside a batch at index {index}"));
        }
        if role.contains(RenderRole::LAST) {
            self.batch_open = false;
        }

        match self.instances.get_mut(&index) {
            Some(instance) if instance.active => instance.renders += 1,
            Some(_) => {}
            None => self.violation(format_args!("render for unknown index {index}")),
        }
    }

    fn set_active(&mut self, index: i32, active: bool) {
        self.record(EngineCall::SetActive { index, active });
        match self.instances.get_mut(&index) {
            Some(instance) => instance.active = active,
            None => self.violation(format_args!("set_active for unknown index {index}")),
        }
    }

    fn destroy_particle_system(&mut self, index: i32) {
        self.record(EngineCall::Destroy { index });
        if self.instances.remove(&index).is_some() {
            self.free_indices.push(index);
        } else {
            self.violation(format_args!("destroy for unknown index {index}"));
        }
    }
}
