//! Particle emitter entity
//!
//! A [`ParticleEmitter`] owns one assembled state and its world transform,
//! and tracks whether a native instance currently exists for it. Misordered
//! calls are rejected here, before the registry or the engine sees them.

use glam::Mat4;

use fxbridge_shared::ParticleInitState;

use crate::assemble::StateAssembler;
use crate::authoring::AuthoringSource;
use crate::bridge::FrameUpdateBridge;
use crate::context::NativeContext;
use crate::error::{BridgeError, ExtractError, SequencingViolation};
use crate::native::{NativeEngine, RenderRole};
use crate::registry::InstanceHandle;
use crate::render::{DrawState, RenderDispatcher};

/// Where an emitter is in its native lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmitterLifecycle {
    Unregistered,
    Live(InstanceHandle),
    Destroyed,
}

#[derive(Debug)]
pub struct ParticleEmitter {
    name: String,
    state: ParticleInitState,
    transform: Mat4,
    lifecycle: EmitterLifecycle,
}

impl ParticleEmitter {
    pub fn new(name: impl Into<String>, state: ParticleInitState) -> Self {
        Self {
            name: name.into(),
            state,
            transform: Mat4::IDENTITY,
            lifecycle: EmitterLifecycle::Unregistered,
        }
    }

    /// Assemble the emitter's state from an authoring source.
    pub fn from_source<S: AuthoringSource + ?Sized>(
        name: impl Into<String>,
        assembler: &StateAssembler,
        source: &S,
    ) -> Result<Self, ExtractError> {
        Ok(Self::new(name, assembler.assemble(source)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &ParticleInitState {
        &self.state
    }

    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    pub fn lifecycle(&self) -> EmitterLifecycle {
        self.lifecycle
    }

    /// Handle of the live native instance.
    pub fn handle(&self) -> Result<InstanceHandle, SequencingViolation> {
        match self.lifecycle {
            EmitterLifecycle::Live(handle) => Ok(handle),
            EmitterLifecycle::Unregistered => Err(SequencingViolation::NotCreated),
            EmitterLifecycle::Destroyed => Err(SequencingViolation::Destroyed),
        }
    }

    /// Create the native instance. An emitter whose instance was destroyed
    /// may be created again and receives a fresh handle.
    pub fn create<E: NativeEngine>(
        &mut self,
        ctx: &mut NativeContext<E>,
    ) -> Result<InstanceHandle, BridgeError> {
        if let EmitterLifecycle::Live(handle) = self.lifecycle {
            return Err(SequencingViolation::AlreadyCreated(handle).into());
        }
        let handle = ctx.create(&self.state)?;
        tracing::debug!(emitter = %self.name, %handle, "emitter created");
        self.lifecycle = EmitterLifecycle::Live(handle);
        Ok(handle)
    }

    pub fn set_active<E: NativeEngine>(
        &self,
        ctx: &mut NativeContext<E>,
        active: bool,
    ) -> Result<(), BridgeError> {
        ctx.set_active(self.handle()?, active)
    }

    pub fn is_active<E: NativeEngine>(&self, ctx: &NativeContext<E>) -> Result<bool, BridgeError> {
        ctx.is_active(self.handle()?)
    }

    /// Submit this frame's transform.
    pub fn update<E: NativeEngine>(
        &self,
        bridge: &mut FrameUpdateBridge,
        ctx: &mut NativeContext<E>,
    ) -> Result<(), BridgeError> {
        bridge.update(ctx, self.handle()?, &self.transform)
    }

    pub fn render<E: NativeEngine, D: DrawState>(
        &self,
        dispatcher: &mut RenderDispatcher<D>,
        ctx: &mut NativeContext<E>,
        role: RenderRole,
    ) -> Result<(), BridgeError> {
        dispatcher.render(ctx, self.handle()?, role)
    }

    /// Cancel any per-frame schedule, then destroy the native instance.
    pub fn destroy<E: NativeEngine>(
        &mut self,
        ctx: &mut NativeContext<E>,
    ) -> Result<(), BridgeError> {
        let handle = self.handle()?;
        ctx.cancel(handle)?;
        ctx.destroy(handle)?;
        self.lifecycle = EmitterLifecycle::Destroyed;
        tracing::debug!(emitter = %self.name, %handle, "emitter destroyed");
        Ok(())
    }
}
