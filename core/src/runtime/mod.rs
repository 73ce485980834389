//! Frame loop orchestration
//!
//! [`FrameLoop`] owns the native context and the emitters scheduled on it.
//! Each frame hands the engine its clock and camera, runs an update pass over
//! every active emitter, then a render pass with batch roles. A failing
//! emitter is aborted on the spot and the rest of the frame continues.

use fxbridge_shared::FrameData;
use smallvec::SmallVec;
use tracing::{debug, error, warn};

use crate::bridge::FrameUpdateBridge;
use crate::context::NativeContext;
use crate::emitter::ParticleEmitter;
use crate::error::{BridgeError, SequencingViolation};
use crate::native::{NativeEngine, RenderRole};
use crate::render::{DrawState, RenderDispatcher};

mod report;


pub use report::{AbortedEmitter, FrameReport, FramePass};

/// Identifier of an emitter owned by a [`FrameLoop`]. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmitterId(u32);

impl std::fmt::Display for EmitterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "emitter{}", self.0)
    }
}

type Batch = SmallVec<[EmitterId; 16]>;

/// Cooperative per-frame driver for a set of emitters.
pub struct FrameLoop<E: NativeEngine, D: DrawState> {
    emitters: Vec<Option<ParticleEmitter>>,
    bridge: FrameUpdateBridge,
    dispatcher: RenderDispatcher<D>,
    // Shut down only after `Drop` has destroyed every emitter
    ctx: NativeContext<E>,
}

impl<E: NativeEngine, D: DrawState> FrameLoop<E, D> {
    pub fn new(ctx: NativeContext<E>, draw_state: D) -> Self {
        Self {
            emitters: Vec::new(),
            bridge: FrameUpdateBridge::new(),
            dispatcher: RenderDispatcher::new(draw_state),
            ctx,
        }
    }

    pub fn context(&self) -> &NativeContext<E> {
        &self.ctx
    }

    pub fn dispatcher(&self) -> &RenderDispatcher<D> {
        &self.dispatcher
    }

    /// Number of emitters currently owned.
    pub fn len(&self) -> usize {
        self.emitters.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create `emitter` on the engine and schedule it for per-frame work.
    pub fn spawn(&mut self, mut emitter: ParticleEmitter) -> Result<EmitterId, BridgeError> {
        let handle = emitter.create(&mut self.ctx)?;
        if let Err(e) = self.ctx.schedule(handle) {
            // Never scheduled, so destroy directly
            if let Err(cleanup) = emitter.destroy(&mut self.ctx) {
                error!(emitter = emitter.name(), "cleanup after failed schedule: {cleanup}");
            }
            return Err(e);
        }

        let id = EmitterId(self.emitters.len() as u32);
        self.emitters.push(Some(emitter));
        debug!(%id, %handle, "emitter spawned");
        Ok(id)
    }

    pub fn emitter(&self, id: EmitterId) -> Option<&ParticleEmitter> {
        self.emitters.get(id.0 as usize)?.as_ref()
    }

    pub fn emitter_mut(&mut self, id: EmitterId) -> Option<&mut ParticleEmitter> {
        self.emitters.get_mut(id.0 as usize)?.as_mut()
    }

    pub fn set_active(&mut self, id: EmitterId, active: bool) -> Result<(), BridgeError> {
        let emitter = self
            .emitters
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(SequencingViolation::NotCreated)?;
        emitter.set_active(&mut self.ctx, active)
    }

    /// Cancel the emitter's schedule, destroy its instance and hand it back.
    pub fn destroy(&mut self, id: EmitterId) -> Result<ParticleEmitter, BridgeError> {
        let slot = self
            .emitters
            .get_mut(id.0 as usize)
            .ok_or(SequencingViolation::NotCreated)?;
        let emitter = slot
            .as_mut()
            .ok_or(SequencingViolation::Destroyed)?;
        emitter.destroy(&mut self.ctx)?;
        slot.take()
            .ok_or_else(|| SequencingViolation::Destroyed.into())
    }

    /// Run one frame: frame update, update pass, then render pass.
    pub fn run_frame(&mut self, frame_data: &FrameData) -> FrameReport {
        let frame = self.ctx.begin_frame(frame_data);
        let mut report = FrameReport::new(frame);

        let mut batch = Batch::new();
        for (slot, emitter) in self.emitters.iter().enumerate() {
            let Some(emitter) = emitter else { continue };
            match emitter.is_active(&self.ctx) {
                Ok(true) => batch.push(EmitterId(slot as u32)),
                Ok(false) => report.skipped += 1,
                Err(e) => report.record_failure(EmitterId(slot as u32), FramePass::Update, e),
            }
        }

        // Update pass
        batch.retain(|id| {
            let Some(emitter) = self.emitters[id.0 as usize].as_ref() else {
                return false;
            };
            match emitter.update(&mut self.bridge, &mut self.ctx) {
                Ok(()) => {
                    report.updated += 1;
                    true
                }
                Err(e) => {
                    report.record_failure(*id, FramePass::Update, e);
                    false
                }
            }
        });

        self.render_pass(&batch, &mut report);

        for aborted in &report.aborted {
            self.abort(aborted.id);
        }

        debug!(
            frame,
            updated = report.updated,
            rendered = report.rendered,
            skipped = report.skipped,
            aborted = report.aborted.len(),
            "frame complete"
        );
        report
    }

    /// Render every emitter in `batch` that is cleared to render. Roles are
    /// assigned after the checks, so a rejected emitter never leaves the
    /// engine's batch open.
    fn render_pass(&mut self, batch: &Batch, report: &mut FrameReport) {
        let mut ready: SmallVec<[_; 16]> = SmallVec::new();
        for &id in batch {
            let Some(emitter) = self.emitters[id.0 as usize].as_ref() else {
                continue;
            };
            let checked = emitter
                .handle()
                .map_err(BridgeError::from)
                .and_then(|handle| Ok((handle, self.ctx.render_index(handle)?)));
            match checked {
                Ok((handle, index)) => ready.push((handle, index)),
                Err(e) => report.record_failure(id, FramePass::Render, e),
            }
        }

        let len = ready.len();
        for (position, (handle, index)) in ready.into_iter().enumerate() {
            let role = RenderRole::for_position(position, len);
            self.dispatcher.dispatch(&mut self.ctx, handle, index, role);
            report.rendered += 1;
        }
    }

    /// Remove an emitter after a failed call: cancel, destroy, log. Never
    /// retried.
    fn abort(&mut self, id: EmitterId) {
        let Some(mut emitter) = self.emitters.get_mut(id.0 as usize).and_then(Option::take) else {
            return;
        };
        match emitter.destroy(&mut self.ctx) {
            Ok(()) => warn!(%id, emitter = emitter.name(), "emitter aborted"),
            Err(e) => error!(%id, emitter = emitter.name(), "abort could not destroy instance: {e}"),
        }
    }

    /// Destroy every emitter, then shut the engine down.
    pub fn shutdown(self) {
        drop(self);
    }

    fn destroy_all(&mut self) {
        for slot in 0..self.emitters.len() {
            let Some(mut emitter) = self.emitters[slot].take() else {
                continue;
            };
            if let Err(e) = emitter.destroy(&mut self.ctx) {
                error!(emitter = emitter.name(), "failed to destroy at shutdown: {e}");
            }
        }
    }
}

impl<E: NativeEngine, D: DrawState> Drop for FrameLoop<E, D> {
    fn drop(&mut self) {
        self.destroy_all();
    }
}
