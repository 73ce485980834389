//! Native engine context
//!
//! [`NativeContext`] owns a started engine and the registry of its live
//! instances. Every lifecycle call goes through it, so each call is checked
//! against the registry before anything reaches the engine. Dropping the
//! context destroys whatever is still registered and shuts the engine down.

use fxbridge_shared::{FrameData, Matrix4x4, ParticleInitState, UpdateData};
use tracing::{debug, error, info, warn};

use crate::abi::ParticleInitStateAbi;
use crate::config::RuntimeConfig;
use crate::error::BridgeError;
use crate::native::{NativeEngine, RenderRole, SharedLogSink};
use crate::registry::{InstanceHandle, InstanceRegistry};

/// A started native engine plus its instance registry.
pub struct NativeContext<E: NativeEngine> {
    engine: E,
    registry: InstanceRegistry,
    frame: u64,
    running: bool,
}

impl<E: NativeEngine> NativeContext<E> {
    /// Start `engine` and link its log output to `sink`.
    pub fn startup(
        mut engine: E,
        config: &RuntimeConfig,
        sink: SharedLogSink,
    ) -> Result<Self, BridgeError> {
        engine.startup()?;
        engine.link_debug(sink);
        info!(max_instances = config.max_instances, "native engine started");
        Ok(Self {
            engine,
            registry: InstanceRegistry::new(config.max_instances),
            frame: 0,
            running: true,
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    /// Current frame number; zero until the first [`Self::begin_frame`].
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advance to the next frame and hand the engine its clock and camera.
    /// Updates from earlier frames no longer permit a render.
    pub fn begin_frame(&mut self, frame_data: &FrameData) -> u64 {
        self.frame += 1;
        self.engine.update_frame(frame_data);
        debug!(
            frame = self.frame,
            frame_time = frame_data.frame_time,
            delta_time = frame_data.delta_time,
            "frame begun"
        );
        self.frame
    }

    /// Create a native instance from `state`.
    pub fn create(&mut self, state: &ParticleInitState) -> Result<InstanceHandle, BridgeError> {
        self.registry.ensure_capacity()?;

        let checksum = state.checksum();
        let index = self
            .engine
            .create_particle_system(&ParticleInitStateAbi::new(state));
        if index < 0 {
            error!(index, checksum = format_args!("{checksum:016x}"), "native create failed");
            return Err(BridgeError::CreateFailed { index });
        }
        if self.registry.contains_index(index) {
            error!(index, "native engine returned an index that is already live");
            return Err(BridgeError::DuplicateIndex { index });
        }

        let handle = self.registry.register(index, checksum)?;
        info!(
            %handle,
            index,
            checksum = format_args!("{checksum:016x}"),
            "particle system created"
        );
        Ok(handle)
    }

    pub fn set_active(&mut self, handle: InstanceHandle, active: bool) -> Result<(), BridgeError> {
        let entry = self.registry.get_mut(handle)?;
        entry.active = active;
        let index = entry.native_index;
        self.engine.set_active(index, active);
        debug!(%handle, index, active, "set active");
        Ok(())
    }

    pub fn is_active(&self, handle: InstanceHandle) -> Result<bool, BridgeError> {
        Ok(self.registry.get(handle)?.active)
    }

    /// Destroy an instance. Its per-frame schedule must already be cancelled.
    pub fn destroy(&mut self, handle: InstanceHandle) -> Result<(), BridgeError> {
        let index = self.registry.check_destroy(handle)?;
        self.engine.destroy_particle_system(index);
        self.registry.unregister(handle)?;
        info!(%handle, index, "particle system destroyed");
        Ok(())
    }

    /// Mark an instance as scheduled for per-frame work.
    pub fn schedule(&mut self, handle: InstanceHandle) -> Result<(), BridgeError> {
        self.registry.set_scheduled(handle, true)
    }

    /// Cancel any per-frame work for an instance.
    pub fn cancel(&mut self, handle: InstanceHandle) -> Result<(), BridgeError> {
        self.registry.set_scheduled(handle, false)
    }

    pub(crate) fn submit_update(
        &mut self,
        handle: InstanceHandle,
        world_matrix: Matrix4x4,
    ) -> Result<(), BridgeError> {
        let frame = self.frame;
        let index = self.registry.record_update(handle, frame)?;
        self.engine
            .update_particle_system(&UpdateData::new(index, world_matrix));
        debug!(%handle, index, frame, "update submitted");
        Ok(())
    }

    /// Native index for a render this frame, without issuing it.
    pub(crate) fn render_index(&self, handle: InstanceHandle) -> Result<i32, BridgeError> {
        self.registry.check_render(handle, self.frame)
    }

    pub(crate) fn submit_render(&mut self, index: i32, role: RenderRole) {
        self.engine.render(index, role);
    }

    /// Destroy every remaining instance and shut the engine down.
    pub fn shutdown(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;

        let remaining: Vec<_> = self.registry.handles().collect();
        if !remaining.is_empty() {
            warn!(count = remaining.len(), "destroying instances still live at shutdown");
        }
        for handle in remaining {
            if let Err(e) = self
                .cancel(handle)
                .and_then(|()| self.destroy(handle))
            {
                error!(%handle, "failed to destroy at shutdown: {e}");
            }
        }

        self.engine.shutdown();
        info!(frames = self.frame, "native engine shut down");
    }
}

impl<E: NativeEngine> Drop for NativeContext<E> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SequencingViolation;
    use crate::native::{EngineCall, HeadlessEngine, NullSink};
    use crate::test_utils::{ScriptedEngine, headless_context, sample_state};
    use std::sync::Arc;

    #[test]
    fn test_create_distinct_instances() {
        let mut ctx = headless_context(16);
        let state = sample_state();

        let handles: Vec<_> = (0..5).map(|_| ctx.create(&state).unwrap()).collect();
        let mut indices: Vec<_> = handles
            .iter()
            .map(|h| ctx.registry().get(*h).unwrap().native_index)
            .collect();
        indices.sort();
        indices.dedup();
        assert_eq!(indices.len(), 5);
        assert_eq!(ctx.engine().live_count(), 5);
    }

    #[test]
    fn test_registry_keeps_checksum() {
        let mut ctx = headless_context(4);
        let state = sample_state();
        let handle = ctx.create(&state).unwrap();
        assert_eq!(ctx.registry().get(handle).unwrap().checksum, state.checksum());

        let index = ctx.registry().get(handle).unwrap().native_index;
        assert_eq!(ctx.engine().instance(index).unwrap().state, state);
    }

    #[test]
    fn test_capacity_checked_before_native_create() {
        let mut ctx = headless_context(1);
        let state = ParticleInitState::default();
        ctx.create(&state).unwrap();

        assert!(matches!(
            ctx.create(&state),
            Err(BridgeError::CapacityExceeded { max: 1 })
        ));
        assert_eq!(ctx.engine().live_count(), 1);
    }

    #[test]
    fn test_create_failure() {
        let engine = ScriptedEngine::with_create_results([-1]);
        let mut ctx =
            NativeContext::startup(engine, &RuntimeConfig::default(), Arc::new(NullSink)).unwrap();

        assert!(matches!(
            ctx.create(&ParticleInitState::default()),
            Err(BridgeError::CreateFailed { index: -1 })
        ));
        assert!(ctx.registry().is_empty());
    }

    #[test]
    fn test_duplicate_index_keeps_existing() {
        let engine = ScriptedEngine::with_create_results([3, 3]);
        let mut ctx =
            NativeContext::startup(engine, &RuntimeConfig::default(), Arc::new(NullSink)).unwrap();
        let first = ctx.create(&ParticleInitState::default()).unwrap();

        assert!(matches!(
            ctx.create(&ParticleInitState::default()),
            Err(BridgeError::DuplicateIndex { index: 3 })
        ));
        assert_eq!(ctx.registry().len(), 1);
        assert!(ctx.registry().get(first).is_ok());
        assert!(ctx.engine().destroyed().is_empty());
    }

    #[test]
    fn test_destroyed_handle_is_stale() {
        let mut ctx = headless_context(4);
        let handle = ctx.create(&ParticleInitState::default()).unwrap();
        ctx.destroy(handle).unwrap();

        assert!(matches!(
            ctx.set_active(handle, false),
            Err(BridgeError::Sequencing(SequencingViolation::StaleHandle(_)))
        ));
        assert!(ctx.destroy(handle).is_err());
        assert_eq!(ctx.engine().live_count(), 0);
    }

    #[test]
    fn test_destroy_requires_cancel() {
        let mut ctx = headless_context(4);
        let handle = ctx.create(&ParticleInitState::default()).unwrap();
        ctx.schedule(handle).unwrap();

        assert!(matches!(
            ctx.destroy(handle),
            Err(BridgeError::Sequencing(SequencingViolation::DestroyWhileScheduled(_)))
        ));
        assert_eq!(ctx.engine().live_count(), 1);

        ctx.cancel(handle).unwrap();
        ctx.destroy(handle).unwrap();
        assert_eq!(ctx.engine().live_count(), 0);
    }

    #[test]
    fn test_set_active_forwarded() {
        let mut ctx = headless_context(4);
        let handle = ctx.create(&ParticleInitState::default()).unwrap();
        let index = ctx.registry().get(handle).unwrap().native_index;

        ctx.set_active(handle, false).unwrap();
        assert!(!ctx.is_active(handle).unwrap());
        assert!(!ctx.engine().instance(index).unwrap().active);
        assert_eq!(
            ctx.engine().calls().last(),
            Some(&EngineCall::SetActive {
                index,
                active: false
            })
        );
    }

    #[test]
    fn test_render_index_requires_update_this_frame() {
        let mut ctx = headless_context(4);
        let handle = ctx.create(&ParticleInitState::default()).unwrap();
        ctx.begin_frame(&FrameData::default());

        assert!(ctx.render_index(handle).is_err());
        ctx.submit_update(handle, Matrix4x4::IDENTITY).unwrap();
        assert!(ctx.render_index(handle).is_ok());

        ctx.begin_frame(&FrameData::default());
        assert!(ctx.render_index(handle).is_err());
    }

    // ========================================================================
    // Frames
    // ========================================================================

    #[test]
    fn test_begin_frame_forwards_clock_and_camera() {
        let mut ctx = headless_context(4);
        let view = Matrix4x4::from_translation(0.0, -1.0, 10.0);
        let first = FrameData::new(0.0, 1.0 / 60.0, view);
        let second = first.advance(1.0 / 30.0);

        assert_eq!(ctx.begin_frame(&first), 1);
        assert_eq!(ctx.begin_frame(&second), 2);

        assert_eq!(ctx.engine().frames(), 2);
        assert_eq!(ctx.engine().frame(), &second);
        let frames: Vec<_> = ctx
            .engine()
            .calls()
            .iter()
            .filter(|c| matches!(c, EngineCall::Frame(_)))
            .cloned()
            .collect();
        assert_eq!(frames, vec![EngineCall::Frame(first), EngineCall::Frame(second)]);
    }

    #[test]
    fn test_drop_destroys_then_shuts_down() {
        let engine = ScriptedEngine::default();
        let log = engine.call_log();
        let mut ctx =
            NativeContext::startup(engine, &RuntimeConfig::default(), Arc::new(NullSink)).unwrap();
        let a = ctx.create(&ParticleInitState::default()).unwrap();
        ctx.create(&ParticleInitState::default()).unwrap();
        ctx.schedule(a).unwrap();
        drop(ctx);

        let calls = log.lock().unwrap().clone();
        let destroys = calls
            .iter()
            .filter(|c| matches!(c, EngineCall::Destroy { .. }))
            .count();
        assert_eq!(destroys, 2);
        assert_eq!(calls.last(), Some(&EngineCall::Shutdown));
    }

    #[test]
    fn test_startup_failure_propagates() {
        let mut engine = HeadlessEngine::new();
        engine.startup().unwrap();
        let result = NativeContext::startup(engine, &RuntimeConfig::default(), Arc::new(NullSink));
        assert!(matches!(result, Err(BridgeError::AlreadyStarted)));
    }
}
