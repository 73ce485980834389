//! Render dispatch

use smallvec::SmallVec;
use tracing::debug;

use crate::context::NativeContext;
use crate::error::BridgeError;
use crate::native::{NativeEngine, RenderRole};
use crate::registry::InstanceHandle;

/// Host-side draw state the engine's render call relies on (bound
/// material, mesh and pipeline).
pub trait DrawState {
    /// Make the state current if it is not already.
    fn ensure_bound(&mut self);
}

/// Draw state for hosts with nothing to bind.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDrawState;

impl DrawState for NullDrawState {
    fn ensure_bound(&mut self) {}
}

/// Issues native render calls after checking ordering and binding draw
/// state.
#[derive(Debug)]
pub struct RenderDispatcher<D: DrawState> {
    draw_state: D,
    dispatched: u64,
}

impl<D: DrawState> RenderDispatcher<D> {
    pub fn new(draw_state: D) -> Self {
        Self {
            draw_state,
            dispatched: 0,
        }
    }

    pub fn draw_state(&self) -> &D {
        &self.draw_state
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Render `handle` with `role` in the context's current frame.
    ///
    /// The instance must have been updated in this frame. Draw state is only
    /// touched once the call is known to be valid.
    pub fn render<E: NativeEngine>(
        &mut self,
        ctx: &mut NativeContext<E>,
        handle: InstanceHandle,
        role: RenderRole,
    ) -> Result<(), BridgeError> {
        let index = ctx.render_index(handle)?;
        self.dispatch(ctx, handle, index, role);
        Ok(())
    }

    /// Render `handles` as one batch with positional roles.
    ///
    /// Every handle is checked before the first call, and roles are assigned
    /// over the handles that passed, so the engine always sees a closed
    /// batch. Returns the first rejection after the rest have rendered.
    pub fn render_batch<E: NativeEngine>(
        &mut self,
        ctx: &mut NativeContext<E>,
        handles: &[InstanceHandle],
    ) -> Result<(), BridgeError> {
        let mut rejected = None;
        let ready: SmallVec<[(InstanceHandle, i32); 16]> = handles
            .iter()
            .filter_map(|&handle| match ctx.render_index(handle) {
                Ok(index) => Some((handle, index)),
                Err(e) => {
                    rejected.get_or_insert(e);
                    None
                }
            })
            .collect();

        let len = ready.len();
        for (position, (handle, index)) in ready.into_iter().enumerate() {
            self.dispatch(ctx, handle, index, RenderRole::for_position(position, len));
        }
        rejected.map_or(Ok(()), Err)
    }

    /// Issue a render already cleared by [`NativeContext::render_index`].
    pub(crate) fn dispatch<E: NativeEngine>(
        &mut self,
        ctx: &mut NativeContext<E>,
        handle: InstanceHandle,
        index: i32,
        role: RenderRole,
    ) {
        self.draw_state.ensure_bound();
        ctx.submit_render(index, role);
        self.dispatched += 1;
        debug!(%handle, index, ?role, "render dispatched");
    }
}

#[cfg(test)]
mod tests {
    use fxbridge_shared::{FrameData, Matrix4x4, ParticleInitState};

    use super::*;
    use crate::error::SequencingViolation;
    use crate::native::EngineCall;
    use crate::test_utils::{CountingDrawState, headless_context};

    #[test]
    fn test_render_before_update_rejected() {
        let mut ctx = headless_context(4);
        let handle = ctx.create(&ParticleInitState::default()).unwrap();
        ctx.begin_frame(&FrameData::default());

        let mut dispatcher = RenderDispatcher::new(CountingDrawState::default());
        let err = dispatcher
            .render(&mut ctx, handle, RenderRole::FIRST | RenderRole::LAST)
            .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Sequencing(SequencingViolation::RenderBeforeUpdate { frame: 1, .. })
        ));
        assert_eq!(dispatcher.draw_state().binds, 0);
        assert!(!ctx
            .engine()
            .calls()
            .iter()
            .any(|c| matches!(c, EngineCall::Render { .. })));
    }

    #[test]
    fn test_render_binds_then_calls_engine() {
        let mut ctx = headless_context(4);
        let handle = ctx.create(&ParticleInitState::default()).unwrap();
        let index = ctx.registry().get(handle).unwrap().native_index;
        ctx.begin_frame(&FrameData::default());
        ctx.submit_update(handle, Matrix4x4::IDENTITY).unwrap();

        let mut dispatcher = RenderDispatcher::new(CountingDrawState::default());
        dispatcher
            .render(&mut ctx, handle, RenderRole::FIRST | RenderRole::LAST)
            .unwrap();

        assert_eq!(dispatcher.draw_state().binds, 1);
        assert_eq!(dispatcher.dispatched(), 1);
        assert_eq!(
            ctx.engine().calls().last(),
            Some(&EngineCall::Render {
                index,
                role: RenderRole::FIRST | RenderRole::LAST
            })
        );
    }

    #[test]
    fn test_batch_assigns_roles() {
        let mut ctx = headless_context(8);
        let handles: Vec<_> = (0..3)
            .map(|_| ctx.create(&ParticleInitState::default()).unwrap())
            .collect();
        ctx.begin_frame(&FrameData::default());
        for &h in &handles {
            ctx.submit_update(h, Matrix4x4::IDENTITY).unwrap();
        }

        let mut dispatcher = RenderDispatcher::new(NullDrawState);
        dispatcher.render_batch(&mut ctx, &handles).unwrap();

        let roles: Vec<_> = ctx
            .engine()
            .calls()
            .iter()
            .filter_map(|c| match c {
                EngineCall::Render { role, .. } => Some(*role),
                _ => None,
            })
            .collect();
        assert_eq!(
            roles,
            vec![RenderRole::FIRST, RenderRole::NORMAL, RenderRole::LAST]
        );
        assert_eq!(ctx.engine().violations(), 0);
    }

    fn render_roles(ctx: &NativeContext<crate::native::HeadlessEngine>) -> Vec<(i32, RenderRole)> {
        ctx.engine()
            .calls()
            .iter()
            .filter_map(|c| match c {
                EngineCall::Render { index, role } => Some((*index, *role)),
                _ => None,
            })
            .collect()
    }

    // ========================================================================
    // Batches with rejected handles
    // ========================================================================

    #[test]
    fn test_batch_closes_when_first_handle_rejected() {
        let mut ctx = headless_context(8);
        let handles: Vec<_> = (0..3)
            .map(|_| ctx.create(&ParticleInitState::default()).unwrap())
            .collect();
        ctx.begin_frame(&FrameData::default());
        for &h in &handles[1..] {
            ctx.submit_update(h, Matrix4x4::IDENTITY).unwrap();
        }
        let index = |h: InstanceHandle| ctx.registry().get(h).unwrap().native_index;
        let (second, third) = (index(handles[1]), index(handles[2]));

        let mut dispatcher = RenderDispatcher::new(CountingDrawState::default());
        let err = dispatcher.render_batch(&mut ctx, &handles).unwrap_err();

        assert!(matches!(
            err,
            BridgeError::Sequencing(SequencingViolation::RenderBeforeUpdate { .. })
        ));
        assert_eq!(
            render_roles(&ctx),
            vec![(second, RenderRole::FIRST), (third, RenderRole::LAST)]
        );
        assert_eq!(dispatcher.dispatched(), 2);
        assert_eq!(ctx.engine().violations(), 0);
    }

    #[test]
    fn test_batch_closes_when_last_handle_rejected() {
        let mut ctx = headless_context(8);
        let handles: Vec<_> = (0..3)
            .map(|_| ctx.create(&ParticleInitState::default()).unwrap())
            .collect();
        ctx.begin_frame(&FrameData::default());
        for &h in &handles[..2] {
            ctx.submit_update(h, Matrix4x4::IDENTITY).unwrap();
        }

        let mut dispatcher = RenderDispatcher::new(NullDrawState);
        assert!(dispatcher.render_batch(&mut ctx, &handles).is_err());

        let roles: Vec<_> = render_roles(&ctx).into_iter().map(|(_, role)| role).collect();
        assert_eq!(roles, vec![RenderRole::FIRST, RenderRole::LAST]);
        assert_eq!(ctx.engine().violations(), 0);

        // The engine accepts a fresh batch afterwards
        ctx.begin_frame(&FrameData::default());
        ctx.submit_update(handles[0], Matrix4x4::IDENTITY).unwrap();
        dispatcher.render_batch(&mut ctx, &handles[..1]).unwrap();
        assert_eq!(ctx.engine().violations(), 0);
    }

    #[test]
    fn test_batch_with_every_handle_rejected_renders_nothing() {
        let mut ctx = headless_context(8);
        let handles: Vec<_> = (0..2)
            .map(|_| ctx.create(&ParticleInitState::default()).unwrap())
            .collect();
        ctx.begin_frame(&FrameData::default());

        let mut dispatcher = RenderDispatcher::new(CountingDrawState::default());
        assert!(dispatcher.render_batch(&mut ctx, &handles).is_err());
        assert!(render_roles(&ctx).is_empty());
        assert_eq!(dispatcher.draw_state().binds, 0);
    }
}
