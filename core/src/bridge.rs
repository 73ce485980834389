//! Per-frame transform submission

use fxbridge_shared::Matrix4x4;
use glam::Mat4;

use crate::context::NativeContext;
use crate::error::BridgeError;
use crate::native::NativeEngine;
use crate::registry::InstanceHandle;

/// Submits each instance's world transform once per frame, ahead of its
/// render.
#[derive(Debug, Default)]
pub struct FrameUpdateBridge {
    submitted: u64,
}

impl FrameUpdateBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit `world` for `handle` in the context's current frame.
    ///
    /// Inactive instances are still forwarded; skipping them is the frame
    /// loop's decision.
    pub fn update<E: NativeEngine>(
        &mut self,
        ctx: &mut NativeContext<E>,
        handle: InstanceHandle,
        world: &Mat4,
    ) -> Result<(), BridgeError> {
        ctx.submit_update(handle, to_native(world))?;
        self.submitted += 1;
        Ok(())
    }

    /// Updates submitted through this bridge so far.
    pub fn submitted(&self) -> u64 {
        self.submitted
    }
}

/// Column-major copy of a `glam` matrix.
pub fn to_native(world: &Mat4) -> Matrix4x4 {
    bytemuck::cast(*world)
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::*;
    use crate::native::EngineCall;
    use crate::test_utils::headless_context;
    use fxbridge_shared::{FrameData, ParticleInitState};

    #[test]
    fn test_matrix_conversion_is_column_major() {
        let world = Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0));
        let native = to_native(&world);
        assert_eq!(native.translation(), [4.0, 5.0, 6.0]);
        assert_eq!(native.to_cols_array(), world.to_cols_array());
    }

    #[test]
    fn test_update_reaches_engine() {
        let mut ctx = headless_context(4);
        let handle = ctx.create(&ParticleInitState::default()).unwrap();
        let index = ctx.registry().get(handle).unwrap().native_index;
        ctx.begin_frame(&FrameData::default());

        let world = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Quat::from_rotation_y(1.0),
            Vec3::new(1.0, 0.0, -1.0),
        );
        let mut bridge = FrameUpdateBridge::new();
        bridge.update(&mut ctx, handle, &world).unwrap();

        assert_eq!(bridge.submitted(), 1);
        assert_eq!(
            ctx.engine().instance(index).unwrap().world_matrix,
            to_native(&world)
        );
        assert_eq!(
            ctx.engine().calls().last(),
            Some(&EngineCall::Update {
                index,
                world_matrix: to_native(&world)
            })
        );
    }

    #[test]
    fn test_update_of_inactive_instance_forwarded() {
        let mut ctx = headless_context(4);
        let handle = ctx.create(&ParticleInitState::default()).unwrap();
        ctx.set_active(handle, false).unwrap();
        ctx.begin_frame(&FrameData::default());

        let mut bridge = FrameUpdateBridge::new();
        bridge.update(&mut ctx, handle, &Mat4::IDENTITY).unwrap();
        assert_eq!(bridge.submitted(), 1);
    }

    #[test]
    fn test_update_after_destroy_rejected() {
        let mut ctx = headless_context(4);
        let handle = ctx.create(&ParticleInitState::default()).unwrap();
        ctx.destroy(handle).unwrap();

        let mut bridge = FrameUpdateBridge::new();
        let err = bridge.update(&mut ctx, handle, &Mat4::IDENTITY).unwrap_err();
        assert!(err.is_sequencing());
        assert_eq!(bridge.submitted(), 0);
    }
}
