//! Native particle engine boundary
//!
//! [`NativeEngine`] is the complete call surface of the engine. It is
//! implemented by [`HeadlessEngine`], an in-process engine used by tools and
//! tests, and by [`NativeLibrary`], which binds the same calls from a shared
//! library at runtime.
//!
//! All calls happen on the render thread. None of them report errors: the
//! engine's only outward channel is the log sink linked at startup.

use bitflags::bitflags;
use fxbridge_shared::{FrameData, UpdateData};

use crate::abi::ParticleInitStateAbi;
use crate::error::BridgeError;

mod headless;
#[cfg(feature = "dylib")]
mod library;
mod log;

pub use headless::{EngineCall, HeadlessEngine, HeadlessInstance};
#[cfg(feature = "dylib")]
pub use library::NativeLibrary;
pub use log::{LogSink, NullSink, SharedLogSink, TracingSink};

bitflags! {
    /// Position of a render call within one frame's batch.
    ///
    /// The engine binds shared GPU state on `FIRST` and flushes on `LAST`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RenderRole: u8 {
        const FIRST = 1;
        const NORMAL = 2;
        const LAST = 4;
    }
}

impl RenderRole {
    /// Role of the `position`-th render in a batch of `len`.
    pub fn for_position(position: usize, len: usize) -> Self {
        match (position, len) {
            (_, 1) => Self::FIRST | Self::LAST,
            (0, _) => Self::FIRST,
            (p, n) if p + 1 == n => Self::LAST,
            _ => Self::NORMAL,
        }
    }
}

/// Call surface of a native particle engine.
pub trait NativeEngine {
    /// Bring the engine up. Called once before any other call.
    fn startup(&mut self) -> Result<(), BridgeError>;

    /// Install the sink that receives the engine's log lines.
    fn link_debug(&mut self, sink: SharedLogSink);

    /// Tear the engine down; every instance is gone afterwards.
    fn shutdown(&mut self);

    /// Create an instance from a borrowed state view.
    ///
    /// Returns the new instance index, negative on failure.
    fn create_particle_system(&mut self, init_state: &ParticleInitStateAbi<'_>) -> i32;

    /// Advance the engine clock and camera. Sent once per frame, before any
    /// instance update.
    fn update_frame(&mut self, frame_data: &FrameData);

    fn update_particle_system(&mut self, update_data: &UpdateData);

    fn render(&mut self, index: i32, role: RenderRole);

    fn set_active(&mut self, index: i32, active: bool);

    fn destroy_particle_system(&mut self, index: i32);
}
