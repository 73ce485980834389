//! Per-frame outcome

use tracing::error;

use super::EmitterId;
use crate::error::BridgeError;

/// Which pass a failure happened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramePass {
    Update,
    Render,
}

/// An emitter removed from the loop after a failed call.
#[derive(Debug)]
pub struct AbortedEmitter {
    pub id: EmitterId,
    pub pass: FramePass,
    pub error: BridgeError,
}

/// What one [`super::FrameLoop::run_frame`] did.
#[derive(Debug)]
pub struct FrameReport {
    pub frame: u64,
    pub updated: usize,
    pub rendered: usize,
    /// Inactive emitters left out of both passes.
    pub skipped: usize,
    pub aborted: Vec<AbortedEmitter>,
}

impl FrameReport {
    pub(super) fn new(frame: u64) -> Self {
        Self {
            frame,
            updated: 0,
            rendered: 0,
            skipped: 0,
            aborted: Vec::new(),
        }
    }

    pub(super) fn record_failure(&mut self, id: EmitterId, pass: FramePass, error: BridgeError) {
        error!(frame = self.frame, %id, ?pass, "{error}");
        self.aborted.push(AbortedEmitter { id, pass, error });
    }

    pub fn is_clean(&self) -> bool {
        self.aborted.is_empty()
    }
}
