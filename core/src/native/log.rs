//! Native log forwarding

use std::sync::Arc;

/// Receives log lines emitted by the native engine.
pub trait LogSink: Send + Sync {
    fn log(&self, message: &str);
}

pub type SharedLogSink = Arc<dyn LogSink>;

/// Forwards native lines to `tracing` under the `fxbridge::native` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, message: &str) {
        tracing::info!(target: "fxbridge::native", "{}", message.trim_end());
    }
}

/// Discards native lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _message: &str) {}
}
