//! Native engine loaded from a shared library
//!
//! The library exports the engine's C entry points by name. Symbols are
//! resolved once at load time and called through plain function pointers;
//! the [`Library`] is kept alive for as long as those pointers are.
//!
//! The engine keeps process-global state, so at most one library engine may
//! be started at a time.

use std::ffi::{CStr, c_char};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use fxbridge_shared::{FrameData, UpdateData};
use libloading::Library;
use tracing::{debug, info};

use super::{NativeEngine, RenderRole, SharedLogSink};
use crate::abi::ParticleInitStateAbi;
use crate::error::BridgeError;

type LogCallback = unsafe extern "C" fn(*const c_char);

type StartupFn = unsafe extern "C" fn();
type ShutdownFn = unsafe extern "C" fn();
type LinkDebugFn = unsafe extern "C" fn(Option<LogCallback>);
type CreateFn = unsafe extern "C" fn(*const ParticleInitStateAbi<'static>) -> i32;
type UpdateFrameFn = unsafe extern "C" fn(*const FrameData);
type UpdateFn = unsafe extern "C" fn(*const UpdateData);
type RenderFn = unsafe extern "C" fn(i32, u8);
type SetActiveFn = unsafe extern "C" fn(i32, bool);
type DestroyFn = unsafe extern "C" fn(i32);

static STARTED: AtomicBool = AtomicBool::new(false);
static LOG_SINK: RwLock<Option<SharedLogSink>> = RwLock::new(None);

unsafe extern "C" fn forward_native_log(message: *const c_char) {
    if message.is_null() {
        return;
    }
    // SAFETY: the engine passes a NUL-terminated string valid for this call
    let text = unsafe { CStr::from_ptr(message) }.to_string_lossy();
    if let Ok(guard) = LOG_SINK.read()
        && let Some(sink) = guard.as_ref()
    {
        sink.log(&text);
    }
}

/// A native engine bound from a shared library.
pub struct NativeLibrary {
    path: PathBuf,
    startup: StartupFn,
    shutdown: ShutdownFn,
    link_debug: LinkDebugFn,
    create: CreateFn,
    update_frame: UpdateFrameFn,
    update: UpdateFn,
    render: RenderFn,
    set_active: SetActiveFn,
    destroy: DestroyFn,
    started: bool,
    // Keeps every function pointer above valid
    _library: Library,
}

impl std::fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeLibrary")
            .field("path", &self.path)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl NativeLibrary {
    /// Load the library at `path` and resolve every entry point.
    ///
    /// # Safety
    ///
    /// Loading runs the library's initializers, and the resolved symbols are
    /// trusted to have the signatures of the native declarations.
    pub unsafe fn load(path: &Path) -> Result<Self, BridgeError> {
        let wrap = |source| BridgeError::Library {
            path: path.display().to_string(),
            source,
        };

        // SAFETY: forwarded to the caller
        unsafe {
            let library = Library::new(path).map_err(wrap)?;
            let startup = *library.get::<StartupFn>(b"startup\0").map_err(wrap)?;
            let shutdown = *library.get::<ShutdownFn>(b"shutdown\0").map_err(wrap)?;
            let link_debug = *library.get::<LinkDebugFn>(b"link_debug\0").map_err(wrap)?;
            let create = *library
                .get::<CreateFn>(b"create_particle_system\0")
                .map_err(wrap)?;
            let update_frame = *library
                .get::<UpdateFrameFn>(b"update_frame\0")
                .map_err(wrap)?;
            let update = *library
                .get::<UpdateFn>(b"update_particle_system\0")
                .map_err(wrap)?;
            let render = *library.get::<RenderFn>(b"render\0").map_err(wrap)?;
            let set_active = *library.get::<SetActiveFn>(b"set_active\0").map_err(wrap)?;
            let destroy = *library
                .get::<DestroyFn>(b"destroy_particle_system\0")
                .map_err(wrap)?;

            info!("Loaded native engine from {}", path.display());
            Ok(Self {
                path: path.to_path_buf(),
                startup,
                shutdown,
                link_debug,
                create,
                update_frame,
                update,
                render,
                set_active,
                destroy,
                started: false,
                _library: library,
            })
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NativeEngine for NativeLibrary {
    fn startup(&mut self) -> Result<(), BridgeError> {
        if STARTED.swap(true, Ordering::AcqRel) {
            return Err(BridgeError::AlreadyStarted);
        }
        // SAFETY: resolved from the library held by `self`
        unsafe { (self.startup)() };
        self.started = true;
        Ok(())
    }

    fn link_debug(&mut self, sink: SharedLogSink) {
        match LOG_SINK.write() {
            Ok(mut slot) => *slot = Some(sink),
            Err(poisoned) => *poisoned.into_inner() = Some(sink),
        }
        // SAFETY: resolved from the library held by `self`
        unsafe { (self.link_debug)(Some(forward_native_log)) };
    }

    fn shutdown(&mut self) {
        if !self.started {
            return;
        }
        // SAFETY: resolved from the library held by `self`
        unsafe {
            (self.link_debug)(None);
            (self.shutdown)();
        }
        match LOG_SINK.write() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
        self.started = false;
        STARTED.store(false, Ordering::Release);
        debug!("Native engine {} shut down", self.path.display());
    }

    fn create_particle_system(&mut self, init_state: &ParticleInitStateAbi<'_>) -> i32 {
        let ptr: *const ParticleInitStateAbi<'_> = init_state;
        // SAFETY: the view and everything it points to outlive this call
        unsafe { (self.create)(ptr.cast()) }
    }

    fn update_frame(&mut self, frame_data: &FrameData) {
        // SAFETY: `FrameData` is `#[repr(C)]` and borrowed for the call
        unsafe { (self.update_frame)(frame_data) }
    }

    fn update_particle_system(&mut self, update_data: &UpdateData) {
        // SAFETY: `UpdateData` is `#[repr(C)]` and borrowed for the call
        unsafe { (self.update)(update_data) }
    }

    fn render(&mut self, index: i32, role: RenderRole) {
        // SAFETY: plain scalar arguments
        unsafe { (self.render)(index, role.bits()) }
    }

    fn set_active(&mut self, index: i32, active: bool) {
        // SAFETY: plain scalar arguments
        unsafe { (self.set_active)(index, active) }
    }

    fn destroy_particle_system(&mut self, index: i32) {
        // SAFETY: plain scalar arguments
        unsafe { (self.destroy)(index) }
    }
}

impl Drop for NativeLibrary {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libabsent_engine.so");
        let err = unsafe { NativeLibrary::load(&path) }.unwrap_err();
        assert!(matches!(err, BridgeError::Library { .. }));
        assert!(err.to_string().contains("libabsent_engine"));
    }

    #[test]
    fn test_log_trampoline_ignores_null() {
        unsafe { forward_native_log(std::ptr::null()) };
    }
}
