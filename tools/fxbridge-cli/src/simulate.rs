//! Simulate command - drive emitters through the frame loop
//!
//! Runs on the in-process headless engine unless `--library` names a native
//! engine shared library.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use glam::{Mat4, Vec3};
use fxbridge_core::{
    BridgeConfig, FrameData, FrameLoop, HeadlessEngine, NativeContext, NativeEngine, NullDrawState,
    NullSink, ParticleEmitter, PropertyTree, SharedLogSink, StateAssembler, TracingSink, to_native,
};

/// Arguments for the simulate command
#[derive(Args)]
pub struct SimulateArgs {
    /// Authoring export (JSON property tree)
    pub input: PathBuf,

    /// Number of frames to run
    #[arg(short, long, default_value = "60")]
    pub frames: u64,

    /// Number of emitter instances to spawn
    #[arg(short, long, default_value = "1")]
    pub count: usize,

    /// Distance between spawned emitters along X
    #[arg(long, default_value = "1.0")]
    pub spacing: f32,

    /// Seconds per simulated frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    pub delta: f32,

    /// Camera distance from the origin along +Z
    #[arg(long, default_value = "10.0")]
    pub camera_distance: f32,

    /// Native engine shared library (headless engine when omitted)
    #[cfg(feature = "dylib")]
    #[arg(long)]
    pub library: Option<PathBuf>,
}

/// Totals over a whole simulation.
#[derive(Debug, Default, PartialEq)]
pub struct SimulationSummary {
    pub frames: u64,
    pub updates: usize,
    pub renders: usize,
    pub skipped: usize,
    pub aborted: usize,
    /// Engine clock after the last frame, in seconds.
    pub elapsed: f32,
}

/// Execute the simulate command
pub fn execute(config: &BridgeConfig, args: SimulateArgs) -> Result<()> {
    if args.count == 0 {
        bail!("--count must be at least 1");
    }
    if !(args.delta.is_finite() && args.delta > 0.0) {
        bail!("--delta must be a positive number of seconds");
    }
    let timing = Timing {
        frames: args.frames,
        delta_time: args.delta,
        view: Mat4::look_at_rh(Vec3::Z * args.camera_distance, Vec3::ZERO, Vec3::Y),
    };

    let tree = PropertyTree::load(&args.input)?;
    let emitters = (0..args.count)
        .map(|i| {
            let mut emitter = ParticleEmitter::from_source(
                format!("emitter-{i}"),
                &StateAssembler::from_config(&config.extraction),
                &tree,
            )?;
            emitter.set_transform(Mat4::from_translation(Vec3::X * args.spacing * i as f32));
            Ok(emitter)
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Failed to assemble {}", args.input.display()))?;

    let sink: SharedLogSink = if config.logging.forward_native {
        Arc::new(TracingSink)
    } else {
        Arc::new(NullSink)
    };

    #[cfg(feature = "dylib")]
    if let Some(path) = &args.library {
        // SAFETY: the user names a library built against the native engine ABI
        let engine = unsafe { fxbridge_core::NativeLibrary::load(path) }?;
        let summary = run(engine, config, sink, emitters, &timing)?;
        print_summary(&summary);
        return Ok(());
    }

    let summary = run(HeadlessEngine::new(), config, sink, emitters, &timing)?;
    print_summary(&summary);
    Ok(())
}

/// Frame count, fixed step and camera for a simulation.
#[derive(Debug, Clone)]
pub struct Timing {
    pub frames: u64,
    pub delta_time: f32,
    pub view: Mat4,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            frames: 60,
            delta_time: 1.0 / 60.0,
            view: Mat4::IDENTITY,
        }
    }
}

/// Spawn `emitters` on `engine` and run `timing.frames` fixed-step frames.
pub fn run<E: NativeEngine>(
    engine: E,
    config: &BridgeConfig,
    sink: SharedLogSink,
    emitters: Vec<ParticleEmitter>,
    timing: &Timing,
) -> Result<SimulationSummary> {
    let ctx = NativeContext::startup(engine, &config.runtime, sink)?;
    let mut frame_loop = FrameLoop::new(ctx, NullDrawState);
    for emitter in emitters {
        let name = emitter.name().to_owned();
        let id = frame_loop
            .spawn(emitter)
            .with_context(|| format!("Failed to spawn {name}"))?;
        tracing::debug!("Spawned {name} as {id}");
    }

    let mut summary = SimulationSummary::default();
    let mut frame_data = FrameData::new(0.0, 0.0, to_native(&timing.view));
    for _ in 0..timing.frames {
        frame_data = frame_data.advance(timing.delta_time);
        let report = frame_loop.run_frame(&frame_data);
        summary.frames += 1;
        summary.updates += report.updated;
        summary.renders += report.rendered;
        summary.skipped += report.skipped;
        summary.aborted += report.aborted.len();
        summary.elapsed = frame_data.frame_time;
        if frame_loop.is_empty() {
            tracing::warn!("No emitters left after frame {}", report.frame);
            break;
        }
    }

    frame_loop.shutdown();
    Ok(summary)
}

fn print_summary(summary: &SimulationSummary) {
    println!("frames:   {}", summary.frames);
    println!("updates:  {}", summary.updates);
    println!("renders:  {}", summary.renders);
    println!("skipped:  {}", summary.skipped);
    println!("aborted:  {}", summary.aborted);
    println!("elapsed:  {:.3}s", summary.elapsed);
}
