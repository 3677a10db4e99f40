// THEORY:
// The `PipelineDriver` is the only stateful part of the engine. It owns the render
// sink, the particle buffer and (once acquired) the capture source, and turns the
// stateless `HighlightPipeline` into a per-refresh loop.
//
// Lifecycle:
//   Uninitialized --initialize()--> AwaitingCapture --source ready--> Running
//   any state --stop flag--> Stopped
//
// Key principles:
// 1.  **One pass per tick**: `tick` is a single scheduled invocation. It either
//     completes a whole pass (snapshot, analyse, write particles, present) or skips
//     it. Nothing suspends mid-pass, so the particle buffer needs no locking.
// 2.  **Failures end the pass, not the loop**: bad geometry, a failed snapshot or a
//     failed present are logged and the next tick starts fresh. Capture acquisition
//     failure is logged once and the driver idles in `AwaitingCapture` for good.
// 3.  **Explicit shutdown**: a `StopHandle` flips a watch flag that is checked at
//     the top of every tick and wakes the run loop immediately.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, debug_span, error, info, warn};

use crate::core_modules::frame::Frame;
use crate::core_modules::particle_buffer::ParticleBuffer;
use crate::core_modules::projector::ProjectedPoint;
use crate::error::Result;
use crate::pipeline::{FrameDropPolicy, HighlightPipeline, PipelineConfig};

/// A device that yields RGBA8 snapshots on demand.
pub trait FrameSource {
    /// Whether a complete frame can be snapshotted right now.
    fn is_ready(&self) -> bool;
    /// Width and height of the frames `snapshot` returns.
    fn dimensions(&self) -> (u32, u32);
    /// Row-major RGBA8 bytes for the current frame. The slice is only read for the
    /// duration of one pass.
    fn snapshot(&mut self) -> Result<&[u8]>;
}

/// Consumer of the per-pass point cloud.
pub trait RenderSink {
    /// Allocates whatever the sink needs to draw `capacity` particles. Failing here
    /// aborts driver initialization.
    fn prepare(&mut self, capacity: usize) -> Result<()>;
    /// Called once per completed pass, after the particle buffer is updated.
    fn present(&mut self, points: &[ProjectedPoint], particles: &ParticleBuffer) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Uninitialized,
    AwaitingCapture,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotInitialized,
    AwaitingCapture,
    InvalidFrameGeometry,
    SnapshotFailed,
    RenderFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Completed { points: usize },
    Skipped(SkipReason),
    Stopped,
}

/// Requests a clean shutdown of a driver from anywhere.
#[derive(Clone)]
pub struct StopHandle {
    stop_tx: watch::Sender<bool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }
}

pub struct PipelineDriver<S, R> {
    pipeline: HighlightPipeline,
    particles: ParticleBuffer,
    sink: R,
    source: Option<S>,
    state: DriverState,
    capture_failed: bool,
    passes: u64,
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
}

impl<S: FrameSource, R: RenderSink> PipelineDriver<S, R> {
    pub fn new(config: PipelineConfig, sink: R) -> Result<Self> {
        let particles = ParticleBuffer::new(config.max_bright_points, config.projection_distance);
        let pipeline = HighlightPipeline::new(config)?;
        let (stop_tx, stop_rx) = watch::channel(false);
        Ok(Self {
            pipeline,
            particles,
            sink,
            source: None,
            state: DriverState::Uninitialized,
            capture_failed: false,
            passes: 0,
            stop_tx,
            stop_rx,
        })
    }

    /// Prepares the render sink. On failure the driver stays `Uninitialized`.
    pub fn initialize(&mut self) -> Result<()> {
        if self.state != DriverState::Uninitialized {
            return Ok(());
        }
        if let Err(err) = self.sink.prepare(self.particles.capacity()) {
            error!(%err, "render sink could not be prepared; aborting initialization");
            return Err(err);
        }
        self.state = DriverState::AwaitingCapture;
        info!(capacity = self.particles.capacity(), "driver initialized, awaiting capture");
        Ok(())
    }

    /// Hands over the result of acquiring a capture source.
    ///
    /// A failed acquisition is reported once. The driver never retries and ignores
    /// any later attach attempts, staying in `AwaitingCapture`.
    pub fn attach_capture(&mut self, acquired: Result<S>) {
        if self.capture_failed {
            debug!("capture already failed; ignoring attach");
            return;
        }
        match acquired {
            Ok(source) => {
                let (width, height) = source.dimensions();
                info!(width, height, "capture source attached");
                self.source = Some(source);
            }
            Err(err) => {
                error!(%err, "capture source unavailable; pipeline will stay idle");
                self.capture_failed = true;
            }
        }
    }

    /// Awaits an asynchronous acquisition and attaches its result.
    pub async fn acquire_capture<F>(&mut self, acquisition: F)
    where
        F: Future<Output = Result<S>>,
    {
        let acquired = acquisition.await;
        self.attach_capture(acquired);
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            stop_tx: self.stop_tx.clone(),
        }
    }

    /// One scheduled invocation.
    pub fn tick(&mut self) -> TickOutcome {
        if *self.stop_rx.borrow() {
            self.mark_stopped();
            return TickOutcome::Stopped;
        }
        match self.state {
            DriverState::Uninitialized => return TickOutcome::Skipped(SkipReason::NotInitialized),
            DriverState::Stopped => return TickOutcome::Stopped,
            DriverState::AwaitingCapture | DriverState::Running => {}
        }

        let Some(source) = self.source.as_mut() else {
            return TickOutcome::Skipped(SkipReason::AwaitingCapture);
        };
        if !source.is_ready() {
            return TickOutcome::Skipped(SkipReason::AwaitingCapture);
        }
        if self.state == DriverState::AwaitingCapture {
            info!("capture ready, running");
            self.state = DriverState::Running;
        }

        self.passes += 1;
        let span = debug_span!("pass", frame = self.passes);
        let _enter = span.enter();

        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            warn!(width, height, "zero-sized frame; skipping pass");
            return TickOutcome::Skipped(SkipReason::InvalidFrameGeometry);
        }
        let data = match source.snapshot() {
            Ok(data) => data,
            Err(err) => {
                warn!(%err, "snapshot failed; skipping pass");
                return TickOutcome::Skipped(SkipReason::SnapshotFailed);
            }
        };
        let frame = match Frame::new(width, height, data) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(%err, "unusable frame; skipping pass");
                return TickOutcome::Skipped(SkipReason::InvalidFrameGeometry);
            }
        };

        let points = self.pipeline.process_frame(&frame);
        // Rolled back if the sink rejects the pass, so the buffer only ever holds
        // points that were presented.
        let previous = self.particles.clone();
        let written = self.particles.write(&points);
        if let Err(err) = self.sink.present(&points[..written], &self.particles) {
            warn!(%err, "render sink rejected the pass");
            self.particles = previous;
            return TickOutcome::Skipped(SkipReason::RenderFailed);
        }

        debug!(points = written, "pass complete");
        TickOutcome::Completed { points: written }
    }

    /// Ticks once per `refresh_interval` until stopped.
    pub async fn run(&mut self, refresh_interval: Duration) -> Result<()> {
        self.initialize()?;

        let mut interval = tokio::time::interval(refresh_interval);
        interval.set_missed_tick_behavior(missed_tick_behavior(
            self.pipeline.config().frame_drop_policy,
        ));
        let mut stop_rx = self.stop_rx.clone();

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if self.tick() == TickOutcome::Stopped {
                        break;
                    }
                }
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow_and_update() {
                        self.mark_stopped();
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn mark_stopped(&mut self) {
        if self.state != DriverState::Stopped {
            info!(passes = self.passes, "driver stopped");
            self.state = DriverState::Stopped;
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn particles(&self) -> &ParticleBuffer {
        &self.particles
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    pub fn config(&self) -> &PipelineConfig {
        self.pipeline.config()
    }

    /// Passes attempted since the capture source became ready.
    pub fn passes(&self) -> u64 {
        self.passes
    }
}

/// How the refresh timer treats slots that a slow pass overran.
pub fn missed_tick_behavior(policy: FrameDropPolicy) -> MissedTickBehavior {
    match policy {
        FrameDropPolicy::Delay => MissedTickBehavior::Delay,
        FrameDropPolicy::Skip => MissedTickBehavior::Skip,
    }
}
