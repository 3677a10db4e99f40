// THEORY:
// This file is the main entry point for the `glint_vision` library crate. It exposes
// two layers:
//
// - `pipeline`: the stateless per-frame analysis (edge map, bright-point
//   extraction, ranking, projection) as a single `HighlightPipeline::process_frame`.
// - `driver`: the stateful per-refresh loop that pulls frames from a `FrameSource`,
//   keeps the fixed-size particle buffer, and hands every pass to a `RenderSink`.
//
// The building blocks under `core_modules` stay public so each stage can be
// exercised on its own.

pub mod core_modules;
pub mod driver;
pub mod error;
pub mod pipeline;

pub use core_modules::frame::Frame;
pub use core_modules::particle_buffer::ParticleBuffer;
pub use core_modules::projector::ProjectedPoint;
pub use driver::{
    DriverState, FrameSource, PipelineDriver, RenderSink, SkipReason, StopHandle, TickOutcome,
};
pub use error::{GlintError, Result};
pub use pipeline::{FrameDropPolicy, HighlightPipeline, PipelineConfig};
