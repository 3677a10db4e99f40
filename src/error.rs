use thiserror::Error;

/// Everything that can go wrong between a capture device and the render sink.
///
/// None of these escape the driver's per-frame loop: a pass that hits one is
/// skipped and the error is surfaced through `tracing` only. They are returned
/// as values from the building blocks so tests and embedders can match on them.
#[derive(Debug, Error)]
pub enum GlintError {
    #[error("capture source unavailable: {reason}")]
    CaptureUnavailable { reason: String },
    #[error("frame stream ended")]
    StreamEnded,
    #[error("invalid frame geometry {width}x{height}")]
    InvalidFrameGeometry { width: u32, height: u32 },
    #[error("frame buffer holds {actual} bytes, expected {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },
    #[error("render target unavailable: {reason}")]
    RenderTargetUnavailable { reason: String },
    #[error("invalid pipeline config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, GlintError>;
