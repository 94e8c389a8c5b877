use crate::errors::AppError;

/// A single color frame pulled from a capture stream.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub timestamp: f64, // device clock, as reported by the driver
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>, // packed RGB8, row-major
}

// --- The FrameSource Trait ---

/// Blocking stream of color frames. `next_frame` waits as long as the
/// underlying driver does; no extra timeout is layered on top.
pub trait FrameSource {
    fn name(&self) -> String;

    fn start(&mut self) -> Result<(), AppError>;

    fn next_frame(&mut self) -> Result<CapturedFrame, AppError>;

    // Must be safe to call on a stream that never started.
    fn stop(&mut self);
}
