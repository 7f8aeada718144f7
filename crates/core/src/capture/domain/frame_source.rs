use thiserror::Error;

use crate::shared::frame::Frame;

/// The capture graph could not be assembled. Fatal to startup, never retried:
/// it usually means missing hardware or permissions.
#[derive(Debug, Error)]
pub enum CaptureSetupError {
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("capture input could not be attached: {0}")]
    InputRejected(String),
    #[error("capture output could not be attached: {0}")]
    OutputRejected(String),
    #[error("capture I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CameraPosition {
    #[default]
    Front,
    Back,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
    Gray8,
}

impl PixelFormat {
    pub fn channels(self) -> u8 {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// What an opened source will deliver.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub position: CameraPosition,
    pub pixel_format: PixelFormat,
}

/// A camera-like producer of frames.
///
/// `next_frame` blocks until the next frame is due, so implementations own
/// their pacing; `None` ends the stream. Frame indices increase by one.
pub trait FrameSource: Send {
    fn open(&mut self) -> Result<SourceInfo, CaptureSetupError>;

    fn next_frame(&mut self) -> Option<Frame>;

    /// Releases any resources held by the source.
    fn close(&mut self);
}
