use crate::capture::domain::frame_source::{
    CameraPosition, CaptureSetupError, FrameSource, PixelFormat, SourceInfo,
};
use crate::capture::infrastructure::frame_pacer::{frame_interval, FramePacer};
use crate::shared::frame::Frame;

/// Simulated camera producing uniform frames at a fixed rate.
///
/// Useful wherever a real device is absent: demos, tests, benchmarking a
/// detector against a given capture cadence.
pub struct SyntheticFrameSource {
    width: u32,
    height: u32,
    fps: f64,
    position: CameraPosition,
    pixel_format: PixelFormat,
    fill: u8,
    frame_limit: Option<usize>,
    available: bool,
    next_index: usize,
    pacer: Option<FramePacer>,
}

impl SyntheticFrameSource {
    pub fn new(width: u32, height: u32, fps: f64) -> Self {
        Self {
            width,
            height,
            fps,
            position: CameraPosition::Front,
            pixel_format: PixelFormat::Rgb8,
            fill: 128,
            frame_limit: None,
            available: true,
            next_index: 0,
            pacer: None,
        }
    }

    /// Stop after `limit` frames instead of running forever.
    pub fn with_frame_limit(mut self, limit: usize) -> Self {
        self.frame_limit = Some(limit);
        self
    }

    pub fn with_position(mut self, position: CameraPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_pixel_format(mut self, pixel_format: PixelFormat) -> Self {
        self.pixel_format = pixel_format;
        self
    }

    pub fn with_fill(mut self, fill: u8) -> Self {
        self.fill = fill;
        self
    }

    /// Simulates a missing or permission-denied camera.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}

impl FrameSource for SyntheticFrameSource {
    fn open(&mut self) -> Result<SourceInfo, CaptureSetupError> {
        if !self.available {
            return Err(CaptureSetupError::DeviceUnavailable(format!(
                "no {:?} camera",
                self.position
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(CaptureSetupError::InputRejected(format!(
                "unsupported frame size {}x{}",
                self.width, self.height
            )));
        }
        let Some(interval) = frame_interval(self.fps) else {
            return Err(CaptureSetupError::InputRejected(format!(
                "unsupported frame rate {}",
                self.fps
            )));
        };

        self.next_index = 0;
        self.pacer = Some(FramePacer::new(interval));
        Ok(SourceInfo {
            width: self.width,
            height: self.height,
            fps: self.fps,
            position: self.position,
            pixel_format: self.pixel_format,
        })
    }

    fn next_frame(&mut self) -> Option<Frame> {
        let pacer = self.pacer.as_mut()?;
        if self.frame_limit.is_some_and(|limit| self.next_index >= limit) {
            return None;
        }
        pacer.wait();

        let channels = self.pixel_format.channels();
        let len = self.width as usize * self.height as usize * channels as usize;
        let frame = Frame::new(
            vec![self.fill; len],
            self.width,
            self.height,
            channels,
            self.next_index,
        );
        self.next_index += 1;
        Some(frame)
    }

    fn close(&mut self) {
        self.pacer = None;
    }
}
