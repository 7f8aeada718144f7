/// Capture rate the simulated cameras default to.
pub const DEFAULT_CAPTURE_FPS: f64 = 30.0;

pub const DEFAULT_FRAME_WIDTH: u32 = 640;
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;

/// Portrait phone screen in points.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 375.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 667.0;

pub const CAPTURE_THREAD_NAME: &str = "capture.output";
pub const DETECTION_THREAD_NAME: &str = "detection.queue";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
