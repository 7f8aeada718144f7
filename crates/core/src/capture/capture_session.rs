use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::capture::domain::frame_source::{
    CameraPosition, CaptureSetupError, FrameSource, SourceInfo,
};
use crate::pipeline::frame_pipeline::FramePipeline;
use crate::shared::constants::CAPTURE_THREAD_NAME;
use crate::shared::frame::Orientation;

/// How often the capture loop re-checks a busy pipeline when late frames
/// are held back instead of discarded.
const BUSY_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Capture settings applied by [`CaptureSession::start`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Camera the source must provide.
    pub position: CameraPosition,
    /// Tag applied to every frame before it is submitted.
    pub orientation: Orientation,
    /// When false, the capture loop holds each frame until the pipeline is
    /// idle rather than letting it be dropped.
    pub discard_late_frames: bool,
}

impl Default for CaptureConfig {
    /// Front camera in portrait: sensor buffers arrive rotated and mirrored.
    fn default() -> Self {
        Self {
            position: CameraPosition::Front,
            orientation: Orientation::LeftMirrored,
            discard_late_frames: true,
        }
    }
}

/// A running capture: one named thread pulling frames from a source and
/// pushing them into a [`FramePipeline`].
///
/// The pipeline holds no reference back to the session; the capture thread
/// owns its clone and hands it back from [`CaptureSession::join`].
pub struct CaptureSession {
    info: SourceInfo,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<FramePipeline>>,
}

impl CaptureSession {
    /// Opens the source and starts capturing.
    ///
    /// Setup failures are logged and returned; no thread is started and
    /// nothing is retried.
    pub fn start(
        mut source: Box<dyn FrameSource>,
        pipeline: FramePipeline,
        config: CaptureConfig,
    ) -> Result<Self, CaptureSetupError> {
        let info = match configure(source.as_mut(), &config) {
            Ok(info) => info,
            Err(e) => {
                log::error!("Failed to set up capture session: {e}");
                source.close();
                return Err(e);
            }
        };
        log::info!(
            "Capture started: {:?} camera {}x{} @ {:.1} fps ({:?})",
            info.position,
            info.width,
            info.height,
            info.fps,
            info.pixel_format
        );

        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let handle = thread::Builder::new()
            .name(CAPTURE_THREAD_NAME.to_string())
            .spawn(move || capture_loop(source, pipeline, config, &stop_flag))
            .map_err(|e| {
                log::error!("Failed to spawn capture thread: {e}");
                CaptureSetupError::Io(e)
            })?;

        Ok(Self {
            info,
            stop,
            handle: Some(handle),
        })
    }

    pub fn info(&self) -> &SourceInfo {
        &self.info
    }

    /// Asks the capture thread to finish after the current frame.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// True once the source has ended or the session was stopped.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Waits for the capture thread and returns its pipeline handle.
    /// `None` if the capture thread panicked.
    pub fn join(mut self) -> Option<FramePipeline> {
        let handle = self.handle.take()?;
        join_capture_thread(handle)
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop();
            join_capture_thread(handle);
        }
    }
}

fn join_capture_thread(handle: JoinHandle<FramePipeline>) -> Option<FramePipeline> {
    match handle.join() {
        Ok(pipeline) => Some(pipeline),
        Err(_) => {
            log::error!("Capture thread panicked");
            None
        }
    }
}

fn configure(
    source: &mut dyn FrameSource,
    config: &CaptureConfig,
) -> Result<SourceInfo, CaptureSetupError> {
    let info = source.open()?;
    if info.position != config.position {
        return Err(CaptureSetupError::DeviceUnavailable(format!(
            "requested {:?} camera, source provides {:?}",
            config.position, info.position
        )));
    }
    Ok(info)
}

fn capture_loop(
    mut source: Box<dyn FrameSource>,
    pipeline: FramePipeline,
    config: CaptureConfig,
    stop: &AtomicBool,
) -> FramePipeline {
    let mut captured = 0usize;
    while !stop.load(Ordering::Relaxed) {
        let Some(frame) = source.next_frame() else {
            break;
        };
        if !config.discard_late_frames {
            while pipeline.is_busy() && !stop.load(Ordering::Relaxed) {
                thread::sleep(BUSY_POLL_INTERVAL);
            }
        }
        pipeline.submit(frame.oriented(config.orientation));
        captured += 1;
    }
    source.close();
    log::info!("Capture finished after {captured} frame(s)");
    pipeline
}
