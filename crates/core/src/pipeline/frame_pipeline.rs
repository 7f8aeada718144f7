use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Instant;

use crate::detection::domain::face_detector::FaceDetector;
use crate::pipeline::detection_executor::DetectionExecutor;
use crate::pipeline::error_sink::{ErrorSink, LogErrorSink};
use crate::pipeline::infrastructure::inline_detection_executor::InlineDetectionExecutor;
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::pipeline::pipeline_state::{PipelineState, PipelineStats};
use crate::shared::frame::Frame;
use crate::shared::region::DetectionRegion;

/// Callback receiving the ordered regions of every completed detection pass.
///
/// Runs on the detection context; use an [`OverlayDispatcher`] to reach the
/// UI context.
///
/// [`OverlayDispatcher`]: crate::overlay::overlay_channel::OverlayDispatcher
pub type ResultHandler = Arc<dyn Fn(Vec<DetectionRegion>) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The frame owns the detection slot and has been handed to the executor.
    Accepted,
    /// A pass was still running (or the pipeline is shut down); frame discarded.
    Dropped,
}

struct PipelineCore {
    detector: Mutex<Box<dyn FaceDetector>>,
    handler: RwLock<Option<ResultHandler>>,
    error_sink: Box<dyn ErrorSink>,
    logger: Mutex<Box<dyn PipelineLogger>>,
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PipelineCore {
    fn process(&self, frame: &Frame, state: &PipelineState) {
        let started = Instant::now();
        let result = lock(&self.detector).detect(frame);
        let detect_ms = started.elapsed().as_secs_f64() * 1000.0;

        let regions = match result {
            Ok(regions) => {
                state.record_processed(false);
                regions
            }
            Err(e) => {
                state.record_processed(true);
                self.error_sink.report(&e);
                Vec::new()
            }
        };

        {
            let mut logger = lock(&self.logger);
            logger.timing("detect", detect_ms);
            logger.metric("faces", regions.len() as f64);
        }

        let handler = self
            .handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match handler {
            Some(handler) => handler(regions),
            None => log::debug!(
                "No result handler registered, discarding {} region(s) of frame {}",
                regions.len(),
                frame.index()
            ),
        }
    }
}

/// Throttles a frame stream to the detector's throughput.
///
/// At most one detection pass is in flight; frames submitted meanwhile are
/// dropped, never queued, so the detector always sees the freshest frame it
/// can keep up with. Clones share the same detector, state and handler.
#[derive(Clone)]
pub struct FramePipeline {
    core: Arc<PipelineCore>,
    state: Arc<PipelineState>,
    executor: Arc<dyn DetectionExecutor>,
}

impl FramePipeline {
    /// Pipeline with the inline executor, a logging error sink and no logger.
    pub fn new(detector: Box<dyn FaceDetector>) -> Self {
        Self::builder(detector).build()
    }

    pub fn builder(detector: Box<dyn FaceDetector>) -> FramePipelineBuilder {
        FramePipelineBuilder {
            detector,
            executor: None,
            error_sink: None,
            logger: None,
        }
    }

    /// Offers one frame to the detector.
    ///
    /// Safe to call from any thread. With a worker executor this returns as
    /// soon as the frame is handed over; with the inline executor it returns
    /// after the result handler has run.
    pub fn submit(&self, frame: Frame) -> SubmitOutcome {
        self.state.record_submitted();

        if self.state.is_closed() {
            self.state.record_dropped();
            return SubmitOutcome::Dropped;
        }

        let Some(guard) = self.state.try_acquire() else {
            self.state.record_dropped();
            lock(&self.core.logger).frame_dropped(frame.index());
            return SubmitOutcome::Dropped;
        };

        let core = Arc::clone(&self.core);
        let state = Arc::clone(&self.state);
        self.executor.execute(Box::new(move || {
            // Released only after the handler has returned.
            let _guard = guard;
            core.process(&frame, &state);
        }));
        SubmitOutcome::Accepted
    }

    /// Registers the result callback, replacing any previous one.
    pub fn set_result_handler(&self, handler: ResultHandler) {
        *self
            .core
            .handler
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    pub fn clear_result_handler(&self) {
        self.core
            .handler
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    pub fn stats(&self) -> PipelineStats {
        self.state.stats()
    }

    /// Forwards a status message to the pipeline logger.
    pub fn info(&self, message: &str) {
        lock(&self.core.logger).info(message);
    }

    /// Asks the pipeline logger for its end-of-run summary.
    pub fn summary(&self) {
        lock(&self.core.logger).summary();
    }

    /// Stops accepting frames, waits for the running pass and releases the
    /// result handler so downstream channels disconnect.
    pub fn shutdown(&self) {
        self.state.close();
        self.executor.shutdown();
        self.clear_result_handler();
    }
}

pub struct FramePipelineBuilder {
    detector: Box<dyn FaceDetector>,
    executor: Option<Arc<dyn DetectionExecutor>>,
    error_sink: Option<Box<dyn ErrorSink>>,
    logger: Option<Box<dyn PipelineLogger>>,
}

impl FramePipelineBuilder {
    pub fn executor(mut self, executor: impl DetectionExecutor + 'static) -> Self {
        self.executor = Some(Arc::new(executor));
        self
    }

    pub fn error_sink(mut self, sink: impl ErrorSink + 'static) -> Self {
        self.error_sink = Some(Box::new(sink));
        self
    }

    pub fn logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn build(self) -> FramePipeline {
        FramePipeline {
            core: Arc::new(PipelineCore {
                detector: Mutex::new(self.detector),
                handler: RwLock::new(None),
                error_sink: self.error_sink.unwrap_or_else(|| Box::new(LogErrorSink)),
                logger: Mutex::new(self.logger.unwrap_or_else(|| Box::new(NullPipelineLogger))),
            }),
            state: Arc::new(PipelineState::default()),
            executor: self
                .executor
                .unwrap_or_else(|| Arc::new(InlineDetectionExecutor)),
        }
    }
}
