use crate::pipeline::detection_executor::{DetectionExecutor, DetectionJob};

/// Runs each detection pass synchronously inside `submit`.
///
/// Detection then happens on whatever context delivers frames, typically
/// the capture thread; frames arriving from other threads meanwhile are
/// dropped by the busy flag.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineDetectionExecutor;

impl DetectionExecutor for InlineDetectionExecutor {
    fn execute(&self, job: DetectionJob) {
        job();
    }
}
