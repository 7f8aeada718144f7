use crate::detection::domain::face_detector::DetectionError;

/// Receives per-frame detection failures the pipeline recovered from.
pub trait ErrorSink: Send + Sync {
    fn report(&self, error: &DetectionError);
}

/// Default sink: a warning in the log, the stream carries on.
pub struct LogErrorSink;

impl ErrorSink for LogErrorSink {
    fn report(&self, error: &DetectionError) {
        log::warn!("{error}");
    }
}

impl<F> ErrorSink for F
where
    F: Fn(&DetectionError) + Send + Sync,
{
    fn report(&self, error: &DetectionError) {
        self(error)
    }
}
