/// One detection pass, packaged so it can run on another context.
pub type DetectionJob = Box<dyn FnOnce() + Send>;

/// Decides where detection passes run.
///
/// This is a port: infrastructure provides an inline executor (the caller's
/// context) and a dedicated worker thread. The pipeline never submits a
/// second job before the first has finished, so executors need no queueing
/// policy of their own.
pub trait DetectionExecutor: Send + Sync {
    fn execute(&self, job: DetectionJob);

    /// Waits for the running job, then refuses further work. Default: no-op.
    fn shutdown(&self) {}
}
