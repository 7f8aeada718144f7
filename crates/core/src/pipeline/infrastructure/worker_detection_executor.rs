use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;

use crate::pipeline::detection_executor::{DetectionExecutor, DetectionJob};
use crate::shared::constants::DETECTION_THREAD_NAME;

/// Runs detection passes on one dedicated, named thread.
///
/// `submit` only hands the job over, so detection latency never blocks the
/// capture context. A panicking job is logged and the worker keeps serving.
pub struct WorkerDetectionExecutor {
    tx: Mutex<Option<Sender<DetectionJob>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl WorkerDetectionExecutor {
    pub fn new() -> std::io::Result<Self> {
        Self::with_name(DETECTION_THREAD_NAME)
    }

    pub fn with_name(name: &str) -> std::io::Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded::<DetectionJob>();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                for job in rx {
                    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                        log::error!("Detection job panicked; worker continues");
                    }
                }
            })?;
        log::debug!("Started detection worker: {name}");
        Ok(Self {
            tx: Mutex::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl DetectionExecutor for WorkerDetectionExecutor {
    fn execute(&self, job: DetectionJob) {
        let guard = lock(&self.tx);
        let Some(tx) = guard.as_ref() else {
            log::warn!("Detection worker is shut down, job discarded");
            return;
        };
        if tx.send(job).is_err() {
            log::warn!("Detection worker has exited, job discarded");
        }
    }

    fn shutdown(&self) {
        drop(lock(&self.tx).take());
        let Some(handle) = lock(&self.handle).take() else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            // Called from inside a job: the loop ends once the channel drains.
            return;
        }
        if handle.join().is_err() {
            log::error!("Detection worker thread panicked");
        }
    }
}

impl Drop for WorkerDetectionExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
