use std::thread;
use std::time::{Duration, Instant};

/// Sleeps so successive frames are spaced one interval apart.
///
/// A source that falls behind does not burst to catch up: the schedule
/// restarts from the late frame.
pub(crate) struct FramePacer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl FramePacer {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub(crate) fn wait(&mut self) {
        let now = Instant::now();
        match self.next_due {
            Some(due) if due > now => {
                thread::sleep(due - now);
                self.next_due = Some(due + self.interval);
            }
            _ => self.next_due = Some(now + self.interval),
        }
    }
}

/// Time between frames at `fps`, or `None` if no pacer can honour that rate.
pub(crate) fn frame_interval(fps: f64) -> Option<Duration> {
    if !(fps.is_finite() && fps > 0.0) {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / fps).ok()
}
