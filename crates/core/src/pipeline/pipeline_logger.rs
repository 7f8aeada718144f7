use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting logger for pipeline events.
///
/// Decouples the pipeline from specific output mechanisms so callers can
/// observe timing and backpressure without touching the orchestration code.
pub trait PipelineLogger: Send {
    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. faces per frame).
    fn metric(&mut self, name: &str, value: f64);

    /// A frame was discarded because a detection pass was still running.
    fn frame_dropped(&mut self, frame_index: usize);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn frame_dropped(&mut self, _frame_index: usize) {}
    fn info(&mut self, _message: &str) {}
}

/// Count, sum and maximum of a stream of samples.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunningStat {
    pub count: usize,
    pub sum: f64,
    pub max: f64,
}

impl RunningStat {
    fn record(&mut self, value: f64) {
        self.max = if self.count == 0 {
            value
        } else {
            self.max.max(value)
        };
        self.count += 1;
        self.sum += value;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Logger backed by the `log` crate that aggregates per-stage timings and
/// metrics for a summary report.
///
/// Memory stays constant however long the capture runs: only running
/// aggregates are kept, one per stage or metric name. Dropped-frame notices
/// are throttled to one per `throttle_drops` drops; at 30 fps with a slow
/// detector most frames are dropped.
pub struct LogPipelineLogger {
    throttle_drops: usize,
    timings: HashMap<String, RunningStat>,
    metrics: HashMap<String, RunningStat>,
    start_time: Instant,
    dropped: usize,
}

impl LogPipelineLogger {
    pub fn new(throttle_drops: usize) -> Self {
        Self {
            throttle_drops: throttle_drops.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            dropped: 0,
        }
    }

    /// Returns the formatted summary string, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() && self.dropped == 0 {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let passes = self
            .timings
            .values()
            .map(|stat| stat.count)
            .max()
            .unwrap_or(0);
        let mut lines = Vec::new();

        lines.push(format!(
            "Pipeline summary ({passes} passes, {} dropped, {:.1}s total):",
            self.dropped,
            elapsed_ms / 1000.0
        ));

        let mut stages: Vec<_> = self.timings.iter().collect();
        stages.sort_by(|a, b| a.0.cmp(b.0));
        for (stage, stat) in stages {
            lines.push(format!(
                "  {stage:12}: avg {:6.1}ms  max {:6.1}ms  total {:7.0}ms",
                stat.mean(),
                stat.max,
                stat.sum
            ));
        }

        let mut metrics: Vec<_> = self.metrics.iter().collect();
        metrics.sort_by(|a, b| a.0.cmp(b.0));
        for (name, stat) in metrics {
            lines.push(format!("  {name}: avg {:.1}", stat.mean()));
        }

        if passes > 0 && elapsed_ms > 0.0 {
            let rate = passes as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Detection rate: {rate:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<RunningStat> {
        self.timings.get(stage).copied()
    }

    pub fn metrics_for(&self, name: &str) -> Option<RunningStat> {
        self.metrics.get(name).copied()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn timing(&mut self, stage: &str, duration_ms: f64) {
        match self.timings.get_mut(stage) {
            Some(stat) => stat.record(duration_ms),
            None => {
                let mut stat = RunningStat::default();
                stat.record(duration_ms);
                self.timings.insert(stage.to_string(), stat);
            }
        }
    }

    fn metric(&mut self, name: &str, value: f64) {
        match self.metrics.get_mut(name) {
            Some(stat) => stat.record(value),
            None => {
                let mut stat = RunningStat::default();
                stat.record(value);
                self.metrics.insert(name.to_string(), stat);
            }
        }
    }

    fn frame_dropped(&mut self, frame_index: usize) {
        self.dropped += 1;
        if self.dropped % self.throttle_drops == 0 {
            log::debug!(
                "Detection busy: {} frames dropped so far (latest #{frame_index})",
                self.dropped
            );
        }
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
