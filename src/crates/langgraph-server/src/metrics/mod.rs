//! Hand-rolled counters and a duration summary, exposed as both Prometheus
//! text and JSON. No metrics crate: the surface here is small enough that
//! pulling one in would cost more than it saves, and nothing else in the
//! ambient stack needs a richer metrics abstraction.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct Metrics {
    runs_started: AtomicU64,
    runs_succeeded: AtomicU64,
    runs_failed: AtomicU64,
    active_runs: AtomicI64,
    run_duration_ms: Mutex<Vec<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
        self.active_runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn run_finished(&self, succeeded: bool, duration_ms: u64) {
        self.active_runs.fetch_sub(1, Ordering::Relaxed);
        if succeeded {
            self.runs_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.runs_failed.fetch_add(1, Ordering::Relaxed);
        }
        let mut samples = self.run_duration_ms.lock().expect("metrics mutex poisoned");
        samples.push(duration_ms);
        if samples.len() > 1000 {
            samples.remove(0);
        }
    }

    fn duration_summary(&self) -> (u64, u64, u64) {
        let samples = self.run_duration_ms.lock().expect("metrics mutex poisoned");
        if samples.is_empty() {
            return (0, 0, 0);
        }
        let sum: u64 = samples.iter().sum();
        let avg = sum / samples.len() as u64;
        let max = *samples.iter().max().unwrap();
        (avg, max, samples.len() as u64)
    }

    pub fn to_json(&self) -> serde_json::Value {
        let (avg_ms, max_ms, samples) = self.duration_summary();
        serde_json::json!({
            "runs_started": self.runs_started.load(Ordering::Relaxed),
            "runs_succeeded": self.runs_succeeded.load(Ordering::Relaxed),
            "runs_failed": self.runs_failed.load(Ordering::Relaxed),
            "active_runs": self.active_runs.load(Ordering::Relaxed),
            "run_duration_ms_avg": avg_ms,
            "run_duration_ms_max": max_ms,
            "run_duration_samples": samples,
        })
    }

    pub fn to_prometheus(&self) -> String {
        let (avg_ms, max_ms, _) = self.duration_summary();
        format!(
            "# TYPE langgraph_runs_started_total counter\n\
             langgraph_runs_started_total {}\n\
             # TYPE langgraph_runs_succeeded_total counter\n\
             langgraph_runs_succeeded_total {}\n\
             # TYPE langgraph_runs_failed_total counter\n\
             langgraph_runs_failed_total {}\n\
             # TYPE langgraph_active_runs gauge\n\
             langgraph_active_runs {}\n\
             # TYPE langgraph_run_duration_ms_avg gauge\n\
             langgraph_run_duration_ms_avg {}\n\
             # TYPE langgraph_run_duration_ms_max gauge\n\
             langgraph_run_duration_ms_max {}\n",
            self.runs_started.load(Ordering::Relaxed),
            self.runs_succeeded.load(Ordering::Relaxed),
            self.runs_failed.load(Ordering::Relaxed),
            self.active_runs.load(Ordering::Relaxed),
            avg_ms,
            max_ms,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_started_active_and_terminal_counts() {
        let metrics = Metrics::new();
        metrics.run_started();
        metrics.run_started();
        metrics.run_finished(true, 10);
        let json = metrics.to_json();
        assert_eq!(json["runs_started"], 2);
        assert_eq!(json["runs_succeeded"], 1);
        assert_eq!(json["active_runs"], 1);
    }
}
