use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{Instant, Sleep};

/// Trait for monotonic session timers
///
/// Timestamps are nanoseconds since the timer's origin. Clones share the origin,
/// so a clone handed to the input layer stamps events on the same time base.
pub trait Timer: Clone + Send + Sync {
    fn now(&self) -> u64;
    fn elapsed(&self, ts: u64) -> Duration;
    /// Future that completes at timestamp `ts`
    fn sleep_until(&self, ts: u64) -> Sleep;
    fn record_hold(&mut self, overshoot: Duration);
    fn drift_stats(&self) -> DriftStats;
}

/// How late scheduled holds actually woke up
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriftStats {
    pub samples: usize,
    pub average_overshoot_ns: f64,
    pub jitter_ns: f64,
    pub min_overshoot_ns: f64,
    pub max_overshoot_ns: f64,
}

#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    origin: Instant,
    pub overshoots: VecDeque<Duration>,
    pub max_samples: usize,
}

impl Timer for HighPrecisionTimer {
    fn now(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }

    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }

    fn sleep_until(&self, ts: u64) -> Sleep {
        tokio::time::sleep_until(self.instant_at(ts))
    }

    fn record_hold(&mut self, overshoot: Duration) {
        if self.overshoots.len() >= self.max_samples {
            self.overshoots.pop_front();
        }
        self.overshoots.push_back(overshoot);
    }

    fn drift_stats(&self) -> DriftStats {
        let times: Vec<f64> = self
            .overshoots
            .iter()
            .map(|d| d.as_nanos() as f64)
            .collect();
        if times.is_empty() {
            return DriftStats::default();
        }
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
        DriftStats {
            samples: times.len(),
            average_overshoot_ns: avg,
            jitter_ns: var.sqrt(),
            min_overshoot_ns: times.iter().cloned().fold(f64::INFINITY, f64::min),
            max_overshoot_ns: times.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            overshoots: VecDeque::with_capacity(1000),
            max_samples: 1000,
        }
    }

    pub fn instant_at(&self, ts: u64) -> Instant {
        self.origin + Duration::from_nanos(ts)
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Suspends until `start + duration` and records how late the wake-up was.
///
/// Returns the wake-up timestamp, which the caller uses as the next phase start.
pub async fn hold<T: Timer>(timer: &mut T, start: u64, duration: Duration) -> u64 {
    let deadline = start.saturating_add(duration.as_nanos() as u64);
    timer.sleep_until(deadline).await;
    let woke = timer.now();
    timer.record_hold(Duration::from_nanos(woke.saturating_sub(deadline)));
    woke
}
