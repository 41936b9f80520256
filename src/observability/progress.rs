//! Progress reporting.
//!
//! # Responsibilities
//! - Count completed endpoints against a known total
//! - Log percent, rate and ETA at a cadence scaled to the total
//!
//! # Design Decisions
//! - `Sync`, so `|| reporter.update(1)` can be the engine's callback
//! - Completions past `total` are ignored
//! - Display every N completions (N grows with the total) and no more
//!   than every `min_interval`, except for the final line
//! - Rate is smoothed with an EWMA (alpha 0.1)

use std::sync::Mutex;
use std::time::{Duration, Instant};

const EWMA_ALPHA: f64 = 0.1;

/// Snapshot of a progress display line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressLine {
    pub completed: usize,
    pub total: usize,
    pub percent: f64,
    /// Smoothed completions per second.
    pub rate: f64,
    pub eta: Option<Duration>,
}

#[derive(Debug)]
struct ProgressState {
    completed: usize,
    since_display: usize,
    last_display: Instant,
    avg_rate: f64,
    finished: bool,
    displays: usize,
}

/// Thread-safe progress sink.
#[derive(Debug)]
pub struct ProgressReporter {
    description: String,
    total: usize,
    update_every: usize,
    min_interval: Duration,
    started: Instant,
    state: Mutex<ProgressState>,
}

impl ProgressReporter {
    pub fn new(total: usize, description: impl Into<String>) -> Self {
        Self::with_min_interval(total, description, Duration::from_millis(500))
    }

    pub fn with_min_interval(total: usize, description: impl Into<String>, min_interval: Duration) -> Self {
        let total = total.max(1);
        let now = Instant::now();
        Self {
            description: description.into(),
            total,
            update_every: update_every(total),
            min_interval,
            started: now,
            state: Mutex::new(ProgressState {
                completed: 0,
                since_display: 0,
                last_display: now,
                avg_rate: 0.0,
                finished: false,
                displays: 0,
            }),
        }
    }

    /// Record `n` completions.
    pub fn update(&self, n: usize) {
        let line = {
            let mut state = self.lock();
            if state.finished {
                return;
            }

            let accepted = n.min(self.total - state.completed);
            state.completed += accepted;

            if state.completed >= self.total {
                state.finished = true;
                self.display(&mut state)
            } else {
                state.since_display += accepted;
                if state.since_display < self.update_every || state.last_display.elapsed() < self.min_interval {
                    return;
                }
                state.since_display = 0;
                self.display(&mut state)
            }
        };
        self.emit(&line);
    }

    /// Force the final line, once.
    pub fn complete(&self) {
        let line = {
            let mut state = self.lock();
            if state.finished {
                return;
            }
            state.finished = true;
            self.display(&mut state)
        };
        self.emit(&line);
    }

    /// Stop reporting without a final line; logs the partial count once.
    pub fn abandon(&self) {
        let completed = {
            let mut state = self.lock();
            if state.finished {
                return;
            }
            state.finished = true;
            state.completed
        };
        tracing::warn!(
            task = %self.description,
            completed,
            total = self.total,
            "Progress stopped before completion"
        );
    }

    pub fn completed(&self) -> usize {
        self.lock().completed
    }

    /// Number of display lines produced so far.
    pub fn displays(&self) -> usize {
        self.lock().displays
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProgressState> {
        // A panic while holding this lock cannot leave the counters torn.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn display(&self, state: &mut ProgressState) -> ProgressLine {
        let now = Instant::now();
        let elapsed = now.duration_since(self.started).as_secs_f64().max(0.001);
        let rate = state.completed as f64 / elapsed;
        state.avg_rate = if state.avg_rate == 0.0 {
            rate
        } else {
            EWMA_ALPHA * rate + (1.0 - EWMA_ALPHA) * state.avg_rate
        };
        state.last_display = now;
        state.displays += 1;

        let remaining = self.total - state.completed;
        let eta = (state.avg_rate > 0.0 && remaining > 0)
            .then(|| Duration::from_secs_f64(remaining as f64 / state.avg_rate));

        ProgressLine {
            completed: state.completed,
            total: self.total,
            percent: state.completed as f64 * 100.0 / self.total as f64,
            rate: state.avg_rate,
            eta,
        }
    }

    fn emit(&self, line: &ProgressLine) {
        tracing::info!(
            task = %self.description,
            completed = line.completed,
            total = line.total,
            percent = format_args!("{:.1}", line.percent),
            rate = format_args!("{:.1}/s", line.rate),
            eta_secs = line.eta.map(|d| d.as_secs()),
            "Progress"
        );
    }
}

/// Completions between display lines for a given total.
pub fn update_every(total: usize) -> usize {
    match total {
        0..=100 => 1,
        101..=1000 => 5,
        1001..=10_000 => 20,
        _ => (total / 200).max(50),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_cadence() {
        assert_eq!(update_every(1), 1);
        assert_eq!(update_every(100), 1);
        assert_eq!(update_every(101), 5);
        assert_eq!(update_every(10_000), 20);
        assert_eq!(update_every(10_001), 50);
        assert_eq!(update_every(40_000), 200);
    }

    #[test]
    fn test_clamps_at_total() {
        let progress = ProgressReporter::with_min_interval(3, "probe", Duration::ZERO);
        progress.update(2);
        progress.update(5);
        assert_eq!(progress.completed(), 3);

        let displays = progress.displays();
        progress.update(1);
        progress.complete();
        assert_eq!(progress.displays(), displays);
    }

    #[test]
    fn test_min_interval_throttles_display() {
        let progress = ProgressReporter::with_min_interval(50, "probe", Duration::from_secs(3600));
        for _ in 0..10 {
            progress.update(1);
        }
        assert_eq!(progress.displays(), 0);

        progress.complete();
        assert_eq!(progress.displays(), 1);
        assert_eq!(progress.completed(), 10);
    }

    #[test]
    fn test_abandon_suppresses_final_line() {
        let progress = ProgressReporter::with_min_interval(10, "probe", Duration::from_secs(3600));
        progress.update(3);
        progress.abandon();
        progress.complete();
        progress.update(7);

        assert_eq!(progress.displays(), 0);
        assert_eq!(progress.completed(), 3);
    }

    #[test]
    fn test_usable_as_shared_callback() {
        let progress = ProgressReporter::with_min_interval(4, "probe", Duration::ZERO);
        let callback = || progress.update(1);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(callback);
            }
        });
        assert_eq!(progress.completed(), 4);
        assert!(progress.displays() >= 1);
    }
}
