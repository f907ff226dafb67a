//! Once-only milestone notifiers (learning level and avatar stage).
//!
//! Two independent instances of the same state machine: a percentage source
//! is bucketed into 5 milestones, and each milestone is celebrated at most
//! once, ever — the seen-set is persisted so a reload that recomputes the
//! same percentage never re-shows a celebration. The timed presentation
//! sequence (visual → label → fade) runs on spawned timers that are aborted
//! on drop so they never fire into a destroyed consumer.

use pulse_core::{ChapterProgress, ProgressStore};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Inclusive milestone thresholds. A clamped percentage of exactly 20
/// belongs to bucket 1, not bucket 0; exactly 100 reaches bucket 5.
const MILESTONE_THRESHOLDS: [f64; 5] = [20.0, 40.0, 60.0, 80.0, 100.0];

/// Milestone index 0..=5: the number of thresholds the clamped percentage
/// meets or exceeds. Non-finite input is bucket 0.
pub fn milestone_bucket(pct: f64) -> u8 {
    if !pct.is_finite() {
        return 0;
    }
    let pct = pct.clamp(0.0, 100.0);
    MILESTONE_THRESHOLDS.iter().filter(|t| pct >= **t).count() as u8
}

/// Aggregate chapter-completion ratio (percent) across all plans — the
/// source for the overall-mastery notifier. A chapter counts if completed
/// or at ≥80% progress; zero chapters overall yields 0.0.
pub fn overall_completion_ratio(progress: &[ChapterProgress]) -> f64 {
    let total: usize = progress.iter().map(ChapterProgress::chapter_count).sum();
    if total == 0 {
        return 0.0;
    }
    let done: usize = progress.iter().map(ChapterProgress::effective_completed).sum();
    done as f64 / total as f64 * 100.0
}

/// Presentation phase durations: full-screen visual, label reveal, fade-out.
#[derive(Debug, Clone, Copy)]
pub struct MilestoneTimings {
    pub visual: Duration,
    pub label: Duration,
    pub fade: Duration,
}

impl MilestoneTimings {
    /// Defaults for a milestone: higher milestones get a longer visual.
    pub fn for_milestone(milestone: u8) -> Self {
        Self {
            visual: Duration::from_millis(1800 + 400 * u64::from(milestone)),
            label: Duration::from_millis(2200),
            fade: Duration::from_millis(1000),
        }
    }

    /// Uniform short timings for tests.
    pub fn uniform(each: Duration) -> Self {
        Self { visual: each, label: each, fade: each }
    }
}

type CompletionCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// One notifier instance. Create two with independent namespaces for the
/// learning-level and avatar-stage sources; the state machines are identical.
pub struct MilestoneNotifier {
    namespace: &'static str,
    store: Arc<ProgressStore>,
    /// Last bucket observed this session; `None` before the first evaluation.
    last_observed: Mutex<Option<u8>>,
    /// In-flight presentation, at most one at a time.
    presentation: Mutex<Option<JoinHandle<()>>>,
    /// Fixed timing override; `None` uses the per-milestone defaults.
    timings: Option<MilestoneTimings>,
    on_complete: Option<CompletionCallback>,
}

impl MilestoneNotifier {
    pub fn new(namespace: &'static str, store: Arc<ProgressStore>) -> Self {
        Self {
            namespace,
            store,
            last_observed: Mutex::new(None),
            presentation: Mutex::new(None),
            timings: None,
            on_complete: None,
        }
    }

    pub fn with_timings(mut self, timings: MilestoneTimings) -> Self {
        self.timings = Some(timings);
        self
    }

    /// Callback invoked after the presentation completes and the milestone
    /// has been recorded as seen.
    pub fn on_complete(mut self, callback: impl Fn(u8) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(callback));
        self
    }

    /// Evaluates a freshly computed percentage. Returns the milestone whose
    /// presentation was started, if any.
    ///
    /// A presentation starts iff the bucket is higher than the last value
    /// observed this session AND not in the persisted seen-set. While a
    /// presentation is in flight the observation is deferred entirely: the
    /// next evaluation after it finishes re-runs the trigger check.
    pub fn evaluate(&self, pct: f64) -> Option<u8> {
        let bucket = milestone_bucket(pct);

        {
            let mut active = match self.presentation.lock() {
                Ok(guard) => guard,
                Err(_) => return None,
            };
            if active.as_ref().map(|h| !h.is_finished()).unwrap_or(false) {
                // In-flight presentation runs to completion; timers are never
                // restarted by new data.
                return None;
            }

            let prev = match self.last_observed.lock() {
                Ok(mut guard) => guard.replace(bucket),
                Err(_) => return None,
            };
            if bucket == 0 {
                return None;
            }
            if let Some(prev) = prev {
                if bucket <= prev {
                    return None;
                }
            }
            if self.store.is_milestone_seen(self.namespace, bucket) {
                return None;
            }

            // The task captures only what it needs, never `Arc<Self>`:
            // dropping the notifier must be able to abort these timers.
            let store = Arc::clone(&self.store);
            let namespace = self.namespace;
            let timings = self
                .timings
                .unwrap_or_else(|| MilestoneTimings::for_milestone(bucket));
            let callback = self.on_complete.clone();
            *active = Some(tokio::spawn(async move {
                run_presentation(namespace, store, timings, callback, bucket).await;
            }));
        }

        tracing::info!(
            target: "pulse::milestones",
            namespace = self.namespace,
            milestone = bucket,
            "milestone presentation started"
        );
        Some(bucket)
    }

}

async fn run_presentation(
    namespace: &'static str,
    store: Arc<ProgressStore>,
    timings: MilestoneTimings,
    callback: Option<CompletionCallback>,
    milestone: u8,
) {
    tokio::time::sleep(timings.visual).await;
    tokio::time::sleep(timings.label).await;
    tokio::time::sleep(timings.fade).await;

    // Only a fully presented milestone is recorded; an aborted
    // presentation may legitimately replay after restart.
    if let Err(e) = store.record_milestone(namespace, milestone) {
        tracing::warn!(
            target: "pulse::milestones",
            namespace = namespace,
            milestone = milestone,
            error = %e,
            "failed to record milestone"
        );
    }
    if let Some(callback) = &callback {
        callback(milestone);
    }
    tracing::debug!(
        target: "pulse::milestones",
        namespace = namespace,
        milestone = milestone,
        "milestone presentation complete"
    );
}

impl Drop for MilestoneNotifier {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.presentation.lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }
}
