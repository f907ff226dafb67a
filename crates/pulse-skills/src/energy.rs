//! Daily energy (XP) engine.
//!
//! Owns the canonical [`DailyEnergyState`]: polls the productivity summary,
//! recomputes the 0–100 energy value through the additive model, applies
//! optimistic deltas for perceived responsiveness, and runs the reward-mode
//! timed unlock. All external-fetch failures are swallowed and logged — the
//! engine never surfaces an error to its consumers; staleness is preferred
//! over crashing the UI.

use pulse_core::{
    now_ms, BridgeMessage, DailyEnergyState, DashboardClient, ProductivitySummary, ProgressStore,
    PulseBridge, RewardMode,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Poll cadence for the authoritative recompute.
pub const POLL_INTERVAL_SECS: u64 = 60;

/// Trailing weekly average required to unlock reward mode.
pub const REWARD_ELIGIBLE_WEEK_AVG: f64 = 70.0;

const PRODUCTIVE_WEIGHT: f64 = 0.3;
const NEUTRAL_WEIGHT: f64 = 0.5;
const DISTRACTING_WEIGHT: f64 = 2.0;

const DEFAULT_REFETCH_DELAY: Duration = Duration::from_secs(3);
const DEFAULT_REWARD_MINUTES: u32 = 30;

/// Additive energy model. Zero recorded activity means a full bar, not an
/// empty one — the day simply has not started.
pub fn compute_energy(summary: &ProductivitySummary) -> u8 {
    if summary.total_minutes() == 0 {
        return 100;
    }
    let raw = 100.0 + PRODUCTIVE_WEIGHT * f64::from(summary.productive_minutes)
        - NEUTRAL_WEIGHT * f64::from(summary.neutral_minutes)
        - DISTRACTING_WEIGHT * f64::from(summary.distracting_minutes);
    raw.round().clamp(0.0, 100.0) as u8
}

/// Activity classification reported by the tracker. Unknown kinds are a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityClass {
    Learning,
    Distraction,
    Neutral,
}

impl ActivityClass {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind.trim().to_lowercase().as_str() {
            "learning" => Some(Self::Learning),
            "distraction" => Some(Self::Distraction),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }

    /// Optimistic delta applied before the authoritative re-fetch.
    pub fn optimistic_delta(self) -> f64 {
        match self {
            Self::Learning => 5.0,
            Self::Distraction => -5.0,
            Self::Neutral => -2.0,
        }
    }
}

/// The engine. Cloning is cheap and shares all state, so the classification
/// handler can move a handle into its delayed authoritative re-fetch task.
#[derive(Clone)]
pub struct EnergyEngine {
    store: Arc<ProgressStore>,
    client: Arc<DashboardClient>,
    bridge: PulseBridge,
    state: Arc<Mutex<DailyEnergyState>>,
    refetch_delay: Duration,
    default_reward_minutes: u32,
}

impl EnergyEngine {
    /// Loads the persisted state (full bar on first run) and advances the
    /// date marker if the store was last written on an earlier day.
    pub fn new(store: Arc<ProgressStore>, client: Arc<DashboardClient>, bridge: PulseBridge) -> Self {
        let mut state = store.energy_state();
        if state.archive_rollover(&Self::today_key()) {
            if let Err(e) = store.set_energy_state(&state) {
                tracing::warn!(target: "pulse::energy", error = %e, "mount-time persist failed");
            }
        }
        Self {
            store,
            client,
            bridge,
            state: Arc::new(Mutex::new(state)),
            refetch_delay: DEFAULT_REFETCH_DELAY,
            default_reward_minutes: DEFAULT_REWARD_MINUTES,
        }
    }

    /// Overrides the optimistic-reconcile delay (tests, config).
    pub fn with_refetch_delay(mut self, delay: Duration) -> Self {
        self.refetch_delay = delay;
        self
    }

    pub fn with_default_reward_minutes(mut self, minutes: u32) -> Self {
        if minutes > 0 {
            self.default_reward_minutes = minutes;
        }
        self
    }

    fn today_key() -> String {
        chrono::Local::now().format("%Y-%m-%d").to_string()
    }

    /// Read-only snapshot for UI consumers.
    pub fn snapshot(&self) -> DailyEnergyState {
        self.state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn current_xp(&self) -> u8 {
        self.state.lock().map(|s| s.current_xp).unwrap_or(100)
    }

    pub fn week_avg(&self) -> f64 {
        self.state.lock().map(|s| s.week_avg()).unwrap_or(100.0)
    }

    /// Reward mode unlocks only after a strong trailing week.
    pub fn is_reward_eligible(&self) -> bool {
        self.week_avg() >= REWARD_ELIGIBLE_WEEK_AVG
    }

    fn persist(&self, state: &DailyEnergyState) {
        if let Err(e) = self.store.set_energy_state(state) {
            tracing::warn!(target: "pulse::energy", error = %e, "energy persist failed; keeping in-memory value");
        }
    }

    /// Archive-on-rollover. Re-reads the persisted snapshot immediately before
    /// the conditional write: an overlapping tick may have archived this date
    /// already, and an archived date must never be overwritten.
    fn advance_date(&self, state: &mut DailyEnergyState, today: &str) -> bool {
        if state.date_key == today {
            return false;
        }
        let persisted = self.store.energy_state();
        if persisted.history.iter().any(|d| d.date == state.date_key) {
            state.history = persisted.history;
        }
        let changed = state.archive_rollover(today);
        if changed {
            tracing::info!(
                target: "pulse::energy",
                date_key = today,
                history_len = state.history.len(),
                "local date rollover archived"
            );
        }
        changed
    }

    /// Polled authoritative recompute. Overlapping calls are last-write-wins
    /// on completion; each result is simply "the latest known value".
    pub async fn fetch_and_recompute(&self) {
        let summary = match self.client.fetch_productivity_summary().await {
            Ok(summary) => summary,
            Err(e) => {
                // Transient failure: retain last-known-good state.
                tracing::warn!(
                    target: "pulse::energy",
                    error = %e,
                    "productivity summary fetch failed; keeping current value"
                );
                return;
            }
        };
        let xp = compute_energy(&summary);
        let today = Self::today_key();
        if let Ok(mut state) = self.state.lock() {
            self.advance_date(&mut state, &today);
            state.current_xp = xp;
            self.persist(&state);
            tracing::debug!(
                target: "pulse::energy",
                xp = xp,
                productive = summary.productive_minutes,
                neutral = summary.neutral_minutes,
                distracting = summary.distracting_minutes,
                "energy recomputed"
            );
        }
    }

    fn apply_delta(&self, delta: f64) {
        if let Ok(mut state) = self.state.lock() {
            let next = (f64::from(state.current_xp) + delta).round().clamp(0.0, 100.0) as u8;
            state.current_xp = next;
            self.persist(&state);
        }
    }

    /// Immediate clamped increase. Non-positive or non-finite input is a
    /// no-op, not an error.
    pub fn increase_xp(&self, points: f64) {
        if points.is_finite() && points > 0.0 {
            self.apply_delta(points);
        }
    }

    /// Immediate clamped decrease. Non-positive or non-finite input is a
    /// no-op, not an error.
    pub fn decrease_xp(&self, points: f64) {
        if points.is_finite() && points > 0.0 {
            self.apply_delta(-points);
        }
    }

    /// Two-phase update: optimistic fixed delta now, authoritative recompute
    /// after a short delay (the backend's own numbers lag the event by the
    /// polling interval). Unknown kinds are ignored.
    pub fn handle_activity_classification(&self, kind: &str) {
        let class = match ActivityClass::parse(kind) {
            Some(class) => class,
            None => {
                tracing::debug!(target: "pulse::energy", kind = kind, "unknown activity classification ignored");
                return;
            }
        };
        self.apply_delta(class.optimistic_delta());
        let engine = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(engine.refetch_delay).await;
            engine.fetch_and_recompute().await;
        });
    }

    /// Activates reward mode for `duration_minutes` (engine default when
    /// `None`) and broadcasts the activation. Returns `false` without side
    /// effects when the trailing week average is below the eligibility bar.
    pub fn activate_reward_mode(&self, duration_minutes: Option<u32>) -> bool {
        if !self.is_reward_eligible() {
            tracing::info!(
                target: "pulse::energy",
                week_avg = self.week_avg(),
                "reward mode not eligible"
            );
            return false;
        }
        let minutes = duration_minutes
            .filter(|m| *m > 0)
            .unwrap_or(self.default_reward_minutes);
        let reward = RewardMode::starting_now(minutes);
        let expires_at_ms = reward.expires_at_ms;
        if let Ok(mut state) = self.state.lock() {
            state.reward_mode = Some(reward);
            self.persist(&state);
        }
        self.bridge.publish(&BridgeMessage::RewardModeActivated {
            expires_at_ms,
            duration_minutes: minutes,
        });
        tracing::info!(
            target: "pulse::energy",
            duration_minutes = minutes,
            "reward mode activated"
        );
        true
    }

    /// Clears reward mode and broadcasts the deactivation.
    pub fn deactivate_reward_mode(&self) {
        let was_active = self
            .state
            .lock()
            .map(|mut state| {
                let was = state.reward_mode.take().is_some();
                if was {
                    self.persist(&state);
                }
                was
            })
            .unwrap_or(false);
        if was_active {
            self.bridge.publish(&BridgeMessage::RewardModeDeactivated);
            tracing::info!(target: "pulse::energy", "reward mode deactivated");
        }
    }

    /// One poll tick: rollover + reward expiry, then the authoritative
    /// recompute. Call once on mount and then every [`POLL_INTERVAL_SECS`].
    pub async fn tick(&self) {
        let today = Self::today_key();
        let expired = if let Ok(mut state) = self.state.lock() {
            if self.advance_date(&mut state, &today) {
                self.persist(&state);
            }
            let expired = state
                .reward_mode
                .as_ref()
                .map(|r| r.is_expired(now_ms()))
                .unwrap_or(false);
            if expired {
                state.reward_mode = None;
                self.persist(&state);
            }
            expired
        } else {
            false
        };
        if expired {
            self.bridge.publish(&BridgeMessage::RewardModeDeactivated);
            tracing::info!(target: "pulse::energy", "reward mode expired");
        }
        self.fetch_and_recompute().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::DayXp;

    fn test_engine(dir: &tempfile::TempDir) -> Arc<EnergyEngine> {
        let store = Arc::new(ProgressStore::open_path(dir.path()).unwrap());
        // Closed port: every fetch fails fast with a connect error.
        let client = Arc::new(DashboardClient::new("http://127.0.0.1:9", None));
        Arc::new(
            EnergyEngine::new(store, client, PulseBridge::new())
                .with_refetch_delay(Duration::from_millis(10)),
        )
    }

    #[test]
    fn zero_activity_is_a_full_bar() {
        assert_eq!(compute_energy(&ProductivitySummary::default()), 100);
    }

    #[test]
    fn additive_model_reference_case() {
        // 100 + 99*0.3 - 70*0.5 - 1*2.0 = 92.7 -> 93
        let summary = ProductivitySummary {
            productive_minutes: 99,
            neutral_minutes: 70,
            distracting_minutes: 1,
        };
        assert_eq!(compute_energy(&summary), 93);
    }

    #[test]
    fn additive_model_clamps_both_ends() {
        let drained = ProductivitySummary {
            productive_minutes: 0,
            neutral_minutes: 0,
            distracting_minutes: 120,
        };
        assert_eq!(compute_energy(&drained), 0);

        let packed = ProductivitySummary {
            productive_minutes: 600,
            neutral_minutes: 0,
            distracting_minutes: 0,
        };
        assert_eq!(compute_energy(&packed), 100);
    }

    #[tokio::test]
    async fn invalid_deltas_are_noops() {
        let dir = tempfile::tempdir().unwrap();
        let engine = test_engine(&dir);
        engine.decrease_xp(30.0);
        assert_eq!(engine.current_xp(), 70);

        engine.increase_xp(0.0);
        engine.increase_xp(-10.0);
        engine.increase_xp(f64::NAN);
        engine.decrease_xp(-5.0);
        assert_eq!(engine.current_xp(), 70);

        engine.increase_xp(500.0);
        assert_eq!(engine.current_xp(), 100);
    }

    #[tokio::test]
    async fn fetch_failure_keeps_current_value() {
        let dir = tempfile::tempdir().unwrap();
        let engine = test_engine(&dir);
        engine.decrease_xp(25.0);
        assert_eq!(engine.current_xp(), 75);
        engine.fetch_and_recompute().await;
        assert_eq!(engine.current_xp(), 75);
    }

    #[tokio::test]
    async fn classification_applies_optimistic_delta() {
        let dir = tempfile::tempdir().unwrap();
        let engine = test_engine(&dir);
        engine.decrease_xp(50.0);

        engine.handle_activity_classification("learning");
        assert_eq!(engine.current_xp(), 55);
        engine.handle_activity_classification("distraction");
        assert_eq!(engine.current_xp(), 50);
        engine.handle_activity_classification("neutral");
        assert_eq!(engine.current_xp(), 48);
        engine.handle_activity_classification("browsing");
        assert_eq!(engine.current_xp(), 48);

        // The reconcile fetch fails against the dead endpoint and must leave
        // the optimistic value in place.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(engine.current_xp(), 48);
    }

    #[tokio::test]
    async fn reward_mode_gated_by_week_avg() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ProgressStore::open_path(dir.path()).unwrap());
        let mut state = store.energy_state();
        for day in 1..=7u8 {
            state.history.push(DayXp { date: format!("2026-07-{:02}", day), xp: 40 });
        }
        store.set_energy_state(&state).unwrap();

        let client = Arc::new(DashboardClient::new("http://127.0.0.1:9", None));
        let bridge = PulseBridge::new();
        let mut rx = bridge.subscribe();
        let engine = Arc::new(EnergyEngine::new(store.clone(), client.clone(), bridge.clone()));

        assert!(!engine.is_reward_eligible());
        assert!(!engine.activate_reward_mode(None));
        assert!(engine.snapshot().reward_mode.is_none());

        // Replace the weak week with a strong one.
        let mut state = store.energy_state();
        state.history.iter_mut().for_each(|d| d.xp = 90);
        store.set_energy_state(&state).unwrap();
        let engine = Arc::new(EnergyEngine::new(store, client, bridge));
        assert!(engine.is_reward_eligible());
        assert!(engine.activate_reward_mode(Some(15)));
        let snapshot = engine.snapshot();
        let reward = snapshot.reward_mode.expect("reward mode set");
        assert_eq!(reward.duration_minutes, 15);

        let raw = rx.recv().await.unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["type"], "reward_mode_activated");
        assert_eq!(v["duration_minutes"], 15);

        engine.deactivate_reward_mode();
        assert!(engine.snapshot().reward_mode.is_none());
        let raw = rx.recv().await.unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["type"], "reward_mode_deactivated");
    }

    #[tokio::test]
    async fn expired_reward_mode_is_cleared_on_tick() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ProgressStore::open_path(dir.path()).unwrap());
        let mut state = store.energy_state();
        state.reward_mode = Some(RewardMode {
            activated_at_ms: 0,
            expires_at_ms: 1, // long past
            duration_minutes: 30,
        });
        store.set_energy_state(&state).unwrap();

        let client = Arc::new(DashboardClient::new("http://127.0.0.1:9", None));
        let engine = Arc::new(EnergyEngine::new(store, client, PulseBridge::new()));
        engine.tick().await;
        assert!(engine.snapshot().reward_mode.is_none());
    }
}
