//! Shared types used across the StudyPulse crates.
//!
//! The canonical mutable entity is [`DailyEnergyState`]; everything else here is
//! a read-only snapshot of what the dashboard API reports. All persisted types
//! round-trip through JSON via `to_bytes`/`from_bytes`, and a value that fails
//! to parse is treated as absent (the caller falls back to `Default`).

use serde::{Deserialize, Serialize};

/// Maximum number of archived days kept in [`DailyEnergyState::history`].
pub const HISTORY_CAP: usize = 14;

/// Number of most-recent history entries that feed the trailing weekly average.
pub const WEEK_WINDOW: usize = 7;

/// Unix timestamp in milliseconds. Clock errors collapse to 0 rather than panic.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

// -----------------------------------------------------------------------------
// Daily energy (XP) state — owned exclusively by the energy engine
// -----------------------------------------------------------------------------

/// One archived day of energy: `date` is a local `YYYY-MM-DD` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayXp {
    pub date: String,
    pub xp: u8,
}

/// Temporary reward-mode override. `None` or expired means inactive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardMode {
    /// Unix ms when reward mode was activated.
    pub activated_at_ms: i64,
    /// Unix ms after which the override no longer applies.
    pub expires_at_ms: i64,
    /// Requested duration, kept for display.
    pub duration_minutes: u32,
}

impl RewardMode {
    /// Builds a reward mode starting now and lasting `duration_minutes`.
    pub fn starting_now(duration_minutes: u32) -> Self {
        let activated_at_ms = now_ms();
        Self {
            activated_at_ms,
            expires_at_ms: activated_at_ms + i64::from(duration_minutes) * 60_000,
            duration_minutes,
        }
    }

    #[inline]
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// Today's energy score plus the trailing 14-day archive.
///
/// Lifecycle: initialized full (100) on first load; recomputed on each poll
/// tick; the previous day's final value is archived into `history` exactly once
/// when the local date rolls over (dedup by date — an archived date is never
/// overwritten). Persisted entirely in the local store, no server copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEnergyState {
    /// Today's energy in [0, 100].
    pub current_xp: u8,
    /// Local `YYYY-MM-DD` the value belongs to. Empty only before first tick.
    #[serde(default)]
    pub date_key: String,
    /// Active reward-mode descriptor, if any.
    #[serde(default)]
    pub reward_mode: Option<RewardMode>,
    /// Most recent archived days, oldest first, capped at [`HISTORY_CAP`].
    #[serde(default)]
    pub history: Vec<DayXp>,
}

impl Default for DailyEnergyState {
    fn default() -> Self {
        Self {
            current_xp: 100,
            date_key: String::new(),
            reward_mode: None,
            history: Vec::new(),
        }
    }
}

impl DailyEnergyState {
    /// Archives the previous day when the local date has advanced past
    /// `date_key`. Dedup by date: a date already present in history is never
    /// overwritten. Returns `true` if the state changed (archive or first-run
    /// date assignment).
    pub fn archive_rollover(&mut self, today_key: &str) -> bool {
        if self.date_key == today_key {
            return false;
        }
        if !self.date_key.is_empty() && !self.history.iter().any(|d| d.date == self.date_key) {
            self.history.push(DayXp {
                date: self.date_key.clone(),
                xp: self.current_xp,
            });
            if self.history.len() > HISTORY_CAP {
                let excess = self.history.len() - HISTORY_CAP;
                self.history.drain(..excess);
            }
        }
        self.date_key = today_key.to_string();
        true
    }

    /// Arithmetic mean of the most recent [`WEEK_WINDOW`] archived days, or
    /// 100.0 when no history exists yet (fresh installs start with a full bar).
    pub fn week_avg(&self) -> f64 {
        if self.history.is_empty() {
            return 100.0;
        }
        let recent: Vec<&DayXp> = self.history.iter().rev().take(WEEK_WINDOW).collect();
        let sum: u32 = recent.iter().map(|d| u32::from(d.xp)).sum();
        f64::from(sum) / recent.len() as f64
    }

    /// True when reward mode is present and not yet expired.
    pub fn reward_mode_active(&self, now_ms: i64) -> bool {
        self.reward_mode
            .as_ref()
            .map(|r| !r.is_expired(now_ms))
            .unwrap_or(false)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }
}

// -----------------------------------------------------------------------------
// External API snapshots (read-only to this engine)
// -----------------------------------------------------------------------------

/// Today's activity-minute breakdown from the productivity summary endpoint.
/// Missing fields are 0 per the API contract.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ProductivitySummary {
    #[serde(default)]
    pub productive_minutes: u32,
    #[serde(default)]
    pub neutral_minutes: u32,
    #[serde(default)]
    pub distracting_minutes: u32,
}

impl ProductivitySummary {
    #[inline]
    pub fn total_minutes(&self) -> u32 {
        self.productive_minutes + self.neutral_minutes + self.distracting_minutes
    }
}

/// One chapter inside a study plan's `plan_data`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanChapter {
    #[serde(default)]
    pub chapter_number: u32,
    #[serde(default)]
    pub is_completed: bool,
}

/// The plan body; only chapters matter to gamification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanData {
    #[serde(default)]
    pub chapters: Vec<PlanChapter>,
}

/// A study plan as listed by the dashboard API. Read-only input to the skill
/// progress aggregator; `quiz_unlocked` is the proxy for "quiz passed".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudyPlanSnapshot {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub plan_data: PlanData,
    #[serde(default)]
    pub quiz_unlocked: bool,
}

impl StudyPlanSnapshot {
    pub fn total_chapters(&self) -> usize {
        self.plan_data.chapters.len()
    }

    pub fn completed_chapters(&self) -> usize {
        self.plan_data.chapters.iter().filter(|c| c.is_completed).count()
    }

    /// Completion percentage; 0.0 when the plan has no chapters.
    pub fn completion_pct(&self) -> f64 {
        let total = self.total_chapters();
        if total == 0 {
            return 0.0;
        }
        self.completed_chapters() as f64 / total as f64 * 100.0
    }

    pub fn all_chapters_done(&self) -> bool {
        let total = self.total_chapters();
        total > 0 && self.completed_chapters() == total
    }
}

/// Per-chapter detail from the chapter-progress endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChapterDetail {
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub progress_percentage: f64,
}

/// Chapter-level progress for one plan, used by the overall-mastery milestone
/// source. A chapter counts as effectively completed if `is_completed` OR its
/// progress is at least 80%.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChapterProgress {
    #[serde(default)]
    pub total_chapters: u32,
    #[serde(default)]
    pub completed_chapters: u32,
    #[serde(default)]
    pub chapters: Vec<ChapterDetail>,
}

impl ChapterProgress {
    /// Chapter count; falls back to `total_chapters` when the detail list is
    /// absent from the response.
    pub fn chapter_count(&self) -> usize {
        if self.chapters.is_empty() {
            self.total_chapters as usize
        } else {
            self.chapters.len()
        }
    }

    /// Chapters counting toward the overall-mastery ratio.
    pub fn effective_completed(&self) -> usize {
        if self.chapters.is_empty() {
            return self.completed_chapters as usize;
        }
        self.chapters
            .iter()
            .filter(|c| c.is_completed || c.progress_percentage >= 80.0)
            .count()
    }
}

/// One day of trailing activity minutes for the focus calendar.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityDay {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub total_active_minutes: u32,
}
