//! pulse-skills: the StudyPulse gamification engine proper.
//!
//! Reconciles asynchronous, polled, partially-unreliable dashboard data into
//! monotonic-feeling, idempotent, once-only UI events, with the local
//! [`pulse_core::ProgressStore`] as the only durable state:
//!
//! - [`energy`] — daily energy (XP) engine: polled recompute, optimistic
//!   deltas, reward mode, date-rollover archiving.
//! - [`evolution`] — once-only milestone notifiers (learning level and
//!   avatar stage).
//! - [`matcher`] + [`taxonomy`] + [`progress`] — free-text study plans
//!   matched against the fixed skill taxonomy.
//! - [`calendar`] — the 52-week focus calendar grid and streak statistics.

pub mod calendar;
pub mod energy;
pub mod evolution;
pub mod matcher;
pub mod progress;
pub mod taxonomy;

pub use calendar::{build_grid, build_grid_now, ColorBucket, DayCell, FocusCalendarGrid, GRID_WEEKS};
pub use energy::{
    compute_energy, ActivityClass, EnergyEngine, POLL_INTERVAL_SECS, REWARD_ELIGIBLE_WEEK_AVG,
};
pub use evolution::{
    milestone_bucket, overall_completion_ratio, MilestoneNotifier, MilestoneTimings,
};
pub use matcher::phrase_matches;
pub use progress::{compute_skill_progress, SkillProgress, SkillState, SubtopicStatus};
pub use taxonomy::{skill_taxonomy, SkillDef, SubtopicDef};
