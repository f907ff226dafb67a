//! pulse-core: StudyPulse gamification core (shared types, local progress store,
//! dashboard API client, cross-context bridge).
//!
//! The gamification engine owns no server-side schema: everything it persists
//! lives in the local Sled store and is treated as low-stakes (a user editing
//! their own progress DB is accepted). External data arrives only through the
//! read-only dashboard API contracts in [`client`].

mod bridge;
mod client;
mod config;
mod rank;
mod shared;
mod store;

pub use bridge::{BridgeMessage, PulseBridge, BRIDGE_CAPACITY};
pub use client::{ClientError, DashboardClient};
pub use config::PulseConfig;
pub use rank::{level_of, next_rank, rank_of, NextRank, Rank};
pub use shared::{
    now_ms, ActivityDay, ChapterDetail, ChapterProgress, DailyEnergyState, DayXp, PlanChapter,
    PlanData, ProductivitySummary, RewardMode, StudyPlanSnapshot, HISTORY_CAP, WEEK_WINDOW,
};
pub use store::{
    ProgressStore, StoreError, AVATAR_MILESTONES_NS, ENERGY_STATE_KEY, LEARNING_MILESTONES_NS,
};
