//! Sled-backed local progress store, one tree per logical owner.
//!
//! | Tree        | Owner              | Contents                                    |
//! |-------------|--------------------|---------------------------------------------|
//! | `energy`    | energy engine      | current snapshot + 14-day history + reward  |
//! | `milestones`| milestone notifiers| two independent seen-milestone namespaces   |
//!
//! Each logical key is written by exactly one component; everyone else reads
//! snapshots. Corrupted or unparseable values are treated as absent — the
//! typed accessors fall back to defaults instead of failing.

use crate::shared::{now_ms, DailyEnergyState};
use sled::Db;
use std::path::Path;

const DEFAULT_PATH: &str = "./data/pulse_progress";

const ENERGY_TREE: &str = "energy";
const MILESTONE_TREE: &str = "milestones";

/// Key in the `energy` tree holding the serialized [`DailyEnergyState`].
pub const ENERGY_STATE_KEY: &str = "energy/current";

/// Seen-milestone namespace for the coarse overall-mastery notifier.
pub const LEARNING_MILESTONES_NS: &str = "learning_level";

/// Seen-milestone namespace for the avatar-stage notifier.
pub const AVATAR_MILESTONES_NS: &str = "avatar_stage";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Sled(#[from] sled::Error),
}

/// Local durable store for all gamification state. No server copy exists;
/// clearing this store resets XP, history, and celebration flags.
pub struct ProgressStore {
    db: Db,
}

impl ProgressStore {
    /// Opens or creates the store at `./data/pulse_progress`.
    pub fn new() -> Result<Self, StoreError> {
        Self::open_path(DEFAULT_PATH)
    }

    /// Opens or creates the store at the given path.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Returns the persisted energy state, or the default full-bar state when
    /// the key is absent or unparseable.
    pub fn energy_state(&self) -> DailyEnergyState {
        let bytes = match self.db.open_tree(ENERGY_TREE) {
            Ok(tree) => tree.get(ENERGY_STATE_KEY.as_bytes()).ok().flatten(),
            Err(_) => None,
        };
        match bytes.as_deref().and_then(DailyEnergyState::from_bytes) {
            Some(state) => state,
            None => {
                if bytes.is_some() {
                    tracing::warn!(
                        target: "pulse::store",
                        key = ENERGY_STATE_KEY,
                        "unparseable energy state; resetting to defaults"
                    );
                }
                DailyEnergyState::default()
            }
        }
    }

    /// Persists the energy state snapshot.
    pub fn set_energy_state(&self, state: &DailyEnergyState) -> Result<(), StoreError> {
        let tree = self.db.open_tree(ENERGY_TREE)?;
        tree.insert(ENERGY_STATE_KEY.as_bytes(), state.to_bytes())?;
        tracing::debug!(
            target: "pulse::store",
            date_key = %state.date_key,
            xp = state.current_xp,
            history_len = state.history.len(),
            "energy state persisted"
        );
        Ok(())
    }

    fn milestone_key(namespace: &str, milestone: u8) -> String {
        format!("{}/{}", namespace, milestone)
    }

    /// True when the milestone id is already recorded in the namespace.
    pub fn is_milestone_seen(&self, namespace: &str, milestone: u8) -> bool {
        match self.db.open_tree(MILESTONE_TREE) {
            Ok(tree) => tree
                .get(Self::milestone_key(namespace, milestone).as_bytes())
                .ok()
                .flatten()
                .is_some(),
            Err(_) => false,
        }
    }

    /// Permanently records a milestone as seen. The value is the record
    /// timestamp; presence alone is what matters.
    pub fn record_milestone(&self, namespace: &str, milestone: u8) -> Result<(), StoreError> {
        let tree = self.db.open_tree(MILESTONE_TREE)?;
        let key = Self::milestone_key(namespace, milestone);
        tree.insert(key.as_bytes(), now_ms().to_string().into_bytes())?;
        tracing::info!(
            target: "pulse::store",
            namespace = namespace,
            milestone = milestone,
            "milestone recorded as seen"
        );
        Ok(())
    }

    /// All seen milestone ids in the namespace, ascending.
    pub fn seen_milestones(&self, namespace: &str) -> Vec<u8> {
        let tree = match self.db.open_tree(MILESTONE_TREE) {
            Ok(tree) => tree,
            Err(_) => return Vec::new(),
        };
        let prefix = format!("{}/", namespace);
        let mut out: Vec<u8> = tree
            .scan_prefix(prefix.as_bytes())
            .keys()
            .filter_map(|k| k.ok())
            .filter_map(|k| String::from_utf8(k.to_vec()).ok())
            .filter_map(|k| k.strip_prefix(&prefix).and_then(|m| m.parse::<u8>().ok()))
            .collect();
        out.sort_unstable();
        out
    }

    #[cfg(test)]
    fn insert_raw(&self, tree_name: &str, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let tree = self.db.open_tree(tree_name)?;
        tree.insert(key.as_bytes(), value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::DayXp;

    #[test]
    fn absent_energy_state_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::open_path(dir.path()).unwrap();
        let state = store.energy_state();
        assert_eq!(state.current_xp, 100);
        assert!(state.history.is_empty());
    }

    #[test]
    fn corrupted_energy_state_resets_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::open_path(dir.path()).unwrap();
        store
            .insert_raw(ENERGY_TREE, ENERGY_STATE_KEY, b"{broken json!")
            .unwrap();
        let state = store.energy_state();
        assert_eq!(state.current_xp, 100);
    }

    #[test]
    fn energy_state_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::open_path(dir.path()).unwrap();
        let mut state = DailyEnergyState::default();
        state.current_xp = 73;
        state.date_key = "2026-08-07".to_string();
        state.history.push(DayXp { date: "2026-08-06".to_string(), xp: 55 });
        store.set_energy_state(&state).unwrap();
        assert_eq!(store.energy_state(), state);
    }

    #[test]
    fn milestone_namespaces_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::open_path(dir.path()).unwrap();
        store.record_milestone(LEARNING_MILESTONES_NS, 2).unwrap();
        store.record_milestone(AVATAR_MILESTONES_NS, 3).unwrap();

        assert!(store.is_milestone_seen(LEARNING_MILESTONES_NS, 2));
        assert!(!store.is_milestone_seen(LEARNING_MILESTONES_NS, 3));
        assert_eq!(store.seen_milestones(AVATAR_MILESTONES_NS), vec![3]);
    }

    #[test]
    fn milestones_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = ProgressStore::open_path(dir.path()).unwrap();
            store.record_milestone(LEARNING_MILESTONES_NS, 4).unwrap();
        }
        let store = ProgressStore::open_path(dir.path()).unwrap();
        assert!(store.is_milestone_seen(LEARNING_MILESTONES_NS, 4));
    }
}
