//! Energy rank and level lookup.
//!
//! Pure, total functions over the 0–100 energy scale. Out-of-range input is
//! clamped before lookup, so there is no error path anywhere in this module.

/// Five fixed tiers with descending minimum thresholds. Evaluated top-down:
/// the first threshold the clamped value meets or exceeds wins.
const RANK_TIERS: [(u8, u8, &str, &str); 5] = [
    (90, 5, "Laser Focused", "emerald"),
    (70, 4, "Deep Work", "green"),
    (50, 3, "Steady", "amber"),
    (30, 2, "Drifting", "orange"),
    (0, 1, "Scattered", "red"),
];

/// A resolved rank tier for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank {
    pub title: &'static str,
    /// 1 (lowest) through 5 (highest); monotonically non-decreasing in XP.
    pub tier: u8,
    pub color_hint: &'static str,
}

/// The next-higher tier and the exact XP delta needed to reach it.
/// `title` is `None` and `xp_needed` is 0 at the top tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextRank {
    pub title: Option<&'static str>,
    pub xp_needed: u8,
}

#[inline]
fn clamp_xp(xp: i64) -> u8 {
    xp.clamp(0, 100) as u8
}

/// Maps an energy value to its rank tier.
pub fn rank_of(xp: i64) -> Rank {
    let xp = clamp_xp(xp);
    for &(min, tier, title, color_hint) in &RANK_TIERS {
        if xp >= min {
            return Rank { title, tier, color_hint };
        }
    }
    // Unreachable: the last tier's minimum is 0.
    let (_, tier, title, color_hint) = RANK_TIERS[RANK_TIERS.len() - 1];
    Rank { title, tier, color_hint }
}

/// Coarse 0–10 level: one level per 10 XP.
#[inline]
pub fn level_of(xp: i64) -> u8 {
    clamp_xp(xp) / 10
}

/// Title and XP delta of the next-higher tier.
pub fn next_rank(xp: i64) -> NextRank {
    let xp = clamp_xp(xp);
    let current = rank_of(i64::from(xp));
    if current.tier == 5 {
        return NextRank { title: None, xp_needed: 0 };
    }
    // Tiers are ordered high-to-low; the entry before the current one is next.
    let idx = RANK_TIERS
        .iter()
        .position(|&(_, tier, _, _)| tier == current.tier)
        .unwrap_or(RANK_TIERS.len() - 1);
    let (min, _, title, _) = RANK_TIERS[idx - 1];
    NextRank {
        title: Some(title),
        xp_needed: min - xp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_monotonic() {
        let mut last = 0;
        for xp in 0..=100i64 {
            let tier = rank_of(xp).tier;
            assert!(tier >= last, "tier regressed at xp={}", xp);
            last = tier;
        }
    }

    #[test]
    fn boundaries_resolve_high_to_low() {
        assert_eq!(rank_of(100).title, "Laser Focused");
        assert_eq!(rank_of(90).title, "Laser Focused");
        assert_eq!(rank_of(89).title, "Deep Work");
        assert_eq!(rank_of(70).title, "Deep Work");
        assert_eq!(rank_of(50).title, "Steady");
        assert_eq!(rank_of(30).title, "Drifting");
        assert_eq!(rank_of(29).title, "Scattered");
        assert_eq!(rank_of(0).title, "Scattered");
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        assert_eq!(rank_of(-5), rank_of(0));
        assert_eq!(rank_of(400), rank_of(100));
        assert_eq!(level_of(-5), 0);
        assert_eq!(level_of(400), 10);
    }

    #[test]
    fn level_is_floor_of_tens() {
        assert_eq!(level_of(0), 0);
        assert_eq!(level_of(9), 0);
        assert_eq!(level_of(10), 1);
        assert_eq!(level_of(55), 5);
        assert_eq!(level_of(100), 10);
    }

    #[test]
    fn next_rank_delta_is_exact() {
        let next = next_rank(42);
        assert_eq!(next.title, Some("Steady"));
        assert_eq!(next.xp_needed, 8);

        let top = next_rank(95);
        assert_eq!(top.title, None);
        assert_eq!(top.xp_needed, 0);
    }
}
