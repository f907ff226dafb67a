//! Skill progress aggregator: fixed taxonomy × study-plan snapshots →
//! per-skill completion.
//!
//! A subtopic counts as completed only when its best-matching plan has every
//! chapter completed AND its quiz is unlocked (the proxy for "quiz passed").
//! Prerequisites never gate anything here.

use crate::matcher::phrase_matches;
use crate::taxonomy::SkillDef;
use pulse_core::StudyPlanSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Display state of a whole skill, derived per evaluation (never stored).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillState {
    NotStarted,
    InProgress,
    Completed,
}

/// Status of one subtopic after scanning all plans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtopicStatus {
    pub name: String,
    pub completed: bool,
    pub in_progress: bool,
    /// True when any plan matched, even at 0% progress. Lets a freshly
    /// created plan visibly claim a subtopic before work starts.
    pub has_match: bool,
    pub matched_plan_title: Option<String>,
    /// Completion percentage of the winning plan (0.0 without a match).
    pub matched_plan_pct: f64,
}

/// Aggregated progress for one skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillProgress {
    pub completed_count: usize,
    pub in_progress_count: usize,
    pub total_count: usize,
    /// Nearest-integer average over subtopics (100 / matched pct / 0).
    pub completion_pct: u8,
    pub subtopics: Vec<SubtopicStatus>,
}

impl SkillProgress {
    /// Derived display state. In-progress also covers "claimed but at 0%":
    /// any matching plan at all pulls the skill out of not-started.
    pub fn state(&self) -> SkillState {
        if self.total_count > 0 && self.completed_count == self.total_count {
            return SkillState::Completed;
        }
        let any_progress = self
            .subtopics
            .iter()
            .any(|s| s.completed || s.in_progress || s.has_match);
        if any_progress {
            SkillState::InProgress
        } else {
            SkillState::NotStarted
        }
    }
}

/// Per-plan facts, precomputed once per aggregation pass.
struct PlanFacts<'a> {
    plan: &'a StudyPlanSnapshot,
    search_text: String,
    completion_pct: f64,
    all_chapters_done: bool,
    quiz_passed: bool,
}

impl<'a> PlanFacts<'a> {
    fn new(plan: &'a StudyPlanSnapshot) -> Self {
        let all_chapters_done = plan.all_chapters_done();
        Self {
            plan,
            search_text: format!("{} {}", plan.title, plan.goal),
            completion_pct: plan.completion_pct(),
            all_chapters_done,
            quiz_passed: plan.quiz_unlocked && all_chapters_done,
        }
    }
}

/// Aggregates every skill in the taxonomy against the full plan set.
pub fn compute_skill_progress(
    plans: &[StudyPlanSnapshot],
    taxonomy: &[SkillDef],
) -> HashMap<String, SkillProgress> {
    let facts: Vec<PlanFacts<'_>> = plans.iter().map(PlanFacts::new).collect();

    let mut out = HashMap::with_capacity(taxonomy.len());
    for skill in taxonomy {
        let subtopics: Vec<SubtopicStatus> = skill
            .subtopics
            .iter()
            .map(|sub| {
                // Stable scan: ties on completion pct keep the first plan seen.
                let mut winner: Option<&PlanFacts<'_>> = None;
                for f in &facts {
                    let is_candidate = sub
                        .keywords
                        .iter()
                        .any(|phrase| phrase_matches(&f.search_text, phrase));
                    if !is_candidate {
                        continue;
                    }
                    match winner {
                        Some(best) if f.completion_pct <= best.completion_pct => {}
                        _ => winner = Some(f),
                    }
                }

                match winner {
                    Some(best) => {
                        let completed = best.all_chapters_done && best.quiz_passed;
                        SubtopicStatus {
                            name: sub.name.to_string(),
                            completed,
                            in_progress: !completed && best.completion_pct > 0.0,
                            has_match: true,
                            matched_plan_title: Some(best.plan.title.clone()),
                            matched_plan_pct: best.completion_pct,
                        }
                    }
                    None => SubtopicStatus {
                        name: sub.name.to_string(),
                        completed: false,
                        in_progress: false,
                        has_match: false,
                        matched_plan_title: None,
                        matched_plan_pct: 0.0,
                    },
                }
            })
            .collect();

        let total_count = subtopics.len();
        let completed_count = subtopics.iter().filter(|s| s.completed).count();
        let in_progress_count = subtopics.iter().filter(|s| s.in_progress).count();
        let pct_sum: f64 = subtopics
            .iter()
            .map(|s| {
                if s.completed {
                    100.0
                } else if s.in_progress {
                    s.matched_plan_pct
                } else {
                    0.0
                }
            })
            .sum();
        let completion_pct = if total_count == 0 {
            0
        } else {
            (pct_sum / total_count as f64).round() as u8
        };

        out.insert(
            skill.id.to_string(),
            SkillProgress {
                completed_count,
                in_progress_count,
                total_count,
                completion_pct,
                subtopics,
            },
        );
    }
    out
}
