//! Fixed skill taxonomy: tiers, skills, subtopics, keyword phrases.
//!
//! Static data loaded once at start and never mutated. Prerequisites are
//! informational only — nothing in the engine gates availability on them.

use std::sync::OnceLock;

/// One subtopic of a skill. A study plan "claims" a subtopic when any of the
/// keyword phrases matches the plan's title/goal text (see [`crate::matcher`]).
#[derive(Debug, Clone)]
pub struct SubtopicDef {
    pub name: &'static str,
    /// Keyword phrases; every word of a phrase must appear in the plan text.
    pub keywords: &'static [&'static str],
}

/// One skill in the taxonomy.
#[derive(Debug, Clone)]
pub struct SkillDef {
    /// Stable identifier (storage and map key).
    pub id: &'static str,
    pub name: &'static str,
    /// Tier index, 1 = foundations. Ordering only; no gating.
    pub tier: u8,
    pub color_hint: &'static str,
    /// Informational pointers to earlier skills. Never enforced.
    pub prerequisites: &'static [&'static str],
    pub subtopics: &'static [SubtopicDef],
}

static TAXONOMY: OnceLock<Vec<SkillDef>> = OnceLock::new();

/// The full taxonomy in tier order. Seeded on first access.
pub fn skill_taxonomy() -> &'static [SkillDef] {
    TAXONOMY.get_or_init(seed_taxonomy)
}

fn seed_taxonomy() -> Vec<SkillDef> {
    vec![
        SkillDef {
            id: "html-css",
            name: "HTML & CSS",
            tier: 1,
            color_hint: "orange",
            prerequisites: &[],
            subtopics: &[
                SubtopicDef { name: "HTML Basics", keywords: &["html"] },
                SubtopicDef { name: "CSS Layout", keywords: &["css", "flexbox", "css grid"] },
                SubtopicDef { name: "Responsive Design", keywords: &["responsive design", "media queries"] },
            ],
        },
        SkillDef {
            id: "javascript",
            name: "JavaScript",
            tier: 1,
            color_hint: "yellow",
            prerequisites: &["html-css"],
            subtopics: &[
                SubtopicDef { name: "Language Fundamentals", keywords: &["javascript fundamentals", "javascript basics", "js basics"] },
                SubtopicDef { name: "DOM & Events", keywords: &["dom", "javascript events"] },
                SubtopicDef { name: "Async JavaScript", keywords: &["async javascript", "promises", "async await"] },
            ],
        },
        SkillDef {
            id: "python",
            name: "Python",
            tier: 1,
            color_hint: "blue",
            prerequisites: &[],
            subtopics: &[
                SubtopicDef { name: "Python Basics", keywords: &["python"] },
                SubtopicDef { name: "Data Structures", keywords: &["python data structures", "lists dictionaries"] },
                SubtopicDef { name: "Scripting & Automation", keywords: &["python scripting", "python automation"] },
            ],
        },
        SkillDef {
            id: "react",
            name: "React",
            tier: 2,
            color_hint: "cyan",
            prerequisites: &["javascript"],
            subtopics: &[
                SubtopicDef { name: "Components & Props", keywords: &["react fundamentals", "react components", "react basics"] },
                SubtopicDef { name: "Hooks & State", keywords: &["react hooks", "react state"] },
                SubtopicDef { name: "Routing", keywords: &["react router"] },
            ],
        },
        SkillDef {
            id: "typescript",
            name: "TypeScript",
            tier: 2,
            color_hint: "blue",
            prerequisites: &["javascript"],
            subtopics: &[
                SubtopicDef { name: "Type System", keywords: &["typescript"] },
                SubtopicDef { name: "Generics", keywords: &["typescript generics"] },
            ],
        },
        SkillDef {
            id: "backend-api",
            name: "Backend APIs",
            tier: 3,
            color_hint: "green",
            prerequisites: &["javascript", "python"],
            subtopics: &[
                SubtopicDef { name: "REST Design", keywords: &["rest api", "api design"] },
                SubtopicDef { name: "Authentication", keywords: &["authentication", "auth jwt"] },
                SubtopicDef { name: "Node or Django", keywords: &["node express", "django", "fastapi"] },
            ],
        },
        SkillDef {
            id: "databases",
            name: "Databases",
            tier: 3,
            color_hint: "purple",
            prerequisites: &["backend-api"],
            subtopics: &[
                SubtopicDef { name: "SQL Fundamentals", keywords: &["sql"] },
                SubtopicDef { name: "Modeling & Indexing", keywords: &["database design", "database modeling", "indexing"] },
            ],
        },
        SkillDef {
            id: "data-analysis",
            name: "Data Analysis",
            tier: 4,
            color_hint: "teal",
            prerequisites: &["python", "databases"],
            subtopics: &[
                SubtopicDef { name: "Pandas & NumPy", keywords: &["pandas", "numpy"] },
                SubtopicDef { name: "Visualization", keywords: &["data visualization", "matplotlib"] },
                SubtopicDef { name: "Statistics", keywords: &["statistics"] },
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_is_tier_ordered_with_unique_ids() {
        let skills = skill_taxonomy();
        assert!(!skills.is_empty());
        let mut last_tier = 0;
        let mut ids = std::collections::HashSet::new();
        for skill in skills {
            assert!(skill.tier >= last_tier, "tiers out of order at {}", skill.id);
            last_tier = skill.tier;
            assert!(ids.insert(skill.id), "duplicate skill id {}", skill.id);
            assert!(!skill.subtopics.is_empty());
        }
    }

    #[test]
    fn prerequisites_reference_existing_skills() {
        let skills = skill_taxonomy();
        let ids: std::collections::HashSet<_> = skills.iter().map(|s| s.id).collect();
        for skill in skills {
            for prereq in skill.prerequisites {
                assert!(ids.contains(prereq), "{} -> missing {}", skill.id, prereq);
            }
        }
    }
}
