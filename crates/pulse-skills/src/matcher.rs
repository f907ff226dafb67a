//! Keyword matcher: associates free-text study-plan titles with taxonomy
//! subtopics.
//!
//! Normalization makes "React.js" and "react js" equivalent; matching is
//! whole-word, order- and adjacency-independent. Pathological input must
//! never panic: dynamic patterns are built from escaped text, and a failed
//! pattern construction degrades to plain substring containment.

use regex::Regex;

/// Lowercase, `.` → space, strip non-alphanumeric/non-space, collapse
/// whitespace, trim.
fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase().replace('.', " ");
    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when the word occurs with word boundaries somewhere in `text`.
fn word_in_text(text: &str, word: &str) -> bool {
    match Regex::new(&format!(r"\b{}\b", regex::escape(word))) {
        Ok(re) => re.is_match(text),
        // Escaped input should always compile; if it somehow does not,
        // substring containment is the agreed degraded behavior.
        Err(_) => text.contains(word),
    }
}

/// True iff every whitespace-delimited word of the normalized `phrase`
/// occurs as a whole word in the normalized `text`. An empty phrase does
/// not match anything.
pub fn phrase_matches(text: &str, phrase: &str) -> bool {
    let text = normalize(text);
    let phrase = normalize(phrase);
    if phrase.is_empty() {
        return false;
    }
    phrase.split_whitespace().all(|word| word_in_text(&text, word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_and_case_are_ignored() {
        assert!(phrase_matches("React.js Fundamentals in a Day", "react fundamentals"));
        assert!(phrase_matches("JAVA basics", "java"));
        assert!(phrase_matches("Intro to Node.JS!", "node js"));
    }

    #[test]
    fn unrelated_text_does_not_match() {
        assert!(!phrase_matches("Advanced Python", "react fundamentals"));
    }

    #[test]
    fn word_order_is_irrelevant() {
        assert!(phrase_matches("Fundamentals of React hooks", "react fundamentals"));
    }

    #[test]
    fn whole_word_boundaries_are_respected() {
        // "java" must not match inside "javascript".
        assert!(!phrase_matches("JavaScript for beginners", "java"));
        assert!(phrase_matches("Java and JavaScript compared", "java"));
    }

    #[test]
    fn regex_special_characters_are_safe() {
        assert!(!phrase_matches("plain text", "c++ (advanced) [edition]"));
        assert!(phrase_matches("c advanced edition", "c++ (advanced) [edition]"));
    }

    #[test]
    fn empty_phrase_never_matches() {
        assert!(!phrase_matches("anything at all", ""));
        assert!(!phrase_matches("anything at all", "!!! ???"));
    }
}
