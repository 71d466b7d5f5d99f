//! Pattern-based extraction of idea-like clauses.
//!
//! Patterns run in their declared order; within a pattern, matches come out
//! in text order. Results are deliberately over-inclusive: a clause hit by two
//! patterns is returned twice.

use regex::Regex;

use crate::error::Result;

/// Declarative description of one idea pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdeaPatternSpec {
    /// Stable identifier, useful in logs and tests
    pub id: &'static str,
    /// Regular expression source, matched case-insensitively
    pub pattern: &'static str,
    /// Capture group holding the idea clause
    pub capture_group: usize,
    /// A capture must be strictly longer than this after trimming
    pub min_length: usize,
}

/// The built-in pattern table. Each capture runs to and includes the next
/// sentence terminator.
pub const DEFAULT_IDEA_PATTERNS: &[IdeaPatternSpec] = &[
    IdeaPatternSpec {
        id: "explicit-marker",
        pattern: r"(?:idea|suggestion|concept|thought|plan|proposal)(?:\s+is)?:?\s+([^.!?]+[.!?])",
        capture_group: 1,
        min_length: 10,
    },
    IdeaPatternSpec {
        id: "suggestive-phrasing",
        pattern: r"(?:you could|we could|might|perhaps|maybe|consider)(?:\s+try)?(?:\s+to)?\s+([^.!?]+[.!?])",
        capture_group: 1,
        min_length: 10,
    },
    IdeaPatternSpec {
        id: "rhetorical-framing",
        pattern: r"(?:what if|how about|why not)\s+([^.!?]+[.!?])",
        capture_group: 1,
        min_length: 10,
    },
];

/// A compiled idea pattern
#[derive(Debug, Clone)]
pub struct IdeaPattern {
    /// Pattern identifier, e.g. `suggestive-phrasing`
    pub id: &'static str,
    regex: Regex,
    capture_group: usize,
    min_length: usize,
}

impl IdeaPattern {
    /// Compile a pattern spec (case-insensitive)
    pub fn compile(spec: &IdeaPatternSpec) -> Result<Self> {
        let regex = Regex::new(&format!("(?i){}", spec.pattern))?;
        Ok(Self {
            id: spec.id,
            regex,
            capture_group: spec.capture_group,
            min_length: spec.min_length,
        })
    }

    /// All accepted, trimmed captures of this pattern in text order
    #[must_use]
    pub fn find_all(&self, text: &str) -> Vec<String> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| caps.get(self.capture_group))
            .map(|m| m.as_str().trim())
            .filter(|capture| capture.chars().count() > self.min_length)
            .map(ToString::to_string)
            .collect()
    }
}

/// Runs the idea pattern table over text
#[derive(Debug, Clone)]
pub struct IdeaExtractor {
    patterns: Vec<IdeaPattern>,
}

impl IdeaExtractor {
    /// Build an extractor from the built-in pattern table
    pub fn new() -> Result<Self> {
        Self::with_patterns(DEFAULT_IDEA_PATTERNS)
    }

    /// Build an extractor from a custom pattern table
    pub fn with_patterns(specs: &[IdeaPatternSpec]) -> Result<Self> {
        let patterns = specs
            .iter()
            .map(IdeaPattern::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Set the minimum capture length on every pattern
    #[must_use]
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        for pattern in &mut self.patterns {
            pattern.min_length = min_length;
        }
        self
    }

    /// Compiled patterns in application order
    #[must_use]
    pub fn patterns(&self) -> &[IdeaPattern] {
        &self.patterns
    }

    /// Extract candidate idea statements from `text`
    #[must_use]
    pub fn extract(&self, text: &str) -> Vec<String> {
        self.patterns
            .iter()
            .flat_map(|pattern| pattern.find_all(text))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> IdeaExtractor {
        IdeaExtractor::new().expect("Failed to compile idea patterns")
    }

    #[test]
    fn test_suggestive_phrasing() {
        let ideas = extractor().extract("I think you could try meditating daily.");
        assert_eq!(ideas, vec!["meditating daily."]);
    }

    #[test]
    fn test_explicit_marker_with_colon() {
        let ideas = extractor().extract("My idea is: build a habit tracker app!");
        assert_eq!(ideas, vec!["build a habit tracker app!"]);
    }

    #[test]
    fn test_rhetorical_framing() {
        let ideas = extractor().extract("What if we moved the standup to Friday?");
        assert_eq!(ideas, vec!["we moved the standup to Friday?"]);
    }

    #[test]
    fn test_short_captures_rejected() {
        assert!(extractor().extract("Why not now?").is_empty());
    }

    #[test]
    fn test_unterminated_clause_is_ignored() {
        assert!(extractor().extract("maybe we should rewrite everything").is_empty());
    }

    #[test]
    fn test_patterns_run_in_declared_order() {
        let text = "Why not ship the beta early? My plan is to write the docs first.";
        let ideas = extractor().extract(text);
        assert_eq!(
            ideas,
            vec!["to write the docs first.", "ship the beta early?"]
        );
    }

    #[test]
    fn test_overlapping_patterns_produce_duplicates() {
        // "plan" and "maybe" both introduce a clause
        let ideas = extractor().extract("The plan: maybe rent a cabin near the lake.");
        assert_eq!(ideas.len(), 2);
    }

    #[test]
    fn test_custom_table() {
        let specs = [IdeaPatternSpec {
            id: "todo",
            pattern: r"todo:\s*([^.!?]+[.!?])",
            capture_group: 1,
            min_length: 3,
        }];
        let extractor = IdeaExtractor::with_patterns(&specs).expect("Failed to compile");
        assert_eq!(extractor.extract("TODO: call mom."), vec!["call mom."]);
    }

    #[test]
    fn test_pattern_ids() {
        let ids: Vec<_> = extractor().patterns().iter().map(|p| p.id).collect();
        assert_eq!(
            ids,
            vec!["explicit-marker", "suggestive-phrasing", "rhetorical-framing"]
        );
    }
}
