//! Regex corpora for content-quality detection.
//!
//! These pattern tables are domain data, tuned against published GEO
//! effectiveness research, not control flow. Each category is unit-tested
//! against positive/negative fixtures below.

use lazy_static::lazy_static;
use regex::Regex;

fn build(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).expect("invalid corpus pattern"))
        .collect()
}

lazy_static! {
    /// Citations: "according to", "(Author, 2024)", "[1]", "Source: ...".
    pub static ref CITATION_PATTERNS: Vec<Regex> = build(&[
        r"according to\b",
        r"\bcited? (?:by|in|from)\b",
        r"\(\w[\w\s&.,]+\d{4}\)",
        r"\[\d+\]",
        r"\bsource:\s",
        r"\breference:\s",
        r"\bas reported by\b",
        r"\bpublished (?:in|by)\b",
        r"\bresearch (?:by|from|shows)\b",
        r"\bstudy (?:by|from|shows|found)\b",
        r"\bdata from\b",
    ]);

    /// Statistics: numbers with context, not just any number.
    pub static ref STAT_PATTERNS: Vec<Regex> = build(&[
        r"\d+(?:\.\d+)?%",
        r"\$\d[\d,.]*\s*(?:billion|million|trillion|thousand|B|M|K)?",
        r"\d[\d,.]*\s*(?:billion|million|trillion|thousand)",
        r"\d+x\s+(?:more|faster|slower|better|higher|lower|increase|growth)",
        r"\b(?:increased?|decreased?|grew?|rose|fell|dropped?)\s+(?:by\s+)?\d",
        r"\d+\s*(?:out of|/)\s*\d+",
        r"\b(?:average|median|mean)\s+(?:of\s+)?\d",
        r"\d+(?:\.\d+)?\s*(?:per ?cent|percent)",
    ]);

    /// Expert quotes: quoted text with attribution.
    pub static ref QUOTE_PATTERNS: Vec<Regex> = build(&[
        r#"['\u{2018}\u{201C}"][\w\s]{15,}['\u{2019}\u{201D}"]\s*(?:,?\s*(?:says?|said|explains?|notes?|argues?|according to|wrote|states?))"#,
        r#"(?:says?|said|explains?|notes?|argues?|wrote|states?)\s+[\w\s]+[,:]?\s*['\u{2018}\u{201C}"]"#,
        r#"['\u{2018}\u{201C}"][\w\s]{15,}['\u{2019}\u{201D}"]\s*[-\u{2014}\u{2013}]\s*\w"#,
    ]);

    /// Authoritative tone markers.
    pub static ref AUTHORITY_PATTERNS: Vec<Regex> = build(&[
        r"\b(?:demonstrably|definitively|conclusively|systematically)\b",
        r"\bbased on (?:our|my|the) (?:analysis|research|data|findings|testing)\b",
        r"\b(?:our|my) (?:research|analysis|data|findings|testing) (?:shows?|reveals?|indicates?|confirms?|demonstrates?)\b",
        r"\b(?:evidence|data) (?:shows?|suggests?|indicates?|confirms?)\b",
        r"\b(?:it is|it's) (?:clear|evident|well.established|proven|documented)\b",
        r"\b(?:critical|essential|fundamental|imperative)\s+(?:to|that|for)\b",
        r"\b(?:best practice|industry standard|proven (?:method|approach|strategy))\b",
        r"\b(?:we (?:recommend|advise|suggest)|(?:should|must) (?:be|ensure|implement))\b",
    ]);

    /// Hedging language, the opposite of authoritative.
    pub static ref HEDGING_PATTERNS: Vec<Regex> = build(&[
        r"\b(?:i think|i guess|maybe|perhaps|possibly|might be|could be|not sure)\b",
        r"\b(?:it seems like|sort of|kind of|in my opinion)\b",
        r"\b(?:i believe|i feel|i suppose)\b",
    ]);

    /// Answer-first opening paragraph indicators, anchored to paragraph start.
    pub static ref ANSWER_FIRST_PATTERNS: Vec<Regex> = build(&[
        r"^(?:the\s+)?(?:short\s+)?answer\s+is\b",
        r"^(?:in\s+short|simply\s+put|to\s+summarize|in\s+summary|tl;?dr)\b",
        r"^(?:yes|no)[,.]",
        r"^(?:\w+\s+){1,10}(?:is|are|was|were|means?|refers?\s+to)\b",
    ]);

    /// Transition words signalling logical flow.
    pub static ref TRANSITION_PATTERNS: Vec<Regex> = build(&[
        r"\bhowever\b",
        r"\btherefore\b",
        r"\bmoreover\b",
        r"\bfurthermore\b",
        r"\bin addition\b",
        r"\bconsequently\b",
        r"\bas a result\b",
        r"\bon the other hand\b",
        r"\bin contrast\b",
        r"\bfor (?:example|instance)\b",
        r"\bspecifically\b",
        r"\bnotably\b",
        r"\bimportantly\b",
    ]);

    /// First-person experience phrases (static E-E-A-T fallback).
    pub static ref EXPERIENCE_PATTERNS: Vec<Regex> = build(&[
        r"\bi tested\b",
        r"\bi tried\b",
        r"\bi used\b",
        r"\bin my experience\b",
        r"\bwe found\b",
        r"\bwe tested\b",
        r"\bour team\b",
        r"\bwe built\b",
        r"\bhands-on\b",
        r"\bcase study\b",
        r"\breal.world\b",
    ]);

    /// Expertise-depth phrases (static E-E-A-T fallback).
    pub static ref DEPTH_PATTERNS: Vec<Regex> = build(&[
        r"\bfor example\b",
        r"\bspecifically\b",
        r"\bin practice\b",
        r"\bthe reason\b",
        r"\bthis means\b",
        r"\bhow it works\b",
        r"\bstep.by.step\b",
        r"\bkey takeaway\b",
        r"\bpro tip\b",
        r"\bimportant(?:ly)?\b.*because",
        r"\bcommon mistake\b",
    ]);

    /// Sourcing phrases mentioned in prose (static E-E-A-T fallback).
    pub static ref SOURCE_MENTION_PATTERNS: Vec<Regex> = build(&[
        r"according to",
        r"source:",
        r"sources:",
        r"data from",
        r"published in",
        r"as reported by",
        r"study by",
        r"research from",
    ]);

    /// "Acronym defined" constructs like "Retrieval-Augmented Generation (RAG)".
    pub static ref ACRONYM_DEFINITION: Regex =
        Regex::new(r"\b[A-Z][a-z]+(?:[\s-][A-Z][a-z]+)+\s*\([A-Z]{2,}\)").unwrap();

    /// Standalone acronyms, 3+ uppercase letters.
    pub static ref STANDALONE_ACRONYM: Regex = Regex::new(r"\b[A-Z]{3,}\b").unwrap();

    /// Hyphenated compound technical terms.
    pub static ref COMPOUND_TERM: Regex = Regex::new(
        r"\b\w+-(?:based|driven|powered|enabled|focused|oriented|specific|level|aware)\b",
    )
    .unwrap();

    /// Lowercase word tokens used for TTR and bigram analysis.
    pub static ref WORD_3PLUS: Regex = Regex::new(r"\b[a-z]{3,}\b").unwrap();
    pub static ref WORD_2PLUS: Regex = Regex::new(r"\b[a-z]{2,}\b").unwrap();
}

/// Uppercase tokens that look like acronyms but are ordinary words.
pub const COMMON_UPPERCASE_WORDS: [&str; 30] = [
    "THE", "AND", "FOR", "NOT", "BUT", "ARE", "WAS", "HAS", "HIS", "HER", "ITS", "ALL", "CAN",
    "HAD", "HIM", "WHO", "DID", "GET", "HOW", "MAY", "NEW", "NOW", "OLD", "OUR", "OWN", "SAY",
    "SHE", "TOO", "USE", "FAQ",
];

/// Count total matches across every pattern in a category.
pub fn count_matches(text: &str, patterns: &[Regex]) -> usize {
    patterns.iter().map(|p| p.find_iter(text).count()).sum()
}

/// Count how many patterns in a category match at least once.
pub fn count_matching_patterns(text: &str, patterns: &[Regex]) -> usize {
    patterns.iter().filter(|p| p.is_match(text)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_citation_patterns() {
        assert!(count_matches("According to a study by Chen et al., results improved.", &CITATION_PATTERNS) >= 2);
        assert!(count_matches("Findings were published in Nature (Smith, 2024).", &CITATION_PATTERNS) >= 2);
        assert!(count_matches("See footnote [3] for details.", &CITATION_PATTERNS) >= 1);
        assert_eq!(count_matches("We like widgets a lot.", &CITATION_PATTERNS), 0);
    }

    #[test]
    fn test_stat_patterns() {
        assert!(count_matches("Revenue grew 42% to $1.5 billion.", &STAT_PATTERNS) >= 2);
        assert!(count_matches("9 out of 10 customers agree.", &STAT_PATTERNS) >= 1);
        assert!(count_matches("10x faster than before.", &STAT_PATTERNS) >= 1);
        assert_eq!(count_matches("many customers agree strongly", &STAT_PATTERNS), 0);
    }

    #[test]
    fn test_quote_patterns() {
        assert!(
            count_matches(
                r#""This changed how our whole team works" says Jane Doe."#,
                &QUOTE_PATTERNS
            ) >= 1
        );
        assert_eq!(count_matches("No quotes in this text at all.", &QUOTE_PATTERNS), 0);
    }

    #[test]
    fn test_authority_vs_hedging() {
        let authoritative = "Based on our analysis, the evidence shows this is the industry standard.";
        assert!(count_matches(authoritative, &AUTHORITY_PATTERNS) >= 2);
        assert_eq!(count_matches(authoritative, &HEDGING_PATTERNS), 0);

        let hedged = "I think it could be useful, maybe, in my opinion.";
        assert!(count_matches(hedged, &HEDGING_PATTERNS) >= 3);
    }

    #[test]
    fn test_answer_first_patterns() {
        assert!(ANSWER_FIRST_PATTERNS.iter().any(|p| p.is_match("the answer is simple")));
        assert!(ANSWER_FIRST_PATTERNS.iter().any(|p| p.is_match("yes, widgets help")));
        assert!(ANSWER_FIRST_PATTERNS
            .iter()
            .any(|p| p.is_match("generative engine optimization is a discipline")));
        assert!(!ANSWER_FIRST_PATTERNS
            .iter()
            .any(|p| p.is_match("once upon a time there")));
    }

    #[test]
    fn test_technical_term_patterns() {
        let text = "Retrieval-Augmented Generation (RAG) uses an HTTP-based API with JSON payloads.";
        assert_eq!(ACRONYM_DEFINITION.find_iter(text).count(), 1);
        assert!(STANDALONE_ACRONYM.find_iter(text).count() >= 3);
        assert_eq!(COMPOUND_TERM.find_iter(&text.to_lowercase()).count(), 1);
    }

    #[test]
    fn test_common_uppercase_excluded() {
        assert!(COMMON_UPPERCASE_WORDS.contains(&"FAQ"));
        assert!(!COMMON_UPPERCASE_WORDS.contains(&"RAG"));
    }
}
