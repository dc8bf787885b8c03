//! Pillar score types.
//!
//! Every scorer produces a [`PillarScore`]: a clamped 0-100 value plus a
//! structured detail report. The `findings` list is the integration contract
//! with the recommendation engine: each entry is a short stable key
//! ("no_h1", "no_citations") that maps to a rule in the recommendation table.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The six scoring dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Content,
    Schema,
    Eeat,
    Technical,
    Entity,
    AiVisibility,
}

impl Pillar {
    pub const ALL: [Pillar; 6] = [
        Pillar::Content,
        Pillar::Schema,
        Pillar::Eeat,
        Pillar::Technical,
        Pillar::Entity,
        Pillar::AiVisibility,
    ];

    /// Pillars scorable without live LLM probing, used for competitor scoring.
    pub const STATIC: [Pillar; 4] = [
        Pillar::Content,
        Pillar::Schema,
        Pillar::Eeat,
        Pillar::Technical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pillar::Content => "content",
            Pillar::Schema => "schema",
            Pillar::Eeat => "eeat",
            Pillar::Technical => "technical",
            Pillar::Entity => "entity",
            Pillar::AiVisibility => "ai_visibility",
        }
    }
}

impl std::fmt::Display for Pillar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamp any score into the valid 0-100 range.
///
/// Internal arithmetic may transiently exceed bounds (stuffing penalties can
/// go negative, bonus stacking can overshoot), so every scorer clamps last.
pub fn safe_score(score: f64) -> f64 {
    if !score.is_finite() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}

/// Structured detail report attached to a pillar score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PillarDetails {
    /// Named check results (booleans, counts, sub-scores)
    #[serde(default)]
    pub checks: Map<String, Value>,

    /// Stable finding keys consumed by the recommendation engine
    #[serde(default)]
    pub findings: Vec<String>,

    /// Free-form note (partial results, error context)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl PillarDetails {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a named check value.
    pub fn check(&mut self, key: &str, value: impl Into<Value>) {
        self.checks.insert(key.to_string(), value.into());
    }

    /// Append a finding key, preserving emission order.
    pub fn finding(&mut self, key: &str) {
        self.findings.push(key.to_string());
    }

    /// A details payload for a pillar that could not run because the page
    /// was never fetched. Carries the `crawl_failed` marker alongside the
    /// error message.
    pub fn from_error(message: impl Into<String>) -> Self {
        let mut details = Self::new();
        details
            .checks
            .insert("crawl_failed".to_string(), Value::Bool(true));
        details
            .checks
            .insert("error".to_string(), Value::String(message.into()));
        details
    }
}

/// One pillar's result: clamped score plus detail report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PillarScore {
    pub score: f64,
    pub details: PillarDetails,
}

impl PillarScore {
    pub fn new(score: f64, details: PillarDetails) -> Self {
        Self {
            score: safe_score(score),
            details,
        }
    }

    /// Zero score carrying an error detail.
    pub fn errored(message: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            details: PillarDetails::from_error(message),
        }
    }
}

/// The complete per-page score set persisted for a run or competitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageScore {
    pub url: String,
    pub content: PillarScore,
    pub schema: PillarScore,
    pub eeat: PillarScore,
    pub technical: PillarScore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<PillarScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_visibility: Option<PillarScore>,
    pub composite: f64,
}

impl PageScore {
    pub fn pillar(&self, pillar: Pillar) -> Option<&PillarScore> {
        match pillar {
            Pillar::Content => Some(&self.content),
            Pillar::Schema => Some(&self.schema),
            Pillar::Eeat => Some(&self.eeat),
            Pillar::Technical => Some(&self.technical),
            Pillar::Entity => self.entity.as_ref(),
            Pillar::AiVisibility => self.ai_visibility.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_score_clamps() {
        assert_eq!(safe_score(-5.0), 0.0);
        assert_eq!(safe_score(0.0), 0.0);
        assert_eq!(safe_score(55.5), 55.5);
        assert_eq!(safe_score(100.0), 100.0);
        assert_eq!(safe_score(140.0), 100.0);
        assert_eq!(safe_score(f64::NAN), 0.0);
    }

    #[test]
    fn test_details_preserve_finding_order() {
        let mut details = PillarDetails::new();
        details.finding("no_h1");
        details.finding("no_faq_section");
        details.finding("no_lists");
        assert_eq!(details.findings, vec!["no_h1", "no_faq_section", "no_lists"]);
    }

    #[test]
    fn test_errored_pillar_score() {
        let score = PillarScore::errored("Request timed out");
        assert_eq!(score.score, 0.0);
        assert_eq!(
            score.details.checks.get("error").and_then(|v| v.as_str()),
            Some("Request timed out")
        );
        assert_eq!(
            score.details.checks.get("crawl_failed").and_then(|v| v.as_bool()),
            Some(true)
        );
    }
}
