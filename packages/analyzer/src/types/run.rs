//! Analysis run records and lifecycle types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::score::PageScore;
use crate::error::{AnalyzerError, Result};

/// Run lifecycle states. A run only moves forward through this sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Crawling,
    Analyzing,
    Scoring,
    Complete,
    Failed,
}

impl RunStatus {
    /// Ordinal used to enforce forward-only transitions.
    pub fn rank(&self) -> u8 {
        match self {
            RunStatus::Pending => 0,
            RunStatus::Crawling => 1,
            RunStatus::Analyzing => 2,
            RunStatus::Scoring => 3,
            RunStatus::Complete => 4,
            RunStatus::Failed => 4,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Complete | RunStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunType {
    SinglePage,
    FullSite,
}

/// Incoming analysis request, before normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    pub url: String,
    #[serde(default = "default_run_type")]
    pub run_type: RunType,
    #[serde(default)]
    pub email: Option<String>,
}

fn default_run_type() -> RunType {
    RunType::SinglePage
}

impl AnalysisRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            run_type: RunType::SinglePage,
            email: None,
        }
    }

    /// Normalize the request: ensure the URL carries a scheme (default
    /// https) and lowercase-trim the email.
    pub fn normalized(mut self) -> Result<Self> {
        let trimmed = self.url.trim();
        if trimmed.is_empty() {
            return Err(AnalyzerError::InvalidInput("empty URL".into()));
        }
        self.url = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };
        self.email = self
            .email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());
        Ok(self)
    }
}

/// One LLM call record collected during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmCallLog {
    /// Human-readable provider label ("gpt", "claude", "gemini")
    pub model: String,
    /// Full routed model id
    pub model_id: String,
    /// What the call was for ("probe_generation", "eeat_analysis", ...)
    pub purpose: String,
    /// Prompt, truncated to 500 chars
    pub prompt: String,
    /// Response, truncated to 2000 chars
    pub response: String,
    /// "success" or "error: ..."
    pub status: String,
    pub duration_ms: u64,
}

/// A discovered competitor and its static scoring outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub url: String,
    pub industry: String,
    pub composite_score: f64,
    /// False when the competitor's page could not be crawled
    pub scored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_score: Option<PageScore>,
}

/// A ranked recommendation derived from a finding key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub pillar: String,
    pub priority: String,
    pub title: String,
    pub description: String,
    pub action: String,
    pub impact_estimate: String,
    pub category: String,
}

/// Transcript of one AI-visibility probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiProbe {
    pub prompt_used: String,
    pub llm_response: String,
    pub brand_mentioned: bool,
    pub confidence: f64,
}

/// A persisted analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub id: Uuid,
    pub url: String,
    pub run_type: RunType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub status: RunStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub page_scores: Vec<PageScore>,
    pub competitors: Vec<Competitor>,
    pub recommendations: Vec<Recommendation>,
    pub ai_probes: Vec<AiProbe>,
    pub llm_call_logs: Vec<LlmCallLog>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnalysisRun {
    pub fn new(request: &AnalysisRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            url: request.url.clone(),
            run_type: request.run_type,
            email: request.email.clone(),
            status: RunStatus::Pending,
            progress: 0,
            composite_score: None,
            error_message: None,
            page_scores: Vec::new(),
            competitors: Vec::new(),
            recommendations: Vec::new(),
            ai_probes: Vec::new(),
            llm_call_logs: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_normalization_adds_scheme() {
        let request = AnalysisRequest::new("example.com").normalized().unwrap();
        assert_eq!(request.url, "https://example.com");

        let request = AnalysisRequest::new("http://example.com")
            .normalized()
            .unwrap();
        assert_eq!(request.url, "http://example.com");
    }

    #[test]
    fn test_request_normalization_email() {
        let mut request = AnalysisRequest::new("example.com");
        request.email = Some("  User@Example.COM ".to_string());
        let request = request.normalized().unwrap();
        assert_eq!(request.email.as_deref(), Some("user@example.com"));
    }

    #[test]
    fn test_empty_url_rejected() {
        assert!(AnalysisRequest::new("   ").normalized().is_err());
    }

    #[test]
    fn test_status_forward_only_ranks() {
        assert!(RunStatus::Pending.rank() < RunStatus::Crawling.rank());
        assert!(RunStatus::Crawling.rank() < RunStatus::Analyzing.rank());
        assert!(RunStatus::Analyzing.rank() < RunStatus::Scoring.rank());
        assert!(RunStatus::Scoring.rank() < RunStatus::Complete.rank());
        assert!(RunStatus::Complete.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
    }
}
