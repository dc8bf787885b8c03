//! Error types for the analyzer library.

use thiserror::Error;

/// Result type for analyzer operations.
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Top-level analyzer errors.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Crawl failed after exhausting retries
    #[error("Crawl error: {0}")]
    Crawl(#[from] CrawlError),

    /// LLM call failed across all providers
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// A pillar scorer failed internally
    #[error("Scoring error in {pillar}: {message}")]
    Scoring { pillar: String, message: String },

    /// Store operation failed
    #[error("Store error: {0}")]
    Store(String),

    /// Run not found or in an unexpected state
    #[error("Run error: {0}")]
    Run(String),

    /// Invalid input (malformed URL, bad request)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors from the page fetcher.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Request timed out
    #[error("Request timed out after {attempts} attempts: {url}")]
    Timeout { url: String, attempts: u32 },

    /// Connection failed
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Terminal HTTP status (4xx other than 429)
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// Retryable statuses exhausted all attempts
    #[error("HTTP {status} for {url} after {attempts} attempts")]
    RetriesExhausted {
        url: String,
        status: u16,
        attempts: u32,
    },

    /// URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors from the LLM gateway.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No provider has credentials configured
    #[error("No LLM provider configured")]
    Unavailable,

    /// Provider call failed
    #[error("Provider {provider} failed: {message}")]
    Provider { provider: String, message: String },

    /// All providers failed for one request
    #[error("All providers failed: {0}")]
    AllProvidersFailed(String),

    /// Response was not parseable as the expected structure
    #[error("Malformed LLM response: {0}")]
    Malformed(String),
}

impl CrawlError {
    /// Short stable label used in findings and partial-result notes.
    pub fn finding_key(&self) -> Option<&'static str> {
        match self {
            CrawlError::Timeout { .. } => Some("crawl_timeout"),
            CrawlError::HttpStatus { status: 403, .. } => Some("crawl_blocked_403"),
            _ => None,
        }
    }
}
