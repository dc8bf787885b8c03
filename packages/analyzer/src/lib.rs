//! GEO Page Analysis Library
//!
//! Scores how well a web page is positioned for generative engines: crawls
//! the page, runs six heuristic pillar scorers, blends them with
//! industry-adaptive weights and turns the findings into a ranked
//! recommendation list, with optional competitor benchmarking.
//!
//! # Design
//!
//! - Heuristics first, LLMs as judges: deterministic checks carry the
//!   score, LLM calls refine the subjective pillars and degrade to static
//!   fallbacks when no provider is configured
//! - A failed crawl produces a partial COMPLETE run, never a FAILED one
//! - Every deduction is a stable finding key that maps to a recommendation
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use analyzer::{Analyzer, AnalysisRequest, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//! let analyzer = Analyzer::new(store);
//! let run = analyzer.analyze(AnalysisRequest::new("example.com")).await?;
//! println!("composite: {:?}", run.composite_score);
//! ```
//!
//! # Modules
//!
//! - [`crawler`] - Page fetcher with retry/backoff and root-file probes
//! - [`scorers`] - The six pillar scorers and the weighted aggregator
//! - [`llm`] - Multi-provider gateway with rotation, fallback and call logs
//! - [`recommendations`] - Finding-key to recommendation mapping
//! - [`competitors`] - LLM-driven discovery and static competitor scoring
//! - [`pipeline`] - Run orchestration and lifecycle
//! - [`store`] - Run persistence behind the [`RunStore`] trait

pub mod competitors;
pub mod crawler;
pub mod error;
pub mod html;
pub mod llm;
pub mod pipeline;
pub mod recommendations;
pub mod scorers;
pub mod store;
pub mod testing;
pub mod types;

pub use crawler::{CrawlResult, Fetcher};
pub use error::{AnalyzerError, CrawlError, LlmError, Result};
pub use llm::{AskOptions, Gateway, LlmProvider, ProviderSet};
pub use pipeline::Analyzer;
pub use store::{MemoryStore, RunStore};
pub use types::{
    AiProbe, AnalysisRequest, AnalysisRun, Competitor, PageScore, PillarScore, Recommendation,
    RunStatus, RunType,
};
