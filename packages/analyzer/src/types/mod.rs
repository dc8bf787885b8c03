//! Core data types for analysis runs and scores.

pub mod run;
pub mod score;

pub use run::{
    AiProbe, AnalysisRequest, AnalysisRun, Competitor, LlmCallLog, Recommendation, RunStatus,
    RunType,
};
pub use score::{safe_score, PageScore, Pillar, PillarDetails, PillarScore};
