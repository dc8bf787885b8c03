//! The six pillar scorers plus their shared pattern and readability helpers.
//!
//! Every scorer returns a [`crate::types::PillarScore`] on a 0-100 scale
//! with a details block of named checks and machine-readable finding keys.
//! Scorers never panic on bad input; a failed crawl or malformed page yields
//! an errored or degraded score, not an error.

pub mod aggregator;
pub mod ai_visibility;
pub mod content;
pub mod eeat;
pub mod entity;
pub mod industry;
pub mod patterns;
pub mod readability;
pub mod schema;
pub mod technical;

pub use aggregator::{compute_composite, compute_static_composite, weights_for, PillarWeights};
pub use ai_visibility::{score_ai_visibility, score_ai_visibility_domain_only};
pub use content::score_content;
pub use eeat::score_eeat;
pub use entity::EntityScorer;
pub use industry::classify_industry;
pub use schema::score_schema;
pub use technical::{probe_aux_files, score_technical, score_technical_with, AuxSignals};
