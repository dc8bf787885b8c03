//! Composite scoring from the six pillar scores.
//!
//! Each detected industry selects a weight profile (six weights summing to
//! 1.0). Competitors use the static composite over the four non-LLM pillars
//! with those weights renormalized, since competitors are never probed with
//! the Entity/AI-Visibility pillars.

use crate::types::safe_score;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PillarWeights {
    pub content: f64,
    pub schema: f64,
    pub eeat: f64,
    pub technical: f64,
    pub entity: f64,
    pub ai_visibility: f64,
}

pub const DEFAULT_WEIGHTS: PillarWeights = PillarWeights {
    content: 0.20,
    schema: 0.15,
    eeat: 0.20,
    technical: 0.15,
    entity: 0.15,
    ai_visibility: 0.15,
};

/// Industry profiles. YMYL verticals weight E-E-A-T up; ecommerce and local
/// business lean on structured data; saas leans on AI visibility.
pub fn weights_for(industry: &str) -> PillarWeights {
    match industry {
        "health" => PillarWeights {
            content: 0.18,
            schema: 0.15,
            eeat: 0.30,
            technical: 0.12,
            entity: 0.13,
            ai_visibility: 0.12,
        },
        "finance" => PillarWeights {
            content: 0.18,
            schema: 0.15,
            eeat: 0.28,
            technical: 0.13,
            entity: 0.13,
            ai_visibility: 0.13,
        },
        "legal" => PillarWeights {
            content: 0.20,
            schema: 0.14,
            eeat: 0.28,
            technical: 0.12,
            entity: 0.13,
            ai_visibility: 0.13,
        },
        "ecommerce" => PillarWeights {
            content: 0.16,
            schema: 0.25,
            eeat: 0.14,
            technical: 0.15,
            entity: 0.15,
            ai_visibility: 0.15,
        },
        "saas" => PillarWeights {
            content: 0.20,
            schema: 0.15,
            eeat: 0.15,
            technical: 0.15,
            entity: 0.15,
            ai_visibility: 0.20,
        },
        "education" => PillarWeights {
            content: 0.25,
            schema: 0.14,
            eeat: 0.22,
            technical: 0.13,
            entity: 0.13,
            ai_visibility: 0.13,
        },
        "news" => PillarWeights {
            content: 0.24,
            schema: 0.16,
            eeat: 0.24,
            technical: 0.12,
            entity: 0.12,
            ai_visibility: 0.12,
        },
        "local_business" => PillarWeights {
            content: 0.15,
            schema: 0.25,
            eeat: 0.15,
            technical: 0.15,
            entity: 0.20,
            ai_visibility: 0.10,
        },
        _ => DEFAULT_WEIGHTS,
    }
}

/// Weighted composite over all six pillars, clamped to [0,100].
#[allow(clippy::too_many_arguments)]
pub fn compute_composite(
    content: f64,
    schema: f64,
    eeat: f64,
    technical: f64,
    entity: f64,
    ai_visibility: f64,
    industry: &str,
) -> f64 {
    let w = weights_for(industry);
    safe_score(
        content * w.content
            + schema * w.schema
            + eeat * w.eeat
            + technical * w.technical
            + entity * w.entity
            + ai_visibility * w.ai_visibility,
    )
}

/// Composite over the four statically-scorable pillars, with their weights
/// renormalized to sum to 1.
pub fn compute_static_composite(
    content: f64,
    schema: f64,
    eeat: f64,
    technical: f64,
    industry: &str,
) -> f64 {
    let w = weights_for(industry);
    let total = w.content + w.schema + w.eeat + w.technical;
    safe_score(
        (content * w.content + schema * w.schema + eeat * w.eeat + technical * w.technical) / total,
    )
}
