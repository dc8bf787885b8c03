//! Prompt templates for every LLM-backed signal.
//!
//! Kept in one place so the wording that downstream JSON parsing depends on
//! is easy to audit. All prompts that expect structured replies say so
//! explicitly and the callers extract the first JSON value from the text.

/// Fallback probe questions when LLM probe generation yields too few usable
/// questions. `{category}` is substituted with the detected industry.
pub const PROBE_TEMPLATES: [&str; 5] = [
    "What are the best {category} companies?",
    "Can you recommend a {category} provider?",
    "Who are the top {category} services in the market?",
    "What {category} tools or platforms would you suggest?",
    "Compare the leading {category} solutions available today.",
];

const EEAT_TEXT_LIMIT: usize = 3000;

pub fn eeat_analysis(url: &str, text: &str) -> String {
    let excerpt: String = text.chars().take(EEAT_TEXT_LIMIT).collect();
    format!(
        r#"Analyze this webpage content for Google's E-E-A-T (Experience, Expertise, Authoritativeness, Trustworthiness) signals.

URL: {url}
Content (first 3000 chars):
{excerpt}

Score each dimension 0-10 and explain why. Be strict, most pages score 3-6.

Reply ONLY with this JSON format:
{{
  "experience": {{
    "score": 0-10,
    "signals": ["list of specific experience signals found"],
    "missing": ["what's missing"]
  }},
  "expertise": {{
    "score": 0-10,
    "signals": ["list of expertise signals found"],
    "missing": ["what's missing"]
  }},
  "authoritativeness": {{
    "score": 0-10,
    "signals": ["list of authority signals found"],
    "missing": ["what's missing"]
  }},
  "trustworthiness": {{
    "score": 0-10,
    "signals": ["list of trust signals found"],
    "missing": ["what's missing"]
  }},
  "overall_assessment": "one sentence summary"
}}"#
    )
}

pub fn knowledge_panel(brand_name: &str, industry: &str) -> String {
    let industry = if industry.is_empty() {
        "technology"
    } else {
        industry
    };
    format!(
        "Is '{brand_name}' a well-known brand/company in the {industry} industry? \
         Does it have a Google Knowledge Panel? \
         Reply with JSON: {{\"well_known\": true/false, \"confidence\": 0.0-1.0, \"description\": \"brief\"}}"
    )
}

pub fn mention_volume(brand_name: &str) -> String {
    format!(
        "How often is '{brand_name}' mentioned in third-party publications, review sites, \
         and industry directories? Rate from 0-10. \
         Reply with JSON: {{\"mention_score\": 0-10, \"confidence\": 0.0-1.0}}"
    )
}

pub fn identify_category(site_context: &str) -> String {
    format!(
        "Based on this site description, identify the industry/category in 2-4 words. \
         Reply with ONLY the category, no explanation.\n\nSite context: {site_context}"
    )
}

/// Asks for category-level customer questions. The brand must never appear
/// in the prompt; generated probes are still post-filtered for brand leaks.
pub fn generate_probes(category: &str, count: usize) -> String {
    format!(
        "You are simulating real customers researching {category} options. \
         Write {count} distinct questions such a customer would ask an AI assistant \
         when looking for {category} providers, tools, or services. \
         Ask about the category only. Never name any specific company or brand. \
         Reply with ONLY the questions, one per line, no numbering."
    )
}

pub fn competitor_discovery(brand_name: &str, site_context: &str) -> String {
    format!(
        "Identify 5-8 competitors for '{brand_name}'. \
         Site context: {site_context}\n\n\
         Reply ONLY with a JSON array of objects with 'name', 'url', and 'industry' fields. \
         The URL should be the homepage. Example:\n\
         [{{\"name\": \"Competitor\", \"url\": \"https://competitor.com\", \"industry\": \"SaaS\"}}]"
    )
}
