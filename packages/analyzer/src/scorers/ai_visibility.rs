//! AI-visibility scoring: does the brand surface when real customers ask
//! AI assistants category-level questions?
//!
//! Probes are generated by an LLM from a brand-free category description
//! (with template fallback), fanned out to every configured provider, and
//! the combined responses are scanned with a tiered brand matcher (exact,
//! substring, domain, fuzzy). A mention's prominence (position, sentiment,
//! context) scales 40% of the per-probe points.

use regex::Regex;
use serde_json::json;
use strsim::normalized_levenshtein;
use tracing::debug;

use crate::crawler::CrawlResult;
use crate::html;
use crate::llm::{prompts, AskOptions, Gateway};
use crate::types::{AiProbe, PillarDetails, PillarScore};

const PROBE_COUNT: usize = 5;
const MIN_USABLE_PROBES: usize = 3;
const FUZZY_THRESHOLD: f64 = 0.85;
const SENTIMENT_WINDOW: usize = 500;

const BRAND_SUFFIXES: [&str; 5] = [" inc", " llc", " ltd", " corp", " co"];

const POSITIVE_WORDS: [&str; 8] = [
    "great", "excellent", "popular", "reliable", "trusted", "leading", "innovative", "best",
];
const NEGATIVE_WORDS: [&str; 7] = [
    "poor", "bad", "expensive", "limited", "lacking", "worst", "avoid",
];

/// How the brand was found in a response.
#[derive(Debug, Clone, PartialEq)]
pub struct BrandMatch {
    pub match_type: &'static str,
    pub confidence: f64,
    /// Byte offset of the match in the scanned text
    pub position: usize,
}

/// Lowercased name variants the brand might appear as, bounded to 3-40
/// chars: raw name, legal-suffix-stripped, domain label, camel-case split,
/// space-removed.
pub fn build_aliases(brand_name: &str, url: &str) -> Vec<String> {
    let raw = brand_name.trim().to_lowercase();
    let mut candidates = vec![raw.clone()];

    for suffix in BRAND_SUFFIXES {
        if let Some(stripped) = raw.strip_suffix(suffix) {
            candidates.push(stripped.trim().to_string());
        }
    }

    let label = html::extract_domain(url)
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string();
    candidates.push(label);

    // CamelCase -> "camel case"; uppercase after an existing space must not
    // insert a second one
    let mut split = String::new();
    for c in brand_name.trim().chars() {
        if c.is_uppercase() && !split.is_empty() && !split.ends_with(' ') {
            split.push(' ');
        }
        split.extend(c.to_lowercase());
    }
    candidates.push(split);

    candidates.push(raw.replace(' ', ""));

    let mut aliases = Vec::new();
    for candidate in candidates {
        let candidate = candidate.trim().to_string();
        if (3..=40).contains(&candidate.len()) && !aliases.contains(&candidate) {
            aliases.push(candidate);
        }
    }
    aliases
}

/// Site description for probe generation, with every brand token removed so
/// generated questions cannot be steered toward the brand.
fn brand_free_context(doc: &scraper::Html, aliases: &[String]) -> String {
    let raw = html::meta_content(doc, "description")
        .or_else(|| html::meta_property(doc, "og:description"))
        .or_else(|| html::page_title(doc))
        .unwrap_or_default();
    let truncated: String = raw.chars().take(100).collect();

    truncated
        .split_whitespace()
        .filter(|word| {
            let w = word.to_lowercase();
            !aliases.iter().any(|a| a.split_whitespace().any(|t| t == w))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when a generated probe leaks the brand: any alias appears, or any
/// alias word of 4+ chars does.
fn probe_leaks_brand(probe: &str, aliases: &[String]) -> bool {
    let lower = probe.to_lowercase();
    aliases.iter().any(|alias| {
        lower.contains(alias)
            || alias
                .split_whitespace()
                .any(|frag| frag.len() >= 4 && lower.contains(frag))
    })
}

fn template_probes(category: &str) -> Vec<String> {
    prompts::PROBE_TEMPLATES
        .iter()
        .map(|t| t.replace("{category}", category))
        .collect()
}

async fn generate_probes(gateway: &Gateway, category: &str, aliases: &[String]) -> (Vec<String>, &'static str) {
    let prompt = prompts::generate_probes(category, PROBE_COUNT);
    let raw = gateway
        .ask(&prompt, AskOptions::purpose("Probe Generation"))
        .await;

    let mut probes: Vec<String> = raw
        .lines()
        .map(|l| l.trim().trim_start_matches(['-', '*', '•']).trim().to_string())
        .filter(|l| l.len() > 10 && l.contains('?'))
        .filter(|l| !probe_leaks_brand(l, aliases))
        .take(PROBE_COUNT)
        .collect();

    if probes.len() < MIN_USABLE_PROBES {
        debug!(usable = probes.len(), "too few generated probes, using templates");
        return (template_probes(category), "templates");
    }
    while probes.len() < PROBE_COUNT {
        let fallback = template_probes(category);
        match fallback.get(probes.len()) {
            Some(extra) => probes.push(extra.clone()),
            None => break,
        }
    }
    (probes, "llm")
}

/// Tiered brand detection. Rules run in priority order and the first hit
/// wins: word-boundary exact (1.0), substring for aliases of 5+ chars (0.8),
/// domain pattern like `alias.tld` (0.9), fuzzy token similarity (0.7).
pub fn match_brand(aliases: &[String], text: &str) -> Option<BrandMatch> {
    if text.is_empty() {
        return None;
    }
    let lower = text.to_lowercase();

    for alias in aliases {
        let pattern = format!(r"\b{}\b", regex::escape(alias));
        if let Ok(re) = Regex::new(&pattern) {
            if let Some(m) = re.find(&lower) {
                return Some(BrandMatch {
                    match_type: "exact",
                    confidence: 1.0,
                    position: m.start(),
                });
            }
        }
    }

    for alias in aliases {
        if alias.len() >= 5 {
            if let Some(position) = lower.find(alias.as_str()) {
                return Some(BrandMatch {
                    match_type: "substring",
                    confidence: 0.8,
                    position,
                });
            }
        }
    }

    for alias in aliases {
        let pattern = format!(r"\b{}\.\w{{2,4}}\b", regex::escape(alias));
        if let Ok(re) = Regex::new(&pattern) {
            if let Some(m) = re.find(&lower) {
                return Some(BrandMatch {
                    match_type: "domain",
                    confidence: 0.9,
                    position: m.start(),
                });
            }
        }
    }

    fuzzy_match(aliases, &lower)
}

fn fuzzy_match(aliases: &[String], lower: &str) -> Option<BrandMatch> {
    let word_re = Regex::new(r"[a-z0-9]+").unwrap_or_else(|_| unreachable!("valid static regex"));
    let words: Vec<(usize, &str)> = word_re
        .find_iter(lower)
        .map(|m| (m.start(), m.as_str()))
        .collect();

    for alias in aliases {
        let alias_words = alias.split_whitespace().count();
        if alias_words == 1 {
            for (position, word) in &words {
                if normalized_levenshtein(alias, word) >= FUZZY_THRESHOLD {
                    return Some(BrandMatch {
                        match_type: "fuzzy",
                        confidence: 0.7,
                        position: *position,
                    });
                }
            }
        } else {
            for window in words.windows(alias_words) {
                let candidate = window
                    .iter()
                    .map(|(_, w)| *w)
                    .collect::<Vec<_>>()
                    .join(" ");
                if normalized_levenshtein(alias, &candidate) >= FUZZY_THRESHOLD {
                    return Some(BrandMatch {
                        match_type: "fuzzy",
                        confidence: 0.7,
                        position: window[0].0,
                    });
                }
            }
        }
    }
    None
}

/// Mention quality in [0,1]: position (earlier is better) weighted at 0.5,
/// plus fixed bonuses for recommendation/comparison/ranking/list context and
/// the sentiment of the surrounding window.
pub fn mention_prominence(text: &str, found: &BrandMatch) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let position_factor = 1.0 - (found.position as f64 / text.len() as f64);
    let mut prominence = 0.5 * position_factor.clamp(0.0, 1.0);

    let start = found.position.saturating_sub(SENTIMENT_WINDOW);
    let end = (found.position + SENTIMENT_WINDOW).min(text.len());
    let window: String = text
        .char_indices()
        .filter(|(i, _)| (start..end).contains(i))
        .map(|(_, c)| c)
        .collect::<String>()
        .to_lowercase();

    if window.contains("recommend") {
        prominence += 0.2;
    }
    if window.contains("top ") || window.contains("best ") || window.contains("leading") {
        prominence += 0.15;
    }
    if window.contains("compared") || window.contains("versus") || window.contains(" vs ") {
        prominence += 0.1;
    }
    if window.contains("\n- ") || window.contains("\n* ") || window.contains("1.") {
        prominence += 0.05;
    }

    let positives = POSITIVE_WORDS.iter().filter(|w| window.contains(**w)).count();
    let negatives = NEGATIVE_WORDS.iter().filter(|w| window.contains(**w)).count();
    if positives > negatives {
        prominence += 0.1;
    } else if negatives > positives {
        prominence -= 0.1;
    }

    prominence.clamp(0.0, 1.0)
}

pub async fn score_ai_visibility(
    crawl: &CrawlResult,
    llm: Option<&Gateway>,
) -> (PillarScore, Vec<AiProbe>) {
    let Some(doc) = crawl.document() else {
        let errored = PillarScore::errored(
            crawl.error.clone().unwrap_or_else(|| "crawl failed".into()),
        );
        return (errored, Vec::new());
    };
    let brand_name = html::extract_brand_name(&doc, &crawl.url);
    let aliases = build_aliases(&brand_name, &crawl.url);
    let context = brand_free_context(&doc, &aliases);
    run_probes(&brand_name, aliases, &context, llm).await
}

/// Degraded path for failed crawls: brand and context come from the URL.
pub async fn score_ai_visibility_domain_only(
    url: &str,
    llm: Option<&Gateway>,
) -> (PillarScore, Vec<AiProbe>) {
    let brand_name = html::domain_label_capitalized(url);
    let aliases = build_aliases(&brand_name, url);
    run_probes(&brand_name, aliases, "", llm).await
}

async fn run_probes(
    brand_name: &str,
    aliases: Vec<String>,
    site_context: &str,
    llm: Option<&Gateway>,
) -> (PillarScore, Vec<AiProbe>) {
    let mut details = PillarDetails::new();
    details.check("brand_name", brand_name);
    details.check("aliases", json!(aliases));

    let gateway = llm.filter(|g| g.is_available());

    let category = match (gateway, site_context.is_empty()) {
        (Some(g), false) => {
            let raw = g
                .ask(
                    &prompts::identify_category(site_context),
                    AskOptions::purpose("Industry Identification"),
                )
                .await;
            let cleaned = raw.trim().trim_matches(['"', '\'']).to_string();
            if cleaned.is_empty() || cleaned.len() > 60 {
                fallback_category(site_context)
            } else {
                cleaned
            }
        }
        _ => fallback_category(site_context),
    };
    details.check("category", category.as_str());

    let (probes, probe_source) = match gateway {
        Some(g) => generate_probes(g, &category, &aliases).await,
        None => (template_probes(&category), "templates"),
    };
    details.check("probe_source", probe_source);

    let max_per_probe = 100.0 / probes.len() as f64;
    let mut score = 0.0;
    let mut probe_records = Vec::with_capacity(probes.len());
    let mut mentioned_count = 0;

    for probe in &probes {
        let responses = match gateway {
            Some(g) => g.ask_many(probe, "AI Visibility Probe").await,
            None => Vec::new(),
        };

        let combined = responses
            .iter()
            .map(|(key, response)| format!("[{}] {}", key, response))
            .collect::<Vec<_>>()
            .join("\n\n");

        let found = match_brand(&aliases, &combined);
        let (mentioned, confidence) = match &found {
            Some(m) => {
                mentioned_count += 1;
                let prominence = mention_prominence(&combined, m);
                score += max_per_probe * 0.6 + max_per_probe * 0.4 * prominence;

                // Confidence also reflects provider agreement
                let mentioning = responses
                    .iter()
                    .filter(|(_, r)| match_brand(&aliases, r).is_some())
                    .count();
                let agreement = if responses.is_empty() {
                    0.0
                } else {
                    mentioning as f64 / responses.len() as f64
                };
                (true, m.confidence * agreement)
            }
            None => (false, 0.0),
        };

        probe_records.push(AiProbe {
            prompt_used: probe.clone(),
            llm_response: combined.chars().take(2000).collect(),
            brand_mentioned: mentioned,
            confidence,
        });
    }

    details.check("probes_total", probes.len());
    details.check("probes_mentioned", mentioned_count);
    if mentioned_count == 0 {
        details.finding("brand_not_in_ai");
    }

    (PillarScore::new(score, details), probe_records)
}

fn fallback_category(site_context: &str) -> String {
    let words: Vec<&str> = site_context.split_whitespace().take(4).collect();
    if words.is_empty() {
        "technology".to_string()
    } else {
        words.join(" ").to_lowercase()
    }
}
