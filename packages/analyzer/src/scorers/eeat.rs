//! E-E-A-T (Experience, Expertise, Authoritativeness, Trustworthiness)
//! scoring.
//!
//! Hybrid approach: structural signals (40 pts) are always computed from the
//! HTML since they are cheap and reliable; content-depth signals (60 pts) go
//! through the LLM gateway when one is available and fall back to static
//! heuristics otherwise. `checks.scoring_mode` records which path ran.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use url::Url;

use crate::crawler::CrawlResult;
use crate::html;
use crate::llm::{self, prompts, AskOptions, Gateway};
use crate::scorers::patterns::{
    count_matching_patterns, DEPTH_PATTERNS, EXPERIENCE_PATTERNS, SOURCE_MENTION_PATTERNS,
};
use crate::scorers::schema::extract_jsonld;
use crate::types::{PillarDetails, PillarScore};

pub const TRUST_TLDS: [&str; 7] = [
    ".gov", ".edu", ".ac.uk", ".gov.uk", ".gov.au", ".edu.au", ".ac.jp",
];

pub const TRUST_DOMAINS: [&str; 30] = [
    "wikipedia.org",
    "bbc.com",
    "nytimes.com",
    "reuters.com",
    "nature.com",
    "pubmed.ncbi.nlm.nih.gov",
    "scholar.google.com",
    "forbes.com",
    "hbr.org",
    "techcrunch.com",
    "wsj.com",
    "theguardian.com",
    "washingtonpost.com",
    "bloomberg.com",
    "sciencedirect.com",
    "springer.com",
    "wiley.com",
    "arxiv.org",
    "ieee.org",
    "acm.org",
    "who.int",
    "cdc.gov",
    "nih.gov",
    "fda.gov",
    "harvard.edu",
    "mit.edu",
    "stanford.edu",
    "oxford.ac.uk",
    "cambridge.org",
    "un.org",
];

lazy_static! {
    static ref AUTHOR_CLASS: Regex =
        Regex::new(r"(?i)(author|byline|writer|post-author|entry-author)").expect("valid regex");
    static ref BIO_CLASS: Regex = Regex::new(
        r"(?i)(author-bio|author-description|bio|about-author|author-info|post-author-bio)"
    )
    .expect("valid regex");
}

const DISCLOSURE_PHRASES: [&str; 9] = [
    "disclosure",
    "editorial policy",
    "editorial standards",
    "fact-check",
    "reviewed by",
    "medically reviewed",
    "affiliate",
    "sponsored",
    "advertising policy",
];

const ORG_INFO_PHRASES: [&str; 6] = [
    "about us",
    "our team",
    "our mission",
    "founded in",
    "headquarters",
    "our story",
];

fn is_trust_host(host: &str) -> bool {
    TRUST_DOMAINS.iter().any(|d| host.ends_with(d))
        || TRUST_TLDS.iter().any(|t| host.ends_with(t))
}

fn external_links(doc: &scraper::Html, base_url: &str) -> Vec<Url> {
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };
    let base_host = base.host_str().unwrap_or_default().to_string();
    let mut links = Vec::new();
    for a in doc.select(&html::selector("a[href]")) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        if let Some(host) = resolved.host_str() {
            if host != base_host {
                links.push(resolved);
            }
        }
    }
    links
}

fn score_structural(doc: &scraper::Html, url: &str) -> (f64, Map<String, Value>, Vec<&'static str>) {
    let mut checks = Map::new();
    let mut findings = Vec::new();
    let mut score = 0.0;

    // External citations (10)
    let links = external_links(doc, url);
    let ext_count = links.len();
    checks.insert("external_citation_count".into(), json!(ext_count));
    score += match ext_count {
        n if n >= 5 => 10.0,
        n if n >= 3 => 7.0,
        n if n >= 1 => 3.0,
        _ => 0.0,
    };

    // Links to authoritative sources (10)
    let trust_count = links
        .iter()
        .filter(|l| l.host_str().map(is_trust_host).unwrap_or(false))
        .count();
    checks.insert("trust_link_count".into(), json!(trust_count));
    match trust_count {
        n if n >= 3 => score += 10.0,
        n if n >= 1 => score += 6.0,
        _ => {}
    }

    // Source diversity (5)
    let domains: HashSet<&str> = links.iter().filter_map(|l| l.host_str()).collect();
    checks.insert("source_diversity".into(), json!(domains.len()));
    if domains.len() >= 5 {
        score += 5.0;
    } else if domains.len() >= 3 {
        score += 3.0;
    }

    // Date signals (5)
    let has_date = doc.select(&html::selector("time[datetime]")).next().is_some()
        || html::meta_property(doc, "article:published_time").is_some();
    checks.insert("publish_date".into(), json!(has_date));
    if has_date {
        score += 3.0;
    }
    let has_modified = html::meta_property(doc, "article:modified_time").is_some();
    checks.insert("updated_date".into(), json!(has_modified));
    if has_modified {
        score += 2.0;
    }

    // Trust pages linked from the page (3 each, cap 10)
    let mut nav_links: HashSet<String> = HashSet::new();
    for a in doc.select(&html::selector("a[href]")) {
        if let Some(href) = a.value().attr("href") {
            nav_links.insert(href.to_lowercase());
        }
        let text: String = a.text().collect::<String>().trim().to_lowercase();
        nav_links.insert(text);
    }
    let has_any = |candidates: &[&str]| candidates.iter().any(|c| nav_links.contains(*c));
    let has_about = has_any(&["about", "/about", "/about-us", "about us"]);
    let has_contact = has_any(&["contact", "/contact", "/contact-us", "contact us"]);
    let has_privacy = has_any(&["privacy", "/privacy", "/privacy-policy", "privacy policy"]);
    let has_terms = has_any(&["terms", "/terms", "/terms-of-service", "terms of service"]);
    checks.insert("has_about_page".into(), json!(has_about));
    checks.insert("has_contact_page".into(), json!(has_contact));
    checks.insert("has_privacy_policy".into(), json!(has_privacy));
    checks.insert("has_terms".into(), json!(has_terms));
    let trust_pages = [has_about, has_contact, has_privacy, has_terms]
        .iter()
        .filter(|b| **b)
        .count();
    score += (trust_pages as f64 * 3.0).min(10.0);

    // Structural findings
    if !has_date {
        findings.push("no_publish_date");
    }
    if !has_modified {
        findings.push("no_updated_date");
    }
    if ext_count < 3 {
        findings.push("few_external_citations");
    }
    if trust_count == 0 {
        findings.push("no_trust_links");
    }
    if domains.len() < 3 {
        findings.push("low_source_diversity");
    }
    if !has_about {
        findings.push("no_about_page");
    }

    (score, checks, findings)
}

fn clamped_dim(analysis: &Value, dimension: &str) -> f64 {
    analysis
        .get(dimension)
        .and_then(|d| d.get("score"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
        .clamp(0.0, 10.0)
}

async fn llm_content_analysis(gateway: &Gateway, text: &str, url: &str) -> Option<Value> {
    let prompt = prompts::eeat_analysis(url, text);
    let options = AskOptions::purpose("E-E-A-T Analysis").with_provider("gemini");
    let raw = gateway.ask(&prompt, options).await;
    if raw.is_empty() {
        return None;
    }
    llm::json::extract_object(&raw)
}

fn author_from_jsonld(doc: &scraper::Html) -> Option<String> {
    fn author_name(value: &Value) -> Option<String> {
        match value {
            Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(str::to_string),
            Value::Array(items) => items.first().and_then(author_name),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    for schema in extract_jsonld(doc) {
        if let Some(author) = schema.get("author") {
            if let Some(name) = author_name(author) {
                return Some(name);
            }
        }
        if let Some(Value::Array(graph)) = schema.get("@graph") {
            for item in graph {
                if let Some(name) = item.get("author").and_then(author_name) {
                    return Some(name);
                }
            }
        }
    }
    None
}

fn find_author(doc: &scraper::Html) -> Option<String> {
    if let Some(name) = html::meta_content(doc, "author").filter(|c| !c.is_empty()) {
        return Some(name);
    }
    for el in doc.select(&html::selector("[class]")) {
        let class = el.value().attr("class").unwrap_or_default();
        if AUTHOR_CLASS.is_match(class) {
            let text: String = el.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    if let Some(el) = doc.select(&html::selector(r#"[rel~="author"]"#)).next() {
        let text: String = el.text().collect::<String>().trim().to_string();
        return Some(if text.is_empty() { "linked".into() } else { text });
    }
    author_from_jsonld(doc)
}

fn static_content_analysis(
    doc: &scraper::Html,
    html_lower: &str,
) -> (f64, Map<String, Value>, Vec<&'static str>) {
    let mut checks = Map::new();
    let mut findings = Vec::new();
    let mut score = 0.0;

    // Author attribution (15)
    let author = find_author(doc);
    checks.insert("author_found".into(), json!(author.is_some()));
    checks.insert(
        "author_name".into(),
        json!(author.clone().unwrap_or_default()),
    );
    if author.is_some() {
        score += 15.0;
    } else {
        findings.push("no_author");
    }

    // Author bio block (10)
    let bio_found = doc.select(&html::selector("[class]")).any(|el| {
        let class = el.value().attr("class").unwrap_or_default();
        BIO_CLASS.is_match(class) && el.text().collect::<String>().trim().len() > 30
    });
    checks.insert("author_bio".into(), json!(bio_found));
    if bio_found {
        score += 10.0;
    } else {
        findings.push("no_author_bio");
    }

    // First-person experience language (10)
    let exp_count = count_matching_patterns(html_lower, &EXPERIENCE_PATTERNS);
    checks.insert("experience_signals".into(), json!(exp_count));
    match exp_count {
        n if n >= 3 => score += 10.0,
        n if n >= 1 => score += 5.0,
        _ => findings.push("no_first_hand_experience"),
    }

    // Expertise depth signals (10)
    let depth_count = count_matching_patterns(html_lower, &DEPTH_PATTERNS);
    checks.insert("expertise_depth_signals".into(), json!(depth_count));
    match depth_count {
        n if n >= 4 => score += 10.0,
        n if n >= 2 => score += 6.0,
        n if n >= 1 => score += 3.0,
        _ => findings.push("no_expertise_indicators"),
    }

    // Transparency signals (15)
    let has_disclosure = DISCLOSURE_PHRASES.iter().any(|p| html_lower.contains(p));
    checks.insert("has_disclosure".into(), json!(has_disclosure));
    if has_disclosure {
        score += 5.0;
    }
    let has_org_info = ORG_INFO_PHRASES.iter().any(|p| html_lower.contains(p));
    checks.insert("has_org_info".into(), json!(has_org_info));
    if has_org_info {
        score += 5.0;
    }
    let source_count = count_matching_patterns(html_lower, &SOURCE_MENTION_PATTERNS);
    checks.insert("source_mentions".into(), json!(source_count));
    if source_count >= 2 {
        score += 5.0;
    } else if source_count >= 1 {
        score += 3.0;
    }

    (score, checks, findings)
}

/// Score E-E-A-T. `llm` is `None` for competitor scoring, which always takes
/// the static path.
pub async fn score_eeat(crawl: &CrawlResult, llm: Option<&Gateway>) -> PillarScore {
    let Some(doc) = crawl.document() else {
        return PillarScore::errored(crawl.error.clone().unwrap_or_else(|| "crawl failed".into()));
    };

    let mut details = PillarDetails::new();

    let (structural_score, structural_checks, structural_findings) =
        score_structural(&doc, &crawl.url);
    details
        .checks
        .insert("structural".into(), Value::Object(structural_checks));
    for finding in structural_findings {
        details.finding(finding);
    }

    let analysis = match llm.filter(|g| g.is_available()) {
        Some(gateway) => llm_content_analysis(gateway, &crawl.text, &crawl.url).await,
        None => None,
    };

    let content_score = if let Some(analysis) = analysis {
        details.check("scoring_mode", "gemini");

        let experience = clamped_dim(&analysis, "experience");
        let expertise = clamped_dim(&analysis, "expertise");
        let authority = clamped_dim(&analysis, "authoritativeness");
        let trust = clamped_dim(&analysis, "trustworthiness");

        details.check("experience_score", experience);
        details.check("expertise_score", expertise);
        details.check("authoritativeness_score", authority);
        details.check("trustworthiness_score", trust);

        if experience < 4.0 {
            details.finding("no_first_hand_experience");
        }
        if expertise < 4.0 {
            details.finding("no_expertise_indicators");
        }
        if authority < 4.0 {
            details.finding("low_authority");
        }
        if trust < 4.0 {
            details.finding("low_trust_signals");
        }
        if let Some(assessment) = analysis.get("overall_assessment").and_then(Value::as_str) {
            details.check("assessment", assessment);
        }

        (experience + expertise + authority + trust) / 10.0 * 15.0
    } else {
        details.check("scoring_mode", "static_fallback");
        let html_lower = crawl.html.to_lowercase();
        let (score, static_checks, static_findings) = static_content_analysis(&doc, &html_lower);
        details
            .checks
            .insert("static_analysis".into(), Value::Object(static_checks));
        for finding in static_findings {
            details.finding(finding);
        }
        score
    };

    details.check("structural_score", (structural_score * 10.0).round() / 10.0);
    details.check("content_eeat_score", (content_score * 10.0).round() / 10.0);

    PillarScore::new(structural_score + content_score, details)
}
