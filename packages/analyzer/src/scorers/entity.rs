//! Entity-recognition scoring: how well the brand exists as a recognized
//! entity outside its own site.
//!
//! Signals: brand extraction (5), Wikipedia presence via the public search
//! API (25), and a 65-point block that is LLM-driven when the gateway is
//! available (knowledge-panel judgment, third-party mention volume, social
//! profiles, domain brevity) and rescaled static heuristics otherwise.

use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::warn;
use url::Url;

use crate::crawler::CrawlResult;
use crate::html;
use crate::llm::{self, prompts, AskOptions, Gateway};
use crate::scorers::schema::extract_jsonld;
use crate::types::{PillarDetails, PillarScore};

pub const SOCIAL_DOMAINS: [&str; 8] = [
    "linkedin.com",
    "twitter.com",
    "x.com",
    "facebook.com",
    "instagram.com",
    "youtube.com",
    "github.com",
    "tiktok.com",
];

const WIKIPEDIA_API: &str = "https://en.wikipedia.org/w/api.php";
const CONTACT_PHRASES: [&str; 5] = ["contact us", "mailto:", "tel:", "phone:", "email us"];

/// Inputs resolved before the pure scoring pass, so tests can inject the
/// Wikipedia verdict instead of hitting the live API.
#[derive(Debug, Clone)]
pub struct EntityInputs {
    pub brand_name: String,
    pub url: String,
    pub wikipedia_presence: bool,
}

pub struct EntityScorer {
    http: reqwest::Client,
}

impl Default for EntityScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityScorer {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    pub async fn score(
        &self,
        crawl: &CrawlResult,
        industry: &str,
        llm: Option<&Gateway>,
    ) -> PillarScore {
        let Some(doc) = crawl.document() else {
            return PillarScore::errored(
                crawl.error.clone().unwrap_or_else(|| "crawl failed".into()),
            );
        };
        let brand_name = html::extract_brand_name(&doc, &crawl.url);
        let inputs = EntityInputs {
            wikipedia_presence: self.check_wikipedia(&brand_name).await,
            brand_name,
            url: crawl.url.clone(),
        };
        score_entity_with(&inputs, Some(&doc), industry, llm).await
    }

    /// Degraded path for failed crawls: brand name comes from the domain
    /// label alone and no page-derived signals are available.
    pub async fn score_domain_only(
        &self,
        url: &str,
        industry: &str,
        llm: Option<&Gateway>,
    ) -> PillarScore {
        let brand_name = html::domain_label_capitalized(url);
        let inputs = EntityInputs {
            wikipedia_presence: self.check_wikipedia(&brand_name).await,
            brand_name,
            url: url.to_string(),
        };
        score_entity_with(&inputs, None, industry, llm).await
    }

    /// Search Wikipedia and look for the brand in a result title.
    async fn check_wikipedia(&self, brand_name: &str) -> bool {
        if brand_name.is_empty() {
            return false;
        }
        let request = self
            .http
            .get(WIKIPEDIA_API)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", brand_name),
                ("srlimit", "3"),
                ("format", "json"),
            ])
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        let body: Value = match request {
            Ok(resp) if resp.status().as_u16() == 200 => match resp.json().await {
                Ok(v) => v,
                Err(e) => {
                    warn!(brand = brand_name, error = %e, "wikipedia response parse failed");
                    return false;
                }
            },
            Ok(resp) => {
                warn!(brand = brand_name, status = resp.status().as_u16(), "wikipedia check failed");
                return false;
            }
            Err(e) => {
                warn!(brand = brand_name, error = %e, "wikipedia check failed");
                return false;
            }
        };

        let brand_lower = brand_name.to_lowercase();
        body.pointer("/query/search")
            .and_then(Value::as_array)
            .map(|results| {
                results.iter().any(|r| {
                    r.get("title")
                        .and_then(Value::as_str)
                        .map(|t| t.to_lowercase().contains(&brand_lower))
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false)
    }
}

fn social_profiles(doc: &scraper::Html) -> Vec<&'static str> {
    let mut found: BTreeSet<&'static str> = BTreeSet::new();
    for a in doc.select(&html::selector("a[href]")) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        let Ok(parsed) = Url::parse(href) else {
            continue;
        };
        let Some(host) = parsed.host_str() else {
            continue;
        };
        if let Some(domain) = SOCIAL_DOMAINS.iter().find(|d| host.ends_with(**d)) {
            found.insert(domain);
        }
    }
    found.into_iter().collect()
}

fn domain_is_brief(url: &str) -> bool {
    let label = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .map(|h| {
            h.trim_start_matches("www.")
                .split('.')
                .next()
                .unwrap_or_default()
                .to_string()
        })
        .unwrap_or_default();
    !label.is_empty() && label.len() <= 15
}

async fn knowledge_panel_check(
    gateway: &Gateway,
    brand_name: &str,
    industry: &str,
) -> (bool, f64) {
    let prompt = prompts::knowledge_panel(brand_name, industry);
    let raw = gateway
        .ask(&prompt, AskOptions::purpose("Knowledge Panel Check"))
        .await;
    let Some(data) = llm::json::extract_object(&raw) else {
        return (false, 0.0);
    };
    let well_known = data
        .get("well_known")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let confidence = data
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);
    (well_known, confidence)
}

async fn mention_volume_check(gateway: &Gateway, brand_name: &str) -> (f64, f64) {
    let prompt = prompts::mention_volume(brand_name);
    let raw = gateway
        .ask(&prompt, AskOptions::purpose("Third-Party Mentions"))
        .await;
    let Some(data) = llm::json::extract_object(&raw) else {
        return (0.0, 0.0);
    };
    let mention_score = data
        .get("mention_score")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
        .clamp(0.0, 10.0);
    let confidence = data
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);
    (mention_score, confidence)
}

pub async fn score_entity_with(
    inputs: &EntityInputs,
    doc: Option<&scraper::Html>,
    industry: &str,
    llm: Option<&Gateway>,
) -> PillarScore {
    let mut details = PillarDetails::new();
    let mut score = 0.0;

    // Brand extraction (5)
    let brand_extracted = !inputs.brand_name.is_empty();
    details.check("brand_name", inputs.brand_name.as_str());
    details.check("brand_extracted", brand_extracted);
    if brand_extracted {
        score += 5.0;
    }

    // Wikipedia presence (25)
    details.check("wikipedia_presence", inputs.wikipedia_presence);
    if inputs.wikipedia_presence {
        score += 25.0;
    } else {
        details.finding("no_wikipedia_presence");
    }

    let socials: Vec<&str> = doc.map(social_profiles).unwrap_or_default();
    details.check("social_profiles", json!(socials));
    details.check("social_count", socials.len());
    let brief_domain = domain_is_brief(&inputs.url);
    details.check("domain_brief", brief_domain);

    match llm.filter(|g| g.is_available()) {
        Some(gateway) => {
            details.check("scoring_mode", "llm");

            // Knowledge panel (25)
            let (well_known, kp_confidence) =
                knowledge_panel_check(gateway, &inputs.brand_name, industry).await;
            details.check("knowledge_panel", well_known);
            details.check("kp_confidence", kp_confidence);
            if well_known {
                score += 25.0;
            } else {
                details.finding("brand_not_in_ai");
            }

            // Third-party mention volume (25)
            let (mention_score, mention_confidence) =
                mention_volume_check(gateway, &inputs.brand_name).await;
            details.check("third_party_score", mention_score);
            details.check("mention_confidence", mention_confidence);
            score += (mention_score * 2.5).min(25.0);

            // Social profiles (10)
            match socials.len() {
                n if n >= 2 => score += 10.0,
                1 => score += 5.0,
                _ => details.finding("no_social_profiles"),
            }

            // Domain brevity (10)
            if brief_domain {
                score += 10.0;
            }
        }
        None => {
            details.check("scoring_mode", "static_fallback");

            // Static signals cover at most 50 pts, rescaled below onto the
            // 65-pt block the LLM path would have filled.
            let mut static_score = 0.0;

            match socials.len() {
                n if n >= 3 => static_score += 15.0,
                2 => static_score += 10.0,
                1 => static_score += 5.0,
                _ => details.finding("no_social_profiles"),
            }

            let (has_org_schema, has_same_as) = doc
                .map(|d| {
                    let schemas = extract_jsonld(d);
                    let org = schemas.iter().any(|s| {
                        matches!(s.get("@type").and_then(Value::as_str), Some("Organization"))
                    });
                    let same_as = schemas.iter().any(|s| s.get("sameAs").is_some());
                    (org, same_as)
                })
                .unwrap_or((false, false));
            details.check("has_org_schema", has_org_schema);
            if has_org_schema {
                static_score += 10.0;
                if has_same_as {
                    static_score += 5.0;
                }
            }

            let contact_signals = doc
                .map(|d| {
                    let lower = d.html().to_lowercase();
                    CONTACT_PHRASES.iter().filter(|p| lower.contains(**p)).count()
                })
                .unwrap_or(0);
            details.check("contact_signals", contact_signals);
            if contact_signals >= 2 {
                static_score += 10.0;
            } else if contact_signals >= 1 {
                static_score += 5.0;
            }

            if brief_domain {
                static_score += 10.0;
            }

            score += static_score * (65.0 / 50.0);
        }
    }

    PillarScore::new(score, details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ProviderSet;
    use crate::testing::MockLlm;
    use std::sync::Arc;

    const SOCIAL_PAGE: &str = r#"<html><head>
        <meta property="og:site_name" content="Acme">
        </head><body>
        <a href="https://www.linkedin.com/company/acme">LinkedIn</a>
        <a href="https://twitter.com/acme">Twitter</a>
        <a href="https://github.com/acme">GitHub</a>
        <p>Contact us at tel:555-0100</p>
        </body></html>"#;

    fn inputs(wikipedia: bool) -> EntityInputs {
        EntityInputs {
            brand_name: "Acme".to_string(),
            url: "https://acme.com".to_string(),
            wikipedia_presence: wikipedia,
        }
    }

    #[tokio::test]
    async fn test_llm_path_full_scoring() {
        let kp = MockLlm::new("gemini")
            .respond_with(r#"{"well_known": true, "confidence": 0.9, "description": "known"}"#);
        let set = ProviderSet::from_providers(vec![Arc::new(kp)]);
        let gateway = set.gateway();

        let doc = html::parse_document(SOCIAL_PAGE);
        let result = score_entity_with(&inputs(true), Some(&doc), "saas", Some(&gateway)).await;

        // Single mock answers both prompts with the kp payload; the mention
        // reply parses but has no mention_score, so that block adds 0.
        // 5 brand + 25 wiki + 25 kp + 10 social + 10 brevity
        assert_eq!(result.score, 75.0);
        assert_eq!(result.details.checks["scoring_mode"], json!("llm"));
        assert!(result.details.findings.is_empty());
    }

    #[tokio::test]
    async fn test_mention_volume_scales() {
        let llm_reply = r#"{"well_known": false, "mention_score": 8, "confidence": 0.7}"#;
        let set = ProviderSet::from_providers(vec![Arc::new(
            MockLlm::new("gemini").respond_with(llm_reply),
        )]);
        let gateway = set.gateway();

        let doc = html::parse_document(SOCIAL_PAGE);
        let result = score_entity_with(&inputs(false), Some(&doc), "", Some(&gateway)).await;

        // 5 brand + 0 wiki + 0 kp + 20 mentions + 10 social + 10 brevity
        assert_eq!(result.score, 45.0);
        assert!(result.details.findings.iter().any(|f| f == "no_wikipedia_presence"));
        assert!(result.details.findings.iter().any(|f| f == "brand_not_in_ai"));
    }

    #[tokio::test]
    async fn test_static_fallback_rescales() {
        let doc = html::parse_document(SOCIAL_PAGE);
        let result = score_entity_with(&inputs(true), Some(&doc), "", None).await;

        assert_eq!(result.details.checks["scoring_mode"], json!("static_fallback"));
        // static: 15 social + 10 contact (tel: + contact us) + 10 brevity
        // = 35 -> 35 * 65/50 = 45.5; total 5 + 25 + 45.5
        assert!((result.score - 75.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_static_single_profile_middle_tier() {
        let doc = html::parse_document(
            r#"<html><body>
            <a href="https://twitter.com/acme">Twitter</a>
            <p>Acme builds widgets.</p>
            </body></html>"#,
        );
        let result = score_entity_with(&inputs(false), Some(&doc), "", None).await;

        assert_eq!(result.details.checks["social_count"], json!(1));
        assert!(!result.details.findings.iter().any(|f| f == "no_social_profiles"));
        // static: 5 single social + 10 brevity = 15 -> 19.5; total 5 + 19.5
        assert!((result.score - 24.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_domain_only_has_no_social_signal() {
        let result = score_entity_with(&inputs(false), None, "", None).await;
        assert_eq!(result.details.checks["social_count"], json!(0));
        assert!(result.details.findings.iter().any(|f| f == "no_social_profiles"));
        // 5 brand + brevity 10 * 1.3 = 18
        assert!((result.score - 18.0).abs() < 1e-9);
    }
}
