//! Competitor discovery and static scoring.
//!
//! The LLM proposes 5-8 competitors from a short site-context summary; each
//! URL is validated with a cheap reachability probe and the survivors are
//! crawled and scored through the four static pillars only (Content, Schema,
//! E-E-A-T in static mode, Technical). Entity and AI-Visibility are never
//! run for competitors. Fan-out is bounded to 4 concurrent fetches.

use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{info, warn};

use crate::crawler::{CrawlResult, Fetcher};
use crate::html;
use crate::llm::{self, prompts, AskOptions, Gateway};
use crate::scorers::technical::{probe_aux_files, score_technical_with, AuxSignals};
use crate::scorers::{aggregator, content, eeat, schema};
use crate::types::{Competitor, PageScore};

const MAX_COMPETITORS: usize = 8;
const SCORING_CONCURRENCY: usize = 4;

/// An unvalidated competitor proposed by the LLM.
#[derive(Debug, Clone, PartialEq)]
pub struct CompetitorLead {
    pub name: String,
    pub url: String,
    pub industry: String,
}

/// Short summary of the analyzed page used to steer discovery: title, meta
/// description, first H1 and the opening text.
pub fn site_context(crawl: &CrawlResult) -> String {
    let mut parts = Vec::new();
    if let Some(doc) = crawl.document() {
        if let Some(title) = html::page_title(&doc) {
            parts.push(title);
        }
        if let Some(desc) = html::meta_content(&doc, "description") {
            parts.push(desc);
        }
        if let Some(h1) = html::first_h1(&doc) {
            parts.push(h1);
        }
    }
    let opening: String = crawl.text.chars().take(300).collect();
    if !opening.is_empty() {
        parts.push(opening);
    }
    parts.join(" | ")
}

/// Parse the discovery reply into leads, dropping entries without a name or
/// URL and capping the list.
pub fn parse_competitor_leads(raw: &str) -> Vec<CompetitorLead> {
    let Some(Value::Array(items)) = llm::json::extract_array(raw) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let name = item.get("name").and_then(Value::as_str).unwrap_or_default();
            let url = item.get("url").and_then(Value::as_str).unwrap_or_default();
            if name.is_empty() || url.is_empty() {
                return None;
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return None;
            }
            Some(CompetitorLead {
                name: name.to_string(),
                url: url.to_string(),
                industry: item
                    .get("industry")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
        })
        .take(MAX_COMPETITORS)
        .collect()
}

/// Ask the LLM for competitors of the analyzed brand.
pub async fn discover_competitors(gateway: &Gateway, crawl: &CrawlResult) -> Vec<CompetitorLead> {
    let Some(doc) = crawl.document() else {
        return Vec::new();
    };
    let brand_name = html::extract_brand_name(&doc, &crawl.url);
    let context = site_context(crawl);

    let prompt = prompts::competitor_discovery(&brand_name, &context);
    let raw = gateway
        .ask(
            &prompt,
            AskOptions::purpose("Competitor Discovery").with_provider("gemini"),
        )
        .await;
    let leads = parse_competitor_leads(&raw);
    info!(count = leads.len(), brand = %brand_name, "competitors discovered");
    leads
}

/// Static pillar stack for one fetched competitor page.
pub async fn score_static_page(
    crawl: &CrawlResult,
    aux: &AuxSignals,
    industry: &str,
) -> PageScore {
    let content = content::score_content(crawl);
    let schema = schema::score_schema(crawl);
    let eeat = eeat::score_eeat(crawl, None).await;
    let technical = score_technical_with(crawl, aux);

    let composite = aggregator::compute_static_composite(
        content.score,
        schema.score,
        eeat.score,
        technical.score,
        industry,
    );

    PageScore {
        url: crawl.url.clone(),
        content,
        schema,
        eeat,
        technical,
        entity: None,
        ai_visibility: None,
        composite,
    }
}

async fn score_one(fetcher: &Fetcher, lead: CompetitorLead, industry: &str) -> Competitor {
    if !fetcher.is_reachable(&lead.url).await {
        warn!(url = %lead.url, "competitor url unreachable");
        return Competitor {
            name: lead.name,
            url: lead.url,
            industry: lead.industry,
            composite_score: 0.0,
            scored: false,
            page_score: None,
        };
    }

    let crawl = fetcher.crawl_page(&lead.url).await;
    if !crawl.ok() {
        warn!(url = %lead.url, error = ?crawl.error, "competitor crawl failed");
        return Competitor {
            name: lead.name,
            url: lead.url,
            industry: lead.industry,
            composite_score: 0.0,
            scored: false,
            page_score: None,
        };
    }

    let aux = probe_aux_files(fetcher, &crawl.url).await;
    let page_score = score_static_page(&crawl, &aux, industry).await;
    Competitor {
        name: lead.name,
        url: lead.url,
        industry: lead.industry,
        composite_score: page_score.composite,
        scored: true,
        page_score: Some(page_score),
    }
}

/// Fetch and score every lead with bounded concurrency. The main page's
/// industry profile is used for all competitors so composites compare.
pub async fn score_competitors(
    fetcher: &Fetcher,
    leads: Vec<CompetitorLead>,
    industry: &str,
) -> Vec<Competitor> {
    let mut competitors: Vec<Competitor> = stream::iter(leads)
        .map(|lead| score_one(fetcher, lead, industry))
        .buffer_unordered(SCORING_CONCURRENCY)
        .collect()
        .await;
    competitors.sort_by(|a, b| {
        b.composite_score
            .partial_cmp(&a.composite_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    competitors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leads_filters_and_caps() {
        let raw = r#"Here you go:
        [
            {"name": "Alpha", "url": "https://alpha.com", "industry": "SaaS"},
            {"name": "", "url": "https://nameless.com", "industry": "SaaS"},
            {"name": "NoUrl", "industry": "SaaS"},
            {"name": "BadScheme", "url": "ftp://bad.com", "industry": "SaaS"},
            {"name": "B1", "url": "https://b1.com"}, {"name": "B2", "url": "https://b2.com"},
            {"name": "B3", "url": "https://b3.com"}, {"name": "B4", "url": "https://b4.com"},
            {"name": "B5", "url": "https://b5.com"}, {"name": "B6", "url": "https://b6.com"},
            {"name": "B7", "url": "https://b7.com"}, {"name": "B8", "url": "https://b8.com"}
        ]"#;
        let leads = parse_competitor_leads(raw);
        assert_eq!(leads.len(), 8);
        assert_eq!(leads[0].name, "Alpha");
        assert!(leads.iter().all(|l| l.url.starts_with("https://")));
    }

    #[test]
    fn test_parse_leads_garbage_is_empty() {
        assert!(parse_competitor_leads("no json at all").is_empty());
        assert!(parse_competitor_leads("{\"name\": \"not an array\"}").is_empty());
    }

    #[test]
    fn test_site_context_summary() {
        let crawl = CrawlResult::from_html(
            "https://acme.com",
            r#"<html><head><title>Acme Payroll</title>
               <meta name="description" content="Payroll for small teams">
               </head><body><h1>Payroll, done right</h1><p>Run payroll in minutes.</p></body></html>"#,
        );
        let context = site_context(&crawl);
        assert!(context.contains("Acme Payroll"));
        assert!(context.contains("Payroll for small teams"));
        assert!(context.contains("Payroll, done right"));
    }

    #[tokio::test]
    async fn test_static_page_has_no_llm_pillars() {
        let crawl = CrawlResult::from_html(
            "https://rival.com",
            "<html><head><title>Rival</title></head><body><h1>Rival</h1><p>text</p></body></html>",
        );
        let page = score_static_page(&crawl, &AuxSignals::default(), "default").await;
        assert!(page.entity.is_none());
        assert!(page.ai_visibility.is_none());
        assert_eq!(
            page.eeat.details.checks["scoring_mode"],
            serde_json::json!("static_fallback")
        );
        assert!(page.composite >= 0.0 && page.composite <= 100.0);
    }
}
