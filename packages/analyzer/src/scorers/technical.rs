//! Technical readiness scoring.
//!
//! Designed to degrade gracefully: the auxiliary-file checks (llms.txt,
//! robots.txt, sitemap.xml) and URL-level checks work even when the main
//! crawl failed, in which case the 70-point HTML-independent subtotal is
//! renormalized to the full 100-point scale.

use serde_json::{json, Value};

use crate::crawler::robots::RobotsTxt;
use crate::crawler::{CrawlResult, Fetcher};
use crate::html;
use crate::types::{PillarDetails, PillarScore};

/// Results of the root-file probes, gathered independently of the main crawl.
#[derive(Debug, Clone, Default)]
pub struct AuxSignals {
    pub has_llms_txt: bool,
    pub robots_txt: Option<String>,
    pub has_sitemap: bool,
}

/// Probe llms.txt, robots.txt and sitemap.xml at the site root. Each probe
/// fails soft; a missing file is just a false/None signal.
pub async fn probe_aux_files(fetcher: &Fetcher, url: &str) -> AuxSignals {
    AuxSignals {
        has_llms_txt: fetcher.file_exists(url, "llms.txt").await,
        robots_txt: fetcher
            .fetch_file_content(url, "robots.txt")
            .await
            .filter(|c| !c.trim().is_empty()),
        has_sitemap: fetcher.file_exists(url, "sitemap.xml").await,
    }
}

pub async fn score_technical(crawl: &CrawlResult, fetcher: &Fetcher) -> PillarScore {
    let aux = probe_aux_files(fetcher, &crawl.url).await;
    score_technical_with(crawl, &aux)
}

/// Scoring core, split from the probes so tests can inject signals.
pub fn score_technical_with(crawl: &CrawlResult, aux: &AuxSignals) -> PillarScore {
    let mut details = PillarDetails::new();
    let mut score = 0.0;

    // llms.txt (20)
    details.check("llms_txt", aux.has_llms_txt);
    if aux.has_llms_txt {
        score += 20.0;
    } else {
        details.finding("no_llms_txt");
    }

    // robots.txt AI-bot allowance (20); no robots.txt means allow-all
    match &aux.robots_txt {
        Some(content) => {
            details.check("has_robots_txt", true);
            let robots = RobotsTxt::parse(content);
            let (allows_ai, blocked_bots) = robots.ai_bot_allowance();
            details.check("ai_bots_allowed", allows_ai);
            details.check("blocked_bots", json!(blocked_bots));
            if allows_ai {
                score += 20.0;
            } else {
                details.finding("ai_bots_blocked");
            }
        }
        None => {
            details.check("has_robots_txt", false);
            details.check("ai_bots_allowed", true);
            score += 20.0;
        }
    }

    // sitemap.xml (10)
    details.check("has_sitemap", aux.has_sitemap);
    if aux.has_sitemap {
        score += 10.0;
    } else {
        details.finding("no_sitemap");
    }

    // HTTPS (5)
    details.check("is_https", crawl.is_https);
    if crawl.is_https {
        score += 5.0;
    } else {
        details.finding("no_https");
    }

    // Load time (15), from whatever the fetch recorded even on failure
    if crawl.load_time > 0.0 {
        details.check("load_time", (crawl.load_time * 100.0).round() / 100.0);
        if crawl.load_time < 1.5 {
            score += 15.0;
        } else if crawl.load_time < 3.0 {
            score += 10.0;
        } else if crawl.load_time < 5.0 {
            score += 5.0;
        } else {
            details.finding("slow_load_time");
        }
    } else {
        details.check("load_time", Value::Null);
    }

    // Checks that require page HTML (30)
    if let Some(doc) = crawl.document() {
        let noindex = html::meta_content(&doc, "robots")
            .map(|c| c.to_lowercase().contains("noindex"))
            .unwrap_or(false);
        details.check("meta_robots_ok", !noindex);
        if noindex {
            details.finding("meta_noindex");
        } else {
            score += 10.0;
        }

        let has_viewport = html::meta_content(&doc, "viewport").is_some();
        details.check("has_viewport", has_viewport);
        if has_viewport {
            score += 10.0;
        } else {
            details.finding("no_viewport");
        }

        let has_canonical = doc
            .select(&html::selector(r#"link[rel="canonical"]"#))
            .next()
            .is_some();
        details.check("has_canonical", has_canonical);
        if has_canonical {
            score += 10.0;
        } else {
            details.finding("no_canonical");
        }
    } else {
        details.check("meta_robots_ok", Value::Null);
        details.check("has_viewport", Value::Null);
        details.check("has_canonical", Value::Null);
        details.check("crawl_blocked", true);
        // Only 70 pts were checkable; renormalize so partial results
        // stay on the same scale
        if score > 0.0 {
            score *= 100.0 / 70.0;
        }
    }

    PillarScore::new(score, details)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_page() -> CrawlResult {
        let mut crawl = CrawlResult::from_html(
            "https://example.com",
            r#"<html><head>
                <meta name="viewport" content="width=device-width">
                <link rel="canonical" href="https://example.com/">
            </head><body><p>hi</p></body></html>"#,
        );
        crawl.load_time = 1.0;
        crawl
    }

    #[test]
    fn test_perfect_page_scores_100() {
        let aux = AuxSignals {
            has_llms_txt: true,
            robots_txt: Some("User-agent: *\nDisallow: /admin\n".to_string()),
            has_sitemap: true,
        };
        let result = score_technical_with(&full_page(), &aux);
        assert_eq!(result.score, 100.0);
        assert!(result.details.findings.is_empty());
    }

    #[test]
    fn test_missing_robots_means_allow() {
        let aux = AuxSignals::default();
        let result = score_technical_with(&full_page(), &aux);
        assert_eq!(result.details.checks["has_robots_txt"], json!(false));
        assert_eq!(result.details.checks["ai_bots_allowed"], json!(true));
        assert!(!result.details.findings.iter().any(|f| f == "ai_bots_blocked"));
    }

    #[test]
    fn test_gptbot_block_flagged() {
        let aux = AuxSignals {
            robots_txt: Some("User-agent: GPTBot\nDisallow: /\n".to_string()),
            ..Default::default()
        };
        let result = score_technical_with(&full_page(), &aux);
        assert_eq!(result.details.checks["ai_bots_allowed"], json!(false));
        assert!(result.details.findings.iter().any(|f| f == "ai_bots_blocked"));
        let blocked = result.details.checks["blocked_bots"].as_array().unwrap();
        assert!(blocked.iter().any(|b| b == "GPTBot"));
    }

    #[test]
    fn test_failed_crawl_renormalizes() {
        let mut crawl = CrawlResult::new("https://example.com");
        crawl.error = Some("HTTP 403".to_string());
        let aux = AuxSignals {
            has_llms_txt: true,
            robots_txt: None,
            has_sitemap: true,
        };
        // 20 + 20 + 10 + 5 = 55 of the 70 checkable points
        let result = score_technical_with(&crawl, &aux);
        assert_eq!(result.details.checks["crawl_blocked"], json!(true));
        assert_eq!(result.details.checks["meta_robots_ok"], Value::Null);
        assert!((result.score - 55.0 * 100.0 / 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_slow_load_and_http_findings() {
        let mut crawl = CrawlResult::from_html(
            "http://example.com",
            "<html><body><p>hi</p></body></html>",
        );
        crawl.is_https = false;
        crawl.load_time = 6.2;
        let result = score_technical_with(&crawl, &AuxSignals::default());
        assert!(result.details.findings.iter().any(|f| f == "no_https"));
        assert!(result.details.findings.iter().any(|f| f == "slow_load_time"));
        assert!(result.details.findings.iter().any(|f| f == "no_viewport"));
        assert!(result.details.findings.iter().any(|f| f == "no_canonical"));
    }
}
