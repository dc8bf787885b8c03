//! Page fetcher with retry/backoff and auxiliary file probes.
//!
//! The fetcher makes up to 3 attempts (1 initial + 2 retries), rotating a
//! small pool of realistic browser user-agent strings. Server errors and
//! rate limits (429/5xx) back off linearly (2s, 4s); transport timeouts and
//! connection errors back off 1s; other 4xx statuses are terminal. A failed
//! crawl is a normal [`CrawlResult`] with `error` set, not an `Err`; the
//! pipeline's partial-analysis path consumes it.

pub mod robots;

use scraper::Html;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::CrawlError;
use crate::html;

pub use robots::RobotsTxt;

/// Rotated to reduce blocking by bot-hostile origins.
pub const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

const CRAWL_TIMEOUT: Duration = Duration::from_secs(15);
const FILE_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_RETRIES: u32 = 2;

const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Immutable record of one fetch. Raw HTML is carried instead of a parsed
/// document so the result stays `Send`; consumers parse with [`Self::document`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlResult {
    pub url: String,
    pub status_code: u16,
    pub html: String,
    pub text: String,
    pub internal_links: Vec<String>,
    pub load_time: f64,
    pub error: Option<String>,
    pub is_https: bool,
}

impl CrawlResult {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let is_https = url.starts_with("https://");
        Self {
            url,
            is_https,
            ..Default::default()
        }
    }

    /// Build a successful result from fetched HTML, running text and link
    /// extraction eagerly.
    pub fn from_html(url: impl Into<String>, raw_html: impl Into<String>) -> Self {
        let mut result = Self::new(url);
        result.status_code = 200;
        result.html = raw_html.into();
        let doc = html::parse_document(&result.html);
        result.text = html::extract_text(&doc);
        result.internal_links = html::extract_internal_links(&doc, &result.url);
        result
    }

    /// True when the page was fetched and yielded parseable HTML.
    pub fn ok(&self) -> bool {
        self.status_code == 200 && !self.html.is_empty()
    }

    /// Typed view of a failed crawl, `None` while the result is healthy.
    pub fn crawl_error(&self) -> Option<CrawlError> {
        let error = self.error.as_deref()?;
        if error.contains("timed out") {
            Some(CrawlError::Timeout {
                url: self.url.clone(),
                attempts: MAX_RETRIES + 1,
            })
        } else if RETRYABLE_STATUSES.contains(&self.status_code) {
            Some(CrawlError::RetriesExhausted {
                url: self.url.clone(),
                status: self.status_code,
                attempts: MAX_RETRIES + 1,
            })
        } else if error.starts_with("HTTP") {
            Some(CrawlError::HttpStatus {
                url: self.url.clone(),
                status: self.status_code,
            })
        } else {
            Some(CrawlError::Connection(error.to_string()))
        }
    }

    /// Re-parse the raw HTML. Returns `None` when the crawl failed.
    pub fn document(&self) -> Option<Html> {
        if self.ok() {
            Some(html::parse_document(&self.html))
        } else {
            None
        }
    }
}

/// HTTP fetcher shared by the pipeline and competitor scoring.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Fetch a page with retries. Never returns `Err`; failures are encoded
    /// in the result's `error` field.
    pub async fn crawl_page(&self, url: &str) -> CrawlResult {
        let mut result = CrawlResult::new(url);
        let mut last_error = String::new();

        for attempt in 0..=MAX_RETRIES {
            let ua = USER_AGENTS[attempt as usize % USER_AGENTS.len()];
            let start = Instant::now();

            let response = self
                .client
                .get(url)
                .header("User-Agent", ua)
                .header(
                    "Accept",
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                )
                .header("Accept-Language", "en-US,en;q=0.9")
                .header("Connection", "keep-alive")
                .header("Upgrade-Insecure-Requests", "1")
                .timeout(CRAWL_TIMEOUT)
                .send()
                .await;

            match response {
                Ok(resp) => {
                    result.load_time = start.elapsed().as_secs_f64();
                    let status = resp.status().as_u16();
                    result.status_code = status;

                    if status == 200 {
                        match resp.text().await {
                            Ok(body) => {
                                let mut success = CrawlResult::from_html(url, body);
                                success.load_time = result.load_time;
                                return success;
                            }
                            Err(e) => {
                                last_error = format!("Body read error: {}", e);
                                warn!(url = %url, error = %e, "failed to read response body");
                                break;
                            }
                        }
                    }

                    if RETRYABLE_STATUSES.contains(&status) {
                        last_error = format!("HTTP {}", status);
                        info!(
                            attempt = attempt + 1,
                            max = MAX_RETRIES + 1,
                            status = status,
                            url = %url,
                            "retryable status, backing off"
                        );
                        tokio::time::sleep(Duration::from_secs(2 * (attempt as u64 + 1))).await;
                        continue;
                    }

                    // Non-retryable HTTP error (403, 404, etc.)
                    result.error = Some(format!("HTTP {}", status));
                    return result;
                }
                Err(e) if e.is_timeout() => {
                    last_error = "Request timed out".to_string();
                    info!(attempt = attempt + 1, max = MAX_RETRIES + 1, url = %url, "crawl attempt timed out");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
                Err(e) if e.is_connect() => {
                    last_error = format!("Connection error: {}", e);
                    info!(attempt = attempt + 1, max = MAX_RETRIES + 1, url = %url, "connection error");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!(url = %url, error = %e, "crawl request error");
                    break;
                }
            }
        }

        result.error = Some(last_error);
        result
    }

    /// HEAD probe for a root-level file (robots.txt, sitemap.xml, llms.txt).
    /// Independent of the main crawl; failures just return false.
    pub async fn file_exists(&self, base_url: &str, path: &str) -> bool {
        let Some(url) = root_file_url(base_url, path) else {
            return false;
        };
        debug!(url = %url, "file existence probe");
        match self
            .client
            .head(&url)
            .header("User-Agent", USER_AGENTS[0])
            .timeout(FILE_PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) => resp.status().as_u16() == 200,
            Err(_) => false,
        }
    }

    /// Fetch a root-level file's body, or `None` on any failure.
    pub async fn fetch_file_content(&self, base_url: &str, path: &str) -> Option<String> {
        let url = root_file_url(base_url, path)?;
        let resp = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENTS[0])
            .timeout(FILE_PROBE_TIMEOUT)
            .send()
            .await
            .ok()?;
        if resp.status().as_u16() != 200 {
            return None;
        }
        resp.text().await.ok()
    }

    /// Cheap reachability probe used for competitor URL validation. Retries
    /// once with an https swap when an http URL fails.
    pub async fn is_reachable(&self, url: &str) -> bool {
        if self.head_ok(url).await {
            return true;
        }
        if let Some(https) = url.strip_prefix("http://") {
            return self.head_ok(&format!("https://{}", https)).await;
        }
        false
    }

    async fn head_ok(&self, url: &str) -> bool {
        match self
            .client
            .head(url)
            .header("User-Agent", USER_AGENTS[0])
            .timeout(Duration::from_secs(3))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success() || resp.status().is_redirection(),
            Err(_) => false,
        }
    }
}

fn root_file_url(base_url: &str, path: &str) -> Option<String> {
    let parsed = Url::parse(base_url).ok()?;
    let host = parsed.host_str()?;
    Some(format!(
        "{}://{}/{}",
        parsed.scheme(),
        host,
        path.trim_start_matches('/')
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_result_ok_predicate() {
        let result = CrawlResult::from_html("https://example.com", "<html><body>hi</body></html>");
        assert!(result.ok());

        let mut failed = CrawlResult::new("https://example.com");
        failed.status_code = 404;
        failed.error = Some("HTTP 404".to_string());
        assert!(!failed.ok());
        assert!(failed.document().is_none());
    }

    #[test]
    fn test_crawl_result_extracts_text_and_links() {
        let html = r#"<html><body>
            <p>Body text here.</p>
            <a href="/page-one">One</a>
            <a href="https://example.com/page-two/">Two</a>
        </body></html>"#;
        let result = CrawlResult::from_html("https://example.com", html);
        assert!(result.text.contains("Body text here."));
        assert_eq!(
            result.internal_links,
            vec![
                "https://example.com/page-one".to_string(),
                "https://example.com/page-two".to_string(),
            ]
        );
    }

    #[test]
    fn test_https_flag() {
        assert!(CrawlResult::new("https://example.com").is_https);
        assert!(!CrawlResult::new("http://example.com").is_https);
    }

    #[test]
    fn test_root_file_url() {
        assert_eq!(
            root_file_url("https://example.com/deep/page", "robots.txt").as_deref(),
            Some("https://example.com/robots.txt")
        );
        assert_eq!(
            root_file_url("https://example.com", "/llms.txt").as_deref(),
            Some("https://example.com/llms.txt")
        );
        assert!(root_file_url("not a url", "robots.txt").is_none());
    }
}
