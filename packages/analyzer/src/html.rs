//! HTML text, link, and brand extraction helpers.
//!
//! Built on `scraper` for DOM queries. Since `scraper::Html` is not `Send`,
//! crawl results carry raw HTML strings and each consumer parses on its own
//! task via [`parse_document`].

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::{BTreeSet, HashSet};
use url::Url;

lazy_static! {
    static ref TITLE_SEPARATORS: Regex = Regex::new(r"[|\-\u{2013}\u{2014}:]").unwrap();
}

/// Parse raw HTML into a queryable document.
pub fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}

pub(crate) fn selector(css: &str) -> Selector {
    // Selectors here are compile-time literals; parse cannot fail.
    Selector::parse(css).unwrap_or_else(|_| unreachable!("invalid static selector: {css}"))
}

/// Extract readable body text with script/style/nav/footer/header stripped,
/// space-separated and whitespace-normalized.
pub fn extract_text(doc: &Html) -> String {
    let skip = selector("script, style, nav, footer, header");
    let skipped: HashSet<_> = doc
        .select(&skip)
        .flat_map(|el| el.descendants().map(|n| n.id()))
        .collect();

    let mut words: Vec<&str> = Vec::new();
    for node in doc.root_element().descendants() {
        if skipped.contains(&node.id()) {
            continue;
        }
        if let Some(text) = node.value().as_text() {
            words.extend(text.split_whitespace());
        }
    }
    words.join(" ")
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Collect same-host internal links, normalized to scheme://host/path with
/// the trailing slash stripped and query/fragment dropped.
pub fn extract_internal_links(doc: &Html, base_url: &str) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(_) => return Vec::new(),
    };
    let base_host = base.host_str().unwrap_or_default().to_string();

    let anchors = selector("a[href]");
    let mut links = BTreeSet::new();
    for a in doc.select(&anchors) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        if resolved.host_str() != Some(base_host.as_str()) {
            continue;
        }
        let clean = format!(
            "{}://{}{}",
            resolved.scheme(),
            base_host,
            resolved.path()
        );
        links.insert(clean.trim_end_matches('/').to_string());
    }
    links.into_iter().collect()
}

/// Host with a leading `www.` stripped.
pub fn extract_domain(url: &str) -> String {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(&host).to_string()
}

/// First label of the domain, capitalized ("carboncut.io" -> "Carboncut").
pub fn domain_label_capitalized(url: &str) -> String {
    let domain = extract_domain(url);
    let label = domain.split('.').next().unwrap_or_default();
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Best-effort brand name: og:site_name if short enough, else the shortest
/// title segment split on separators, else the capitalized domain label.
pub fn extract_brand_name(doc: &Html, url: &str) -> String {
    let og = selector(r#"meta[property="og:site_name"]"#);
    if let Some(content) = doc
        .select(&og)
        .next()
        .and_then(|el| el.value().attr("content"))
    {
        let name = content.trim();
        if !name.is_empty() && name.len() <= 40 {
            return name.to_string();
        }
    }

    if let Some(title) = page_title(doc) {
        let candidates: Vec<&str> = TITLE_SEPARATORS
            .split(&title)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if candidates.len() > 1 {
            if let Some(shortest) = candidates.iter().min_by_key(|p| p.len()) {
                if shortest.len() <= 30 {
                    return shortest.to_string();
                }
            }
        } else if let Some(first) = candidates.first() {
            if first.len() <= 30 {
                return first.to_string();
            }
        }
    }

    domain_label_capitalized(url)
}

/// `<title>` text, trimmed, if present and non-empty.
pub fn page_title(doc: &Html) -> Option<String> {
    let title = selector("title");
    doc.select(&title)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Meta tag content by name attribute.
pub fn meta_content(doc: &Html, name: &str) -> Option<String> {
    let sel = selector(&format!(r#"meta[name="{}"]"#, name));
    doc.select(&sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Meta tag content by property attribute (OpenGraph and article tags).
pub fn meta_property(doc: &Html, property: &str) -> Option<String> {
    let sel = selector(&format!(r#"meta[property="{}"]"#, property));
    doc.select(&sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Text of the first H1, if any.
pub fn first_h1(doc: &Html) -> Option<String> {
    let h1 = selector("h1");
    doc.select(&h1)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><head>
            <title>Acme Widgets | The Best Widgets Online</title>
            <meta property="og:site_name" content="Acme">
            <meta name="description" content="Widgets for every occasion">
        </head><body>
            <header><a href="/skip-me">nav link counted anyway</a></header>
            <nav>Menu text</nav>
            <h1>Welcome to Acme</h1>
            <p>Widgets are great.</p>
            <a href="/products">Products</a>
            <a href="/products/">Products again</a>
            <a href="https://example.com/about?ref=x#top">About</a>
            <a href="https://other-site.com/page">External</a>
            <a href="mailto:hi@example.com">Mail</a>
            <script>var x = "should not appear";</script>
            <footer>Footer text</footer>
        </body></html>
    "#;

    #[test]
    fn test_extract_text_strips_chrome() {
        let doc = parse_document(PAGE);
        let text = extract_text(&doc);
        assert!(text.contains("Widgets are great."));
        assert!(!text.contains("should not appear"));
        assert!(!text.contains("Menu text"));
        assert!(!text.contains("Footer text"));
    }

    #[test]
    fn test_internal_links_normalized_and_deduped() {
        let doc = parse_document(PAGE);
        let links = extract_internal_links(&doc, "https://example.com/page");
        assert!(links.contains(&"https://example.com/products".to_string()));
        assert!(links.contains(&"https://example.com/about".to_string()));
        // trailing-slash variant deduped, query/fragment dropped
        assert_eq!(
            links
                .iter()
                .filter(|l| l.contains("/products"))
                .count(),
            1
        );
        assert!(!links.iter().any(|l| l.contains("other-site.com")));
        assert!(!links.iter().any(|l| l.starts_with("mailto:")));
    }

    #[test]
    fn test_extract_domain_strips_www() {
        assert_eq!(extract_domain("https://www.example.com/x"), "example.com");
        assert_eq!(extract_domain("http://sub.example.org"), "sub.example.org");
    }

    #[test]
    fn test_brand_name_prefers_og_site_name() {
        let doc = parse_document(PAGE);
        assert_eq!(extract_brand_name(&doc, "https://example.com"), "Acme");
    }

    #[test]
    fn test_brand_name_from_title_shortest_segment() {
        let html = r#"<html><head><title>Some Long Tagline Here | Zap</title></head><body></body></html>"#;
        let doc = parse_document(html);
        assert_eq!(extract_brand_name(&doc, "https://zap.io"), "Zap");
    }

    #[test]
    fn test_brand_name_falls_back_to_domain() {
        let doc = parse_document("<html><body></body></html>");
        assert_eq!(
            extract_brand_name(&doc, "https://www.carboncut.io"),
            "Carboncut"
        );
    }

    #[test]
    fn test_word_count() {
        assert_eq!(count_words("one two  three"), 3);
        assert_eq!(count_words(""), 0);
    }
}
