//! Content structure and quality scoring.
//!
//! Two sections totalling 100:
//! - Structure signals (35 pts): H1, heading hierarchy, FAQ, lists, tables,
//!   answer-first opening, internal links.
//! - GEO content quality (65 pts): citations, statistics, expert quotes,
//!   authoritative tone, readability, technical terms, vocabulary
//!   diversity, fluency, and a keyword-stuffing penalty. Point bands follow
//!   published effectiveness data per method.

use scraper::Selector;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};

use super::patterns::*;
use super::readability;
use crate::crawler::CrawlResult;
use crate::html::count_words;
use crate::types::{PillarDetails, PillarScore};

pub fn score_content(crawl: &CrawlResult) -> PillarScore {
    let Some(doc) = crawl.document() else {
        return PillarScore::errored(crawl.error.clone().unwrap_or_else(|| "crawl failed".into()));
    };

    let mut details = PillarDetails::new();

    let (structure_score, structure_checks, structure_findings) = score_structure(crawl, &doc);
    details.checks.insert("structure".into(), Value::Object(structure_checks));
    for finding in structure_findings {
        details.finding(finding);
    }

    let (geo_score, geo_checks, geo_findings) = score_geo_quality(crawl, &doc);
    details.checks.insert("geo_quality".into(), Value::Object(geo_checks));
    for finding in geo_findings {
        details.finding(finding);
    }

    details.check("structure_score", round1(structure_score));
    details.check("geo_quality_score", round1(geo_score));

    PillarScore::new(structure_score + geo_score, details)
}

fn sel(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|_| unreachable!("invalid static selector: {css}"))
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

// ── Structure signals (max 35 pts) ───────────────────────────────────────

fn score_structure(
    crawl: &CrawlResult,
    doc: &scraper::Html,
) -> (f64, Map<String, Value>, Vec<&'static str>) {
    let mut checks = Map::new();
    let mut findings = Vec::new();
    let mut score = 0.0;

    // Exactly one H1 (5 pts)
    let h1_count = doc.select(&sel("h1")).count();
    if h1_count == 1 {
        score += 5.0;
        checks.insert("h1_singular".into(), json!(true));
    } else {
        checks.insert("h1_singular".into(), json!(false));
        findings.push(if h1_count == 0 { "no_h1" } else { "multiple_h1" });
    }

    // No heading-level skip in document order (5 pts)
    let levels: Vec<u8> = doc
        .select(&sel("h1, h2, h3, h4, h5, h6"))
        .filter_map(|el| el.value().name().strip_prefix('h'))
        .filter_map(|n| n.parse().ok())
        .collect();
    let hierarchy_ok = levels.windows(2).all(|w| w[1] <= w[0] || w[1] - w[0] <= 1);
    if hierarchy_ok && !levels.is_empty() {
        score += 5.0;
        checks.insert("heading_hierarchy".into(), json!(true));
    } else {
        checks.insert("heading_hierarchy".into(), json!(false));
        findings.push("broken_heading_hierarchy");
    }

    // FAQ section via heading text, class, or id (8 pts)
    let faq_in_heading = doc
        .select(&sel("h2, h3, h4"))
        .any(|el| el.text().collect::<String>().to_lowercase().contains("faq"));
    let faq_found = faq_in_heading
        || doc.select(&sel("*")).any(|el| {
            el.value()
                .classes()
                .any(|c| c.to_lowercase().contains("faq"))
                || el
                    .value()
                    .id()
                    .is_some_and(|id| id.to_lowercase().contains("faq"))
        });
    checks.insert("faq_section".into(), json!(faq_found));
    if faq_found {
        score += 8.0;
    } else {
        findings.push("no_faq_section");
    }

    // Lists (4 pts)
    let list_count = doc.select(&sel("ul, ol")).count();
    checks.insert("list_count".into(), json!(list_count));
    if list_count > 0 {
        score += 4.0;
        checks.insert("lists_present".into(), json!(true));
    } else {
        checks.insert("lists_present".into(), json!(false));
        findings.push("no_lists");
    }

    // Tables (3 pts)
    let has_tables = doc.select(&sel("table")).next().is_some();
    checks.insert("tables_present".into(), json!(has_tables));
    if has_tables {
        score += 3.0;
    }

    // Answer-first opening paragraph (5 pts)
    let first_p = doc
        .select(&sel("p"))
        .next()
        .map(|p| p.text().collect::<String>().trim().to_lowercase());
    let mut answer_first = false;
    if let Some(first_text) = &first_p {
        let head: String = first_text.chars().take(200).collect();
        answer_first = ANSWER_FIRST_PATTERNS.iter().any(|p| p.is_match(&head));
        if !answer_first {
            let words = head.split_whitespace().count();
            if (20..=60).contains(&words)
                && ["is ", "are ", "means ", "refers "]
                    .iter()
                    .any(|w| head.contains(w))
            {
                answer_first = true;
            }
        }
    }
    checks.insert("answer_first_format".into(), json!(answer_first));
    if answer_first {
        score += 5.0;
    } else {
        findings.push("no_answer_first");
    }

    // Internal links >= 3 (5 pts)
    let internal_count = crawl.internal_links.len();
    checks.insert("internal_link_count".into(), json!(internal_count));
    if internal_count >= 3 {
        score += 5.0;
    } else {
        findings.push("few_internal_links");
    }

    (score, checks, findings)
}

// ── GEO content quality (max 65 pts) ─────────────────────────────────────

fn score_geo_quality(
    crawl: &CrawlResult,
    doc: &scraper::Html,
) -> (f64, Map<String, Value>, Vec<&'static str>) {
    let text = &crawl.text;
    let text_lower = text.to_lowercase();
    let mut checks = Map::new();
    let mut findings = Vec::new();
    let mut score = 0.0;

    let word_count = count_words(text);
    checks.insert("word_count".into(), json!(word_count));

    // Cite sources (12 pts)
    let mut citation_count = count_matches(text, &CITATION_PATTERNS);
    for heading in doc.select(&sel("h2, h3, h4")) {
        let heading_text = heading.text().collect::<String>().trim().to_lowercase();
        if matches!(
            heading_text.as_str(),
            "references" | "sources" | "bibliography" | "works cited" | "citations"
        ) {
            citation_count += 3;
        }
    }
    checks.insert("citation_count".into(), json!(citation_count));
    score += match citation_count {
        n if n >= 5 => 12.0,
        n if n >= 3 => 9.0,
        n if n >= 1 => 5.0,
        _ => {
            findings.push("no_citations");
            0.0
        }
    };

    // Statistics (10 pts)
    let stat_count = count_matches(text, &STAT_PATTERNS);
    checks.insert("statistic_count".into(), json!(stat_count));
    score += match stat_count {
        n if n >= 5 => 10.0,
        n if n >= 3 => 7.0,
        n if n >= 1 => 4.0,
        _ => {
            findings.push("no_statistics");
            0.0
        }
    };

    // Expert quotes, including <blockquote> (8 pts)
    let quote_count =
        count_matches(text, &QUOTE_PATTERNS) + doc.select(&sel("blockquote")).count();
    checks.insert("quote_count".into(), json!(quote_count));
    score += match quote_count {
        n if n >= 3 => 8.0,
        n if n >= 1 => 5.0,
        _ => {
            findings.push("no_expert_quotes");
            0.0
        }
    };

    // Authoritative tone, net of hedging (8 pts)
    let authority_count = count_matches(&text_lower, &AUTHORITY_PATTERNS) as i64;
    let hedge_count = count_matches(&text_lower, &HEDGING_PATTERNS) as i64;
    checks.insert("authority_signals".into(), json!(authority_count));
    checks.insert("hedging_signals".into(), json!(hedge_count));
    let net_authority = authority_count - hedge_count;
    if net_authority >= 4 {
        score += 8.0;
    } else if net_authority >= 2 {
        score += 5.0;
    } else if net_authority >= 0 && authority_count >= 1 {
        score += 3.0;
    } else {
        findings.push("weak_authoritative_tone");
    }

    // Readability (7 pts); neutral 3 when the text is too short to score
    if text.len() > 100 {
        if let Some(r) = readability::analyze(text) {
            checks.insert("fk_grade".into(), json!(round1(r.fk_grade)));
            checks.insert("flesch_ease".into(), json!(round1(r.flesch_ease)));
            if (6.0..=12.0).contains(&r.fk_grade) {
                score += 4.0;
            } else if (4.0..=14.0).contains(&r.fk_grade) {
                score += 2.0;
            } else {
                findings.push("poor_readability");
            }
            if r.flesch_ease >= 60.0 {
                score += 3.0;
            } else if r.flesch_ease >= 40.0 {
                score += 1.0;
            }
        } else {
            checks.insert("fk_grade".into(), Value::Null);
            checks.insert("flesch_ease".into(), Value::Null);
            score += 3.0;
        }
    } else {
        checks.insert("fk_grade".into(), Value::Null);
        checks.insert("flesch_ease".into(), Value::Null);
        score += 3.0;
    }

    // Technical terms: defined acronyms, standalone acronyms, compounds (5 pts)
    let acronym_definitions = ACRONYM_DEFINITION.find_iter(text).count();
    let technical_acronyms: HashSet<&str> = STANDALONE_ACRONYM
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|a| !COMMON_UPPERCASE_WORDS.contains(a))
        .collect();
    let compound_terms = COMPOUND_TERM.find_iter(&text_lower).count();
    let tech_term_count = acronym_definitions + technical_acronyms.len() + compound_terms;
    checks.insert("technical_term_count".into(), json!(tech_term_count));
    checks.insert("acronym_definitions".into(), json!(acronym_definitions));
    score += match tech_term_count {
        n if n >= 8 => 5.0,
        n if n >= 4 => 3.0,
        n if n >= 1 => 1.0,
        _ => {
            findings.push("no_technical_terms");
            0.0
        }
    };

    // Vocabulary diversity via type-token ratio on a capped sample (5 pts)
    if word_count >= 50 {
        let words: Vec<&str> = WORD_3PLUS
            .find_iter(&text_lower)
            .map(|m| m.as_str())
            .collect();
        if words.is_empty() {
            checks.insert("vocabulary_ttr".into(), json!(0));
            findings.push("low_vocabulary_diversity");
        } else {
            let sample = &words[..words.len().min(500)];
            let unique: HashSet<&&str> = sample.iter().collect();
            let ttr = unique.len() as f64 / sample.len() as f64;
            checks.insert("vocabulary_ttr".into(), json!((ttr * 1000.0).round() / 1000.0));
            checks.insert(
                "unique_word_count".into(),
                json!(words.iter().collect::<HashSet<_>>().len()),
            );
            if ttr >= 0.65 {
                score += 5.0;
            } else if ttr >= 0.50 {
                score += 3.0;
            } else if ttr >= 0.35 {
                score += 1.0;
            } else {
                findings.push("low_vocabulary_diversity");
            }
        }
    } else {
        checks.insert("vocabulary_ttr".into(), Value::Null);
    }

    // Fluency and structure (5 pts)
    if word_count >= 1500 {
        score += 2.0;
    } else if word_count >= 800 {
        score += 1.0;
    } else {
        findings.push("low_word_count");
    }

    let para_lengths: Vec<usize> = doc
        .select(&sel("p"))
        .map(|p| p.text().collect::<String>())
        .filter(|t| !t.trim().is_empty())
        .map(|t| count_words(&t))
        .collect();
    if para_lengths.is_empty() {
        checks.insert("avg_paragraph_words".into(), json!(0));
    } else {
        let avg_para = para_lengths.iter().sum::<usize>() as f64 / para_lengths.len() as f64;
        checks.insert("avg_paragraph_words".into(), json!(round1(avg_para)));
        checks.insert("paragraph_count".into(), json!(para_lengths.len()));
        if (20.0..=80.0).contains(&avg_para) {
            score += 2.0;
        } else if (15.0..=120.0).contains(&avg_para) {
            score += 1.0;
        } else {
            findings.push("poor_paragraph_structure");
        }
    }

    let transition_count = count_matches(&text_lower, &TRANSITION_PATTERNS);
    checks.insert("transition_word_count".into(), json!(transition_count));
    if transition_count >= 5 {
        score += 1.0;
    }

    // Keyword stuffing penalty: top bigram share of all bigrams
    if word_count >= 100 {
        let words_list: Vec<&str> = WORD_2PLUS
            .find_iter(&text_lower)
            .map(|m| m.as_str())
            .collect();
        if words_list.len() >= 2 {
            let mut bigram_counts: HashMap<(&str, &str), usize> = HashMap::new();
            for pair in words_list.windows(2) {
                *bigram_counts.entry((pair[0], pair[1])).or_insert(0) += 1;
            }
            let total = (words_list.len() - 1) as f64;
            if let Some(((w1, w2), freq)) =
                bigram_counts.iter().max_by_key(|(_, &count)| count)
            {
                let ratio = *freq as f64 / total;
                checks.insert(
                    "top_bigram_frequency".into(),
                    json!((ratio * 10000.0).round() / 10000.0),
                );
                checks.insert("top_bigram".into(), json!(format!("{} {}", w1, w2)));
                if ratio > 0.03 {
                    score -= 5.0;
                    findings.push("keyword_stuffing");
                    checks.insert("keyword_stuffing_detected".into(), json!(true));
                } else if ratio > 0.02 {
                    score -= 2.0;
                    checks.insert("keyword_stuffing_detected".into(), json!("mild"));
                } else {
                    checks.insert("keyword_stuffing_detected".into(), json!(false));
                }
            }
        }
    }

    (score, checks, findings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawl_from(html: &str) -> CrawlResult {
        CrawlResult::from_html("https://example.com", html)
    }

    #[test]
    fn test_heading_hierarchy_awarded_without_skip() {
        let crawl = crawl_from(
            "<html><body><h1>T</h1><h2>A</h2><h3>B</h3><h2>C</h2><p>text</p></body></html>",
        );
        let result = score_content(&crawl);
        let structure = &result.details.checks["structure"];
        assert_eq!(structure["h1_singular"], json!(true));
        assert_eq!(structure["heading_hierarchy"], json!(true));
        assert!(!result.details.findings.iter().any(|f| f == "broken_heading_hierarchy"));
    }

    #[test]
    fn test_heading_skip_emits_finding() {
        let crawl = crawl_from("<html><body><h1>T</h1><h3>B</h3><p>text</p></body></html>");
        let result = score_content(&crawl);
        let structure = &result.details.checks["structure"];
        assert_eq!(structure["heading_hierarchy"], json!(false));
        assert!(result.details.findings.iter().any(|f| f == "broken_heading_hierarchy"));
    }

    #[test]
    fn test_no_h1_and_multiple_h1_findings() {
        let none = score_content(&crawl_from("<html><body><p>x</p></body></html>"));
        assert!(none.details.findings.iter().any(|f| f == "no_h1"));

        let multi = score_content(&crawl_from(
            "<html><body><h1>A</h1><h1>B</h1></body></html>",
        ));
        assert!(multi.details.findings.iter().any(|f| f == "multiple_h1"));
    }

    #[test]
    fn test_faq_detected_via_class() {
        let crawl = crawl_from(
            r#"<html><body><h1>T</h1><div class="faq-block"><p>Q and A</p></div></body></html>"#,
        );
        let result = score_content(&crawl);
        assert_eq!(result.details.checks["structure"]["faq_section"], json!(true));
        assert!(!result.details.findings.iter().any(|f| f == "no_faq_section"));
    }

    #[test]
    fn test_answer_first_concise_definition() {
        let p = "Generative engine optimization is the practice of structuring web content \
                 so AI assistants can retrieve, cite, and recommend it when answering questions.";
        let crawl = crawl_from(&format!("<html><body><h1>T</h1><p>{}</p></body></html>", p));
        let result = score_content(&crawl);
        assert_eq!(
            result.details.checks["structure"]["answer_first_format"],
            json!(true)
        );
    }

    #[test]
    fn test_empty_document_scores_low_never_negative() {
        let result = score_content(&crawl_from("<html><body></body></html>"));
        assert!(result.score >= 0.0);
        assert!(result.score <= 100.0);
        assert!(result.details.findings.iter().any(|f| f == "no_h1"));
        assert!(result.details.findings.iter().any(|f| f == "no_citations"));
    }

    #[test]
    fn test_failed_crawl_errors() {
        let mut crawl = CrawlResult::new("https://example.com");
        crawl.error = Some("HTTP 404".into());
        let result = score_content(&crawl);
        assert_eq!(result.score, 0.0);
        assert!(result.details.checks.contains_key("error"));
    }

    #[test]
    fn test_keyword_stuffing_penalized() {
        let stuffed = "best widgets ".repeat(120);
        let crawl = crawl_from(&format!(
            "<html><body><h1>T</h1><p>{}</p></body></html>",
            stuffed
        ));
        let result = score_content(&crawl);
        assert!(result.details.findings.iter().any(|f| f == "keyword_stuffing"));
        assert_eq!(
            result.details.checks["geo_quality"]["keyword_stuffing_detected"],
            json!(true)
        );
    }

    #[test]
    fn test_idempotent_on_same_input() {
        let crawl = crawl_from(
            "<html><body><h1>T</h1><h2>FAQ</h2><ul><li>a</li></ul><p>According to a study by \
             researchers, 42% of pages improved. Revenue grew 30%.</p></body></html>",
        );
        let first = score_content(&crawl);
        let second = score_content(&crawl);
        assert_eq!(first.score, second.score);
        assert_eq!(first.details.findings, second.details.findings);
    }

    #[test]
    fn test_rich_page_scores_high() {
        let body: String = (0..40)
            .map(|i| {
                format!(
                    "<p>According to a study by Chen et al. ({year}), adoption grew {pct}% across \
                     the sector. However, practitioners note that API-based workflows matter. \
                     Specifically, Retrieval-Augmented Generation (RAG) pipelines and HTTP \
                     endpoints benefit. Moreover, data from industry reports shows steady gains \
                     in measurable outcomes for teams adopting structured content practices.</p>",
                    year = 2020 + (i % 5),
                    pct = 10 + i
                )
            })
            .collect();
        let html = format!(
            r#"<html><body><h1>Guide</h1><h2>Overview</h2>{body}
            <h2>FAQ</h2><ul><li>Q1</li><li>Q2</li></ul><table><tr><td>x</td></tr></table>
            <a href="/a">a</a><a href="/b">b</a><a href="/c">c</a></body></html>"#
        );
        let result = score_content(&crawl_from(&html));
        assert!(result.score >= 60.0, "score was {}", result.score);
        assert!(!result.details.findings.iter().any(|f| f == "no_citations"));
        assert!(!result.details.findings.iter().any(|f| f == "no_statistics"));
    }
}
