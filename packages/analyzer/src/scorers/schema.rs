//! JSON-LD structured-data scoring.
//!
//! Rewards what is present and well-implemented rather than penalizing
//! page-specific types that may live elsewhere on the site. Scoring:
//! 15 pts JSON-LD present (early return at 0 when absent), 5 pts structural
//! validity, up to 15 pts identity-schema completeness, up to 50 pts
//! quality across remaining recognized types, up to 15 pts type variety.

use lazy_static::lazy_static;
use scraper::Selector;
use serde_json::{json, Map, Value};
use std::collections::{BTreeSet, HashMap};

use crate::crawler::CrawlResult;
use crate::types::{PillarDetails, PillarScore};

lazy_static! {
    /// Required properties per schema type. Missing any makes it hollow.
    static ref REQUIRED_PROPS: HashMap<&'static str, Vec<&'static str>> = HashMap::from([
        ("FAQPage", vec!["mainEntity"]),
        ("Article", vec!["headline", "author", "datePublished"]),
        ("NewsArticle", vec!["headline", "author", "datePublished"]),
        ("BlogPosting", vec!["headline", "author", "datePublished"]),
        ("Organization", vec!["name", "url"]),
        ("LocalBusiness", vec!["name", "address"]),
        ("Product", vec!["name"]),
        ("HowTo", vec!["name", "step"]),
        ("BreadcrumbList", vec!["itemListElement"]),
        ("WebSite", vec!["name", "url"]),
        ("WebPage", vec!["name"]),
        ("VideoObject", vec!["name", "uploadDate"]),
        ("Event", vec!["name", "startDate"]),
        ("Review", vec!["itemReviewed", "reviewRating"]),
        ("AggregateRating", vec!["ratingValue", "reviewCount"]),
        ("SoftwareApplication", vec!["name"]),
        ("Service", vec!["name"]),
    ]);

    /// Recommended (optional but valuable) properties per type.
    static ref RECOMMENDED_PROPS: HashMap<&'static str, Vec<&'static str>> = HashMap::from([
        ("FAQPage", vec![]),
        ("Article", vec!["image", "publisher", "dateModified", "description"]),
        ("NewsArticle", vec!["image", "publisher", "dateModified", "description"]),
        ("BlogPosting", vec!["image", "publisher", "dateModified", "description"]),
        ("Organization", vec!["logo", "sameAs", "description", "contactPoint", "address"]),
        ("LocalBusiness", vec!["telephone", "openingHours", "geo"]),
        ("Product", vec!["description", "image", "offers", "brand", "review", "aggregateRating"]),
        ("HowTo", vec!["description", "image", "totalTime"]),
        ("BreadcrumbList", vec![]),
        ("WebSite", vec!["potentialAction", "description"]),
        ("WebPage", vec!["description", "datePublished"]),
        ("VideoObject", vec!["description", "thumbnailUrl", "duration"]),
        ("Event", vec!["location", "description", "endDate"]),
        ("Review", vec!["author", "datePublished"]),
        ("AggregateRating", vec!["bestRating"]),
        ("SoftwareApplication", vec!["applicationCategory", "offers", "operatingSystem"]),
        ("Service", vec!["description", "provider", "areaServed"]),
    ]);
}

const IDENTITY_TYPES: [&str; 3] = ["Organization", "LocalBusiness", "Corporation"];
const ARTICLE_TYPES: [&str; 3] = ["Article", "NewsArticle", "BlogPosting"];

/// Parse every `<script type="application/ld+json">` block, tolerating both
/// single objects and arrays. Unparseable blocks are skipped.
pub fn extract_jsonld(doc: &scraper::Html) -> Vec<Map<String, Value>> {
    let sel = Selector::parse(r#"script[type="application/ld+json"]"#)
        .unwrap_or_else(|_| unreachable!("invalid static selector"));
    let mut schemas = Vec::new();
    for script in doc.select(&sel) {
        let raw: String = script.text().collect();
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => {
                schemas.extend(items.into_iter().filter_map(|v| match v {
                    Value::Object(m) => Some(m),
                    _ => None,
                }));
            }
            Ok(Value::Object(m)) => schemas.push(m),
            _ => continue,
        }
    }
    schemas
}

/// Flatten a schema into its typed objects, descending into `@graph`.
fn all_objects(schema: &Map<String, Value>) -> Vec<&Map<String, Value>> {
    let mut objects = Vec::new();
    if schema.contains_key("@type") {
        objects.push(schema);
    }
    if let Some(Value::Array(graph)) = schema.get("@graph") {
        for item in graph {
            if let Value::Object(m) = item {
                objects.extend(all_objects(m));
            }
        }
    }
    objects
}

fn types_of(obj: &Map<String, Value>) -> Vec<String> {
    match obj.get("@type") {
        Some(Value::String(t)) => vec![t.clone()],
        Some(Value::Array(list)) => list
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(m)) => !m.is_empty(),
        Some(_) => true,
    }
}

struct CompletenessReport {
    completeness: f64,
    required_present: Vec<&'static str>,
    required_missing: Vec<&'static str>,
    recommended_present: Vec<&'static str>,
    recommended_missing: Vec<&'static str>,
}

impl CompletenessReport {
    fn to_json(&self, points: Option<(f64, f64)>) -> Value {
        let mut entry = json!({
            "completeness": (self.completeness * 100.0).round(),
            "required_present": self.required_present,
            "required_missing": self.required_missing,
            "recommended_present": self.recommended_present,
            "recommended_missing": self.recommended_missing,
        });
        if let Some((pts, max)) = points {
            entry["points"] = json!((pts * 10.0).round() / 10.0);
            entry["max_points"] = json!(max);
        }
        entry
    }
}

/// Property completeness in [0,1]: required weighted 0.7, recommended 0.3.
fn compute_completeness(obj: &Map<String, Value>, schema_type: &str) -> CompletenessReport {
    let required = REQUIRED_PROPS.get(schema_type).cloned().unwrap_or_default();
    let recommended = RECOMMENDED_PROPS
        .get(schema_type)
        .cloned()
        .unwrap_or_default();

    let mut report = CompletenessReport {
        completeness: 0.0,
        required_present: Vec::new(),
        required_missing: Vec::new(),
        recommended_present: Vec::new(),
        recommended_missing: Vec::new(),
    };

    for prop in &required {
        if is_present(obj.get(*prop)) {
            report.required_present.push(prop);
        } else {
            report.required_missing.push(prop);
        }
    }
    for prop in &recommended {
        if is_present(obj.get(*prop)) {
            report.recommended_present.push(prop);
        } else {
            report.recommended_missing.push(prop);
        }
    }

    let req_score = if required.is_empty() {
        1.0
    } else {
        report.required_present.len() as f64 / required.len() as f64
    };
    let rec_score = if recommended.is_empty() {
        1.0
    } else {
        report.recommended_present.len() as f64 / recommended.len() as f64
    };
    report.completeness = req_score * 0.7 + rec_score * 0.3;
    report
}

pub fn score_schema(crawl: &CrawlResult) -> PillarScore {
    let Some(doc) = crawl.document() else {
        return PillarScore::errored(crawl.error.clone().unwrap_or_else(|| "crawl failed".into()));
    };

    let mut details = PillarDetails::new();
    let mut score = 0.0;

    let schemas = extract_jsonld(&doc);

    // JSON-LD present (15 pts), early return at exactly 0 when absent
    if schemas.is_empty() {
        details.check("jsonld_present", false);
        details.finding("no_jsonld");
        return PillarScore::new(0.0, details);
    }
    score += 15.0;
    details.check("jsonld_present", true);

    let objects: Vec<&Map<String, Value>> = schemas.iter().flat_map(|s| all_objects(s)).collect();
    let all_types: BTreeSet<String> = objects.iter().flat_map(|o| types_of(o)).collect();
    details.check(
        "types_found",
        Value::Array(all_types.iter().map(|t| json!(t)).collect()),
    );

    // Top-level structural validity (5 pts)
    let valid = schemas
        .iter()
        .all(|s| s.contains_key("@context") || s.contains_key("@graph"));
    details.check("valid_structure", valid);
    if valid {
        score += 5.0;
    } else {
        details.finding("invalid_jsonld_structure");
    }

    let mut completeness_detail = Map::new();

    // Identity schema completeness (15 pts)
    let has_identity = IDENTITY_TYPES.iter().any(|t| all_types.contains(*t));
    details.check("has_identity_schema", has_identity);
    if has_identity {
        'identity: for id_type in IDENTITY_TYPES {
            if !all_types.contains(id_type) {
                continue;
            }
            for obj in &objects {
                if types_of(obj).iter().any(|t| t == id_type) {
                    let report = compute_completeness(obj, id_type);
                    let identity_pts = 15.0 * report.completeness;
                    score += identity_pts;
                    completeness_detail
                        .insert(id_type.to_string(), report.to_json(Some((identity_pts, 15.0))));
                    break 'identity;
                }
            }
        }
    } else {
        details.finding("no_organization_schema");
    }

    // Quality across remaining recognized types (up to 50 pts)
    let mut scored_types: BTreeSet<String> = BTreeSet::new();
    let mut quality_sum = 0.0;
    let mut incomplete: Vec<String> = Vec::new();

    for obj in &objects {
        for schema_type in types_of(obj) {
            if scored_types.contains(&schema_type)
                || IDENTITY_TYPES.contains(&schema_type.as_str())
                || !REQUIRED_PROPS.contains_key(schema_type.as_str())
            {
                continue;
            }
            scored_types.insert(schema_type.clone());
            let report = compute_completeness(obj, &schema_type);
            quality_sum += report.completeness;
            if !report.required_missing.is_empty() {
                incomplete.push(format!("incomplete_{}_schema", schema_type.to_lowercase()));
            }
            details.check(&format!("has_{}", schema_type), true);
            completeness_detail.insert(schema_type, report.to_json(None));
        }
    }
    for finding in &incomplete {
        details.finding(finding);
    }

    if !scored_types.is_empty() {
        let avg = quality_sum / scored_types.len() as f64;
        // 1 type caps at 60%, 2 at 80%, 3+ at 100%
        let coverage = (0.4 + scored_types.len() as f64 * 0.2).min(1.0);
        let quality_pts = 50.0 * avg * coverage;
        score += quality_pts;
        details.check("schema_quality_score", (quality_pts * 10.0).round() / 10.0);
    } else {
        details.check("schema_quality_score", 0);
    }

    details
        .checks
        .insert("completeness".into(), Value::Object(completeness_detail));

    // Variety bonus (15 pts)
    let type_count = all_types.len();
    let variety_pts = match type_count {
        n if n >= 5 => 15.0,
        n if n >= 3 => 10.0,
        2 => 6.0,
        _ => 2.0,
    };
    score += variety_pts;
    details.check("schema_variety", type_count);
    details.check("schema_variety_pts", variety_pts);

    // Page-type absence findings for the recommendation engine
    if !all_types.contains("FAQPage") {
        details.finding("no_faqpage_schema");
    }
    if !ARTICLE_TYPES.iter().any(|t| all_types.contains(*t)) {
        details.finding("no_article_schema");
    }

    PillarScore::new(score, details)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawl_with_jsonld(blocks: &[&str]) -> CrawlResult {
        let scripts: String = blocks
            .iter()
            .map(|b| format!(r#"<script type="application/ld+json">{}</script>"#, b))
            .collect();
        CrawlResult::from_html(
            "https://example.com",
            format!("<html><head>{}</head><body><p>x</p></body></html>", scripts),
        )
    }

    #[test]
    fn test_no_jsonld_early_return() {
        let crawl = CrawlResult::from_html(
            "https://example.com",
            "<html><body><p>no structured data</p></body></html>",
        );
        let result = score_schema(&crawl);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.details.findings, vec!["no_jsonld"]);
    }

    #[test]
    fn test_complete_organization_scores_identity_points() {
        let org = r#"{
            "@context": "https://schema.org",
            "@type": "Organization",
            "name": "Acme",
            "url": "https://example.com",
            "logo": "https://example.com/logo.png",
            "sameAs": ["https://linkedin.com/company/acme"],
            "description": "Widgets",
            "contactPoint": {"@type": "ContactPoint"},
            "address": "1 Main St"
        }"#;
        let result = score_schema(&crawl_with_jsonld(&[org]));
        // 15 present + 5 valid + 15 full identity + 2 variety
        assert_eq!(result.score, 37.0);
        assert!(!result.details.findings.iter().any(|f| f == "no_organization_schema"));
        assert_eq!(result.details.checks["has_identity_schema"], json!(true));
    }

    #[test]
    fn test_incomplete_article_emits_finding() {
        let article = r#"{
            "@context": "https://schema.org",
            "@type": "Article",
            "headline": "Title only"
        }"#;
        let result = score_schema(&crawl_with_jsonld(&[article]));
        assert!(result
            .details
            .findings
            .iter()
            .any(|f| f == "incomplete_article_schema"));
        assert!(result.details.findings.iter().any(|f| f == "no_organization_schema"));
    }

    #[test]
    fn test_graph_nesting_flattened() {
        let graph = r#"{
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "Organization", "name": "Acme", "url": "https://example.com"},
                {"@type": "WebSite", "name": "Acme", "url": "https://example.com"},
                {"@type": "FAQPage", "mainEntity": [{"@type": "Question"}]}
            ]
        }"#;
        let result = score_schema(&crawl_with_jsonld(&[graph]));
        let types = &result.details.checks["types_found"];
        assert_eq!(
            types,
            &json!(["FAQPage", "Organization", "WebSite"])
        );
        assert!(!result.details.findings.iter().any(|f| f == "no_faqpage_schema"));
        assert!(result.details.findings.iter().any(|f| f == "no_article_schema"));
    }

    #[test]
    fn test_missing_context_invalid_structure() {
        let bare = r#"{"@type": "Product", "name": "Widget"}"#;
        let result = score_schema(&crawl_with_jsonld(&[bare]));
        assert!(result
            .details
            .findings
            .iter()
            .any(|f| f == "invalid_jsonld_structure"));
        assert_eq!(result.details.checks["valid_structure"], json!(false));
    }

    #[test]
    fn test_malformed_block_skipped() {
        let result = score_schema(&crawl_with_jsonld(&["{not json at all"]));
        assert_eq!(result.score, 0.0);
        assert_eq!(result.details.findings, vec!["no_jsonld"]);
    }

    #[test]
    fn test_variety_bonus_tiers() {
        let blocks = [
            r#"{"@context": "x", "@type": "Organization", "name": "A", "url": "u"}"#,
            r#"{"@context": "x", "@type": "WebSite", "name": "A", "url": "u"}"#,
            r#"{"@context": "x", "@type": "FAQPage", "mainEntity": ["q"]}"#,
            r#"{"@context": "x", "@type": "BreadcrumbList", "itemListElement": ["a"]}"#,
            r#"{"@context": "x", "@type": "WebPage", "name": "A"}"#,
        ];
        let result = score_schema(&crawl_with_jsonld(&blocks));
        assert_eq!(result.details.checks["schema_variety"], json!(5));
        assert_eq!(result.details.checks["schema_variety_pts"], json!(15.0));
    }
}
