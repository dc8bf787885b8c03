//! Industry classification for weight-profile selection.
//!
//! Ordered keyword rules scan the page's meta keywords, description, title
//! and the first 1000 chars of body text. The first rule with at least two
//! keyword hits wins; pages matching nothing get the "default" profile.

use scraper::Html;

use crate::html;

const MIN_HITS: usize = 2;

/// Ordered rules. Two rule sets map to "health" so overtly medical pages
/// classify the same as general wellness ones.
const RULES: [(&str, &[&str]); 9] = [
    (
        "health",
        &[
            "health", "wellness", "clinic", "patient", "doctor", "treatment", "symptom",
            "hospital", "therapy", "nutrition",
        ],
    ),
    (
        "health",
        &[
            "medical", "medicine", "diagnosis", "pharmac", "prescription", "dental", "cardio",
            "pediatric",
        ],
    ),
    (
        "finance",
        &[
            "finance", "bank", "invest", "loan", "credit", "insurance", "mortgage", "trading",
            "payment", "tax",
        ],
    ),
    (
        "legal",
        &[
            "law firm", "legal", "attorney", "lawyer", "litigation", "court", "compliance",
            "paralegal", "counsel",
        ],
    ),
    (
        "ecommerce",
        &[
            "shop", "cart", "checkout", "store", "buy now", "shipping", "order", "retail",
            "sale", "marketplace",
        ],
    ),
    (
        "saas",
        &[
            "software", "platform", "saas", "api", "integration", "dashboard", "cloud",
            "automation", "workflow", "analytics",
        ],
    ),
    (
        "education",
        &[
            "course", "learn", "education", "student", "training", "curriculum", "school",
            "university", "tutorial", "degree",
        ],
    ),
    (
        "news",
        &[
            "news", "breaking", "editorial", "journalist", "headline", "coverage", "reporter",
            "press release",
        ],
    ),
    (
        "local_business",
        &[
            "opening hours", "directions", "near me", "located in", "appointment", "visit us",
            "family-owned", "serving the",
        ],
    ),
];

/// Classify the page's vertical from its metadata and opening body text.
pub fn classify_industry(doc: &Html, body_text: &str) -> String {
    let mut haystack = String::new();
    for piece in [
        html::meta_content(doc, "keywords"),
        html::meta_content(doc, "description"),
        html::page_title(doc),
    ]
    .into_iter()
    .flatten()
    {
        haystack.push_str(&piece);
        haystack.push(' ');
    }
    haystack.extend(body_text.chars().take(1000));
    let haystack = haystack.to_lowercase();

    for (industry, keywords) in RULES {
        let hits = keywords.iter().filter(|k| haystack.contains(**k)).count();
        if hits >= MIN_HITS {
            return industry.to_string();
        }
    }
    "default".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(head: &str, body: &str) -> Html {
        html::parse_document(&format!("<html><head>{head}</head><body>{body}</body></html>"))
    }

    #[test]
    fn test_health_page_classified() {
        let doc = page(
            r#"<title>City Clinic</title><meta name="description" content="Patient care and treatment plans">"#,
            "<p>Our doctors provide wellness therapy.</p>",
        );
        let text = "Our doctors provide wellness therapy.";
        assert_eq!(classify_industry(&doc, text), "health");
    }

    #[test]
    fn test_single_hit_is_not_enough() {
        let doc = page("<title>Bank Street Bakery</title>", "<p>Fresh bread daily.</p>");
        assert_eq!(classify_industry(&doc, "Fresh bread daily."), "default");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // Both health and saas keywords present; health is ordered first
        let doc = page(
            r#"<title>Patient Portal Platform</title><meta name="description" content="Clinic software dashboard for doctors">"#,
            "",
        );
        assert_eq!(classify_industry(&doc, ""), "health");
    }

    #[test]
    fn test_saas_from_body_text() {
        let doc = page("<title>Acme</title>", "");
        let text = "Our platform offers api integration and workflow automation.";
        assert_eq!(classify_industry(&doc, text), "saas");
    }

    #[test]
    fn test_body_text_beyond_1000_chars_ignored() {
        let doc = page("<title>Acme</title>", "");
        let padding = "x".repeat(1000);
        let text = format!("{padding} software platform api cloud");
        assert_eq!(classify_industry(&doc, &text), "default");
    }
}
