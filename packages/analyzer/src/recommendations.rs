//! Finding-to-recommendation rule table and impact ranking.
//!
//! Every finding key a scorer can emit maps to a static rule (what to fix,
//! how, and what it's worth) plus a numeric impact score reflecting
//! published GEO effectiveness research. Candidates sort by impact
//! descending with priority as the tiebreaker; the top 10 are returned and
//! the numeric impact stays internal. A finding with no rule is dropped,
//! so the completeness test below is part of the scorer contract.

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::types::{PillarDetails, Recommendation};

const MAX_RECOMMENDATIONS: usize = 10;
const DEFAULT_IMPACT: i32 = 30;
const INCOMPLETE_SCHEMA_IMPACT: i32 = 45;

#[derive(Clone)]
struct Rule {
    pillar: &'static str,
    priority: &'static str,
    title: &'static str,
    description: &'static str,
    action: &'static str,
    impact_estimate: &'static str,
}

fn priority_rank(priority: &str) -> u8 {
    match priority {
        "critical" => 0,
        "high" => 1,
        "medium" => 2,
        "low" => 3,
        _ => 99,
    }
}

macro_rules! rules {
    ($(($key:literal, $pillar:literal, $priority:literal, $title:literal, $desc:literal, $action:literal, $impact:literal)),* $(,)?) => {
        HashMap::from([
            $(($key, Rule {
                pillar: $pillar,
                priority: $priority,
                title: $title,
                description: $desc,
                action: $action,
                impact_estimate: $impact,
            })),*
        ])
    };
}

lazy_static! {
    static ref RULES: HashMap<&'static str, Rule> = rules![
        // Crawl-level
        ("crawl_blocked_403", "technical", "critical", "Unblock Automated Crawlers",
         "Your server returned 403 Forbidden to our crawler. AI crawlers hitting the same block cannot read your content at all.",
         "Review your WAF/bot-protection rules and allow reputable crawlers. Test with: curl -A 'GPTBot' https://yoursite.com",
         "Could improve your score by ~40 points"),
        ("crawl_timeout", "technical", "critical", "Fix Server Response Time",
         "Your page timed out repeatedly during crawling. AI crawlers abandon slow origins.",
         "Investigate server response times. Ensure the page responds within a few seconds, add caching or a CDN.",
         "Could improve your score by ~35 points"),

        // Content pillar
        ("no_h1", "content", "critical", "Add an H1 Tag",
         "Your page is missing an H1 tag. This is the first thing AI models look at to understand your page topic.",
         "Add a single H1 tag wrapping your page title: <h1>Your Page Title</h1>. Ensure it clearly describes the page content.",
         "Could improve your score by ~10 points"),
        ("multiple_h1", "content", "high", "Use Only One H1 Tag",
         "Your page has multiple H1 tags. AI models expect a single, clear page title.",
         "Keep only one H1 tag for your main page title. Convert other H1 tags to H2 or H3.",
         "Could improve your score by ~5 points"),
        ("broken_heading_hierarchy", "content", "high", "Fix Heading Hierarchy",
         "Your heading tags skip levels (e.g., H1 to H3). AI models use heading hierarchy to understand content structure.",
         "Ensure headings follow a logical order: H1, then H2, then H3. Never skip levels.",
         "Could improve your score by ~10 points"),
        ("no_faq_section", "content", "high", "Add an FAQ Section",
         "No FAQ section detected. FAQ content directly maps to how LLMs extract answers for users.",
         "Add an FAQ section with Q&A pairs. Use <h2>FAQ</h2> or <h2>Frequently Asked Questions</h2> followed by question/answer pairs.",
         "Could improve your score by ~15 points"),
        ("no_lists", "content", "medium", "Add Structured Lists",
         "No bullet or numbered lists found. Lists help AI models parse and cite specific items.",
         "Add <ul> or <ol> lists to present key points, features, or steps in your content.",
         "Could improve your score by ~10 points"),
        ("no_tables", "content", "low", "Add Data Tables",
         "No tables found. Tables help AI extract structured comparisons and data.",
         "Where appropriate, present comparative data or specifications in <table> format.",
         "Could improve your score by ~5 points"),
        ("no_answer_first", "content", "high", "Lead With the Answer",
         "Your opening paragraph doesn't answer the page's core question directly. AI models lift answer-first passages verbatim.",
         "Rewrite your first paragraph to state the direct answer in 20-60 words, then elaborate below it.",
         "Could improve your score by ~10 points"),
        ("low_word_count", "content", "high", "Expand Content Length",
         "Your page has thin content (<800 words). Thin content rarely gets cited by AI models.",
         "Expand your content to 1,500+ words. Cover the topic comprehensively with sections, examples, and explanations.",
         "Could improve your score by ~15 points"),
        ("poor_readability", "content", "medium", "Improve Readability",
         "Your content readability is outside the optimal range (8th-12th grade level).",
         "Simplify your writing. Aim for 8th-12th grade reading level. Use shorter sentences, simpler words, and bullet points.",
         "Could improve your score by ~5 points"),
        ("poor_paragraph_structure", "content", "medium", "Improve Paragraph Structure",
         "Paragraphs are too long or too short. Ideal paragraphs are 40-150 words.",
         "Break long paragraphs into focused chunks of 40-150 words each. Each paragraph should cover one idea.",
         "Could improve your score by ~10 points"),
        ("few_internal_links", "content", "medium", "Add More Internal Links",
         "Fewer than 3 internal links found. Internal links help AI models understand your site structure.",
         "Add at least 3 internal links to related pages on your site within your content.",
         "Could improve your score by ~10 points"),
        ("no_citations", "content", "critical", "Add Source Citations",
         "No citations of sources found. Cited claims are the single strongest driver of AI answer inclusion.",
         "Cite sources inline ('according to...', 'a study by...') and link them. Add a References section listing your sources.",
         "Could improve your score by ~25 points"),
        ("no_statistics", "content", "high", "Add Statistics and Data Points",
         "No statistics found. Concrete numbers make content far more quotable for AI answers.",
         "Add relevant statistics, percentages, and measured outcomes, each attributed to its source.",
         "Could improve your score by ~15 points"),
        ("no_expert_quotes", "content", "high", "Add Expert Quotations",
         "No quotations found. Direct expert quotes boost authority and quotability.",
         "Quote domain experts with attribution, in quotation marks or <blockquote> elements.",
         "Could improve your score by ~15 points"),
        ("weak_authoritative_tone", "content", "medium", "Strengthen Authoritative Tone",
         "Hedging language outweighs authoritative phrasing. AI models prefer confident, verifiable statements.",
         "Replace hedges ('might', 'perhaps', 'some say') with evidence-backed statements ('research shows', 'data indicates').",
         "Could improve your score by ~10 points"),
        ("no_technical_terms", "content", "low", "Use Domain Terminology",
         "Little domain-specific terminology found. Subject-matter vocabulary signals topical depth.",
         "Use the established technical terms of your field, and define acronyms on first use.",
         "Could improve your score by ~5 points"),
        ("low_vocabulary_diversity", "content", "low", "Vary Your Vocabulary",
         "Vocabulary repetition is high. Repetitive wording reads as thin or generated content.",
         "Rework repetitive sections with synonyms and varied sentence openings.",
         "Could improve your score by ~5 points"),
        ("keyword_stuffing", "content", "high", "Remove Keyword Stuffing",
         "One phrase dominates your content. Keyword stuffing is penalized by both search and AI ranking.",
         "Reduce repetition of the dominant phrase and write naturally; the topic only needs stating a few times.",
         "Could improve your score by ~10 points"),

        // Schema pillar
        ("no_jsonld", "schema", "critical", "Add JSON-LD Structured Data",
         "No structured data markup found. Schema markup is essential for AI to understand your content type.",
         "Add structured data using JSON-LD. At minimum, include Organization schema: <script type=\"application/ld+json\">{\"@context\":\"https://schema.org\",\"@type\":\"Organization\",\"name\":\"Your Company\",\"url\":\"https://yoursite.com\"}</script>",
         "Could improve your score by ~25 points"),
        ("no_faqpage_schema", "schema", "high", "Add FAQPage Schema",
         "No FAQPage schema found. Pages with FAQ schema show 30-40% higher AI visibility.",
         "Add FAQPage schema markup to your FAQ section. Use: {\"@type\":\"FAQPage\",\"mainEntity\":[{\"@type\":\"Question\",\"name\":\"...\",\"acceptedAnswer\":{\"@type\":\"Answer\",\"text\":\"...\"}}]}",
         "Could improve your score by ~15 points"),
        ("no_article_schema", "schema", "high", "Add Article Schema",
         "No Article/BlogPosting schema found. Article schema helps AI understand your content's authorship and topic.",
         "Add Article schema: {\"@type\":\"Article\",\"headline\":\"...\",\"author\":{\"@type\":\"Person\",\"name\":\"...\"},\"datePublished\":\"...\",\"publisher\":{\"@type\":\"Organization\",\"name\":\"...\"}}",
         "Could improve your score by ~15 points"),
        ("no_organization_schema", "schema", "high", "Add Organization Schema",
         "No Organization schema found. This is critical for AI brand recognition.",
         "Add Organization schema with name, url, logo, and sameAs (social profiles).",
         "Could improve your score by ~15 points"),
        ("invalid_jsonld_structure", "schema", "medium", "Fix JSON-LD Structure",
         "Your JSON-LD markup has structural issues (missing @context).",
         "Ensure all JSON-LD blocks include \"@context\": \"https://schema.org\" at the top level.",
         "Could improve your score by ~15 points"),

        // E-E-A-T pillar
        ("no_author", "eeat", "high", "Add Author Attribution",
         "No author name found. E-E-A-T signals are critical for AI trust and citation.",
         "Add visible author name using <span class=\"author\">Author Name</span> or a meta tag: <meta name=\"author\" content=\"Author Name\">.",
         "Could improve your score by ~15 points"),
        ("no_author_bio", "eeat", "medium", "Add Author Bio",
         "No author bio found. Author credentials boost AI trust signals.",
         "Add an author bio section with credentials: <div class=\"author-bio\">Author Name is a [credentials]...</div>",
         "Could improve your score by ~10 points"),
        ("no_publish_date", "eeat", "medium", "Add Publish Date",
         "No publish date found. AI models prefer fresh, dated content.",
         "Add a visible publish date using <time datetime=\"2025-01-15\">January 15, 2025</time> or add article:published_time meta tag.",
         "Could improve your score by ~10 points"),
        ("no_updated_date", "eeat", "medium", "Add Last Updated Date",
         "No update date found. Showing when content was last updated signals freshness to AI.",
         "Add article:modified_time meta tag or a visible \"Last updated: [date]\" on the page.",
         "Could improve your score by ~10 points"),
        ("few_external_citations", "eeat", "high", "Add External Citations",
         "Fewer than 3 external citations. AI models trust content that references credible sources.",
         "Add 3+ citations linking to authoritative external sources (research papers, industry reports, government sites).",
         "Could improve your score by ~15 points"),
        ("no_trust_links", "eeat", "high", "Add Authoritative Source Links",
         "No links to high-trust domains (.gov, .edu, Wikipedia, etc.) found.",
         "Add links to authoritative sources like .gov, .edu, Wikipedia, or major publications to support your claims.",
         "Could improve your score by ~15 points"),
        ("low_source_diversity", "eeat", "medium", "Diversify External Sources",
         "External links come from fewer than 3 different domains.",
         "Link to at least 3 different authoritative domains to demonstrate research breadth.",
         "Could improve your score by ~10 points"),
        ("no_about_page", "eeat", "medium", "Add an About Page",
         "No about page linked from your content. Organizational transparency is a core trust signal.",
         "Create an about page describing who is behind the site, and link it from your main navigation.",
         "Could improve your score by ~10 points"),
        ("no_first_hand_experience", "eeat", "medium", "Show First-Hand Experience",
         "No first-hand experience signals found ('we tested', 'in my experience', case studies).",
         "Describe what you actually did: tests run, products used, results measured. Experience is the first E in E-E-A-T.",
         "Could improve your score by ~10 points"),
        ("no_expertise_indicators", "eeat", "medium", "Add Expertise Indicators",
         "No expertise signals found (credentials, certifications, years of experience).",
         "Mention relevant credentials, certifications, or expertise of content authors.",
         "Could improve your score by ~10 points"),
        ("low_authority", "eeat", "medium", "Build Topical Authority",
         "Content shows weak authoritativeness signals for its topic.",
         "Reference recognized work in the field, earn citations from industry publications, and publish consistently on the topic.",
         "Could improve your score by ~10 points"),
        ("low_trust_signals", "eeat", "medium", "Strengthen Trust Signals",
         "Content shows weak trustworthiness signals (sourcing, transparency, disclosure).",
         "Add source attribution for claims, an editorial or review policy, and clear contact information.",
         "Could improve your score by ~10 points"),

        // Technical pillar
        ("no_llms_txt", "technical", "high", "Create llms.txt File",
         "No llms.txt found. This emerging standard tells AI models what your site is about.",
         "Create an llms.txt file at your domain root (e.g., yoursite.com/llms.txt). Include: site name, description, key pages, and contact info.",
         "Could improve your score by ~20 points"),
        ("ai_bots_blocked", "technical", "critical", "Unblock AI Crawlers in robots.txt",
         "Your robots.txt blocks AI crawlers. This prevents AI models from indexing your content.",
         "Update your robots.txt to allow AI bots. Add:\nUser-agent: GPTBot\nAllow: /\nUser-agent: Google-Extended\nAllow: /\nUser-agent: anthropic-ai\nAllow: /",
         "Could improve your score by ~20 points"),
        ("no_sitemap", "technical", "medium", "Add sitemap.xml",
         "No sitemap.xml found. AI crawlers use sitemaps to discover content.",
         "Add a sitemap.xml to your domain root. Most CMS platforms generate these automatically.",
         "Could improve your score by ~10 points"),
        ("meta_noindex", "technical", "critical", "Remove noindex Meta Tag",
         "Your page has a noindex meta tag, preventing AI models from indexing it.",
         "Remove <meta name=\"robots\" content=\"noindex\"> or change to content=\"index, follow\".",
         "Could improve your score by ~10 points"),
        ("no_https", "technical", "high", "Enable HTTPS",
         "Your site does not use HTTPS. Secure connections are a trust signal.",
         "Install an SSL certificate and redirect HTTP to HTTPS.",
         "Could improve your score by ~5 points"),
        ("slow_load_time", "technical", "medium", "Improve Page Load Speed",
         "Your page takes over 5 seconds to load. Fast pages are prioritized by AI crawlers.",
         "Optimize images, enable compression, use a CDN, and minimize JavaScript.",
         "Could improve your score by ~15 points"),
        ("no_viewport", "technical", "medium", "Add Viewport Meta Tag",
         "No viewport meta tag found. This affects mobile-friendliness.",
         "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"> to your <head>.",
         "Could improve your score by ~10 points"),
        ("no_canonical", "technical", "medium", "Add Canonical Tag",
         "No canonical URL tag found. This helps prevent duplicate content issues.",
         "Add <link rel=\"canonical\" href=\"https://yoursite.com/page-url\"> to your <head>.",
         "Could improve your score by ~10 points"),

        // Entity / AI visibility
        ("brand_not_in_ai", "entity", "high", "Improve AI Brand Visibility",
         "Your brand doesn't appear in AI responses for your category.",
         "Focus on getting mentioned in third-party publications, review sites, and industry directories to build brand authority.",
         "Could improve your score by ~20 points"),
        ("no_social_profiles", "entity", "low", "Link Social Media Profiles",
         "No social media profile links found on your page.",
         "Link your social media profiles (LinkedIn, Twitter/X, Facebook) from your page footer to strengthen brand entity signals.",
         "Could improve your score by ~10 points"),
        ("no_wikipedia_presence", "entity", "medium", "Build Wikipedia Presence",
         "Your brand was not found on Wikipedia. Wikipedia presence strongly influences AI knowledge.",
         "Work toward Wikipedia notability through press coverage, awards, and industry recognition.",
         "Could improve your score by ~25 points"),
    ];

    /// Effectiveness ranking, separate from the per-page impact estimates.
    /// Derived from published GEO research: crawl access and citations
    /// dominate; cosmetic structure fixes trail.
    static ref IMPACT_SCORES: HashMap<&'static str, i32> = HashMap::from([
        ("crawl_blocked_403", 98),
        ("no_citations", 95),
        ("ai_bots_blocked", 92),
        ("meta_noindex", 90),
        ("crawl_timeout", 88),
        ("no_statistics", 85),
        ("no_jsonld", 82),
        ("no_expert_quotes", 78),
        ("brand_not_in_ai", 75),
        ("no_llms_txt", 72),
        ("no_faqpage_schema", 70),
        ("no_faq_section", 68),
        ("weak_authoritative_tone", 66),
        ("no_organization_schema", 64),
        ("no_article_schema", 62),
        ("low_word_count", 60),
        ("no_wikipedia_presence", 58),
        ("no_author", 56),
        ("few_external_citations", 55),
        ("no_trust_links", 54),
        ("no_first_hand_experience", 52),
        ("no_expertise_indicators", 50),
        ("low_authority", 48),
        ("low_trust_signals", 48),
        ("keyword_stuffing", 47),
        ("no_publish_date", 46),
        ("no_answer_first", 44),
        ("invalid_jsonld_structure", 43),
        ("poor_readability", 42),
        ("no_h1", 40),
        ("broken_heading_hierarchy", 38),
        ("multiple_h1", 36),
        ("no_updated_date", 35),
        ("poor_paragraph_structure", 34),
        ("low_vocabulary_diversity", 33),
        ("slow_load_time", 32),
        ("no_https", 31),
        ("no_technical_terms", 30),
        ("few_internal_links", 29),
        ("no_lists", 28),
        ("no_sitemap", 27),
        ("no_tables", 26),
        ("low_source_diversity", 25),
        ("no_about_page", 23),
        ("no_viewport", 22),
        ("no_canonical", 21),
        ("no_author_bio", 24),
        ("no_social_profiles", 20),
    ]);
}

/// Resolve a finding key to its rule. `incomplete_<type>_schema` keys are
/// synthesized since the schema scorer emits one per recognized type.
fn resolve(finding: &str) -> Option<(Recommendation, i32)> {
    if let Some(rule) = RULES.get(finding) {
        let impact = IMPACT_SCORES.get(finding).copied().unwrap_or(DEFAULT_IMPACT);
        return Some((
            Recommendation {
                pillar: rule.pillar.to_string(),
                priority: rule.priority.to_string(),
                title: rule.title.to_string(),
                description: rule.description.to_string(),
                action: rule.action.to_string(),
                impact_estimate: rule.impact_estimate.to_string(),
                category: rule.pillar.to_string(),
            },
            impact,
        ));
    }

    let schema_type = finding
        .strip_prefix("incomplete_")
        .and_then(|rest| rest.strip_suffix("_schema"))?;
    let display = capitalize(schema_type);
    Some((
        Recommendation {
            pillar: "schema".to_string(),
            priority: "medium".to_string(),
            title: format!("Complete Your {} Schema", display),
            description: format!(
                "Your {} schema is missing required properties, which limits how AI models can use it.",
                display
            ),
            action: format!(
                "Fill in the required properties for your {} schema block. Validate with the schema.org validator.",
                display
            ),
            impact_estimate: "Could improve your score by ~10 points".to_string(),
            category: "schema".to_string(),
        },
        INCOMPLETE_SCHEMA_IMPACT,
    ))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Generate the ranked top-10 recommendations from all pillar findings.
/// Duplicate keys across pillars collapse to one entry; unknown keys drop.
pub fn generate_recommendations(pillar_details: &[&PillarDetails]) -> Vec<Recommendation> {
    let mut seen: Vec<&str> = Vec::new();
    let mut candidates: Vec<(Recommendation, i32)> = Vec::new();

    for details in pillar_details {
        for finding in &details.findings {
            if seen.contains(&finding.as_str()) {
                continue;
            }
            seen.push(finding);
            if let Some(candidate) = resolve(finding) {
                candidates.push(candidate);
            }
        }
    }

    candidates.sort_by(|(a, a_impact), (b, b_impact)| {
        b_impact
            .cmp(a_impact)
            .then_with(|| priority_rank(&a.priority).cmp(&priority_rank(&b.priority)))
    });

    candidates
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|(rec, _)| rec)
        .collect()
}
