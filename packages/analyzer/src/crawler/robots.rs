//! Robots.txt parsing and AI-crawler allowance checks.

use std::collections::HashMap;

/// AI assistant crawlers whose access determines the robots allowance score.
pub const AI_BOT_AGENTS: [&str; 7] = [
    "GPTBot",
    "Google-Extended",
    "anthropic-ai",
    "ClaudeBot",
    "PerplexityBot",
    "ChatGPT-User",
    "CCBot",
];

/// Parsed robots.txt rules, grouped per user-agent (lowercase).
#[derive(Debug, Clone, Default)]
pub struct RobotsTxt {
    /// Disallowed path prefixes per named user-agent
    rules: HashMap<String, Vec<String>>,

    /// Disallowed path prefixes for `*`
    default_disallow: Vec<String>,
}

impl RobotsTxt {
    /// Parse robots.txt content. Unknown directives are ignored; a
    /// `User-agent` line opens a group that collects following `Disallow`
    /// lines until the next group starts.
    pub fn parse(content: &str) -> Self {
        let mut robots = Self::default();
        let mut current_agents: Vec<String> = Vec::new();
        let mut in_rules = false;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((directive, value)) = line.split_once(':') else {
                continue;
            };
            let directive = directive.trim().to_lowercase();
            let value = value.trim();

            match directive.as_str() {
                "user-agent" => {
                    // Consecutive User-agent lines share one rule group.
                    if in_rules {
                        current_agents.clear();
                        in_rules = false;
                    }
                    current_agents.push(value.to_lowercase());
                }
                "disallow" => {
                    in_rules = true;
                    if value.is_empty() {
                        continue;
                    }
                    for agent in &current_agents {
                        if agent == "*" {
                            robots.default_disallow.push(value.to_string());
                        } else {
                            robots
                                .rules
                                .entry(agent.clone())
                                .or_default()
                                .push(value.to_string());
                        }
                    }
                }
                _ => {
                    in_rules = true;
                }
            }
        }

        robots
    }

    /// Disallow prefixes that apply to the given agent, wildcard included.
    fn disallows_for(&self, user_agent: &str) -> Vec<&str> {
        let agent_lower = user_agent.to_lowercase();
        let mut paths: Vec<&str> = self
            .rules
            .iter()
            .filter(|(agent, _)| agent.contains(&agent_lower) || agent_lower.contains(agent.as_str()))
            .flat_map(|(_, disallow)| disallow.iter().map(String::as_str))
            .collect();
        paths.extend(self.default_disallow.iter().map(String::as_str));
        paths
    }

    /// True when the agent is blocked from the whole site.
    pub fn blocks_entirely(&self, user_agent: &str) -> bool {
        self.disallows_for(user_agent)
            .iter()
            .any(|path| *path == "/" || *path == "/*")
    }

    /// Check which AI crawlers are blocked from the whole site. Returns the
    /// allowance verdict and the blocked crawler names.
    pub fn ai_bot_allowance(&self) -> (bool, Vec<String>) {
        let blocked: Vec<String> = AI_BOT_AGENTS
            .iter()
            .filter(|bot| self.blocks_entirely(bot))
            .map(|bot| bot.to_string())
            .collect();
        (blocked.is_empty(), blocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gptbot_full_block() {
        let robots = RobotsTxt::parse("User-agent: GPTBot\nDisallow: /");
        let (allows, blocked) = robots.ai_bot_allowance();
        assert!(!allows);
        assert_eq!(blocked, vec!["GPTBot"]);
    }

    #[test]
    fn test_wildcard_blocks_all_ai_bots() {
        let robots = RobotsTxt::parse("User-agent: *\nDisallow: /*");
        let (allows, blocked) = robots.ai_bot_allowance();
        assert!(!allows);
        assert_eq!(blocked.len(), AI_BOT_AGENTS.len());
    }

    #[test]
    fn test_path_disallow_not_a_full_block() {
        let robots = RobotsTxt::parse("User-agent: *\nDisallow: /admin/\nDisallow: /private/");
        let (allows, blocked) = robots.ai_bot_allowance();
        assert!(allows);
        assert!(blocked.is_empty());
    }

    #[test]
    fn test_empty_robots_allows_everything() {
        let robots = RobotsTxt::parse("");
        let (allows, blocked) = robots.ai_bot_allowance();
        assert!(allows);
        assert!(blocked.is_empty());
        assert!(!robots.blocks_entirely("GPTBot"));
    }

    #[test]
    fn test_grouped_agents_share_rules() {
        let content = "User-agent: ClaudeBot\nUser-agent: PerplexityBot\nDisallow: /\n\nUser-agent: *\nDisallow: /tmp/";
        let robots = RobotsTxt::parse(content);
        assert!(robots.blocks_entirely("ClaudeBot"));
        assert!(robots.blocks_entirely("PerplexityBot"));
        assert!(!robots.blocks_entirely("GPTBot"));
    }

    #[test]
    fn test_case_insensitive_directives() {
        let robots = RobotsTxt::parse("USER-AGENT: gptbot\nDISALLOW: /");
        assert!(robots.blocks_entirely("GPTBot"));
    }
}
