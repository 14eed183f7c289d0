//! Heuristic security assessment of a rule set

use super::{distinct_clients, AclAnalyzer, TopicRef};
use serde::Serialize;
use tracing::debug;

const ISSUE_PENALTY: usize = 20;
const WARNING_PENALTY: usize = 5;
const MAX_SCORE: usize = 100;

const RECOMMEND_EXPLICIT_PREFIXES: &str =
    "Review and restrict overly permissive wildcard permissions: grant write on explicit topic prefixes instead of '#'";
const RECOMMEND_NARROW_WILDCARDS: &str =
    "Replace write access on '+' patterns with the concrete topics each client publishes to";
const RECOMMEND_SINGLE_WRITER: &str =
    "Consider implementing least-privilege access controls so each topic has a single publishing client";
const RECOMMEND_GROUP_CLIENTS: &str =
    "Large ACL files can be difficult to maintain - consider grouping similar clients";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Medium,
    High,
}

/// Kind of heuristic that produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    /// Write or readwrite on the bare `#` pattern
    WriteAllTopics,
    /// Write or readwrite on a pattern containing `+`
    WildcardWrite,
    /// More than one client can write to the same exact topic
    MultipleWriters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityFinding {
    pub level: Severity,
    pub category: FindingCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Short title
    pub issue: String,
    pub description: String,
}

/// Result of the security assessment
#[derive(Debug, Clone, Serialize)]
pub struct SecurityReport {
    pub issues: Vec<SecurityFinding>,
    pub warnings: Vec<SecurityFinding>,
    pub recommendations: Vec<String>,
    /// 0-100, higher is better
    pub security_score: u32,
}

/// Score from finding counts: `max(0, 100 - 20 * issues - 5 * warnings)`
pub fn security_score(issue_count: usize, warning_count: usize) -> u32 {
    let score = MAX_SCORE
        .saturating_sub(issue_count.saturating_mul(ISSUE_PENALTY))
        .saturating_sub(warning_count.saturating_mul(WARNING_PENALTY));
    score as u32
}

fn fired(findings: &[SecurityFinding], category: FindingCategory) -> bool {
    findings.iter().any(|f| f.category == category)
}

impl<'a> AclAnalyzer<'a> {
    /// Assess the rule set for overly broad write access
    pub fn security_analysis(&self) -> SecurityReport {
        let mut issues = Vec::new();
        let mut warnings = Vec::new();

        for rule in self.model.iter_rules() {
            if !rule.access.allows_write() {
                continue;
            }

            if self.topic_matcher.matches_everything(&rule.topic) {
                debug!(client = %rule.client, access = %rule.access, "Write access to all topics");
                issues.push(SecurityFinding {
                    level: Severity::High,
                    category: FindingCategory::WriteAllTopics,
                    client: Some(rule.client.clone()),
                    topic: Some(rule.topic.clone()),
                    issue: "Write access to all topics (#)".to_string(),
                    description: format!(
                        "Client '{}' has {} access to all topics",
                        rule.client, rule.access
                    ),
                });
            }

            if self.topic_matcher.has_single_level_wildcard(&rule.topic) {
                debug!(client = %rule.client, topic = %rule.topic, "Write access to wildcard topic");
                warnings.push(SecurityFinding {
                    level: Severity::Medium,
                    category: FindingCategory::WildcardWrite,
                    client: Some(rule.client.clone()),
                    topic: Some(rule.topic.clone()),
                    issue: "Write access to wildcard topics".to_string(),
                    description: format!(
                        "Client '{}' has {} access to '{}'",
                        rule.client, rule.access, rule.topic
                    ),
                });
            }
        }

        for (topic, refs) in &self.topics {
            let writers: Vec<TopicRef<'_>> =
                refs.iter().filter(|r| r.access.allows_write()).copied().collect();
            let writers = distinct_clients(&writers);

            if writers.len() > 1 {
                debug!(topic = %topic, writers = writers.len(), "Multiple writers to topic");
                warnings.push(SecurityFinding {
                    level: Severity::Medium,
                    category: FindingCategory::MultipleWriters,
                    client: None,
                    topic: Some(topic.to_string()),
                    issue: "Multiple writers to same topic".to_string(),
                    description: format!(
                        "Multiple clients can write to '{}': {}",
                        topic,
                        writers.join(", ")
                    ),
                });
            }
        }

        let mut recommendations = Vec::new();
        if fired(&issues, FindingCategory::WriteAllTopics) {
            recommendations.push(RECOMMEND_EXPLICIT_PREFIXES.to_string());
        }
        if fired(&warnings, FindingCategory::WildcardWrite) {
            recommendations.push(RECOMMEND_NARROW_WILDCARDS.to_string());
        }
        if fired(&warnings, FindingCategory::MultipleWriters) {
            recommendations.push(RECOMMEND_SINGLE_WRITER.to_string());
        }
        if self.model.rule_count() > self.config.large_acl_threshold {
            recommendations.push(RECOMMEND_GROUP_CLIENTS.to_string());
        }

        SecurityReport {
            security_score: security_score(issues.len(), warnings.len()),
            issues,
            warnings,
            recommendations,
        }
    }
}
