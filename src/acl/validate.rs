//! Advisory checks over a parsed rule model
//!
//! Validation never fails; it returns warnings for the caller to surface.

use super::rules::RuleModel;
use crate::mqtt::{TopicMatcher, MULTI_LEVEL, SINGLE_LEVEL};
use serde::Serialize;
use std::fmt;

/// A non-fatal finding about the rule set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    /// Client the warning is about
    pub client: String,
    /// Topic pattern the warning is about, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Human readable message
    pub message: String,
}

impl ValidationWarning {
    fn client(client: &str, message: String) -> Self {
        Self {
            client: client.to_string(),
            topic: None,
            message,
        }
    }

    fn topic(client: &str, topic: &str, message: String) -> Self {
        Self {
            client: client.to_string(),
            topic: Some(topic.to_string()),
            message,
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validate ACL rules and return a list of warnings
pub fn validate_acl_rules(model: &RuleModel) -> Vec<ValidationWarning> {
    let matcher = TopicMatcher::new();
    let mut warnings = Vec::new();

    for client in model.clients() {
        let name = client.name.as_str();

        if client.rules.is_empty() {
            warnings.push(ValidationWarning::client(
                name,
                format!("Client '{}' has no ACL rules", name),
            ));
            continue;
        }

        for rule in &client.rules {
            let topic = rule.topic.as_str();

            if matcher.matches_everything(topic) && rule.access.allows_write() {
                warnings.push(ValidationWarning::topic(
                    name,
                    topic,
                    format!("Client '{}' has write access to all topics (#) - security risk", name),
                ));
            }

            if matcher.has_single_level_wildcard(topic) && rule.access.allows_write() {
                warnings.push(ValidationWarning::topic(
                    name,
                    topic,
                    format!("Client '{}' has write access to wildcard topic '{}'", name, topic),
                ));
            }

            let levels = matcher.levels(topic);

            if levels.iter().any(|l| l.contains('#') && *l != MULTI_LEVEL) {
                warnings.push(ValidationWarning::topic(
                    name,
                    topic,
                    format!("Topic '{}' combines '#' with other characters in one level", topic),
                ));
            }

            if levels.iter().any(|l| l.contains('+') && *l != SINGLE_LEVEL) {
                warnings.push(ValidationWarning::topic(
                    name,
                    topic,
                    format!("Topic '{}' combines '+' with other characters in one level", topic),
                ));
            }

            if levels.iter().any(|l| l.is_empty()) {
                warnings.push(ValidationWarning::topic(
                    name,
                    topic,
                    format!("Topic '{}' contains an empty level", topic),
                ));
            }
        }
    }

    warnings
}
