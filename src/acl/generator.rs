//! ACL text generation from a rule model
//!
//! Produces canonical ACL text that parses back to an equivalent model.

use super::rules::{AccessMode, ClientRules, Rule, RuleModel};
use crate::config::GeneratorConfig;
use crate::mqtt::TopicMatcher;
use thiserror::Error;
use tracing::debug;

/// Rule model that cannot be written as ACL text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid rule model: {}", .problems.join("; "))]
pub struct GenerateError {
    pub problems: Vec<String>,
}

/// Check that every client and rule can be written and read back
///
/// Returns one message per problem; an empty list means the model is valid.
pub fn validate_generation_input(model: &RuleModel) -> Vec<String> {
    let matcher = TopicMatcher::new();
    let mut problems = Vec::new();

    for client in model.clients() {
        let name = client.name.as_str();

        if name.is_empty() {
            problems.push("Client name must not be empty".to_string());
        } else if name.chars().any(char::is_whitespace) {
            problems.push(format!("Client name '{}' contains whitespace", name));
        }

        for rule in &client.rules {
            if rule.client != name {
                problems.push(format!(
                    "Rule for client '{}' listed under client '{}'",
                    rule.client, name
                ));
            }

            if rule.topic.is_empty() {
                problems.push(format!("Client '{}' has a rule with an empty topic", name));
            } else if rule.topic.chars().any(char::is_whitespace) {
                problems.push(format!("Topic '{}' contains whitespace", rule.topic));
            } else if !matcher.has_valid_multi_level_position(&rule.topic) {
                problems.push(format!(
                    "Topic '{}' uses '#' before the final level",
                    rule.topic
                ));
            }
        }
    }

    problems
}

/// Writes rule models as ACL text
#[derive(Debug, Clone)]
pub struct AclGenerator {
    sort_clients: bool,
    include_comments: bool,
}

impl AclGenerator {
    pub fn new(sort_clients: bool, include_comments: bool) -> Self {
        Self {
            sort_clients,
            include_comments,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.sort_clients, config.include_comments)
    }

    /// Generate ACL text
    ///
    /// With an `access_filter`, only rules whose access mode is listed are
    /// written. Clients are always written, even with no remaining rules.
    pub fn generate(
        &self,
        model: &RuleModel,
        access_filter: Option<&[AccessMode]>,
    ) -> Result<String, GenerateError> {
        let problems = validate_generation_input(model);
        if !problems.is_empty() {
            return Err(GenerateError { problems });
        }

        let mut clients: Vec<&ClientRules> = model.clients().collect();
        if self.sort_clients {
            clients.sort_by(|a, b| a.name.cmp(&b.name));
        }

        let blocks: Vec<(&str, Vec<&Rule>)> = clients
            .into_iter()
            .map(|client| {
                let rules = client
                    .rules
                    .iter()
                    .filter(|r| access_filter.map_or(true, |f| f.contains(&r.access)))
                    .collect();
                (client.name.as_str(), rules)
            })
            .collect();
        let written_rules: usize = blocks.iter().map(|(_, rules)| rules.len()).sum();

        let mut out = String::new();

        if self.include_comments {
            out.push_str("# Mosquitto ACL file\n");
            out.push_str(&format!(
                "# {} client(s), {} rule(s)\n\n",
                blocks.len(),
                written_rules
            ));
        }

        for (i, (name, rules)) in blocks.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }

            if self.include_comments {
                out.push_str(&format!("# {}: {} rule(s)\n", name, rules.len()));
            }
            out.push_str(&format!("user {}\n", name));

            for rule in rules {
                out.push_str(&format!("topic {} {}\n", rule.access, rule.topic));
            }
        }

        debug!(
            clients = blocks.len(),
            rules = written_rules,
            bytes = out.len(),
            "Generated ACL text"
        );

        Ok(out)
    }
}

impl Default for AclGenerator {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }
}
