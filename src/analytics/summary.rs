//! Per-client and per-topic summaries and overall statistics

use super::{distinct_clients, AclAnalyzer};
use crate::acl::AccessMode;
use serde::Serialize;
use std::cmp::Reverse;

/// A rule's topic and access as listed in a client summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleTopic {
    pub topic: String,
    pub access: AccessMode,
}

/// Permission summary for one client
#[derive(Debug, Clone, Serialize)]
pub struct ClientSummary {
    pub name: String,
    pub total_rules: usize,
    /// Rules with exactly `read`
    pub read_rules: usize,
    /// Rules with exactly `write`
    pub write_rules: usize,
    /// Rules with exactly `readwrite`
    pub readwrite_rules: usize,
    /// Rules granting read, `readwrite` included
    pub read_permissions: usize,
    /// Rules granting write, `readwrite` included
    pub write_permissions: usize,
    pub wildcard_topics: usize,
    pub exact_topics: usize,
    pub topics: Vec<RuleTopic>,
}

/// Summary of one exact topic string across all clients
#[derive(Debug, Clone, Serialize)]
pub struct TopicSummary {
    pub topic: String,
    /// Distinct clients referencing the topic, sorted
    pub clients: Vec<String>,
    pub client_count: usize,
    /// Rules referencing the topic
    pub rule_count: usize,
    /// Distinct access modes seen, sorted
    pub access_types: Vec<AccessMode>,
    pub is_wildcard: bool,
    pub read_clients: Vec<String>,
    pub write_clients: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessDistribution {
    pub read: usize,
    pub write: usize,
    pub readwrite: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopicDistribution {
    pub exact: usize,
    pub wildcard: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

/// Overall statistics of a rule set
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub total_clients: usize,
    pub total_rules: usize,
    /// Rounded to two decimals, 0 without clients
    pub avg_rules_per_client: f64,
    pub access_distribution: AccessDistribution,
    pub topic_distribution: TopicDistribution,
    pub most_common_topics: Vec<TopicCount>,
}

impl<'a> AclAnalyzer<'a> {
    /// One summary per client, in insertion order
    pub fn client_summaries(&self) -> Vec<ClientSummary> {
        self.model
            .clients()
            .map(|client| {
                let rules = &client.rules;
                let count = |mode: AccessMode| rules.iter().filter(|r| r.access == mode).count();
                let wildcard_topics = rules
                    .iter()
                    .filter(|r| self.topic_matcher.is_wildcard(&r.topic))
                    .count();

                ClientSummary {
                    name: client.name.clone(),
                    total_rules: rules.len(),
                    read_rules: count(AccessMode::Read),
                    write_rules: count(AccessMode::Write),
                    readwrite_rules: count(AccessMode::ReadWrite),
                    read_permissions: rules.iter().filter(|r| r.access.allows_read()).count(),
                    write_permissions: rules.iter().filter(|r| r.access.allows_write()).count(),
                    wildcard_topics,
                    exact_topics: rules.len() - wildcard_topics,
                    topics: rules
                        .iter()
                        .map(|r| RuleTopic {
                            topic: r.topic.clone(),
                            access: r.access,
                        })
                        .collect(),
                }
            })
            .collect()
    }

    /// One summary per exact topic string
    ///
    /// Ordered by descending client count, then ascending topic.
    pub fn topic_summaries(&self) -> Vec<TopicSummary> {
        let mut summaries: Vec<TopicSummary> = self
            .topics
            .iter()
            .map(|(topic, refs)| {
                let mut clients: Vec<String> =
                    distinct_clients(refs).into_iter().map(String::from).collect();
                clients.sort();

                let mut access_types: Vec<AccessMode> = refs.iter().map(|r| r.access).collect();
                access_types.sort();
                access_types.dedup();

                let read: Vec<_> = refs.iter().filter(|r| r.access.allows_read()).copied().collect();
                let write: Vec<_> = refs.iter().filter(|r| r.access.allows_write()).copied().collect();

                TopicSummary {
                    topic: topic.to_string(),
                    client_count: clients.len(),
                    clients,
                    rule_count: refs.len(),
                    access_types,
                    is_wildcard: self.topic_matcher.is_wildcard(topic),
                    read_clients: distinct_clients(&read).into_iter().map(String::from).collect(),
                    write_clients: distinct_clients(&write).into_iter().map(String::from).collect(),
                }
            })
            .collect();

        // Stable sort keeps the ascending topic order from the index
        summaries.sort_by_key(|s| Reverse(s.client_count));
        summaries
    }

    /// Totals, distributions and the most referenced topics
    pub fn statistics(&self) -> Statistics {
        let total_clients = self.model.client_count();
        let total_rules = self.model.rule_count();

        let mut access_distribution = AccessDistribution::default();
        let mut topic_distribution = TopicDistribution::default();

        for rule in self.model.iter_rules() {
            match rule.access {
                AccessMode::Read => access_distribution.read += 1,
                AccessMode::Write => access_distribution.write += 1,
                AccessMode::ReadWrite => access_distribution.readwrite += 1,
            }

            if self.topic_matcher.is_wildcard(&rule.topic) {
                topic_distribution.wildcard += 1;
            } else {
                topic_distribution.exact += 1;
            }
        }

        let mut most_common_topics: Vec<TopicCount> = self
            .topics
            .iter()
            .map(|(topic, refs)| TopicCount {
                topic: topic.to_string(),
                count: refs.len(),
            })
            .collect();
        most_common_topics.sort_by_key(|t| Reverse(t.count));
        most_common_topics.truncate(self.config.top_topics);

        let avg_rules_per_client = if total_clients > 0 {
            (total_rules as f64 / total_clients as f64 * 100.0).round() / 100.0
        } else {
            0.0
        };

        Statistics {
            total_clients,
            total_rules,
            avg_rules_per_client,
            access_distribution,
            topic_distribution,
            most_common_topics,
        }
    }
}
