//! Structural views: relationship graph, overlaps, hierarchy and matrix

use super::{distinct_clients, AclAnalyzer};
use crate::acl::AccessMode;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Node of the client/topic graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GraphNode {
    Client {
        id: String,
        label: String,
        /// Number of rules of the client
        size: usize,
    },
    Topic {
        id: String,
        label: String,
        is_wildcard: bool,
    },
}

impl GraphNode {
    pub fn id(&self) -> &str {
        match self {
            Self::Client { id, .. } | Self::Topic { id, .. } => id,
        }
    }
}

/// One rule as a client -> topic edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub access: AccessMode,
    pub label: String,
}

/// Bipartite client/topic graph
#[derive(Debug, Clone, Default, Serialize)]
pub struct RelationshipGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// A client's access to an overlapping topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapClient {
    pub client: String,
    pub access: AccessMode,
}

/// Exact topic string referenced by more than one client
#[derive(Debug, Clone, Serialize)]
pub struct TopicOverlap {
    pub topic: String,
    pub clients: Vec<OverlapClient>,
    pub client_count: usize,
    pub is_wildcard: bool,
}

/// Node of the topic hierarchy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HierarchyNode {
    /// Rules whose topic ends at or below this node
    pub rule_count: usize,
    /// Rules whose topic ends exactly at this node
    pub terminal_rules: usize,
    pub children: BTreeMap<String, HierarchyNode>,
}

/// Tree of exact topics split on `/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopicHierarchy {
    pub rule_count: usize,
    pub children: BTreeMap<String, HierarchyNode>,
}

impl TopicHierarchy {
    /// Look up the node for a topic path
    pub fn node(&self, topic: &str) -> Option<&HierarchyNode> {
        let mut levels = topic.split('/');
        let mut node = self.children.get(levels.next()?)?;
        for level in levels {
            node = node.children.get(level)?;
        }
        Some(node)
    }
}

/// Access of one client to one exact topic string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MatrixCell {
    /// No rule for the pair (serialized as `null`)
    Empty,
    /// Exactly one access mode
    Single(AccessMode),
    /// Several rules with different access modes, in rule order
    Multiple(Vec<AccessMode>),
}

impl MatrixCell {
    fn from_modes(modes: &[AccessMode]) -> Self {
        match modes {
            [] => Self::Empty,
            [mode] => Self::Single(*mode),
            _ => Self::Multiple(modes.to_vec()),
        }
    }

    pub fn modes(&self) -> &[AccessMode] {
        match self {
            Self::Empty => &[],
            Self::Single(mode) => std::slice::from_ref(mode),
            Self::Multiple(modes) => modes,
        }
    }
}

/// Client x topic access matrix
#[derive(Debug, Clone, Default, Serialize)]
pub struct PermissionMatrix {
    /// Row labels, sorted
    pub clients: Vec<String>,
    /// Column labels, sorted
    pub topics: Vec<String>,
    pub matrix: Vec<Vec<MatrixCell>>,
}

impl PermissionMatrix {
    pub fn cell(&self, client: &str, topic: &str) -> Option<&MatrixCell> {
        let row = self.clients.binary_search_by(|c| c.as_str().cmp(client)).ok()?;
        let col = self.topics.binary_search_by(|t| t.as_str().cmp(topic)).ok()?;
        Some(&self.matrix[row][col])
    }
}

/// Exact topic of the model matched by a wildcard pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoveredTopic {
    pub topic: String,
    /// Clients with a rule on the exact topic
    pub clients: Vec<String>,
}

/// Exact topics of the model that a wildcard pattern matches
#[derive(Debug, Clone, Serialize)]
pub struct WildcardCoverage {
    pub pattern: String,
    /// Clients holding the pattern
    pub clients: Vec<String>,
    pub matched_topics: Vec<CoveredTopic>,
}

impl<'a> AclAnalyzer<'a> {
    /// Client and topic nodes with one edge per rule
    pub fn relationships(&self) -> RelationshipGraph {
        let mut graph = RelationshipGraph::default();

        for client in self.model.clients() {
            graph.nodes.push(GraphNode::Client {
                id: format!("client_{}", client.name),
                label: client.name.clone(),
                size: client.rules.len(),
            });
        }

        let mut seen_topics: HashSet<&str> = HashSet::new();
        for rule in self.model.iter_rules() {
            let topic_id = format!("topic_{}", rule.topic);

            if seen_topics.insert(rule.topic.as_str()) {
                graph.nodes.push(GraphNode::Topic {
                    id: topic_id.clone(),
                    label: rule.topic.clone(),
                    is_wildcard: self.topic_matcher.is_wildcard(&rule.topic),
                });
            }

            graph.edges.push(GraphEdge {
                source: format!("client_{}", rule.client),
                target: topic_id,
                access: rule.access,
                label: rule.access.to_string(),
            });
        }

        graph
    }

    /// Exact topics referenced by more than one distinct client
    ///
    /// Ordered like [`AclAnalyzer::topic_summaries`].
    pub fn overlaps(&self) -> Vec<TopicOverlap> {
        let mut overlaps: Vec<TopicOverlap> = self
            .topics
            .iter()
            .filter_map(|(topic, refs)| {
                let client_count = distinct_clients(refs).len();
                if client_count < 2 {
                    return None;
                }

                let mut seen: HashSet<(&str, AccessMode)> = HashSet::with_capacity(refs.len());
                let clients: Vec<OverlapClient> = refs
                    .iter()
                    .filter(|r| seen.insert((r.client, r.access)))
                    .map(|r| OverlapClient {
                        client: r.client.to_string(),
                        access: r.access,
                    })
                    .collect();

                Some(TopicOverlap {
                    topic: topic.to_string(),
                    clients,
                    client_count,
                    is_wildcard: self.topic_matcher.is_wildcard(topic),
                })
            })
            .collect();

        overlaps.sort_by_key(|o| Reverse(o.client_count));
        overlaps
    }

    /// Tree of exact topics; wildcard patterns are left out
    pub fn hierarchy(&self) -> TopicHierarchy {
        let mut root = TopicHierarchy::default();

        for (topic, refs) in &self.topics {
            if self.topic_matcher.is_wildcard(topic) {
                continue;
            }

            let count = refs.len();
            root.rule_count += count;

            let mut levels = self.topic_matcher.levels(topic).into_iter();
            let first = levels.next().unwrap_or_default();
            let mut node = root.children.entry(first.to_string()).or_default();
            node.rule_count += count;

            for level in levels {
                node = node.children.entry(level.to_string()).or_default();
                node.rule_count += count;
            }
            node.terminal_rules += count;
        }

        root
    }

    /// Access matrix over sorted clients and sorted exact topic strings
    ///
    /// Wildcard patterns are their own columns.
    pub fn matrix(&self) -> PermissionMatrix {
        let mut clients: Vec<&str> = self.model.client_names().collect();
        clients.sort_unstable();

        let topics: Vec<&str> = self.topics.keys().copied().collect();

        let matrix = clients
            .iter()
            .map(|&client| {
                let mut granted: HashMap<&str, Vec<AccessMode>> = HashMap::new();
                for rule in self.model.rules_for(client).unwrap_or_default() {
                    let modes = granted.entry(rule.topic.as_str()).or_default();
                    if !modes.contains(&rule.access) {
                        modes.push(rule.access);
                    }
                }

                topics
                    .iter()
                    .map(|topic| {
                        granted
                            .get(topic)
                            .map_or(MatrixCell::Empty, |modes| MatrixCell::from_modes(modes))
                    })
                    .collect()
            })
            .collect();

        PermissionMatrix {
            clients: clients.into_iter().map(String::from).collect(),
            topics: topics.into_iter().map(String::from).collect(),
            matrix,
        }
    }

    /// For each wildcard pattern, the exact topics of the model it matches
    pub fn wildcard_coverage(&self) -> Vec<WildcardCoverage> {
        let (patterns, exact): (Vec<_>, Vec<_>) = self
            .topics
            .iter()
            .partition(|(topic, _)| self.topic_matcher.is_wildcard(topic));

        patterns
            .into_iter()
            .map(|(pattern, refs)| WildcardCoverage {
                pattern: pattern.to_string(),
                clients: distinct_clients(refs).into_iter().map(String::from).collect(),
                matched_topics: exact
                    .iter()
                    .filter(|(topic, _)| self.topic_matcher.matches(pattern, topic))
                    .map(|(topic, topic_refs)| CoveredTopic {
                        topic: topic.to_string(),
                        clients: distinct_clients(topic_refs)
                            .into_iter()
                            .map(String::from)
                            .collect(),
                    })
                    .collect(),
            })
            .collect()
    }
}
