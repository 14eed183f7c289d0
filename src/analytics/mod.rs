//! Analytics over a parsed rule model
//!
//! Every view is a pure function of the [`RuleModel`]. Topic grouping is
//! done once per analyzer by exact topic string, so the views that group by
//! topic stay linear in the number of rules.
//!
//! Overlaps and the permission matrix compare topics by exact string and do
//! not expand wildcards; [`AclAnalyzer::wildcard_coverage`] is the separate
//! view that applies wildcard semantics.

mod graph;
mod security;
mod summary;

pub use graph::{
    CoveredTopic, GraphEdge, GraphNode, HierarchyNode, MatrixCell, OverlapClient,
    PermissionMatrix, RelationshipGraph, TopicHierarchy, TopicOverlap, WildcardCoverage,
};
pub use security::{security_score, FindingCategory, SecurityFinding, SecurityReport, Severity};
pub use summary::{
    AccessDistribution, ClientSummary, RuleTopic, Statistics, TopicCount, TopicDistribution,
    TopicSummary,
};

use crate::acl::{AccessMode, RuleModel};
use crate::config::AnalysisConfig;
use crate::mqtt::TopicMatcher;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// One rule's reference to a topic string
#[derive(Debug, Clone, Copy)]
pub(crate) struct TopicRef<'a> {
    pub client: &'a str,
    pub access: AccessMode,
}

/// All views of a rule model in one serializable value
#[derive(Debug, Clone, Serialize)]
pub struct AggregateView {
    pub clients: Vec<ClientSummary>,
    pub topics: Vec<TopicSummary>,
    pub relationships: RelationshipGraph,
    pub overlaps: Vec<TopicOverlap>,
    pub hierarchy: TopicHierarchy,
    pub matrix: PermissionMatrix,
    pub security_analysis: SecurityReport,
    pub statistics: Statistics,
}

/// Derives summaries, graphs and a security report from a rule model
pub struct AclAnalyzer<'a> {
    model: &'a RuleModel,
    config: AnalysisConfig,
    topic_matcher: TopicMatcher,
    /// Rule references grouped by exact topic string
    topics: BTreeMap<&'a str, Vec<TopicRef<'a>>>,
}

impl<'a> AclAnalyzer<'a> {
    /// Create an analyzer with default analysis settings
    pub fn new(model: &'a RuleModel) -> Self {
        Self::with_config(model, &AnalysisConfig::default())
    }

    /// Create an analyzer with the given analysis settings
    pub fn with_config(model: &'a RuleModel, config: &AnalysisConfig) -> Self {
        let mut topics: BTreeMap<&'a str, Vec<TopicRef<'a>>> = BTreeMap::new();
        for rule in model.iter_rules() {
            topics.entry(rule.topic.as_str()).or_default().push(TopicRef {
                client: rule.client.as_str(),
                access: rule.access,
            });
        }

        Self {
            model,
            config: config.clone(),
            topic_matcher: TopicMatcher::new(),
            topics,
        }
    }

    /// Compute every view
    ///
    /// An empty model yields empty collections and zero counts.
    pub fn generate_all(&self) -> AggregateView {
        let view = AggregateView {
            clients: self.client_summaries(),
            topics: self.topic_summaries(),
            relationships: self.relationships(),
            overlaps: self.overlaps(),
            hierarchy: self.hierarchy(),
            matrix: self.matrix(),
            security_analysis: self.security_analysis(),
            statistics: self.statistics(),
        };

        debug!(
            clients = view.clients.len(),
            topics = view.topics.len(),
            overlaps = view.overlaps.len(),
            score = view.security_analysis.security_score,
            "Generated ACL analysis"
        );

        view
    }
}

/// Distinct client names referencing a topic, in first-seen order
pub(crate) fn distinct_clients<'a>(refs: &[TopicRef<'a>]) -> Vec<&'a str> {
    let mut seen: HashSet<&'a str> = HashSet::with_capacity(refs.len());
    refs.iter()
        .filter(|r| seen.insert(r.client))
        .map(|r| r.client)
        .collect()
}

/// Analyze a rule model with default settings
pub fn analyze(model: &RuleModel) -> AggregateView {
    AclAnalyzer::new(model).generate_all()
}
