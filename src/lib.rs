//! MQTT ACL Analyzer
//!
//! Parses Mosquitto-style ACL files and derives structured views of them:
//!
//! - **Client summaries**: rule counts and topics per client
//! - **Topic summaries**: which clients reference each exact topic string
//! - **Relationship graph**: client and topic nodes with one edge per rule
//! - **Overlaps**: exact topics shared by several clients
//! - **Hierarchy**: tree of non-wildcard topics split on `/`
//! - **Permission matrix**: client x topic access table
//! - **Security analysis**: heuristic findings and a 0-100 score
//!
//! # Architecture
//!
//! Text is parsed by [`acl::AclParser`] into an immutable [`acl::RuleModel`].
//! [`analytics::AclAnalyzer`] derives every view from the model, using
//! [`mqtt::TopicMatcher`] for topic pattern semantics. [`acl::AclGenerator`]
//! writes a model back out as canonical ACL text.
//!
//! # Example
//!
//! ```
//! use mqtt_acl_analyzer::{analyze, parse_acl};
//!
//! let model = parse_acl("user admin\ntopic readwrite #").unwrap();
//! let view = analyze(&model);
//!
//! assert_eq!(view.security_analysis.issues.len(), 1);
//! assert_eq!(view.security_analysis.security_score, 80);
//! ```
//!
//! # Example Configuration
//!
//! ```json
//! {
//!   "analysis": { "top-topics": 5, "large-acl-threshold": 100 },
//!   "generator": { "sort-clients": true, "include-comments": true },
//!   "store": { "max-entries": 64, "ttl-secs": 3600 },
//!   "output": { "pretty": true }
//! }
//! ```

pub mod acl;
pub mod analytics;
pub mod config;
pub mod mqtt;
pub mod store;

// Re-export main types
pub use acl::{parse_acl, AclGenerator, AclParser, ParseError, RuleModel};
pub use analytics::{analyze, AclAnalyzer, AggregateView};
pub use config::AnalyzerConfig;
pub use store::RuleModelStore;
