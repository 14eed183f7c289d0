//! MQTT topic handling module
//!
//! Provides topic pattern matching shared by the parser, validation and
//! analytics.

mod topic;

pub use topic::{TopicMatcher, MULTI_LEVEL, SINGLE_LEVEL};
