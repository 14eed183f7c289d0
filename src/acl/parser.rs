//! Line-oriented ACL file parser
//!
//! Grammar:
//!
//! ```text
//! # comment
//! user <name>
//! topic [read|write|readwrite] <pattern>
//! ```
//!
//! A `topic` line applies to the client opened by the most recent `user`
//! line. Repeated `user` lines for the same name extend that client's rules.

use super::rules::{AccessMode, RuleModel};
use crate::mqtt::TopicMatcher;
use anyhow::{Context, Result};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Malformed ACL input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Line {line}: {message}: {text}")]
pub struct ParseError {
    /// 1-based line number
    pub line: usize,
    /// What is wrong with the line
    pub message: String,
    /// The offending line, trimmed
    pub text: String,
}

impl ParseError {
    fn new(line: usize, message: &str, text: &str) -> Self {
        Self {
            line,
            message: message.to_string(),
            text: text.to_string(),
        }
    }
}

/// Parser for Mosquitto-style ACL files
#[derive(Debug, Clone, Default)]
pub struct AclParser {
    topic_matcher: TopicMatcher,
}

impl AclParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse ACL text into a rule model
    ///
    /// Parsing is all-or-nothing: the first malformed line aborts the call
    /// and no partial model is returned.
    pub fn parse(&self, text: &str) -> Result<RuleModel, ParseError> {
        let mut model = RuleModel::new();
        let mut current_client: Option<&str> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_number = idx + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let keyword = fields.next().unwrap_or_default();
            let args: Vec<&str> = fields.collect();

            match keyword {
                "user" => {
                    let name = match args.as_slice() {
                        [name] => *name,
                        [] => return Err(self.fail(line_number, "Missing client name", line)),
                        _ => {
                            return Err(self.fail(
                                line_number,
                                "Client name must not contain whitespace",
                                line,
                            ))
                        }
                    };
                    model.add_client(name);
                    current_client = Some(name);
                }
                "topic" => {
                    let (access, pattern) = match args.as_slice() {
                        [pattern] => (AccessMode::default(), *pattern),
                        [access, pattern] => match access.parse::<AccessMode>() {
                            Ok(access) => (access, *pattern),
                            Err(e) => return Err(self.fail(line_number, &e, line)),
                        },
                        [] => return Err(self.fail(line_number, "Missing topic pattern", line)),
                        _ => {
                            return Err(self.fail(
                                line_number,
                                "Too many fields in topic rule",
                                line,
                            ))
                        }
                    };

                    let client = match current_client {
                        Some(client) => client,
                        None => {
                            return Err(self.fail(
                                line_number,
                                "Topic rule without user context",
                                line,
                            ))
                        }
                    };

                    if !self.topic_matcher.has_valid_multi_level_position(pattern) {
                        return Err(self.fail(
                            line_number,
                            "'#' is only allowed in the final topic level",
                            line,
                        ));
                    }

                    model.add_rule(client, access, pattern);
                }
                _ => return Err(self.fail(line_number, "Invalid ACL syntax", line)),
            }
        }

        debug!(
            clients = model.client_count(),
            rules = model.rule_count(),
            "Parsed ACL rules"
        );

        Ok(model)
    }

    /// Read and parse an ACL file
    pub fn parse_file(&self, path: &Path) -> Result<RuleModel> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ACL file: {}", path.display()))?;

        self.parse(&content)
            .with_context(|| format!("Failed to parse ACL file: {}", path.display()))
    }

    fn fail(&self, line: usize, message: &str, text: &str) -> ParseError {
        warn!(line, error = %message, "Rejected ACL line");
        ParseError::new(line, message, text)
    }
}

/// Parse ACL text with a default parser
pub fn parse_acl(text: &str) -> Result<RuleModel, ParseError> {
    AclParser::new().parse(text)
}
