//! Access Control List (ACL) module
//!
//! Parses Mosquitto-style ACL files into a [`RuleModel`], validates it, and
//! writes it back out as canonical ACL text.

mod generator;
mod parser;
mod rules;
mod validate;

pub use generator::{validate_generation_input, AclGenerator, GenerateError};
pub use parser::{parse_acl, AclParser, ParseError};
pub use rules::{AccessMode, ClientRules, Rule, RuleModel};
pub use validate::{validate_acl_rules, ValidationWarning};
