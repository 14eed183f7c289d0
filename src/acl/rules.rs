//! ACL rule types and the parsed rule model

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Access granted by a rule
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    /// Subscribe only
    Read,
    /// Publish only
    Write,
    /// Subscribe and publish
    ReadWrite,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::ReadWrite => "readwrite",
        }
    }

    pub fn allows_read(&self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    pub fn allows_write(&self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

impl Default for AccessMode {
    fn default() -> Self {
        Self::ReadWrite
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = String;

    /// Keywords are case-sensitive, as in the ACL file format.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "readwrite" => Ok(Self::ReadWrite),
            other => Err(format!(
                "Invalid access type: {}. Must be one of read, write, readwrite",
                other
            )),
        }
    }
}

/// A single ACL rule for a client
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    /// Client (username) the rule belongs to
    pub client: String,
    /// Access granted
    pub access: AccessMode,
    /// Topic pattern
    pub topic: String,
}

impl Rule {
    pub fn new(client: &str, access: AccessMode, topic: &str) -> Self {
        Self {
            client: client.to_string(),
            access,
            topic: topic.to_string(),
        }
    }
}

/// Rules of one client, in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRules {
    pub name: String,
    pub rules: Vec<Rule>,
}

/// Parsed ACL rule set: client name to that client's ordered rules
///
/// Clients keep their first-seen order and every rule's `client` equals the
/// key it is stored under. Client names are compared byte-for-byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleModel {
    clients: Vec<ClientRules>,
    index: HashMap<String, usize>,
}

impl RuleModel {
    /// Create an empty rule model
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client, keeping its existing rules if already present
    pub fn add_client(&mut self, name: &str) {
        self.entry(name);
    }

    /// Append a rule to a client, registering the client if needed
    pub fn add_rule(&mut self, client: &str, access: AccessMode, topic: &str) {
        self.entry(client).rules.push(Rule::new(client, access, topic));
    }

    fn entry(&mut self, name: &str) -> &mut ClientRules {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                self.clients.push(ClientRules {
                    name: name.to_string(),
                    rules: Vec::new(),
                });
                self.index.insert(name.to_string(), self.clients.len() - 1);
                self.clients.len() - 1
            }
        };
        &mut self.clients[idx]
    }

    /// Clients in insertion order
    pub fn clients(&self) -> impl Iterator<Item = &ClientRules> {
        self.clients.iter()
    }

    /// Client names in insertion order
    pub fn client_names(&self) -> impl Iterator<Item = &str> {
        self.clients.iter().map(|c| c.name.as_str())
    }

    /// Rules of a client, if the client exists
    pub fn rules_for(&self, client: &str) -> Option<&[Rule]> {
        self.index
            .get(client)
            .map(|&idx| self.clients[idx].rules.as_slice())
    }

    /// Whether a client has been registered, with or without rules
    pub fn contains_client(&self, client: &str) -> bool {
        self.index.contains_key(client)
    }

    /// All rules, client by client, in insertion order
    pub fn iter_rules(&self) -> impl Iterator<Item = &Rule> {
        self.clients.iter().flat_map(|c| c.rules.iter())
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn rule_count(&self) -> usize {
        self.clients.iter().map(|c| c.rules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl Serialize for RuleModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.clients.len()))?;
        for client in &self.clients {
            map.serialize_entry(&client.name, &client.rules)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RuleModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RuleModelVisitor;

        impl<'de> Visitor<'de> for RuleModelVisitor {
            type Value = RuleModel;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of client names to rule lists")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<RuleModel, M::Error> {
                let mut model = RuleModel::new();
                while let Some((name, rules)) = access.next_entry::<String, Vec<Rule>>()? {
                    if let Some(rule) = rules.iter().find(|r| r.client != name) {
                        return Err(de::Error::custom(format!(
                            "rule for client '{}' listed under client '{}'",
                            rule.client, name
                        )));
                    }
                    model.entry(&name).rules.extend(rules);
                }
                Ok(model)
            }
        }

        deserializer.deserialize_map(RuleModelVisitor)
    }
}
