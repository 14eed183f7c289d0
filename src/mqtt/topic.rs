//! MQTT topic pattern matching with wildcards
//!
//! Topic patterns in ACL files use the MQTT filter syntax: `/`-separated
//! levels, `+` for exactly one level and `#` for the remaining levels.
//! Substitution tokens such as `%u` and `%c` are treated as literal levels,
//! since the broker-side identity is not known when analysing a file.

/// Single-level wildcard token
pub const SINGLE_LEVEL: &str = "+";

/// Multi-level wildcard token
pub const MULTI_LEVEL: &str = "#";

/// Topic matcher for MQTT topic patterns
#[derive(Debug, Clone)]
pub struct TopicMatcher;

impl TopicMatcher {
    /// Create a new topic matcher
    pub fn new() -> Self {
        Self
    }

    /// Split a pattern or topic into its levels
    ///
    /// Empty levels are kept, so `a//b` yields three levels.
    pub fn levels<'a>(&self, pattern_or_topic: &'a str) -> Vec<&'a str> {
        pattern_or_topic.split('/').collect()
    }

    /// Check if a topic matches a pattern
    ///
    /// # Arguments
    /// * `pattern` - The ACL pattern (may contain `+` and `#` wildcards)
    /// * `topic` - The topic to test against the pattern
    ///
    /// # Wildcard Rules
    /// * `+` matches exactly one level, including an empty one
    /// * `#` matches zero or more remaining levels and must be the last level
    ///
    /// # Examples
    /// ```
    /// use mqtt_acl_analyzer::mqtt::TopicMatcher;
    ///
    /// let matcher = TopicMatcher::new();
    /// assert!(matcher.matches("sensors/+/living-room", "sensors/temp/living-room"));
    /// assert!(matcher.matches("sensors/#", "sensors/temp/living-room"));
    /// assert!(!matcher.matches("sensors/+/living-room", "sensors/temp/bedroom"));
    /// ```
    pub fn matches(&self, pattern: &str, topic: &str) -> bool {
        let pattern_levels = self.levels(pattern);
        let topic_levels = self.levels(topic);

        self.match_levels(&pattern_levels, &topic_levels)
    }

    fn match_levels(&self, pattern: &[&str], topic: &[&str]) -> bool {
        let mut t_idx = 0;
        let mut p_idx = 0;

        while p_idx < pattern.len() {
            match pattern[p_idx] {
                MULTI_LEVEL => {
                    // Only valid as the final level
                    return p_idx == pattern.len() - 1;
                }
                SINGLE_LEVEL => {
                    if t_idx >= topic.len() {
                        return false;
                    }
                    t_idx += 1;
                    p_idx += 1;
                }
                level => {
                    if t_idx >= topic.len() || topic[t_idx] != level {
                        return false;
                    }
                    t_idx += 1;
                    p_idx += 1;
                }
            }
        }

        t_idx == topic.len()
    }

    /// Whether the string contains a wildcard character anywhere
    pub fn is_wildcard(&self, pattern: &str) -> bool {
        pattern.contains('+') || pattern.contains('#')
    }

    /// Whether the pattern contains the single-level wildcard character
    pub fn has_single_level_wildcard(&self, pattern: &str) -> bool {
        pattern.contains('+')
    }

    /// Whether the pattern is the bare multi-level wildcard, i.e. every topic
    pub fn matches_everything(&self, pattern: &str) -> bool {
        pattern == MULTI_LEVEL
    }

    /// Check that `#` appears only in the final level
    ///
    /// This is the structural rule enforced at parse time. A final level
    /// such as `temp#` passes here and is reported by validation instead.
    pub fn has_valid_multi_level_position(&self, pattern: &str) -> bool {
        let levels = self.levels(pattern);
        let last = levels.len() - 1;
        !levels[..last].iter().any(|level| level.contains('#'))
    }
}

impl Default for TopicMatcher {
    fn default() -> Self {
        Self::new()
    }
}
