//! Configuration types for the ACL analyzer
//!
//! Provides JSON-serializable configuration for analysis thresholds,
//! ACL text generation, the rule model store and CLI output.

use crate::acl::AccessMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// ACL Analyzer Configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct AnalyzerConfig {
    /// Analytics settings
    pub analysis: AnalysisConfig,

    /// ACL text generation settings
    pub generator: GeneratorConfig,

    /// Rule model store settings
    pub store: StoreConfig,

    /// Output settings
    pub output: OutputConfig,
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

// ============================================================================
// Analysis Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AnalysisConfig {
    /// Number of most referenced topics reported in statistics
    pub top_topics: usize,

    /// Total rule count above which a maintenance recommendation is added
    pub large_acl_threshold: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_topics: default_top_topics(),
            large_acl_threshold: default_large_acl_threshold(),
        }
    }
}

// ============================================================================
// Generator Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct GeneratorConfig {
    /// Emit clients sorted by name instead of insertion order
    pub sort_clients: bool,

    /// Emit header and per-client comments
    pub include_comments: bool,

    /// Only emit rules with these access modes (all when unset)
    pub access_filter: Option<Vec<AccessMode>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sort_clients: true,
            include_comments: true,
            access_filter: None,
        }
    }
}

// ============================================================================
// Store Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct StoreConfig {
    /// Maximum number of stored rule models
    pub max_entries: usize,

    /// Entry lifetime in seconds (0 = never expire)
    pub ttl_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

// ============================================================================
// Output Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_top_topics() -> usize {
    5
}

fn default_large_acl_threshold() -> usize {
    100
}

fn default_max_entries() -> usize {
    64
}

fn default_ttl_secs() -> u64 {
    3600
}
