//! Keyed store of parsed rule models
//!
//! Lets a surrounding service keep an uploaded ACL's model between requests.
//! The store is owned by the caller; nothing in the crate keeps one globally.

use crate::acl::RuleModel;
use crate::config::StoreConfig;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

struct StoredModel {
    model: Arc<RuleModel>,
    inserted_at: Instant,
}

/// Bounded, expiring map from key to shared rule model
pub struct RuleModelStore {
    entries: RwLock<HashMap<String, StoredModel>>,
    max_entries: usize,
    ttl: Option<Duration>,
}

impl RuleModelStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: config.max_entries.max(1),
            ttl: (config.ttl_secs > 0).then(|| Duration::from_secs(config.ttl_secs)),
        }
    }

    /// Store a model, evicting the oldest entry when full
    pub fn insert(&self, key: &str, model: RuleModel) -> Arc<RuleModel> {
        let model = Arc::new(model);
        let mut entries = self.entries.write();

        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                debug!(key = %oldest, "Evicting oldest rule model");
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key.to_string(),
            StoredModel {
                model: Arc::clone(&model),
                inserted_at: Instant::now(),
            },
        );

        model
    }

    /// Fetch a model unless missing or expired
    pub fn get(&self, key: &str) -> Option<Arc<RuleModel>> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if self.is_expired(entry) {
            return None;
        }
        Some(Arc::clone(&entry.model))
    }

    pub fn remove(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| !self.is_expired(e));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "Purged expired rule models");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn is_expired(&self, entry: &StoredModel) -> bool {
        self.ttl
            .map_or(false, |ttl| entry.inserted_at.elapsed() >= ttl)
    }
}

impl Default for RuleModelStore {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}
