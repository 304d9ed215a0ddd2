/// Process-local cache of rendered admin list views
///
/// Holds serialized response payloads keyed by view name so that hot admin
/// list pages skip the database on repeat loads. There is no TTL: entries
/// live until a mutation invalidates them, which every lead-mutating
/// handler does. Like the throttles, this is per-instance state.

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Cached admin view payloads
#[derive(Debug, Default)]
pub struct ViewCache {
    entries: Mutex<HashMap<String, JsonValue>>,
}

/// View key for the admin lead list
pub const LEAD_LIST_VIEW: &str = "admin:leads";

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached payload for a view, if any
    pub fn get(&self, view: &str) -> Option<JsonValue> {
        self.lock().get(view).cloned()
    }

    /// Stores a rendered payload for a view
    pub fn put(&self, view: &str, payload: JsonValue) {
        self.lock().insert(view.to_string(), payload);
    }

    /// Drops the cached payload for a view
    pub fn invalidate(&self, view: &str) {
        self.lock().remove(view);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, JsonValue>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_get_invalidate() {
        let cache = ViewCache::new();
        assert!(cache.get(LEAD_LIST_VIEW).is_none());

        cache.put(LEAD_LIST_VIEW, json!({"leads": [], "total": 0}));
        assert_eq!(
            cache.get(LEAD_LIST_VIEW),
            Some(json!({"leads": [], "total": 0}))
        );

        cache.invalidate(LEAD_LIST_VIEW);
        assert!(cache.get(LEAD_LIST_VIEW).is_none());
    }

    #[test]
    fn test_views_are_independent() {
        let cache = ViewCache::new();
        cache.put("a", json!(1));
        cache.put("b", json!(2));

        cache.invalidate("a");
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b"), Some(json!(2)));
    }
}
