use std::any::Any;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::error::ServiceResult;
use crate::host_events::SceneEvent;
use crate::service::{Service, ServiceCtx};

/// Strongly-typed pool key.
///
/// Avoids bare `String` as an "everything id" and gives one place to
/// validate and namespace keys later without touching call-sites.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PoolKey(Box<str>);

impl PoolKey {
    #[inline]
    pub fn new(raw: &str) -> Result<Self, String> {
        let s = raw.trim();
        if s.is_empty() {
            return Err("pool key is empty".to_string());
        }
        Ok(Self(s.into()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PoolKey {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PoolKey").field(&self.as_str()).finish()
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key → object registry for wiring disparate parts of the app together
/// without a direct reference chain.
///
/// Entries hold `Weak` references: the pool never keeps an object alive.
/// An entry whose referent has been dropped answers as not-found and is
/// removed on the next `prune`. The handle is cheap to clone; the inner map
/// is locked because handles are shared across services.
#[derive(Clone, Default)]
pub struct ReferencePool {
    entries: Arc<RwLock<HashMap<PoolKey, Weak<dyn Any + Send + Sync>>>>,
}

impl ReferencePool {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Registers `obj` under `key`. Exactly-once per key: a duplicate key is
    /// rejected with a log and the original entry is retained.
    ///
    /// Returns `true` if the entry was added.
    pub fn add<T: Any + Send + Sync>(&self, key: PoolKey, obj: &Arc<T>) -> bool {
        let mut entries = self.entries.write();
        if entries.contains_key(key.as_str()) {
            log::warn!(target: "pool", "duplicate key rejected: '{key}'");
            return false;
        }
        let dyn_obj: Arc<dyn Any + Send + Sync> = obj.clone();
        entries.insert(key, Arc::downgrade(&dyn_obj));
        true
    }

    /// The object registered under `key`, if the key exists, the referent is
    /// still alive, and it is a `T`.
    pub fn try_get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.entries
            .read()
            .get(key)
            .and_then(Weak::upgrade)
            .and_then(|obj| obj.downcast::<T>().ok())
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Drops every entry whose referent is gone. Returns the removed count.
    pub fn prune(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, weak| weak.strong_count() > 0);
        before - entries.len()
    }
}

/// The pool wrapped as a service, so the manager owns its lifecycle and the
/// scene-event wiring. Other services grab a cloned handle via
/// `ReferencePoolService::pool` after `try_get`ting the service, or are
/// handed one at construction.
pub struct ReferencePoolService {
    pool: ReferencePool,
}

impl ReferencePoolService {
    #[inline]
    pub fn new() -> Self {
        Self {
            pool: ReferencePool::new(),
        }
    }

    #[inline]
    pub fn with_pool(pool: ReferencePool) -> Self {
        Self { pool }
    }

    #[inline]
    pub fn pool(&self) -> ReferencePool {
        self.pool.clone()
    }
}

impl Default for ReferencePoolService {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Send + 'static> Service<E> for ReferencePoolService {
    fn id(&self) -> &'static str {
        "reference-pool"
    }

    fn on_scene_event(
        &mut self,
        _ctx: &mut ServiceCtx<'_, E>,
        event: &SceneEvent,
    ) -> ServiceResult<()> {
        if event.is_transition() {
            let removed = self.pool.prune();
            if removed > 0 {
                log::debug!(target: "pool", "pruned {removed} stale entrie(s) on {event:?}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> PoolKey {
        PoolKey::new(raw).unwrap()
    }

    #[test]
    fn add_then_get_returns_registered_object() {
        let pool = ReferencePool::new();
        let obj = Arc::new(42u32);

        assert!(pool.add(key("answer"), &obj));
        assert_eq!(pool.try_get::<u32>("answer").as_deref(), Some(&42));
    }

    #[test]
    fn duplicate_key_is_rejected_and_original_retained() {
        let pool = ReferencePool::new();
        let first = Arc::new("first".to_string());
        let second = Arc::new("second".to_string());

        assert!(pool.add(key("slot"), &first));
        assert!(!pool.add(key("slot"), &second));
        assert_eq!(pool.try_get::<String>("slot").unwrap().as_str(), "first");
    }

    #[test]
    fn dropped_referent_answers_not_found() {
        let pool = ReferencePool::new();
        let obj = Arc::new(1u8);
        pool.add(key("ephemeral"), &obj);
        drop(obj);

        assert!(pool.try_get::<u8>("ephemeral").is_none());
        // Key is still present until a prune pass.
        assert!(pool.contains("ephemeral"));
    }

    #[test]
    fn prune_drops_dead_entries_and_keeps_live_ones() {
        let pool = ReferencePool::new();
        let keep = Arc::new(7i64);
        let dead = Arc::new(9i64);

        pool.add(key("keep"), &keep);
        pool.add(key("dead"), &dead);
        drop(dead);

        assert_eq!(pool.prune(), 1);
        assert!(!pool.contains("dead"));
        assert_eq!(pool.try_get::<i64>("keep").as_deref(), Some(&7));
    }

    #[test]
    fn type_mismatch_answers_not_found() {
        let pool = ReferencePool::new();
        let obj = Arc::new(3.5f32);
        pool.add(key("value"), &obj);

        assert!(pool.try_get::<u32>("value").is_none());
        assert!(pool.try_get::<f32>("value").is_some());
    }

    #[test]
    fn empty_key_is_invalid() {
        assert!(PoolKey::new("   ").is_err());
    }
}
