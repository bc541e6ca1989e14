use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ServiceError, ServiceResult};

/// Marker for settings records bound 1:1 to a service type.
///
/// Identity is the concrete type: the manager matches a service's declared
/// requirement against the set by `TypeId`, never by name or position.
pub trait ServiceConfig: Any + Send + Sync + fmt::Debug {}

/// Identity of a configuration requirement declared by a service.
#[derive(Debug, Clone, Copy)]
pub struct ConfigKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl ConfigKey {
    #[inline]
    pub fn of<C: ServiceConfig>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            type_name: type_name::<C>(),
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// Type-keyed configuration store.
///
/// Holds at most one entry per concrete config type. Inserting a second
/// entry of the same type is a hard error rather than first-match-wins:
/// two candidate configurations for one service is an authoring mistake,
/// and silently picking one hid real misconfiguration in practice.
#[derive(Default)]
pub struct ConfigSet {
    by_type: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ConfigSet {
    #[inline]
    pub fn new() -> Self {
        Self {
            by_type: HashMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    pub fn insert<C: ServiceConfig>(&mut self, cfg: C) -> ServiceResult<()> {
        let k = TypeId::of::<C>();
        if self.by_type.contains_key(&k) {
            return Err(ServiceError::DuplicateConfig {
                type_name: type_name::<C>(),
            });
        }
        self.by_type.insert(k, Arc::new(cfg));
        Ok(())
    }

    #[inline]
    pub fn contains_key(&self, key: &ConfigKey) -> bool {
        self.by_type.contains_key(&key.type_id())
    }

    #[inline]
    pub fn contains<C: ServiceConfig>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<C>())
    }

    /// Shared handle to the config of type `C`, if present.
    ///
    /// Configurations are immutable from the service's perspective after
    /// binding, so handing out `Arc`s is safe.
    #[inline]
    pub fn get<C: ServiceConfig>(&self) -> Option<Arc<C>> {
        self.by_type
            .get(&TypeId::of::<C>())
            .cloned()
            .and_then(|v| v.downcast::<C>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct AudioConfig {
        volume: f32,
    }
    impl ServiceConfig for AudioConfig {}

    #[derive(Debug)]
    struct InputConfig;
    impl ServiceConfig for InputConfig {}

    #[test]
    fn insert_then_get_returns_same_values() {
        let mut set = ConfigSet::new();
        set.insert(AudioConfig { volume: 0.5 }).unwrap();

        let cfg = set.get::<AudioConfig>().unwrap();
        assert_eq!(*cfg, AudioConfig { volume: 0.5 });
        assert!(set.get::<InputConfig>().is_none());
    }

    #[test]
    fn duplicate_type_is_a_hard_error() {
        let mut set = ConfigSet::new();
        set.insert(AudioConfig { volume: 0.5 }).unwrap();

        let err = set.insert(AudioConfig { volume: 0.9 }).unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateConfig { .. }));

        // Original entry survives the rejected insert.
        assert_eq!(set.get::<AudioConfig>().unwrap().volume, 0.5);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn contains_key_matches_by_type() {
        let mut set = ConfigSet::new();
        set.insert(InputConfig).unwrap();

        assert!(set.contains_key(&ConfigKey::of::<InputConfig>()));
        assert!(!set.contains_key(&ConfigKey::of::<AudioConfig>()));
    }
}
