use std::any::{type_name, TypeId};
use std::cmp::Reverse;
use std::collections::HashSet;

use crate::bus::Bus;
use crate::config::{ConfigSet, ServiceConfig};
use crate::error::{LifecyclePhase, ServiceError, ServiceResult};
use crate::manager::{ManagerState, ServiceManager};
use crate::service::{Service, ServiceCtx};
use crate::sync::ShutdownToken;

struct Registration<E: Send + 'static> {
    type_id: TypeId,
    type_name: &'static str,
    svc: Box<dyn Service<E>>,
}

/// Explicit startup wiring for a `ServiceManager`.
///
/// Dependents receive typed handles out of the built manager instead of
/// going through a global accessor, and every service is constructed by the
/// caller rather than reflected into existence.
pub struct ServiceManagerBuilder<E: Send + 'static> {
    registrations: Vec<Registration<E>>,
    seen_types: HashSet<TypeId>,
    configs: ConfigSet,
    bus: Option<Bus<E>>,
    shutdown: ShutdownToken,
}

impl<E: Send + 'static> ServiceManagerBuilder<E> {
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
            seen_types: HashSet::new(),
            configs: ConfigSet::new(),
            bus: None,
            shutdown: ShutdownToken::new(),
        }
    }

    /// Adds a configuration record. A second record of the same concrete
    /// type is a hard error.
    pub fn config<C: ServiceConfig>(mut self, cfg: C) -> ServiceResult<Self> {
        self.configs.insert(cfg)?;
        Ok(self)
    }

    /// Registers a service. Call order is registration order.
    ///
    /// A second service of an already-registered concrete type is rejected
    /// for that entry only: logged, skipped, and the rest of the batch is
    /// unaffected.
    pub fn register<S: Service<E> + 'static>(mut self, svc: S) -> Self {
        let type_id = TypeId::of::<S>();
        if !self.seen_types.insert(type_id) {
            log::warn!(
                target: "services",
                "service type already registered, ignoring duplicate: {} ('{}')",
                type_name::<S>(),
                svc.id()
            );
            return self;
        }

        self.registrations.push(Registration {
            type_id,
            type_name: type_name::<S>(),
            svc: Box::new(svc),
        });
        self
    }

    pub fn bus(mut self, bus: Bus<E>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn shutdown_token(mut self, token: ShutdownToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Builds the manager: orders services, binds configurations, runs
    /// `awake`, and returns a `Ready` manager.
    ///
    /// Ordering is decided once, here: priority descending, stable in
    /// registration order, and every later phase uses it unchanged.
    ///
    /// A service whose binding or `awake` fails is logged and dropped from
    /// the live set; the remaining registrations still come up.
    pub fn build(self) -> ServiceManager<E> {
        let Self {
            mut registrations,
            seen_types: _,
            configs,
            bus,
            shutdown,
        } = self;

        registrations.sort_by_key(|r| Reverse(r.svc.priority()));

        let bus = bus.unwrap_or_else(Bus::unbounded);
        let mut manager = ServiceManager::from_parts(configs, bus, shutdown);

        for reg in registrations {
            let Registration {
                type_id,
                type_name,
                mut svc,
            } = reg;
            let id = svc.id();

            if let Some(key) = svc.required_config() {
                if !manager.configs.contains_key(&key) {
                    log::warn!(
                        target: "services",
                        "service '{id}' declares configuration {} but none was provided; \
                         continuing unconfigured",
                        key.type_name()
                    );
                }
            }

            let mut exit = false;
            let constructed = construct(&manager.configs, &manager.bus, svc.as_mut(), &mut exit);
            if exit {
                manager.request_exit();
            }
            match constructed {
                Ok(()) => manager.push(type_id, svc),
                Err(e) => {
                    log::error!(
                        target: "services",
                        "service '{id}' ({type_name}) failed to initialize, skipped: {e}"
                    );
                }
            }
        }

        manager.state = ManagerState::Ready;
        manager
    }
}

impl<E: Send + 'static> Default for ServiceManagerBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn construct<E: Send + 'static>(
    configs: &ConfigSet,
    bus: &Bus<E>,
    svc: &mut dyn Service<E>,
    exit: &mut bool,
) -> ServiceResult<()> {
    let id = svc.id();

    svc.bind_config(configs)
        .map_err(|e| ServiceError::in_phase(LifecyclePhase::Awake, id, e))?;

    let mut ctx = ServiceCtx::new(configs, bus, exit);
    svc.awake(&mut ctx)
        .map_err(|e| ServiceError::in_phase(LifecyclePhase::Awake, id, e))
}
