use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::bus::Bus;
use crate::config::ConfigSet;
use crate::error::{LifecyclePhase, ServiceError, ServiceResult};
use crate::frame::Frame;
use crate::host_events::{HostEvent, SceneEvent};
use crate::service::{Service, ServiceCtx};
use crate::sync::ShutdownToken;

/// Manager lifecycle.
///
/// A manager is never observable before construction begins: the builder
/// owns the pre-init span, `build()` covers `Initializing`, and the value it
/// returns is already `Ready`. Re-initialization after `Disposed` is
/// unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Initializing,
    Ready,
    Disposed,
}

/// Owner of the live service set.
///
/// Holds services in a fixed fan-out order (priority descending, stable in
/// registration order — the same order for every phase), resolves typed
/// lookups, and broadcasts host-driven lifecycle callbacks. It never
/// schedules time itself; the host loop calls in.
pub struct ServiceManager<E: Send + 'static> {
    pub(crate) state: ManagerState,
    services: Vec<Box<dyn Service<E>>>,
    type_index: HashMap<TypeId, usize>,
    pub(crate) configs: ConfigSet,
    pub(crate) bus: Bus<E>,
    shutdown: ShutdownToken,
    exit_requested: bool,
}

impl<E: Send + 'static> ServiceManager<E> {
    pub(crate) fn from_parts(configs: ConfigSet, bus: Bus<E>, shutdown: ShutdownToken) -> Self {
        Self {
            state: ManagerState::Initializing,
            services: Vec::new(),
            type_index: HashMap::new(),
            configs,
            bus,
            shutdown,
            exit_requested: false,
        }
    }

    pub(crate) fn push(&mut self, type_id: TypeId, svc: Box<dyn Service<E>>) {
        let idx = self.services.len();
        self.services.push(svc);
        self.type_index.insert(type_id, idx);
    }

    #[inline]
    pub fn state(&self) -> ManagerState {
        self.state
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    #[inline]
    pub fn bus(&self) -> &Bus<E> {
        &self.bus
    }

    #[inline]
    pub fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.clone()
    }

    #[inline]
    pub fn request_exit(&mut self) {
        self.shutdown.request();
        self.exit_requested = true;
    }

    /// Whether a service or the shutdown token asked the host loop to stop.
    #[inline]
    pub fn exit_requested(&self) -> bool {
        self.exit_requested || self.shutdown.is_requested()
    }

    /// Live-service ids in fan-out order, for diagnostics.
    pub fn service_ids(&self) -> Vec<&'static str> {
        self.services.iter().map(|s| s.id()).collect()
    }

    #[inline]
    pub fn contains<T: Any>(&self) -> bool {
        self.type_index.contains_key(&TypeId::of::<T>())
    }

    /// Looks up a live service by exact concrete type.
    ///
    /// On a manager that is not `Ready` this logs an error and answers
    /// not-found; it never panics.
    pub fn get<T: Any>(&self) -> Option<&T> {
        if !self.guard_lookup() {
            return None;
        }
        let idx = *self.type_index.get(&TypeId::of::<T>())?;
        self.services[idx].as_any().downcast_ref::<T>()
    }

    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        if !self.guard_lookup() {
            return None;
        }
        let idx = *self.type_index.get(&TypeId::of::<T>())?;
        self.services[idx].as_any_mut().downcast_mut::<T>()
    }

    /* ============================
       Lifecycle fan-out
       ============================ */

    pub fn start(&mut self) -> ServiceResult<()> {
        self.fan_out(LifecyclePhase::Start, None, |s, ctx| s.start(ctx))
    }

    pub fn enable(&mut self) -> ServiceResult<()> {
        self.fan_out(LifecyclePhase::Enable, None, |s, ctx| s.on_enable(ctx))
    }

    pub fn disable(&mut self) -> ServiceResult<()> {
        self.fan_out(LifecyclePhase::Disable, None, |s, ctx| s.on_disable(ctx))
    }

    pub fn update(&mut self, frame: &Frame) -> ServiceResult<()> {
        self.fan_out(LifecyclePhase::Update, Some(frame), |s, ctx| s.update(ctx))
    }

    pub fn fixed_update(&mut self, frame: &Frame) -> ServiceResult<()> {
        self.fan_out(LifecyclePhase::FixedUpdate, Some(frame), |s, ctx| {
            s.fixed_update(ctx)
        })
    }

    pub fn focus(&mut self, focused: bool) -> ServiceResult<()> {
        self.fan_out(LifecyclePhase::Focus, None, |s, ctx| s.on_focus(ctx, focused))
    }

    pub fn pause(&mut self, paused: bool) -> ServiceResult<()> {
        self.fan_out(LifecyclePhase::Pause, None, |s, ctx| s.on_pause(ctx, paused))
    }

    pub fn quit(&mut self) -> ServiceResult<()> {
        self.fan_out(LifecyclePhase::Quit, None, |s, ctx| s.on_quit(ctx))
    }

    pub fn dispatch_scene_event(&mut self, event: &SceneEvent) -> ServiceResult<()> {
        self.fan_out(LifecyclePhase::Scene, None, |s, ctx| {
            s.on_scene_event(ctx, event)
        })
    }

    /// Routes one host event to the matching per-service hook.
    pub fn dispatch_host_event(&mut self, event: &HostEvent) -> ServiceResult<()> {
        match event {
            HostEvent::Focus(focused) => self.focus(*focused),
            HostEvent::Pause(paused) => self.pause(*paused),
            HostEvent::Quit => {
                self.quit()?;
                self.request_exit();
                Ok(())
            }
            HostEvent::Scene(scene) => self.dispatch_scene_event(scene),
        }
    }

    /// Tears the manager down: `on_disable` then `on_destroy` to every live
    /// service, then clears the collection.
    ///
    /// Hook failures during teardown are logged and do not stop the
    /// remaining notifications.
    pub fn dispose(&mut self) {
        if self.state == ManagerState::Disposed {
            log::warn!(target: "services", "dispose called twice, ignoring");
            return;
        }

        for phase in [LifecyclePhase::Disable, LifecyclePhase::Destroy] {
            let mut services = std::mem::take(&mut self.services);
            for svc in services.iter_mut() {
                let id = svc.id();
                let mut ctx = ServiceCtx::new(&self.configs, &self.bus, &mut self.exit_requested);
                let r = match phase {
                    LifecyclePhase::Disable => svc.on_disable(&mut ctx),
                    _ => svc.on_destroy(&mut ctx),
                };
                if let Err(e) = r {
                    log::error!(target: "services", "service '{id}' failed during {phase}: {e}");
                }
            }
            self.services = services;
        }

        self.services.clear();
        self.type_index.clear();
        self.state = ManagerState::Disposed;
    }

    /* ============================
       Internals
       ============================ */

    fn guard_lookup(&self) -> bool {
        if self.state != ManagerState::Ready {
            log::error!(
                target: "services",
                "service lookup on a manager that is not ready (state: {:?})",
                self.state
            );
            return false;
        }
        true
    }

    fn fan_out<F>(
        &mut self,
        phase: LifecyclePhase,
        frame: Option<&Frame>,
        mut call: F,
    ) -> ServiceResult<()>
    where
        F: FnMut(&mut dyn Service<E>, &mut ServiceCtx<'_, E>) -> ServiceResult<()>,
    {
        if self.state != ManagerState::Ready {
            log::error!(
                target: "services",
                "{phase} fan-out on a manager that is not ready (state: {:?}), ignoring",
                self.state
            );
            return Ok(());
        }

        // Take the collection so hooks cannot alias the live set through us.
        let mut services: Vec<Box<dyn Service<E>>> = std::mem::take(&mut self.services);

        let result = (|| {
            for svc in services.iter_mut() {
                let id = svc.id();

                let mut ctx = ServiceCtx::new(&self.configs, &self.bus, &mut self.exit_requested);
                if let Some(f) = frame {
                    ctx.set_frame(f);
                }

                call(svc.as_mut(), &mut ctx)
                    .map_err(|e| ServiceError::in_phase(phase, id, e))?;
            }
            Ok(())
        })();

        self.services = services;
        result
    }
}
