use std::sync::Arc;

use parking_lot::Mutex;

use cyggie_core::{
    ConfigKey, ConfigSet, Frame, HostEvent, LifecyclePhase, ManagerState, PoolKey,
    ReferencePoolService, SceneEvent, Service, ServiceCtx, ServiceConfig, ServiceError,
    ServiceManagerBuilder, ServiceResult,
};

/// Shared call recorder so tests can assert fan-out order across services.
#[derive(Clone, Default)]
struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock())
    }
}

macro_rules! probe_service {
    ($name:ident, $id:literal, $priority:expr) => {
        struct $name {
            log: CallLog,
        }

        impl $name {
            fn new(log: &CallLog) -> Self {
                Self { log: log.clone() }
            }
        }

        impl Service<()> for $name {
            fn id(&self) -> &'static str {
                $id
            }

            fn priority(&self) -> i32 {
                $priority
            }

            fn start(&mut self, _ctx: &mut ServiceCtx<'_, ()>) -> ServiceResult<()> {
                self.log.push(concat!($id, ":start"));
                Ok(())
            }

            fn update(&mut self, _ctx: &mut ServiceCtx<'_, ()>) -> ServiceResult<()> {
                self.log.push(concat!($id, ":update"));
                Ok(())
            }

            fn on_disable(&mut self, _ctx: &mut ServiceCtx<'_, ()>) -> ServiceResult<()> {
                self.log.push(concat!($id, ":disable"));
                Ok(())
            }

            fn on_destroy(&mut self, _ctx: &mut ServiceCtx<'_, ()>) -> ServiceResult<()> {
                self.log.push(concat!($id, ":destroy"));
                Ok(())
            }
        }
    };
}

probe_service!(Alpha, "alpha", 0);
probe_service!(Beta, "beta", 0);
probe_service!(Gamma, "gamma", 0);
probe_service!(HighPriority, "high", 10);
probe_service!(LowPriority, "low", -5);

fn frame() -> Frame {
    Frame {
        frame_index: 0,
        dt: 1.0 / 60.0,
        fixed_dt: 1.0 / 60.0,
        fixed_alpha: 0.0,
        fixed_steps: 1,
    }
}

#[test]
fn lookup_succeeds_for_exactly_the_registered_types() {
    let log = CallLog::default();
    let manager = ServiceManagerBuilder::<()>::new()
        .register(Alpha::new(&log))
        .register(Beta::new(&log))
        .build();

    assert_eq!(manager.state(), ManagerState::Ready);
    assert!(manager.get::<Alpha>().is_some());
    assert!(manager.get::<Beta>().is_some());
    assert!(manager.get::<Gamma>().is_none());
    assert_eq!(manager.len(), 2);
}

#[test]
fn duplicate_registration_leaves_one_live_instance() {
    let log = CallLog::default();
    let manager = ServiceManagerBuilder::<()>::new()
        .register(Alpha::new(&log))
        .register(Alpha::new(&log))
        .register(Beta::new(&log))
        .build();

    assert_eq!(manager.len(), 2);
    assert!(manager.get::<Alpha>().is_some());
    assert_eq!(manager.service_ids(), vec!["alpha", "beta"]);
}

#[test]
fn update_fan_out_hits_every_service_once_in_registration_order() {
    let log = CallLog::default();
    let mut manager = ServiceManagerBuilder::<()>::new()
        .register(Alpha::new(&log))
        .register(Beta::new(&log))
        .register(Gamma::new(&log))
        .build();

    manager.update(&frame()).unwrap();
    assert_eq!(log.take(), vec!["alpha:update", "beta:update", "gamma:update"]);
}

#[test]
fn priority_orders_every_phase_uniformly() {
    let log = CallLog::default();
    let mut manager = ServiceManagerBuilder::<()>::new()
        .register(LowPriority::new(&log))
        .register(Alpha::new(&log))
        .register(HighPriority::new(&log))
        .register(Beta::new(&log))
        .build();

    // Priority descending, registration order breaking ties.
    assert_eq!(manager.service_ids(), vec!["high", "alpha", "beta", "low"]);

    manager.start().unwrap();
    assert_eq!(
        log.take(),
        vec!["high:start", "alpha:start", "beta:start", "low:start"]
    );

    manager.update(&frame()).unwrap();
    assert_eq!(
        log.take(),
        vec!["high:update", "alpha:update", "beta:update", "low:update"]
    );
}

/* ============================
   Configuration binding
   ============================ */

#[derive(Debug, PartialEq)]
struct TickConfig {
    rate: u32,
}
impl ServiceConfig for TickConfig {}

struct TickService {
    config: Option<Arc<TickConfig>>,
}

impl TickService {
    fn new() -> Self {
        Self { config: None }
    }
}

impl Service<()> for TickService {
    fn id(&self) -> &'static str {
        "tick"
    }

    fn required_config(&self) -> Option<ConfigKey> {
        Some(ConfigKey::of::<TickConfig>())
    }

    fn bind_config(&mut self, configs: &ConfigSet) -> ServiceResult<()> {
        self.config = configs.get::<TickConfig>();
        Ok(())
    }
}

#[test]
fn declared_config_with_one_match_is_bound() {
    let log = CallLog::default();
    let manager = ServiceManagerBuilder::<()>::new()
        .config(TickConfig { rate: 30 })
        .unwrap()
        .register(Alpha::new(&log))
        .register(TickService::new())
        .build();

    let tick = manager.get::<TickService>().unwrap();
    assert_eq!(tick.config.as_deref(), Some(&TickConfig { rate: 30 }));
}

#[test]
fn declared_config_with_no_match_leaves_service_unconfigured_but_live() {
    let manager = ServiceManagerBuilder::<()>::new()
        .register(TickService::new())
        .build();

    let tick = manager.get::<TickService>().unwrap();
    assert!(tick.config.is_none());
}

#[test]
fn duplicate_config_is_a_hard_error() {
    let builder = ServiceManagerBuilder::<()>::new()
        .config(TickConfig { rate: 30 })
        .unwrap();

    let Err(err) = builder.config(TickConfig { rate: 60 }) else {
        panic!("second config of the same type must be rejected");
    };
    assert!(matches!(err, ServiceError::DuplicateConfig { .. }));
}

/* ============================
   Construction failure
   ============================ */

struct BrokenService;

impl Service<()> for BrokenService {
    fn id(&self) -> &'static str {
        "broken"
    }

    fn awake(&mut self, _ctx: &mut ServiceCtx<'_, ()>) -> ServiceResult<()> {
        Err(ServiceError::Other("awake exploded".to_string()))
    }
}

#[test]
fn construction_failure_skips_that_service_only() {
    let log = CallLog::default();
    let manager = ServiceManagerBuilder::<()>::new()
        .register(Alpha::new(&log))
        .register(BrokenService)
        .register(Beta::new(&log))
        .build();

    assert_eq!(manager.len(), 2);
    assert!(manager.get::<BrokenService>().is_none());
    assert!(manager.get::<Alpha>().is_some());
    assert!(manager.get::<Beta>().is_some());
}

/* ============================
   Hook failure propagation
   ============================ */

struct FailsOnUpdate;

impl Service<()> for FailsOnUpdate {
    fn id(&self) -> &'static str {
        "fails-on-update"
    }

    fn update(&mut self, _ctx: &mut ServiceCtx<'_, ()>) -> ServiceResult<()> {
        Err(ServiceError::Other("update exploded".to_string()))
    }
}

#[test]
fn hook_failure_is_tagged_with_phase_and_service() {
    let mut manager = ServiceManagerBuilder::<()>::new()
        .register(FailsOnUpdate)
        .build();

    let err = manager.update(&frame()).unwrap_err();
    match err {
        ServiceError::Phase { phase, id, .. } => {
            assert_eq!(phase, LifecyclePhase::Update);
            assert_eq!(id, "fails-on-update");
        }
        other => panic!("expected phase-tagged error, got: {other}"),
    }
}

/* ============================
   Host events
   ============================ */

#[derive(Default)]
struct HostProbe {
    focused: Option<bool>,
    paused: Option<bool>,
    quit: bool,
    scenes: Vec<String>,
}

struct HostProbeService {
    seen: Arc<Mutex<HostProbe>>,
}

impl Service<()> for HostProbeService {
    fn id(&self) -> &'static str {
        "host-probe"
    }

    fn on_focus(&mut self, _ctx: &mut ServiceCtx<'_, ()>, focused: bool) -> ServiceResult<()> {
        self.seen.lock().focused = Some(focused);
        Ok(())
    }

    fn on_pause(&mut self, _ctx: &mut ServiceCtx<'_, ()>, paused: bool) -> ServiceResult<()> {
        self.seen.lock().paused = Some(paused);
        Ok(())
    }

    fn on_quit(&mut self, _ctx: &mut ServiceCtx<'_, ()>) -> ServiceResult<()> {
        self.seen.lock().quit = true;
        Ok(())
    }

    fn on_scene_event(
        &mut self,
        _ctx: &mut ServiceCtx<'_, ()>,
        event: &SceneEvent,
    ) -> ServiceResult<()> {
        self.seen.lock().scenes.push(format!("{event:?}"));
        Ok(())
    }
}

#[test]
fn host_events_route_to_matching_hooks() {
    let seen = Arc::new(Mutex::new(HostProbe::default()));
    let mut manager = ServiceManagerBuilder::<()>::new()
        .register(HostProbeService { seen: seen.clone() })
        .build();

    manager.dispatch_host_event(&HostEvent::Focus(false)).unwrap();
    manager.dispatch_host_event(&HostEvent::Pause(true)).unwrap();
    manager
        .dispatch_host_event(&HostEvent::Scene(SceneEvent::Loaded {
            name: "menu".to_string(),
        }))
        .unwrap();
    manager.dispatch_host_event(&HostEvent::Quit).unwrap();

    let probe = seen.lock();
    assert_eq!(probe.focused, Some(false));
    assert_eq!(probe.paused, Some(true));
    assert!(probe.quit);
    assert_eq!(probe.scenes.len(), 1);
    drop(probe);

    // Quit also asks the host loop to stop.
    assert!(manager.exit_requested());
}

/* ============================
   Dispose
   ============================ */

#[test]
fn dispose_runs_disable_then_destroy_and_clears_the_set() {
    let log = CallLog::default();
    let mut manager = ServiceManagerBuilder::<()>::new()
        .register(Alpha::new(&log))
        .register(Beta::new(&log))
        .build();

    manager.dispose();

    assert_eq!(
        log.take(),
        vec!["alpha:disable", "beta:disable", "alpha:destroy", "beta:destroy"]
    );
    assert_eq!(manager.state(), ManagerState::Disposed);
    assert!(manager.is_empty());

    // Lookup on a disposed manager answers not-found, never panics.
    assert!(manager.get::<Alpha>().is_none());

    // Fan-out on a disposed manager is a logged no-op.
    manager.update(&frame()).unwrap();
    assert!(log.take().is_empty());
}

/* ============================
   Exit requests from services
   ============================ */

struct ExitRequester;

impl Service<()> for ExitRequester {
    fn id(&self) -> &'static str {
        "exit-requester"
    }

    fn update(&mut self, ctx: &mut ServiceCtx<'_, ()>) -> ServiceResult<()> {
        ctx.request_exit();
        Ok(())
    }
}

#[test]
fn services_can_request_exit_through_their_context() {
    let mut manager = ServiceManagerBuilder::<()>::new()
        .register(ExitRequester)
        .build();

    assert!(!manager.exit_requested());
    manager.update(&frame()).unwrap();
    assert!(manager.exit_requested());
}

/* ============================
   App events over the bus
   ============================ */

struct Announcer;

impl Service<String> for Announcer {
    fn id(&self) -> &'static str {
        "announcer"
    }

    fn start(&mut self, ctx: &mut ServiceCtx<'_, String>) -> ServiceResult<()> {
        ctx.bus().publish("announcer started".to_string());
        Ok(())
    }
}

#[test]
fn services_emit_app_events_the_host_can_drain() {
    let mut manager = ServiceManagerBuilder::<String>::new()
        .register(Announcer)
        .build();

    manager.start().unwrap();

    let events: Vec<String> = manager.bus().drain().collect();
    assert_eq!(events, vec!["announcer started".to_string()]);
}

/* ============================
   Reference pool wired through the manager
   ============================ */

#[test]
fn scene_unload_prunes_dead_pool_entries_through_the_manager() {
    let mut manager = ServiceManagerBuilder::<()>::new()
        .register(ReferencePoolService::new())
        .build();

    let pool = manager.get::<ReferencePoolService>().unwrap().pool();

    let survivor = Arc::new("survivor".to_string());
    let casualty = Arc::new("casualty".to_string());
    assert!(pool.add(PoolKey::new("survivor").unwrap(), &survivor));
    assert!(pool.add(PoolKey::new("casualty").unwrap(), &casualty));
    drop(casualty);

    manager
        .dispatch_scene_event(&SceneEvent::Unloaded {
            name: "level-1".to_string(),
        })
        .unwrap();

    assert!(pool.try_get::<String>("casualty").is_none());
    assert!(!pool.contains("casualty"));
    assert_eq!(pool.try_get::<String>("survivor").unwrap().as_str(), "survivor");
}
