use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;
use serde::Deserialize;

use cyggie_core::{
    ConfigKey, ConfigPaths, ConfigSet, Frame, HostEvent, PoolKey, ReferencePoolService,
    SceneEvent, Service, ServiceConfig, ServiceCtx, ServiceManagerBuilder, ServiceResult,
    ShutdownToken, StartupLoader,
};
use cyggie_services_logging::{ConsoleLoggerConfig, ConsoleLoggerService};

const FIXED_DT: f32 = 1.0 / 60.0;
const MAX_FRAME_DT: f32 = 0.25;
const MAX_FIXED_STEPS: u32 = 8;

#[derive(Debug, Clone)]
enum SandboxEvent {
    Beat(u64),
}

#[derive(Debug, Clone, Deserialize)]
struct HeartbeatConfig {
    interval_seconds: f32,
}

impl ServiceConfig for HeartbeatConfig {}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 1.0,
        }
    }
}

/// Demo service: counts wall time from frame snapshots and announces a beat
/// on the bus every interval.
struct HeartbeatService {
    config: HeartbeatConfig,
    elapsed: f32,
    beats: u64,
}

impl HeartbeatService {
    fn new() -> Self {
        Self {
            config: HeartbeatConfig::default(),
            elapsed: 0.0,
            beats: 0,
        }
    }
}

impl Service<SandboxEvent> for HeartbeatService {
    fn id(&self) -> &'static str {
        "heartbeat"
    }

    fn required_config(&self) -> Option<ConfigKey> {
        Some(ConfigKey::of::<HeartbeatConfig>())
    }

    fn bind_config(&mut self, configs: &ConfigSet) -> ServiceResult<()> {
        if let Some(cfg) = configs.get::<HeartbeatConfig>() {
            self.config = (*cfg).clone();
        }
        Ok(())
    }

    fn start(&mut self, _ctx: &mut ServiceCtx<'_, SandboxEvent>) -> ServiceResult<()> {
        info!(target: "heartbeat", "beating every {:.2}s", self.config.interval_seconds);
        Ok(())
    }

    fn update(&mut self, ctx: &mut ServiceCtx<'_, SandboxEvent>) -> ServiceResult<()> {
        let Some(frame) = ctx.frame() else {
            return Ok(());
        };

        self.elapsed += frame.dt;
        if self.elapsed >= self.config.interval_seconds {
            self.elapsed -= self.config.interval_seconds;
            self.beats += 1;
            ctx.bus().publish(SandboxEvent::Beat(self.beats));
        }
        Ok(())
    }

    fn on_quit(&mut self, _ctx: &mut ServiceCtx<'_, SandboxEvent>) -> ServiceResult<()> {
        info!(target: "heartbeat", "stopping after {} beat(s)", self.beats);
        Ok(())
    }
}

fn main() -> ServiceResult<()> {
    let (startup, report) = StartupLoader::load(&ConfigPaths::default())?;

    let shutdown = ShutdownToken::new();
    {
        let shutdown = shutdown.clone();
        let _ = ctrlc::set_handler(move || shutdown.request());
    }

    let mut manager = ServiceManagerBuilder::<SandboxEvent>::new()
        .config(ConsoleLoggerConfig::from_startup(&startup))?
        .config(
            startup
                .section::<HeartbeatConfig>("heartbeat")?
                .unwrap_or_default(),
        )?
        .shutdown_token(shutdown.clone())
        .register(ConsoleLoggerService::new())
        .register(ReferencePoolService::new())
        .register(HeartbeatService::new())
        .build();

    if let Some(file) = report.file.as_deref() {
        info!(target: "sandbox", "startup config: {}", file.display());
    } else {
        info!(target: "sandbox", "startup config: defaults");
    }
    info!(target: "sandbox", "services: {:?}", manager.service_ids());

    // Demonstrate the pool surviving a scene transition.
    let session = Arc::new("session-token".to_string());
    if let Some(pool_svc) = manager.get::<ReferencePoolService>() {
        let pool = pool_svc.pool();
        if let Ok(key) = PoolKey::new("session") {
            pool.add(key, &session);
        }
    }

    manager.start()?;
    manager.dispatch_host_event(&HostEvent::Scene(SceneEvent::Loaded {
        name: "sandbox".to_string(),
    }))?;

    // Host-owned fixed-timestep loop; the manager only reacts to the calls.
    let mut last = Instant::now();
    let mut acc = 0.0f32;
    let mut frame_index = 0u64;

    while !manager.exit_requested() {
        let now = Instant::now();
        let mut dt = (now - last).as_secs_f32();
        last = now;

        if !dt.is_finite() || dt < 0.0 {
            dt = 0.0;
        }
        dt = dt.min(MAX_FRAME_DT);
        acc = (acc + dt).min(FIXED_DT * MAX_FIXED_STEPS as f32);

        let mut fixed_steps = 0u32;
        while acc >= FIXED_DT {
            acc -= FIXED_DT;
            fixed_steps = fixed_steps.saturating_add(1);
            manager.fixed_update(&Frame::fixed_step(frame_index, FIXED_DT))?;
        }

        manager.update(&Frame {
            frame_index,
            dt,
            fixed_dt: FIXED_DT,
            fixed_alpha: (acc / FIXED_DT).clamp(0.0, 0.999_999),
            fixed_steps,
        })?;

        for ev in manager.bus().drain() {
            match ev {
                SandboxEvent::Beat(n) => info!(target: "sandbox", "beat {n}"),
            }
        }

        frame_index = frame_index.wrapping_add(1);
        std::thread::sleep(Duration::from_millis(4));
    }

    manager.dispatch_host_event(&HostEvent::Quit)?;
    manager.dispose();

    // The pool held only a weak reference; we still own the session.
    info!(
        target: "sandbox",
        "session refs after dispose: {}",
        Arc::strong_count(&session)
    );
    Ok(())
}
