use std::any::Any;

use super::ctx::ServiceCtx;
use crate::config::{ConfigKey, ConfigSet};
use crate::error::ServiceResult;
use crate::host_events::SceneEvent;

/// Upcast helper so the manager can recover the concrete service type
/// behind a `dyn Service` without per-service boilerplate.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A singleton-scoped unit of behavior owned by the manager.
///
/// Every lifecycle hook has a no-op default, so a service implements only
/// the phases it cares about and the fan-out stays a single polymorphic call
/// per phase. At most one live instance per concrete type exists in a
/// manager.
///
/// `E` is the application event type carried by the bus.
pub trait Service<E: Send + 'static>: AsAny + Send {
    fn id(&self) -> &'static str {
        "service"
    }

    /// Fan-out ordering weight. Higher runs earlier; equal priorities keep
    /// registration order. The same order applies to every phase.
    fn priority(&self) -> i32 {
        0
    }

    /// The configuration type this service expects, if any.
    ///
    /// A declared requirement with no matching entry in the set is logged
    /// by the manager and the service proceeds unconfigured.
    fn required_config(&self) -> Option<ConfigKey> {
        None
    }

    /// Called once during build, before `awake`, with the full config set.
    fn bind_config(&mut self, _configs: &ConfigSet) -> ServiceResult<()> {
        Ok(())
    }

    fn awake(&mut self, _ctx: &mut ServiceCtx<'_, E>) -> ServiceResult<()> {
        Ok(())
    }

    fn on_enable(&mut self, _ctx: &mut ServiceCtx<'_, E>) -> ServiceResult<()> {
        Ok(())
    }

    fn start(&mut self, _ctx: &mut ServiceCtx<'_, E>) -> ServiceResult<()> {
        Ok(())
    }

    fn update(&mut self, _ctx: &mut ServiceCtx<'_, E>) -> ServiceResult<()> {
        Ok(())
    }

    fn fixed_update(&mut self, _ctx: &mut ServiceCtx<'_, E>) -> ServiceResult<()> {
        Ok(())
    }

    fn on_disable(&mut self, _ctx: &mut ServiceCtx<'_, E>) -> ServiceResult<()> {
        Ok(())
    }

    fn on_destroy(&mut self, _ctx: &mut ServiceCtx<'_, E>) -> ServiceResult<()> {
        Ok(())
    }

    fn on_focus(&mut self, _ctx: &mut ServiceCtx<'_, E>, _focused: bool) -> ServiceResult<()> {
        Ok(())
    }

    fn on_pause(&mut self, _ctx: &mut ServiceCtx<'_, E>, _paused: bool) -> ServiceResult<()> {
        Ok(())
    }

    fn on_quit(&mut self, _ctx: &mut ServiceCtx<'_, E>) -> ServiceResult<()> {
        Ok(())
    }

    fn on_scene_event(
        &mut self,
        _ctx: &mut ServiceCtx<'_, E>,
        _event: &SceneEvent,
    ) -> ServiceResult<()> {
        Ok(())
    }
}
