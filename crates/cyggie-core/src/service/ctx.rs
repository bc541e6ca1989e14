use crate::bus::Bus;
use crate::config::ConfigSet;
use crate::frame::Frame;

/// Context passed to service hooks.
///
/// Services get this instead of `&mut ServiceManager`: they can read
/// configuration, emit app events, and request exit, but cannot reach into
/// the live collection or re-enter the fan-out.
pub struct ServiceCtx<'a, E: Send + 'static> {
    configs: &'a ConfigSet,
    bus: &'a Bus<E>,
    exit: &'a mut bool,

    /// Frame snapshot for the current phase, when the phase carries one.
    frame: Option<Frame>,
}

impl<'a, E: Send + 'static> ServiceCtx<'a, E> {
    #[inline]
    pub(crate) fn new(configs: &'a ConfigSet, bus: &'a Bus<E>, exit: &'a mut bool) -> Self {
        Self {
            configs,
            bus,
            exit,
            frame: None,
        }
    }

    #[inline]
    pub(crate) fn set_frame(&mut self, frame: &Frame) {
        self.frame = Some(*frame);
    }

    #[inline]
    pub fn configs(&self) -> &ConfigSet {
        self.configs
    }

    #[inline]
    pub fn bus(&self) -> &Bus<E> {
        self.bus
    }

    /// Current frame snapshot; `None` outside `update` / `fixed_update`.
    #[inline]
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    #[inline]
    pub fn request_exit(&mut self) {
        *self.exit = true;
    }

    #[inline]
    pub fn is_exit_requested(&self) -> bool {
        *self.exit
    }
}
