/// Events the host application forwards into the manager.
///
/// These mirror the host lifecycle surface: application focus/pause/quit and
/// scene transitions. The manager routes each variant to the matching
/// per-service hook in manager order.
#[derive(Debug, Clone)]
pub enum HostEvent {
    Focus(bool),
    Pause(bool),
    Quit,
    Scene(SceneEvent),
}

#[derive(Debug, Clone)]
pub enum SceneEvent {
    Loaded { name: String },
    Unloaded { name: String },
    Changed { from: String, to: String },
}

impl SceneEvent {
    /// Whether this event ends the lifetime of scene-scoped objects.
    /// Pool pruning keys off this.
    #[inline]
    pub fn is_transition(&self) -> bool {
        matches!(self, Self::Unloaded { .. } | Self::Changed { .. })
    }
}
