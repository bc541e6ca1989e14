use std::fmt;

use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Lifecycle phase names used for error tagging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    Awake,
    Enable,
    Start,
    Update,
    FixedUpdate,
    Disable,
    Destroy,
    Focus,
    Pause,
    Quit,
    Scene,
}

impl LifecyclePhase {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Awake => "awake",
            Self::Enable => "enable",
            Self::Start => "start",
            Self::Update => "update",
            Self::FixedUpdate => "fixed_update",
            Self::Disable => "disable",
            Self::Destroy => "destroy",
            Self::Focus => "focus",
            Self::Pause => "pause",
            Self::Quit => "quit",
            Self::Scene => "scene",
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Two configurations with the same concrete type were supplied.
    /// Duplicate configurations are a hard configuration error, not a
    /// first-match-wins lookup.
    #[error("duplicate configuration: {type_name}")]
    DuplicateConfig { type_name: &'static str },

    #[error("startup config error: {0}")]
    Startup(String),

    /// A service hook failed. Tagged with the phase and the service id so
    /// the host loop sees where the failure came from.
    #[error("service '{id}' failed in phase {phase}: {source}")]
    Phase {
        phase: LifecyclePhase,
        id: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl ServiceError {
    #[inline]
    pub fn in_phase(phase: LifecyclePhase, id: &'static str, source: ServiceError) -> Self {
        Self::Phase {
            phase,
            id,
            source: anyhow::Error::new(source),
        }
    }
}
