use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ServiceError, ServiceResult};

/// Where to look for the startup file.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub startup: PathBuf,
    pub root_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    #[inline]
    fn default() -> Self {
        Self {
            startup: PathBuf::from("startup.json"),
            root_dir: None,
        }
    }
}

impl ConfigPaths {
    #[inline]
    pub fn new<P: Into<PathBuf>>(startup: P) -> Self {
        Self {
            startup: startup.into(),
            root_dir: None,
        }
    }

    #[inline]
    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(root_dir.into());
        self
    }

    #[inline]
    pub fn startup_path(&self) -> &Path {
        &self.startup
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StartupSource {
    #[default]
    Defaults,
    File {
        path: PathBuf,
    },
    /// File values plus at least one env override.
    Mixed,
}

/// Normalized startup configuration.
///
/// `log_level` has a concrete default; per-service sections stay raw JSON so
/// each service parses its own typed record with `section()`.
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub source: StartupSource,
    pub log_level: String,
    pub(crate) sections: HashMap<String, Value>,
}

impl Default for StartupConfig {
    #[inline]
    fn default() -> Self {
        Self {
            source: StartupSource::Defaults,
            log_level: "info".to_owned(),
            sections: HashMap::new(),
        }
    }
}

impl StartupConfig {
    #[inline]
    pub fn has_section(&self, id: &str) -> bool {
        self.sections.contains_key(id)
    }

    #[inline]
    pub fn section_raw(&self, id: &str) -> Option<&Value> {
        self.sections.get(id)
    }

    /// Parses the `services.<id>` section into a typed record.
    ///
    /// A missing section is `Ok(None)`; a present but malformed one is an
    /// error, so a typo'd field fails loudly instead of half-applying.
    pub fn section<C: DeserializeOwned>(&self, id: &str) -> ServiceResult<Option<C>> {
        match self.sections.get(id) {
            None => Ok(None),
            Some(raw) => serde_json::from_value(raw.clone())
                .map(Some)
                .map_err(|e| ServiceError::Startup(format!("section '{id}' parse failed: {e}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StartupOverride {
    pub key: &'static str,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct StartupLoadReport {
    pub source: StartupSource,
    /// The actual file used (when one was found).
    pub file: Option<PathBuf>,
    pub overrides: Vec<StartupOverride>,
}

impl StartupLoadReport {
    #[inline]
    pub fn has_overrides(&self) -> bool {
        !self.overrides.is_empty()
    }

    #[inline]
    pub fn is_defaults(&self) -> bool {
        matches!(self.source, StartupSource::Defaults)
    }
}
