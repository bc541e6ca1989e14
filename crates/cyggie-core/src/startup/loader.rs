use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ServiceError, ServiceResult};
use crate::startup::{
    ConfigPaths, StartupConfig, StartupLoadReport, StartupOverride, StartupSource,
};

/// Env var consulted after the file layer.
const ENV_LOG_LEVEL: &str = "CYGGIE_LOG";

pub struct StartupLoader;

impl StartupLoader {
    /// Loads startup config with layering: defaults -> file -> env.
    ///
    /// A missing file is not an error (the effective config must be bootable
    /// out of the box); a present but malformed file is.
    pub fn load(paths: &ConfigPaths) -> ServiceResult<(StartupConfig, StartupLoadReport)> {
        let mut cfg = StartupConfig::default();
        let mut report = StartupLoadReport {
            source: StartupSource::Defaults,
            file: None,
            overrides: Vec::new(),
        };

        // File layer (optional).
        if let Some(resolved) = resolve_startup_file(paths) {
            let data = fs::read_to_string(&resolved).map_err(|e| {
                ServiceError::Startup(format!(
                    "startup config read failed: path={:?} err={e}",
                    resolved
                ))
            })?;

            let parsed: RootJson = serde_json::from_str(&data).map_err(|e| {
                ServiceError::Startup(format!(
                    "startup config parse failed (json): path={:?} err={e}",
                    resolved
                ))
            })?;

            apply_root(&mut cfg, &mut report, parsed);

            cfg.source = StartupSource::File {
                path: resolved.clone(),
            };
            report.source = cfg.source.clone();
            report.file = Some(resolved);
        }

        // Env layer.
        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            let level = level.trim().to_owned();
            if !level.is_empty() && level != cfg.log_level {
                report.overrides.push(StartupOverride {
                    key: "logging.level",
                    from: cfg.log_level.clone(),
                    to: level.clone(),
                });
                cfg.log_level = level;

                if !report.is_defaults() {
                    cfg.source = StartupSource::Mixed;
                    report.source = StartupSource::Mixed;
                }
            }
        }

        Ok((cfg, report))
    }
}

/// `absolute path` > `root_dir/<file>` > `<file>` as given, first that exists.
fn resolve_startup_file(paths: &ConfigPaths) -> Option<PathBuf> {
    let raw = paths.startup_path();

    if raw.is_absolute() {
        return raw.exists().then(|| raw.to_path_buf());
    }

    if let Some(root) = paths.root_dir.as_deref() {
        let candidate = root.join(raw);
        if candidate.exists() {
            return Some(candidate);
        }
    }

    raw.exists().then(|| raw.to_path_buf())
}

fn apply_root(cfg: &mut StartupConfig, report: &mut StartupLoadReport, parsed: RootJson) {
    if let Some(logging) = parsed.logging {
        if let Some(level) = logging.level {
            if level != cfg.log_level {
                report.overrides.push(StartupOverride {
                    key: "logging.level",
                    from: cfg.log_level.clone(),
                    to: level.clone(),
                });
                cfg.log_level = level;
            }
        }
    }

    if let Some(services) = parsed.services {
        cfg.sections = services;
    }
}

#[derive(Deserialize)]
struct RootJson {
    logging: Option<LoggingJson>,
    services: Option<HashMap<String, Value>>,
}

#[derive(Deserialize)]
struct LoggingJson {
    level: Option<String>,
}
