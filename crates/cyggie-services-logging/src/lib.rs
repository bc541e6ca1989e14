use env_logger::Builder;
use log::LevelFilter;

use cyggie_core::{
    ConfigKey, ConfigSet, Service, ServiceConfig, ServiceCtx, ServiceError, ServiceResult,
    StartupConfig,
};

use std::io::Write;

#[derive(Debug, Clone)]
pub struct ConsoleLoggerConfig {
    pub level: LevelFilter,
    pub colors: bool,
    pub include_target: bool,
}

impl ServiceConfig for ConsoleLoggerConfig {}

impl ConsoleLoggerConfig {
    /// Level from the startup file, everything else from env toggles.
    pub fn from_startup(startup: &StartupConfig) -> Self {
        let level = startup
            .log_level
            .parse::<LevelFilter>()
            .unwrap_or(LevelFilter::Info);

        let colors = std::env::var("CYGGIE_LOG_COLORS")
            .ok()
            .map(|v| v != "0")
            .unwrap_or(true);
        let include_target = std::env::var("CYGGIE_LOG_TARGET")
            .ok()
            .map(|v| v != "0")
            .unwrap_or(true);

        Self {
            level,
            colors,
            include_target,
        }
    }
}

impl Default for ConsoleLoggerConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            colors: true,
            include_target: true,
        }
    }
}

/// Console logger as a service: installs the global `log` sink during
/// `awake`, so every later service logs through it.
///
/// Register it first (or give it the highest priority) if startup logs from
/// other services matter.
pub struct ConsoleLoggerService {
    config: ConsoleLoggerConfig,
    installed: bool,
}

impl ConsoleLoggerService {
    #[inline]
    pub fn new() -> Self {
        Self {
            config: ConsoleLoggerConfig::default(),
            installed: false,
        }
    }

    #[inline]
    pub fn with_config(config: ConsoleLoggerConfig) -> Self {
        Self {
            config,
            installed: false,
        }
    }
}

impl Default for ConsoleLoggerService {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Send + 'static> Service<E> for ConsoleLoggerService {
    fn id(&self) -> &'static str {
        "console-logger"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn required_config(&self) -> Option<ConfigKey> {
        Some(ConfigKey::of::<ConsoleLoggerConfig>())
    }

    fn bind_config(&mut self, configs: &ConfigSet) -> ServiceResult<()> {
        if let Some(cfg) = configs.get::<ConsoleLoggerConfig>() {
            self.config = (*cfg).clone();
        }
        Ok(())
    }

    fn awake(&mut self, _ctx: &mut ServiceCtx<'_, E>) -> ServiceResult<()> {
        if self.installed {
            return Ok(());
        }

        let mut builder = Builder::new();
        builder.filter_level(self.config.level);

        let config = self.config.clone();
        builder.format(move |buf, record| {
            let style = if config.colors {
                buf.default_level_style(record.level())
            } else {
                env_logger::fmt::style::Style::new()
            };

            if config.include_target {
                writeln!(
                    buf,
                    "[{style}{:<5}{style:#}] {:<12} {}",
                    record.level(),
                    record.target(),
                    record.args()
                )
            } else {
                writeln!(
                    buf,
                    "[{style}{:<5}{style:#}] {}",
                    record.level(),
                    record.args()
                )
            }
        });

        builder
            .try_init()
            .map_err(|e| ServiceError::Other(format!("logger init failed: {e}")))?;

        self.installed = true;
        Ok(())
    }
}
