mod config;
mod loader;

pub use config::{
    ConfigPaths,
    StartupConfig,
    StartupLoadReport,
    StartupOverride,
    StartupSource,
};

pub use loader::StartupLoader;
