pub mod builder;
pub mod config;
pub mod error;
pub mod frame;
pub mod host_events;
pub mod manager;
pub mod pool;
pub mod service;
pub mod startup;

pub mod sync;
mod bus;

pub use builder::ServiceManagerBuilder;
pub use bus::Bus;
pub use config::{ConfigKey, ConfigSet, ServiceConfig};
pub use error::{LifecyclePhase, ServiceError, ServiceResult};
pub use frame::Frame;
pub use host_events::{HostEvent, SceneEvent};
pub use manager::{ManagerState, ServiceManager};
pub use pool::{PoolKey, ReferencePool, ReferencePoolService};
pub use service::{AsAny, Service, ServiceCtx};
pub use startup::{ConfigPaths, StartupConfig, StartupLoadReport, StartupLoader, StartupSource};
pub use sync::ShutdownToken;
