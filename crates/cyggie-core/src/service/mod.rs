pub mod ctx;
pub mod service;

pub use ctx::ServiceCtx;
pub use service::{AsAny, Service};
