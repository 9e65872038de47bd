//! Browser profile router library.

pub mod config;
pub mod dispatch;
pub mod events;
pub mod launcher;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::RouterConfig;
pub use dispatch::Dispatcher;
pub use lifecycle::Shutdown;
