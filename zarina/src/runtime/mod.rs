pub mod app;
pub mod bootstrap;
pub mod events;
pub mod host;
#[cfg(feature = "native")]
pub mod native;

pub use app::Shell;
pub use bootstrap::{Bootstrap, BootstrapOptions, BootstrapState, Launched};
pub use events::{AppEvent, Lifecycle};
