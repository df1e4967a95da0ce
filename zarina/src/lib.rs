pub mod config;
pub mod extension;
pub mod framework;
pub mod gpu;
pub mod presence;
pub mod runtime;
pub mod window;
