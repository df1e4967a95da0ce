//! Host capabilities the shell consumes. The native implementations live in
//! `runtime::native`; tests substitute fakes.

use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use crate::gpu::{GpuDevice, RuntimeConfig};

pub trait GpuProbe: Send + Sync + 'static {
    fn enumerate(&self) -> Result<Vec<GpuDevice>, String>;
}

/// The browsing session shared by the embedded page.
pub trait ContentSession: Send + Sync + 'static {
    fn load_extension(&self, path: &Path) -> Result<(), String>;
}

pub trait PresenceStream: Read + Write + Send {}

impl<T: Read + Write + Send> PresenceStream for T {}

pub trait PresenceConnector: Send + Sync + 'static {
    fn connect(&self) -> Result<Box<dyn PresenceStream>, String>;
}

pub trait Clipboard {
    fn read_text(&mut self) -> Result<Option<String>, String>;
}

pub trait Dialogs {
    /// Blocks until the user acknowledges the notice.
    fn show_notice(&self, title: &str, message: &str);
}

/// A live top-level window hosting the embedded page. Dropping it destroys
/// the native window.
pub trait ContentWindow {
    fn load_url(&mut self, url: &str) -> Result<(), String>;
    fn set_title(&mut self, title: &str);
    fn is_fullscreen(&self) -> bool;
    fn set_fullscreen(&mut self, fullscreen: bool);
}

pub trait WindowFactory {
    fn create_window(
        &mut self,
        config: &RuntimeConfig,
    ) -> Result<Box<dyn ContentWindow>, String>;
}

pub struct HostServices {
    pub gpu: Arc<dyn GpuProbe>,
    pub session: Arc<dyn ContentSession>,
    pub presence: Arc<dyn PresenceConnector>,
    pub clipboard: Box<dyn Clipboard>,
    pub dialogs: Box<dyn Dialogs>,
}
