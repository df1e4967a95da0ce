use log::{debug, error, info, warn};

use super::bootstrap::{Bootstrap, BootstrapOptions, BootstrapState};
use super::events::{AppEvent, Lifecycle};
use super::host::{HostServices, WindowFactory};
use crate::extension::{StagedExtension, StagingHandle};
use crate::gpu::RuntimeConfig;
use crate::presence::PresencePublisher;
use crate::window::{TitleState, WindowController};

/// Owns the application state and reacts to host events. The native event
/// loop translates platform events into [`AppEvent`]s and feeds them here;
/// tests drive it directly.
pub struct Shell {
    host: HostServices,
    bootstrap: Bootstrap,
    config: Option<RuntimeConfig>,
    window: Option<WindowController>,
    staging: Option<StagingHandle>,
    extension: Option<StagedExtension>,
    presence: Option<PresencePublisher>,
}

impl Shell {
    pub fn new(host: HostServices, options: BootstrapOptions) -> Self {
        Self {
            host,
            bootstrap: Bootstrap::new(options),
            config: None,
            window: None,
            staging: None,
            extension: None,
            presence: None,
        }
    }

    pub fn handle(
        &mut self,
        event: AppEvent,
        factory: &mut dyn WindowFactory,
    ) -> Lifecycle {
        debug!("Handling {:?}", event);
        self.poll_staging();

        match event {
            AppEvent::HostReady => {
                self.launch(factory);
                Lifecycle::Continue
            }
            AppEvent::PageLoaded(address) => {
                if let Some(window) = self.window.as_mut() {
                    window.on_load_finished(&address);
                }
                Lifecycle::Continue
            }
            AppEvent::Menu(command) => {
                match self.window.as_mut() {
                    Some(window) => {
                        window.handle_command(command, &mut self.host)
                    }
                    None => warn!("Ignoring {:?}: no window", command),
                }
                Lifecycle::Continue
            }
            AppEvent::CloseRequested => {
                info!("Main window closed");
                self.window = None;
                Lifecycle::Exit
            }
            AppEvent::Reactivated => {
                self.reactivate(factory);
                Lifecycle::Continue
            }
            AppEvent::AllWindowsClosed => Lifecycle::Exit,
        }
    }

    pub fn state(&self) -> BootstrapState {
        self.bootstrap.state()
    }

    pub fn bootstrap(&self) -> &Bootstrap {
        &self.bootstrap
    }

    pub fn config(&self) -> Option<&RuntimeConfig> {
        self.config.as_ref()
    }

    pub fn has_window(&self) -> bool {
        self.window.is_some()
    }

    pub fn title_state(&self) -> Option<TitleState> {
        self.window.as_ref().map(WindowController::title_state)
    }

    /// Blocks until extension staging completes and returns its outcome.
    pub fn wait_for_staging(&mut self) -> Option<&StagedExtension> {
        if let Some(staging) = self.staging.take() {
            self.extension = staging.finish();
        }
        self.extension.as_ref()
    }

    /// Blocks until the current presence connection ends.
    pub fn wait_for_presence(&mut self) {
        if let Some(presence) = self.presence.as_mut() {
            presence.join();
        }
    }

    fn launch(&mut self, factory: &mut dyn WindowFactory) {
        match self.bootstrap.run(&self.host, factory) {
            Ok(launched) => {
                self.config = Some(launched.config);
                self.window = launched.window;
                self.staging = Some(launched.staging);
                self.presence = Some(launched.presence);
            }
            Err(err) => error!("Bootstrap failed: {}", err),
        }
    }

    fn reactivate(&mut self, factory: &mut dyn WindowFactory) {
        if self.window.is_some() {
            return;
        }

        let Some(config) = self.config.as_ref() else {
            debug!("Reactivated before launch; ignoring");
            return;
        };

        info!("Reactivated with no window; recreating");
        match WindowController::create(factory, config) {
            Ok(window) => self.window = Some(window),
            Err(err) => error!("Failed to recreate main window: {}", err),
        }

        if let Some(presence) = self.presence.as_mut() {
            presence.reconnect();
        }
    }

    fn poll_staging(&mut self) {
        if self
            .staging
            .as_ref()
            .is_some_and(StagingHandle::is_finished)
        {
            self.wait_for_staging();
        }
    }
}
