use std::path::PathBuf;
use std::time::Duration;

use log::{debug, error, info};

use super::host::{HostServices, WindowFactory};
use crate::config::PROBE_TIMEOUT;
use crate::extension::{self, StagingHandle};
use crate::gpu::{self, RuntimeConfig};
use crate::presence::{PresenceCredentials, PresencePublisher};
use crate::window::WindowController;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BootstrapState {
    NotReady,
    ProbingCapability,
    FlagsApplied,
    /// Extension staging and window creation are both in flight.
    Launching,
    Running,
}

#[derive(Clone, Debug)]
pub struct BootstrapOptions {
    pub probe_timeout: Duration,
    pub bundle_root: PathBuf,
    pub staging_root: PathBuf,
    pub presence: PresenceCredentials,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            probe_timeout: PROBE_TIMEOUT,
            bundle_root: extension::bundled_extension_dir(),
            staging_root: extension::staging_root(),
            presence: PresenceCredentials::default(),
        }
    }
}

/// Everything the sequencer hands off once it reaches `Running`.
pub struct Launched {
    pub config: RuntimeConfig,
    pub window: Option<WindowController>,
    pub staging: StagingHandle,
    pub presence: PresencePublisher,
}

pub struct Bootstrap {
    options: BootstrapOptions,
    state: BootstrapState,
    history: Vec<BootstrapState>,
}

impl Bootstrap {
    pub fn new(options: BootstrapOptions) -> Self {
        Self {
            options,
            state: BootstrapState::NotReady,
            history: vec![BootstrapState::NotReady],
        }
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    pub fn history(&self) -> &[BootstrapState] {
        &self.history
    }

    /// Runs the startup sequence once the host is ready. The flag set is
    /// committed before the window factory is called; staging and presence
    /// are started but not awaited. Only a second invocation fails.
    pub fn run(
        &mut self,
        host: &HostServices,
        factory: &mut dyn WindowFactory,
    ) -> Result<Launched, String> {
        if self.state != BootstrapState::NotReady {
            return Err(format!(
                "bootstrap already ran (state: {:?})",
                self.state
            ));
        }

        self.transition(BootstrapState::ProbingCapability);
        let tier = gpu::detect(host.gpu.clone(), self.options.probe_timeout);

        let config = RuntimeConfig::commit(tier, gpu::flags_for(tier));
        info!(
            "Committed {} runtime flags for {:?} tier",
            config.flags().len(),
            tier
        );
        debug!("Browser args: {}", config.browser_args());
        self.transition(BootstrapState::FlagsApplied);

        self.transition(BootstrapState::Launching);
        let staging = extension::spawn_stage(
            self.options.bundle_root.clone(),
            self.options.staging_root.clone(),
            host.session.clone(),
        );

        let window = match WindowController::create(factory, &config) {
            Ok(window) => Some(window),
            Err(err) => {
                error!("Failed to create main window: {}", err);
                None
            }
        };

        let presence = PresencePublisher::start(
            self.options.presence.clone(),
            host.presence.clone(),
        );

        self.transition(BootstrapState::Running);

        Ok(Launched {
            config,
            window,
            staging,
            presence,
        })
    }

    fn transition(&mut self, next: BootstrapState) {
        info!("Bootstrap {:?} -> {:?}", self.state, next);
        self.state = next;
        self.history.push(next);
    }
}
