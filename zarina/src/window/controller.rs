use log::{error, info, warn};
use url::Url;

use super::menu::MenuCommand;
use super::title::TitleState;
use crate::config::{
    CLIPBOARD_NOTICE_MESSAGE, CLIPBOARD_NOTICE_TITLE, HOME_URL, LOGIN_URL,
};
use crate::gpu::RuntimeConfig;
use crate::runtime::host::{ContentWindow, HostServices, WindowFactory};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NavigationTarget {
    Home,
    Login,
    Clipboard,
}

/// Sole owner of the top-level window. Dropping the controller destroys the
/// window.
pub struct WindowController {
    window: Box<dyn ContentWindow>,
    title_state: TitleState,
}

impl WindowController {
    /// Builds the window against the committed runtime config and starts
    /// loading the home address.
    pub fn create(
        factory: &mut dyn WindowFactory,
        config: &RuntimeConfig,
    ) -> Result<Self, String> {
        let mut window = factory.create_window(config)?;
        window.set_title(TitleState::Idle.title());

        let mut controller = Self {
            window,
            title_state: TitleState::Idle,
        };
        controller.load(HOME_URL);

        Ok(controller)
    }

    pub fn title_state(&self) -> TitleState {
        self.title_state
    }

    pub fn on_load_finished(&mut self, address: &str) {
        let state = TitleState::from_address(address);
        if state != self.title_state {
            info!("Title state {:?} -> {:?}", self.title_state, state);
        }
        self.title_state = state;
        self.window.set_title(state.title());
    }

    pub fn handle_command(
        &mut self,
        command: MenuCommand,
        host: &mut HostServices,
    ) {
        match command {
            MenuCommand::ToggleFullscreen => self.toggle_fullscreen(),
            MenuCommand::Home => self.navigate(NavigationTarget::Home, host),
            MenuCommand::Login => self.navigate(NavigationTarget::Login, host),
            MenuCommand::JoinGame => {
                self.navigate(NavigationTarget::Clipboard, host)
            }
        }
    }

    pub fn navigate(
        &mut self,
        target: NavigationTarget,
        host: &mut HostServices,
    ) {
        match target {
            NavigationTarget::Home => self.load(HOME_URL),
            NavigationTarget::Login => self.load(LOGIN_URL),
            NavigationTarget::Clipboard => {
                let text = host.clipboard.read_text().unwrap_or_else(|err| {
                    warn!("Failed to read clipboard: {}", err);
                    None
                });

                match clipboard_address(text.as_deref()) {
                    Some(address) => self.load(&address),
                    None => host.dialogs.show_notice(
                        CLIPBOARD_NOTICE_TITLE,
                        CLIPBOARD_NOTICE_MESSAGE,
                    ),
                }
            }
        }
    }

    pub fn toggle_fullscreen(&mut self) {
        let fullscreen = !self.window.is_fullscreen();
        self.window.set_fullscreen(fullscreen);
    }

    fn load(&mut self, address: &str) {
        info!("Loading {}", address);
        if let Err(err) = self.window.load_url(address) {
            error!("Failed to load {}: {}", address, err);
        }
    }
}

/// Returns the clipboard text as a navigable address, if it is an absolute
/// http(s) URL.
pub fn clipboard_address(text: Option<&str>) -> Option<String> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }

    let url = Url::parse(text).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Some(url.into()),
        _ => None,
    }
}
