#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MenuCommand {
    ToggleFullscreen,
    Home,
    Login,
    JoinGame,
}

impl MenuCommand {
    pub const ALL: [MenuCommand; 4] = [
        MenuCommand::ToggleFullscreen,
        MenuCommand::Home,
        MenuCommand::Login,
        MenuCommand::JoinGame,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::ToggleFullscreen => "toggle-fullscreen",
            Self::Home => "home",
            Self::Login => "login",
            Self::JoinGame => "join-game",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ToggleFullscreen => "Toggle Fullscreen",
            Self::Home => "Hub",
            Self::Login => "Login",
            Self::JoinGame => "Join Game",
        }
    }

    pub fn accelerator(self) -> &'static str {
        match self {
            Self::ToggleFullscreen => "F11",
            Self::Home => "CmdOrCtrl+H",
            Self::Login => "CmdOrCtrl+L",
            Self::JoinGame => "CmdOrCtrl+J",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.id() == id)
    }
}

#[cfg(feature = "native")]
pub fn build_menu() -> Result<muda::Menu, String> {
    use muda::accelerator::Accelerator;
    use muda::{Menu, MenuItem, Submenu};

    let menu = Menu::new();
    let client = Submenu::new("Client", true);

    for command in MenuCommand::ALL {
        let accelerator = command
            .accelerator()
            .parse::<Accelerator>()
            .map_err(|err| {
                log::warn!(
                    "Ignoring accelerator '{}': {}",
                    command.accelerator(),
                    err
                );
            })
            .ok();

        let item =
            MenuItem::with_id(command.id(), command.label(), true, accelerator);
        client.append(&item).map_err(|err| err.to_string())?;
    }

    menu.append(&client).map_err(|err| err.to_string())?;

    Ok(menu)
}
