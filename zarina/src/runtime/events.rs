use crate::window::MenuCommand;

/// Host-level occurrences the shell reacts to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AppEvent {
    HostReady,
    PageLoaded(String),
    Menu(MenuCommand),
    CloseRequested,
    Reactivated,
    AllWindowsClosed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Lifecycle {
    Continue,
    Exit,
}
