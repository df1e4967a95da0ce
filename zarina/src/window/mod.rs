pub mod controller;
pub mod menu;
pub mod title;

pub use controller::{NavigationTarget, WindowController, clipboard_address};
pub use menu::MenuCommand;
pub use title::TitleState;

#[cfg(feature = "native")]
pub use menu::build_menu;
