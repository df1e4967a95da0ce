use std::time::Duration;

pub const APP_NAME: &str = "ZarinaClient";
pub const APP_VERSION: &str = "V2.0.0";

pub const BASE_DOMAIN: &str = "ev.io";
pub const HOME_URL: &str = "https://ev.io/";
pub const LOGIN_URL: &str = "https://ev.io/user/login";
pub const LOGIN_PATH: &str = "/user/login";

pub const WINDOW_WIDTH: u32 = 1920;
pub const WINDOW_HEIGHT: u32 = 1080;

/// Upper bound on how long startup waits for graphics enumeration before
/// falling back to the most conservative tier.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Directory name (under the OS temp dir) that holds staged extensions.
pub const STAGING_DIR_NAME: &str = "zarina";
/// Directory name of the extension bundle shipped with the application.
pub const EXTENSION_DIR_NAME: &str = "extension";

pub const PRESENCE_CLIENT_ID: &str = "1254292681878929460";
pub const PRESENCE_DETAILS: &str = "Playing ev.io at maximum speed";
pub const PRESENCE_LARGE_IMAGE: &str = "logo";
pub const PRESENCE_SMALL_IMAGE: &str = "ev";
pub const PRESENCE_BUTTON_LABEL: &str = "Download";
pub const PRESENCE_BUTTON_URL: &str =
    "https://github.com/RedHatMining/ZarinaClient";

pub const CLIPBOARD_NOTICE_TITLE: &str = "Join Game";
pub const CLIPBOARD_NOTICE_MESSAGE: &str =
    "Copy a game link (https://ev.io/...) to the clipboard, then try again.";
