use url::Url;

use crate::config::{BASE_DOMAIN, LOGIN_PATH};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TitleState {
    #[default]
    Idle,
    LoggingIn,
    Playing,
}

impl TitleState {
    /// Categorises a loaded address. Login pages on the game domain win over
    /// the generic "playing" match; everything else is idle.
    pub fn from_address(address: &str) -> Self {
        let Ok(url) = Url::parse(address.trim()) else {
            return Self::Idle;
        };

        let Some(host) = url.host_str() else {
            return Self::Idle;
        };

        if !is_game_host(host) {
            return Self::Idle;
        }

        if is_login_path(url.path()) {
            Self::LoggingIn
        } else {
            Self::Playing
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Idle => "ZarinaClient",
            Self::LoggingIn => "ZarinaClient - Login",
            Self::Playing => "ZarinaClient - Playing",
        }
    }
}

fn is_game_host(host: &str) -> bool {
    let host = host.trim_end_matches('.');
    host.eq_ignore_ascii_case(BASE_DOMAIN)
        || host
            .to_ascii_lowercase()
            .ends_with(&format!(".{}", BASE_DOMAIN))
}

fn is_login_path(path: &str) -> bool {
    path.strip_prefix(LOGIN_PATH)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
