use serde::Serialize;

use crate::config::{
    APP_VERSION, PRESENCE_BUTTON_LABEL, PRESENCE_BUTTON_URL, PRESENCE_DETAILS,
    PRESENCE_LARGE_IMAGE, PRESENCE_SMALL_IMAGE,
};

/// Activity shown on the user's profile. Everything except the start
/// timestamp is fixed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ActivityPayload {
    pub details: String,
    pub state: String,
    pub timestamps: Timestamps,
    pub assets: Assets,
    pub buttons: Vec<Button>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Timestamps {
    /// Seconds since the Unix epoch.
    pub start: i64,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Assets {
    pub large_image: String,
    pub small_image: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Button {
    pub label: String,
    pub url: String,
}

impl ActivityPayload {
    pub fn now() -> Self {
        Self::started_at(chrono::Utc::now().timestamp())
    }

    pub fn started_at(start: i64) -> Self {
        Self {
            details: PRESENCE_DETAILS.to_string(),
            state: APP_VERSION.to_string(),
            timestamps: Timestamps { start },
            assets: Assets {
                large_image: PRESENCE_LARGE_IMAGE.to_string(),
                small_image: PRESENCE_SMALL_IMAGE.to_string(),
            },
            buttons: vec![Button {
                label: PRESENCE_BUTTON_LABEL.to_string(),
                url: PRESENCE_BUTTON_URL.to_string(),
            }],
        }
    }
}
