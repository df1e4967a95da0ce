pub mod activity;
pub mod ipc;

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error, warn};

pub use activity::ActivityPayload;
pub use ipc::{DiscordIpcConnector, PresenceSession};

use crate::config::PRESENCE_CLIENT_ID;
use crate::runtime::host::PresenceConnector;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PresenceCredentials {
    pub client_id: String,
}

impl Default for PresenceCredentials {
    fn default() -> Self {
        Self {
            client_id: PRESENCE_CLIENT_ID.to_string(),
        }
    }
}

/// Fire-and-forget presence: one background connection at a time, which
/// publishes the activity each time the service reports ready.
pub struct PresencePublisher {
    credentials: PresenceCredentials,
    connector: Arc<dyn PresenceConnector>,
    worker: Option<JoinHandle<()>>,
}

impl PresencePublisher {
    pub fn start(
        credentials: PresenceCredentials,
        connector: Arc<dyn PresenceConnector>,
    ) -> Self {
        let mut publisher = Self {
            credentials,
            connector,
            worker: None,
        };
        publisher.spawn();
        publisher
    }

    pub fn is_connected(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    /// Opens a new connection if the previous one has ended.
    pub fn reconnect(&mut self) {
        if self.is_connected() {
            debug!("Presence connection still active; not reconnecting");
            return;
        }
        self.spawn();
    }

    /// Blocks until the current connection ends.
    pub fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Presence thread panicked");
            }
        }
    }

    fn spawn(&mut self) {
        let client_id = self.credentials.client_id.clone();
        let connector = self.connector.clone();

        let spawned = thread::Builder::new()
            .name("presence".to_string())
            .spawn(move || run_connection(&client_id, connector.as_ref()));

        match spawned {
            Ok(worker) => self.worker = Some(worker),
            Err(err) => error!("Failed to spawn presence thread: {}", err),
        }
    }
}

fn run_connection(client_id: &str, connector: &dyn PresenceConnector) {
    let stream = match connector.connect() {
        Ok(stream) => stream,
        Err(err) => {
            warn!("Rich Presence login failed: {}", err);
            return;
        }
    };

    let mut session = PresenceSession::new(stream);

    let result = session
        .handshake(client_id)
        .and_then(|_| session.serve(ActivityPayload::now));

    if let Err(err) = result {
        warn!("Rich Presence connection failed: {}", err);
    }
}
