//! Session-event routing: log in, wait for the snapshot, run the command.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use protocol::{Error, EventHandler, Message, MessageKind, SocketClient};
use serde::Serialize;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::commands::{Command, CommandError};
use crate::session::InitSnapshot;

pub const AUTH_START: &str = "auth:start";
pub const AUTH_PERFORM: &str = "auth:perform";
pub const AUTH_SUCCESS: &str = "auth:success";
pub const AUTH_FAILED: &str = "auth:failed";
pub const INIT: &str = "init";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

#[derive(Serialize)]
struct AuthPerform<'a> {
    user: &'a str,
    password: &'a str,
}

pub struct LoungeHandler {
    credentials: Credentials,
    network: Option<String>,
    command: Box<dyn Command>,
    started: AtomicBool,
    done: Arc<Notify>,
}

impl LoungeHandler {
    /// `done` is notified once the command has finished successfully.
    #[must_use]
    pub fn new(credentials: Credentials, network: Option<String>, command: Box<dyn Command>, done: Arc<Notify>) -> Self {
        Self { credentials, network, command, started: AtomicBool::new(false), done }
    }

    async fn authenticate(&self, socket: &SocketClient) -> Result<(), Error> {
        debug!(user = %self.credentials.user, "handler: authenticating");
        let auth = AuthPerform { user: &self.credentials.user, password: &self.credentials.password };
        socket.emit(AUTH_PERFORM, &auth).await
    }

    async fn on_init(&self, socket: &SocketClient, message: &Message) -> Result<(), CommandError> {
        if self.started.swap(true, Ordering::AcqRel) {
            warn!("handler: repeated init ignored");
            return Ok(());
        }

        let snapshot: InitSnapshot = message.data()?;
        let selector = self.network.as_deref().ok_or(CommandError::NoNetwork)?;
        let network = snapshot
            .network(selector)
            .ok_or_else(|| CommandError::NetworkNotFound(selector.to_owned()))?;
        info!(network = %network.name, channels = network.channels.len(), "handler: session initialized");
        debug!(
            uuid = %network.uuid,
            nick = %network.nick,
            connected = network.status.connected,
            secure = network.status.secure,
            server = ?network.server_options.network,
            active = snapshot.active,
            has_token = snapshot.token.is_some(),
            "handler: network state"
        );

        self.command.run(socket, network).await?;
        self.done.notify_one();
        Ok(())
    }
}

#[async_trait::async_trait]
impl EventHandler for LoungeHandler {
    async fn handle(&self, socket: &SocketClient, message: Message) -> Result<(), Error> {
        if message.kind != MessageKind::Event {
            return Ok(());
        }

        let event = match message.event_name() {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "handler: event message had no name");
                return Ok(());
            }
        };

        match event.as_str() {
            AUTH_START => self.authenticate(socket).await,
            AUTH_SUCCESS => {
                info!("handler: logged in successfully");
                Ok(())
            }
            AUTH_FAILED => Err(Error::handler(CommandError::AuthFailed)),
            INIT => self.on_init(socket, &message).await.map_err(Error::handler),
            other => {
                debug!(event = other, "handler: event ignored");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "handler_test.rs"]
mod tests;
