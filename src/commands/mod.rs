//! Commands executed once the session snapshot has arrived.
//!
//! DESIGN
//! ======
//! `CommandTable` maps a command name to a factory. `main` builds the table
//! once, turns the positional arguments into a boxed [`Command`] before
//! dialing (so usage errors never open a connection), and hands it to the
//! session handler, which runs it with the resolved network.

pub mod join;
pub mod list_channels;
pub mod part;
pub mod send;
pub mod sync_twitch_follows;

use std::collections::BTreeMap;

use protocol::SocketClient;
use serde::Serialize;

use crate::config::Cli;
use crate::session::Network;
use crate::twitch::TwitchError;

/// Event every command uses to type into a channel or lobby.
pub const INPUT_EVENT: &str = "input";

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("duplicate registration of command {0:?}")]
    Duplicate(String),
    #[error("no command given; available commands: {}", .0.join(", "))]
    Missing(Vec<String>),
    #[error("unknown command {name:?}; available commands: {}", .available.join(", "))]
    Unknown { name: String, available: Vec<String> },
    #[error("no network selected; pass --network")]
    NoNetwork,
    #[error("network {0:?} not found")]
    NetworkNotFound(String),
    #[error("unable to find lobby for network {0:?}")]
    NoLobby(String),
    #[error("unable to find channel {0:?} in network")]
    ChannelNotFound(String),
    #[error("login failed")]
    AuthFailed,
    #[error("missing twitch client id; pass --twitch-client-id or set TWITCH_CLIENT_ID")]
    MissingTwitchClientId,
    #[error(transparent)]
    Twitch(#[from] TwitchError),
    #[error(transparent)]
    Socket(#[from] protocol::Error),
}

/// One command run against the selected network.
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    async fn run(&self, socket: &SocketClient, network: &Network) -> Result<(), CommandError>;
}

pub type CommandFactory = fn(&[String], &Cli) -> Result<Box<dyn Command>, CommandError>;

#[derive(Default)]
pub struct CommandTable {
    factories: BTreeMap<String, CommandFactory>,
}

impl CommandTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with every built-in command.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Duplicate`] if two built-ins share a name.
    pub fn builtin() -> Result<Self, CommandError> {
        let mut table = Self::new();
        table.register(join::NAME, join::build)?;
        table.register(list_channels::NAME, list_channels::build)?;
        table.register(part::NAME, part::build)?;
        table.register(send::NAME, send::build)?;
        table.register(sync_twitch_follows::NAME, sync_twitch_follows::build)?;
        Ok(table)
    }

    /// # Errors
    ///
    /// Returns [`CommandError::Duplicate`] when `name` is already taken.
    pub fn register(&mut self, name: &str, factory: CommandFactory) -> Result<(), CommandError> {
        if self.factories.contains_key(name) {
            return Err(CommandError::Duplicate(name.to_owned()));
        }
        self.factories.insert(name.to_owned(), factory);
        Ok(())
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn available(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Build the command called `name` with its arguments.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Missing`] or [`CommandError::Unknown`] with the
    /// list of available commands, or the factory's usage error.
    pub fn build(&self, name: Option<&str>, args: &[String], cli: &Cli) -> Result<Box<dyn Command>, CommandError> {
        let Some(name) = name else {
            return Err(CommandError::Missing(self.available()));
        };
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| CommandError::Unknown { name: name.to_owned(), available: self.available() })?;
        factory(args, cli)
    }
}

#[derive(Serialize)]
struct Input<'a> {
    text: &'a str,
    target: u64,
}

/// Type `text` into the channel with ID `target`.
///
/// # Errors
///
/// Returns [`CommandError::Socket`] when the event cannot be sent.
pub async fn send_input(socket: &SocketClient, text: &str, target: u64) -> Result<(), CommandError> {
    socket.emit(INPUT_EVENT, &Input { text, target }).await?;
    Ok(())
}

/// Prefix `#` unless the name already carries it.
#[must_use]
pub fn channel_name(name: &str) -> String {
    if name.starts_with('#') { name.to_owned() } else { format!("#{name}") }
}

pub(crate) fn lobby_id(network: &Network) -> Result<u64, CommandError> {
    network
        .lobby()
        .map(|lobby| lobby.id)
        .ok_or_else(|| CommandError::NoLobby(network.name.clone()))
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
