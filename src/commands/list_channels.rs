//! `list-channels`: print every non-lobby channel of the network, sorted.

use std::io::Write;

use protocol::SocketClient;

use super::{Command, CommandError};
use crate::config::Cli;
use crate::session::{ChannelKind, Network};

pub const NAME: &str = "list-channels";

pub struct ListChannels;

pub fn build(_args: &[String], _cli: &Cli) -> Result<Box<dyn Command>, CommandError> {
    Ok(Box::new(ListChannels))
}

/// Names of every channel, query and special buffer except the lobby.
#[must_use]
pub fn channel_names(network: &Network) -> Vec<&str> {
    let mut names: Vec<&str> = network
        .channels
        .iter()
        .filter(|channel| channel.kind != ChannelKind::Lobby)
        .map(|channel| channel.name.as_str())
        .collect();
    names.sort_unstable();
    names
}

#[async_trait::async_trait]
impl Command for ListChannels {
    async fn run(&self, _socket: &SocketClient, network: &Network) -> Result<(), CommandError> {
        let mut stdout = std::io::stdout().lock();
        for name in channel_names(network) {
            if writeln!(stdout, "{name}").is_err() {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "list_channels_test.rs"]
mod tests;
