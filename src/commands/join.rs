//! `join <channel>...`: join channels through the network's lobby.

use protocol::SocketClient;
use tracing::info;

use super::{Command, CommandError, channel_name, lobby_id, send_input};
use crate::config::Cli;
use crate::session::Network;

pub const NAME: &str = "join";

pub struct Join {
    channels: Vec<String>,
}

/// # Errors
///
/// Returns [`CommandError::Usage`] without channel arguments.
pub fn build(args: &[String], _cli: &Cli) -> Result<Box<dyn Command>, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Usage("join <channel>..."));
    }
    Ok(Box::new(Join { channels: args.iter().map(|name| channel_name(name)).collect() }))
}

#[async_trait::async_trait]
impl Command for Join {
    async fn run(&self, socket: &SocketClient, network: &Network) -> Result<(), CommandError> {
        let lobby = lobby_id(network)?;
        for channel in &self.channels {
            info!(%channel, network = %network.name, "join: joining channel");
            send_input(socket, &format!("/join {channel}"), lobby).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "join_test.rs"]
mod tests;
