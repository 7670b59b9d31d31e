//! `part <channel>...`: leave channels through the network's lobby.

use protocol::SocketClient;
use tracing::info;

use super::{Command, CommandError, channel_name, lobby_id, send_input};
use crate::config::Cli;
use crate::session::Network;

pub const NAME: &str = "part";

pub struct Part {
    channels: Vec<String>,
}

/// # Errors
///
/// Returns [`CommandError::Usage`] without channel arguments.
pub fn build(args: &[String], _cli: &Cli) -> Result<Box<dyn Command>, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Usage("part <channel>..."));
    }
    Ok(Box::new(Part { channels: args.iter().map(|name| channel_name(name)).collect() }))
}

#[async_trait::async_trait]
impl Command for Part {
    async fn run(&self, socket: &SocketClient, network: &Network) -> Result<(), CommandError> {
        let lobby = lobby_id(network)?;
        for channel in &self.channels {
            info!(%channel, network = %network.name, "part: leaving channel");
            send_input(socket, &format!("/part {channel}"), lobby).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "part_test.rs"]
mod tests;
