//! `send <target> <message>`: type one line into a channel, query or the lobby.

use protocol::SocketClient;

use super::{Command, CommandError, send_input};
use crate::config::Cli;
use crate::session::Network;

pub const NAME: &str = "send";

pub struct SendMessage {
    target: String,
    text: String,
}

/// # Errors
///
/// Returns [`CommandError::Usage`] unless given exactly two arguments.
pub fn build(args: &[String], _cli: &Cli) -> Result<Box<dyn Command>, CommandError> {
    let [target, text] = args else {
        return Err(CommandError::Usage("send <target> <message>"));
    };
    Ok(Box::new(SendMessage { target: target.clone(), text: text.clone() }))
}

#[async_trait::async_trait]
impl Command for SendMessage {
    async fn run(&self, socket: &SocketClient, network: &Network) -> Result<(), CommandError> {
        let target = network
            .find_target(&self.target)
            .ok_or_else(|| CommandError::ChannelNotFound(self.target.clone()))?;
        send_input(socket, &self.text, target.id).await
    }
}

#[cfg(test)]
#[path = "send_test.rs"]
mod tests;
