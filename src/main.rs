mod commands;
mod config;
mod handler;
mod session;
mod twitch;

use std::sync::Arc;

use clap::Parser;
use protocol::{SocketClient, SocketConfig};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::commands::{CommandError, CommandTable};
use crate::config::Cli;
use crate::handler::{Credentials, LoungeHandler};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("unable to connect to server: {0}")]
    Connect(#[source] protocol::Error),
    #[error("error in command or socket: {0}")]
    Session(#[source] protocol::Error),
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    config::init_tracing(cli.log_level);

    let table = CommandTable::builtin()?;
    let command = table.build(cli.command.as_deref(), &cli.args, &cli)?;

    let done = Arc::new(Notify::new());
    let credentials = Credentials { user: cli.username.clone(), password: cli.password.clone() };
    let handler = LoungeHandler::new(credentials, cli.network.clone(), command, Arc::clone(&done));

    let socket = SocketClient::connect(&SocketConfig { url: cli.socket_url.clone() }, Arc::new(handler))
        .await
        .map_err(CliError::Connect)?;
    let errors = socket.errors();

    let outcome = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
            Ok(())
        }
        () = done.notified() => {
            debug!("command finished");
            Ok(())
        }
        Some(e) = errors.recv() => {
            error!(error = %e, "error in command or socket");
            Err(CliError::Session(e))
        }
    };

    if let Err(e) = socket.close().await {
        warn!(error = %e, "socket close failed");
    }
    outcome
}
