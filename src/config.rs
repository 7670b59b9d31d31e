//! Command-line flags, every one of them readable from the environment.

use clap::{Parser, ValueEnum};
use tracing::Level;

pub const DEFAULT_TWITCH_API_URL: &str = "https://api.twitch.tv/kraken";

#[derive(Parser, Debug, Clone)]
#[command(name = "lounge-ctl", version, about = "Control a TheLounge account from the command line")]
pub struct Cli {
    /// Log level (debug, info, warn, error, fatal)
    #[arg(long, env = "LOG_LEVEL", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Name or UUID of the network to act on
    #[arg(long, short = 'n', env = "NETWORK")]
    pub network: Option<String>,

    /// Password for the given username
    #[arg(long, short = 'p', env = "PASSWORD", hide_env_values = true)]
    pub password: String,

    /// URL to the websocket, e.g. `wss://example.com/socket.io/`
    #[arg(long, env = "SOCKET_URL")]
    pub socket_url: String,

    /// Username to log into the socket
    #[arg(long, short = 'u', env = "USERNAME")]
    pub username: String,

    /// Client ID sent to the Twitch API (sync-twitch-follows only)
    #[arg(long, env = "TWITCH_CLIENT_ID", hide_env_values = true)]
    pub twitch_client_id: Option<String>,

    #[arg(long, env = "TWITCH_API_URL", default_value = DEFAULT_TWITCH_API_URL)]
    pub twitch_api_url: String,

    /// Command to execute once the session is initialized
    #[arg(value_name = "COMMAND")]
    pub command: Option<String>,

    /// Arguments for the command
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    /// `fatal` has no tracing counterpart and maps to `ERROR`.
    #[must_use]
    pub fn as_tracing(self) -> Level {
        match self {
            Self::Debug => Level::DEBUG,
            Self::Info => Level::INFO,
            Self::Warn => Level::WARN,
            Self::Error | Self::Fatal => Level::ERROR,
        }
    }
}

/// Install the stderr `fmt` subscriber. Stdout is reserved for command output.
pub fn init_tracing(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_max_level(level.as_tracing())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
