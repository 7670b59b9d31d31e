//! Typed view of the `init` event: the account's networks and their channels.

use serde::Deserialize;
use uuid::Uuid;

/// Channel name that selects a network's lobby instead of a real channel.
pub const LOBBY_TARGET: &str = "lobby";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitSnapshot {
    /// ID of the channel the web UI last had open.
    #[serde(default)]
    pub active: i64,
    #[serde(default)]
    pub networks: Vec<Network>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub uuid: Uuid,
    pub name: String,
    pub nick: String,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub server_options: ServerOptions,
    #[serde(default)]
    pub status: NetworkStatus,
}

/// ISUPPORT values advertised by the IRC server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerOptions {
    #[serde(rename = "NETWORK", default)]
    pub network: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct NetworkStatus {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    /// Target ID used when sending `input` events.
    pub id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Lobby,
    Channel,
    Query,
    Special,
    #[serde(other)]
    Other,
}

impl InitSnapshot {
    /// Network whose name equals `name_or_uuid` or whose UUID parses from it.
    #[must_use]
    pub fn network(&self, name_or_uuid: &str) -> Option<&Network> {
        let uuid = Uuid::parse_str(name_or_uuid).ok();
        self.networks
            .iter()
            .find(|network| network.name == name_or_uuid || Some(network.uuid) == uuid)
    }
}

impl Network {
    #[must_use]
    pub fn lobby(&self) -> Option<&Channel> {
        self.channels.iter().find(|channel| channel.kind == ChannelKind::Lobby)
    }

    /// Channel named `name`, or the lobby for [`LOBBY_TARGET`].
    #[must_use]
    pub fn find_target(&self, name: &str) -> Option<&Channel> {
        if name == LOBBY_TARGET {
            return self.lobby();
        }
        self.channels.iter().find(|channel| channel.name == name)
    }

    /// Regular channels the network currently sits in.
    pub fn joined_channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter().filter(|channel| channel.kind == ChannelKind::Channel)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;

    pub const LIBERA_UUID: &str = "4b4d1ad6-8a2e-4a44-a1b5-0a3c3b1e9f10";
    pub const TWITCH_UUID: &str = "e0c1f7a2-5d0b-4f55-9a0e-7c9d2b6a4e21";

    /// Raw `init` payload with two networks.
    pub fn init_json() -> serde_json::Value {
        serde_json::json!({
            "active": 7,
            "token": "t0k3n",
            "networks": [
                {
                    "uuid": LIBERA_UUID,
                    "name": "libera",
                    "nick": "alice",
                    "serverOptions": { "CHANTYPES": ["#", "&"], "PREFIX": ["@", "+"], "NETWORK": "Libera.Chat" },
                    "status": { "connected": true, "secure": true },
                    "channels": [
                        { "name": "Libera.Chat", "type": "lobby", "id": 1 },
                        { "name": "#tokio", "type": "channel", "id": 8, "topic": "async", "users": ["alice"] },
                        { "name": "#rust", "type": "channel", "id": 7, "unread": 3, "highlight": 1 },
                        { "name": "bob", "type": "query", "id": 9 }
                    ]
                },
                {
                    "uuid": TWITCH_UUID,
                    "name": "twitch",
                    "nick": "streamer",
                    "channels": [
                        { "name": "Twitch", "type": "lobby", "id": 20 },
                        { "name": "#streamer", "type": "channel", "id": 21 },
                        { "name": "#oldfollow", "type": "channel", "id": 22 },
                        { "name": "#Shroud", "type": "channel", "id": 23 },
                        { "name": "Highlights", "type": "special", "id": 24 }
                    ]
                }
            ]
        })
    }

    pub fn snapshot() -> InitSnapshot {
        serde_json::from_value(init_json()).expect("fixture snapshot")
    }

    pub fn network(name: &str) -> Network {
        snapshot().network(name).cloned().expect("fixture network")
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
