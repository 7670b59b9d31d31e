//! `sync-twitch-follows`: make the joined channels match the Twitch follow list.
//!
//! The network nick must equal the Twitch login. Expected channels are the
//! user's own channel plus every followed channel; anything joined but not
//! expected is left. Twitch rate-limits joins, so actions are spaced out.

use std::time::Duration;

use protocol::SocketClient;
use tracing::{debug, info};

use super::{Command, CommandError, lobby_id, send_input};
use crate::config::Cli;
use crate::session::Network;
use crate::twitch::TwitchClient;

pub const NAME: &str = "sync-twitch-follows";
pub const ACTION_DELAY: Duration = Duration::from_millis(750);

pub struct SyncTwitchFollows {
    twitch: TwitchClient,
    delay: Duration,
}

/// # Errors
///
/// Returns [`CommandError::MissingTwitchClientId`] when no client ID is
/// configured.
pub fn build(_args: &[String], cli: &Cli) -> Result<Box<dyn Command>, CommandError> {
    let client_id = cli
        .twitch_client_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(CommandError::MissingTwitchClientId)?;
    let twitch = TwitchClient::new(&cli.twitch_api_url, client_id)?;
    Ok(Box::new(SyncTwitchFollows { twitch, delay: ACTION_DELAY }))
}

/// Channel actions needed to reach the expected set. Names carry no `#`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub join: Vec<String>,
    pub part: Vec<String>,
    pub retain: Vec<String>,
}

/// Compare `present` against `user` plus `follows`, ignoring ASCII case.
#[must_use]
pub fn plan_sync(user: &str, follows: &[String], present: &[String]) -> SyncPlan {
    let mut expected: Vec<&str> = Vec::with_capacity(follows.len() + 1);
    for name in std::iter::once(user).chain(follows.iter().map(String::as_str)) {
        if !contains(&expected, name) {
            expected.push(name);
        }
    }

    let mut plan = SyncPlan::default();
    for name in &expected {
        if !present.iter().any(|p| p.eq_ignore_ascii_case(name)) {
            plan.join.push((*name).to_owned());
        }
    }
    for name in present {
        if contains(&expected, name) {
            plan.retain.push(name.clone());
        } else {
            plan.part.push(name.clone());
        }
    }
    plan
}

fn contains(names: &[&str], name: &str) -> bool {
    names.iter().any(|n| n.eq_ignore_ascii_case(name))
}

impl SyncTwitchFollows {
    async fn act(&self, socket: &SocketClient, lobby: u64, action: &str, channel: &str) -> Result<(), CommandError> {
        send_input(socket, &format!("/{action} #{channel}"), lobby).await?;
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Command for SyncTwitchFollows {
    async fn run(&self, socket: &SocketClient, network: &Network) -> Result<(), CommandError> {
        let lobby = lobby_id(network)?;
        let user = network.nick.as_str();
        info!(username = %user, "sync-twitch-follows: synchronizing with twitch user");

        let user_id = self.twitch.user_id(user).await?;
        let follows = self.twitch.followed_channels(&user_id).await?;
        debug!(%user_id, follows = follows.len(), "sync-twitch-follows: follow list fetched");

        let present: Vec<String> = network
            .joined_channels()
            .map(|channel| channel.name.strip_prefix('#').unwrap_or(&channel.name).to_owned())
            .collect();
        let plan = plan_sync(user, &follows, &present);

        for channel in &plan.retain {
            debug!(%channel, "sync-twitch-follows: retaining channel");
        }
        for channel in &plan.join {
            info!(%channel, "sync-twitch-follows: joining new channel");
            self.act(socket, lobby, "join", channel).await?;
        }
        for channel in &plan.part {
            info!(%channel, "sync-twitch-follows: leaving channel");
            self.act(socket, lobby, "part", channel).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "sync_twitch_follows_test.rs"]
mod tests;
