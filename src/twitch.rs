//! Twitch v5 ("kraken") API client: login → user ID → followed channels.
//!
//! Thin HTTP wrapper. Response parsing lives in pure functions.

use std::time::Duration;

use tracing::debug;

pub const ACCEPT_V5: &str = "application/vnd.twitchtv.v5+json";
/// Page size of the follow list; only the first page is read.
pub const FOLLOWS_LIMIT: u32 = 100;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum TwitchError {
    #[error("failed to build HTTP client: {0}")]
    HttpClientBuild(String),
    #[error("twitch request failed: {0}")]
    Request(String),
    #[error("twitch returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unable to read twitch response: {0}")]
    Parse(String),
    #[error("received invalid number of user IDs: {0}")]
    UserCount(usize),
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct TwitchClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
}

impl TwitchClient {
    /// # Errors
    ///
    /// Returns [`TwitchError::HttpClientBuild`] when the TLS backend fails to
    /// initialize.
    pub fn new(base_url: &str, client_id: &str) -> Result<Self, TwitchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| TwitchError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned(), client_id: client_id.to_owned() })
    }

    /// Resolve a login name to its numeric user ID.
    ///
    /// # Errors
    ///
    /// Fails on transport or status errors, and with
    /// [`TwitchError::UserCount`] unless exactly one user matches.
    pub async fn user_id(&self, login: &str) -> Result<String, TwitchError> {
        let url = format!("{}/users", self.base_url);
        let body = self.get(&url, &[("login", login)]).await?;
        parse_user_id(&body)
    }

    /// Channel names followed by `user_id`.
    ///
    /// # Errors
    ///
    /// Fails on transport, status or parse errors.
    pub async fn followed_channels(&self, user_id: &str) -> Result<Vec<String>, TwitchError> {
        let url = format!("{}/users/{user_id}/follows/channels", self.base_url);
        let limit = FOLLOWS_LIMIT.to_string();
        let body = self.get(&url, &[("limit", limit.as_str())]).await?;
        parse_followed_channels(&body)
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<String, TwitchError> {
        debug!(%url, "twitch: request");
        let response = self
            .http
            .get(url)
            .query(query)
            .header(reqwest::header::ACCEPT, ACCEPT_V5)
            .header("Client-ID", &self.client_id)
            .send()
            .await
            .map_err(|e| TwitchError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TwitchError::Request(e.to_string()))?;

        if status != 200 {
            return Err(TwitchError::Status { status, body: text });
        }
        Ok(text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Deserialize)]
struct UsersResponse {
    users: Vec<User>,
}

#[derive(serde::Deserialize)]
struct User {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(serde::Deserialize)]
struct FollowsResponse {
    #[serde(default)]
    follows: Vec<Follow>,
}

#[derive(serde::Deserialize)]
struct Follow {
    channel: FollowedChannel,
}

#[derive(serde::Deserialize)]
struct FollowedChannel {
    name: String,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_user_id(json: &str) -> Result<String, TwitchError> {
    let response: UsersResponse = serde_json::from_str(json).map_err(|e| TwitchError::Parse(e.to_string()))?;
    match <[User; 1]>::try_from(response.users) {
        Ok([user]) => Ok(user.id),
        Err(users) => Err(TwitchError::UserCount(users.len())),
    }
}

fn parse_followed_channels(json: &str) -> Result<Vec<String>, TwitchError> {
    let response: FollowsResponse = serde_json::from_str(json).map_err(|e| TwitchError::Parse(e.to_string()))?;
    Ok(response.follows.into_iter().map(|follow| follow.channel.name).collect())
}

#[cfg(test)]
#[path = "twitch_test.rs"]
mod tests;
