use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use super::*;
use crate::commands::test_helpers::{cli, input_frame, next_text, socket_pair, texts_within};
use crate::session::test_helpers::network;
use crate::twitch::TwitchError;

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

/// Minimal HTTP/1.1 responder standing in for the Twitch API.
/// Every request head is forwarded on the returned channel.
async fn serve_twitch(users: &'static str, follows: &'static str) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut head = Vec::new();
            let mut buf = [0_u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let Ok(n) = stream.read(&mut buf).await else { break };
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let head = String::from_utf8_lossy(&head).into_owned();
            let path = head.split_whitespace().nth(1).unwrap_or_default().to_owned();
            let _ = tx.send(head);

            let (status, body) = if path.starts_with("/users/") && path.contains("/follows/channels") {
                ("200 OK", follows)
            } else if path.starts_with("/users?") {
                ("200 OK", users)
            } else {
                ("404 Not Found", "{}")
            };
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    (addr, rx)
}

fn command(addr: SocketAddr) -> SyncTwitchFollows {
    SyncTwitchFollows {
        twitch: TwitchClient::new(&format!("http://{addr}"), "client-id").unwrap(),
        delay: Duration::ZERO,
    }
}

// =============================================================================
// PLANNING
// =============================================================================

#[test]
fn plan_joins_missing_and_parts_unexpected() {
    let plan = plan_sync("streamer", &names(&["shroud", "lirik"]), &names(&["streamer", "oldfollow", "shroud"]));
    assert_eq!(plan.join, names(&["lirik"]));
    assert_eq!(plan.part, names(&["oldfollow"]));
    assert_eq!(plan.retain, names(&["streamer", "shroud"]));
}

#[test]
fn plan_always_expects_own_channel() {
    let plan = plan_sync("streamer", &[], &[]);
    assert_eq!(plan.join, names(&["streamer"]));
    assert!(plan.part.is_empty());
}

#[test]
fn plan_ignores_case() {
    let plan = plan_sync("Streamer", &names(&["shroud"]), &names(&["streamer", "Shroud"]));
    assert_eq!(plan, SyncPlan { join: vec![], part: vec![], retain: names(&["streamer", "Shroud"]) });
}

#[test]
fn plan_deduplicates_follows() {
    let plan = plan_sync("me", &names(&["me", "a", "A"]), &[]);
    assert_eq!(plan.join, names(&["me", "a"]));
}

// =============================================================================
// BUILD
// =============================================================================

#[test]
fn build_requires_client_id() {
    let mut cli = cli();
    cli.twitch_client_id = None;
    assert!(matches!(build(&[], &cli), Err(CommandError::MissingTwitchClientId)));

    cli.twitch_client_id = Some(String::new());
    assert!(matches!(build(&[], &cli), Err(CommandError::MissingTwitchClientId)));

    cli.twitch_client_id = Some("abc".to_owned());
    assert!(build(&[], &cli).is_ok());
}

// =============================================================================
// RUN
// =============================================================================

#[tokio::test]
async fn run_syncs_channels_through_lobby() {
    let (addr, mut requests) = serve_twitch(
        r#"{"_total":1,"users":[{"_id":"123","name":"streamer"}]}"#,
        r#"{"_total":2,"follows":[{"channel":{"name":"shroud"}},{"channel":{"name":"lirik"}}]}"#,
    )
    .await;
    let (socket, mut peer) = socket_pair().await;

    command(addr).run(&socket, &network("twitch")).await.unwrap();

    assert_eq!(next_text(&mut peer).await, input_frame("/join #lirik", 20));
    assert_eq!(next_text(&mut peer).await, input_frame("/part #oldfollow", 20));
    assert!(texts_within(&mut peer, Duration::from_millis(100)).await.is_empty());

    let users_request = requests.recv().await.unwrap().to_ascii_lowercase();
    assert!(users_request.starts_with("get /users?login=streamer "), "{users_request}");
    assert!(users_request.contains("client-id: client-id"));
    assert!(users_request.contains("accept: application/vnd.twitchtv.v5+json"));

    let follows_request = requests.recv().await.unwrap();
    assert!(follows_request.starts_with("GET /users/123/follows/channels?limit=100 "), "{follows_request}");
}

#[tokio::test]
async fn run_fails_without_unique_user() {
    let (addr, _requests) = serve_twitch(r#"{"_total":0,"users":[]}"#, r#"{"follows":[]}"#).await;
    let (socket, mut peer) = socket_pair().await;

    let err = command(addr).run(&socket, &network("twitch")).await.unwrap_err();

    assert!(matches!(err, CommandError::Twitch(TwitchError::UserCount(0))));
    assert!(texts_within(&mut peer, Duration::from_millis(100)).await.is_empty());
}
