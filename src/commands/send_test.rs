use std::time::Duration;

use super::*;
use crate::commands::test_helpers::{args, cli, input_frame, next_text, socket_pair, texts_within};
use crate::session::test_helpers::network;

#[test]
fn build_requires_exactly_two_arguments() {
    for bad in [&[][..], &["#rust"][..], &["#rust", "hello", "extra"][..]] {
        assert!(matches!(build(&args(bad), &cli()), Err(CommandError::Usage(_))));
    }
    assert!(build(&args(&["#rust", "hello"]), &cli()).is_ok());
}

#[tokio::test]
async fn run_sends_to_named_channel() {
    let (socket, mut peer) = socket_pair().await;
    let command = build(&args(&["#rust", "hello"]), &cli()).unwrap();

    command.run(&socket, &network("libera")).await.unwrap();

    assert_eq!(next_text(&mut peer).await, r#"42["input",{"text":"hello","target":7}]"#);
}

#[tokio::test]
async fn run_sends_to_lobby_and_queries() {
    let (socket, mut peer) = socket_pair().await;

    build(&args(&["lobby", "/msg NickServ identify"]), &cli())
        .unwrap()
        .run(&socket, &network("libera"))
        .await
        .unwrap();
    build(&args(&["bob", "hi \"bob\""]), &cli()).unwrap().run(&socket, &network("libera")).await.unwrap();

    assert_eq!(next_text(&mut peer).await, input_frame("/msg NickServ identify", 1));
    assert_eq!(next_text(&mut peer).await, r#"42["input",{"text":"hi \"bob\"","target":9}]"#);
}

#[tokio::test]
async fn run_rejects_unknown_target() {
    let (socket, mut peer) = socket_pair().await;
    let command = build(&args(&["#missing", "hello"]), &cli()).unwrap();

    let err = command.run(&socket, &network("libera")).await.unwrap_err();

    assert!(matches!(err, CommandError::ChannelNotFound(name) if name == "#missing"));
    assert!(texts_within(&mut peer, Duration::from_millis(100)).await.is_empty());
}
