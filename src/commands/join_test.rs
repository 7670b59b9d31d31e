use std::time::Duration;

use super::*;
use crate::commands::test_helpers::{args, cli, input_frame, next_text, socket_pair, texts_within};
use crate::session::ChannelKind;
use crate::session::test_helpers::network;

#[test]
fn build_requires_channels() {
    assert!(matches!(build(&[], &cli()), Err(CommandError::Usage(_))));
}

#[tokio::test]
async fn run_joins_each_channel_through_lobby() {
    let (socket, mut peer) = socket_pair().await;
    let command = build(&args(&["go", "#tokio"]), &cli()).unwrap();

    command.run(&socket, &network("libera")).await.unwrap();

    assert_eq!(next_text(&mut peer).await, input_frame("/join #go", 1));
    assert_eq!(next_text(&mut peer).await, input_frame("/join #tokio", 1));
}

#[tokio::test]
async fn run_without_lobby_sends_nothing() {
    let (socket, mut peer) = socket_pair().await;
    let mut network = network("libera");
    network.channels.retain(|channel| channel.kind != ChannelKind::Lobby);
    let command = build(&args(&["go"]), &cli()).unwrap();

    let err = command.run(&socket, &network).await.unwrap_err();

    assert!(matches!(err, CommandError::NoLobby(name) if name == "libera"));
    assert!(texts_within(&mut peer, Duration::from_millis(100)).await.is_empty());
}
