use super::test_helpers::{LIBERA_UUID, TWITCH_UUID, snapshot};
use super::*;

#[test]
fn decodes_init_payload() {
    let snapshot = snapshot();
    assert_eq!(snapshot.active, 7);
    assert_eq!(snapshot.token.as_deref(), Some("t0k3n"));
    assert_eq!(snapshot.networks.len(), 2);

    let libera = &snapshot.networks[0];
    assert_eq!(libera.uuid, Uuid::parse_str(LIBERA_UUID).unwrap());
    assert_eq!(libera.nick, "alice");
    assert_eq!(libera.server_options.network.as_deref(), Some("Libera.Chat"));
    assert!(libera.status.connected);
    assert_eq!(libera.channels[1].name, "#tokio");
    assert_eq!(libera.channels[1].kind, ChannelKind::Channel);
    assert_eq!(libera.channels[2].id, 7);
}

#[test]
fn missing_optional_sections_default() {
    let network: Network = serde_json::from_value(serde_json::json!({
        "uuid": LIBERA_UUID,
        "name": "bare",
        "nick": "n"
    }))
    .unwrap();
    assert!(network.channels.is_empty());
    assert!(!network.status.connected);
    assert!(network.server_options.network.is_none());
}

#[test]
fn unknown_channel_type_decodes_as_other() {
    let channel: Channel = serde_json::from_value(serde_json::json!({
        "name": "weird",
        "type": "something-new",
        "id": 99
    }))
    .unwrap();
    assert_eq!(channel.kind, ChannelKind::Other);
}

#[test]
fn network_lookup_by_name_or_uuid() {
    let snapshot = snapshot();
    assert_eq!(snapshot.network("twitch").unwrap().nick, "streamer");
    assert_eq!(snapshot.network(TWITCH_UUID).unwrap().name, "twitch");
    assert_eq!(snapshot.network(&LIBERA_UUID.to_uppercase()).unwrap().name, "libera");
    assert!(snapshot.network("oftc").is_none());
}

#[test]
fn lobby_and_targets() {
    let snapshot = snapshot();
    let libera = snapshot.network("libera").unwrap();

    assert_eq!(libera.lobby().unwrap().id, 1);
    assert_eq!(libera.find_target(LOBBY_TARGET).unwrap().id, 1);
    assert_eq!(libera.find_target("#rust").unwrap().id, 7);
    assert_eq!(libera.find_target("bob").unwrap().kind, ChannelKind::Query);
    assert!(libera.find_target("#missing").is_none());
}

#[test]
fn joined_channels_skip_lobby_queries_and_specials() {
    let snapshot = snapshot();
    let twitch = snapshot.network("twitch").unwrap();
    let names: Vec<&str> = twitch.joined_channels().map(|channel| channel.name.as_str()).collect();
    assert_eq!(names, vec!["#streamer", "#oldfollow", "#Shroud"]);
}
