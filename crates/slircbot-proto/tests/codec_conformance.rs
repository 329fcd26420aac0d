//! Wire-format behavior the client depends on.

use bytes::BytesMut;
use slircbot_proto::{irc_eq, ChannelExt, LineCodec, Message, Prefix};
use tokio_util::codec::{Decoder, Encoder};

#[test]
fn chat_line_from_a_user() {
    let msg = Message::parse(":nick!user@host PRIVMSG #chan :!echo hello").unwrap();
    assert_eq!(msg.prefix, Some(Prefix::new("nick", "user", "host")));
    assert_eq!(msg.command, "PRIVMSG");
    assert_eq!(msg.params, vec!["#chan", "!echo hello"]);
    assert!(msg.param(0).unwrap().is_channel_name());
}

#[test]
fn ping_is_answered_with_matching_pong() {
    let ping = Message::parse("PING :server1").unwrap();
    let pong = Message::pong(ping.params.clone());
    assert_eq!(pong.to_trailing_string(), "PONG :server1");
}

#[test]
fn registration_lines() {
    assert_eq!(Message::pass("hunter2").to_string(), "PASS hunter2");
    assert_eq!(Message::cap("LS", ["302"]).to_string(), "CAP LS 302");
    assert_eq!(Message::change_nick("slircbot").to_string(), "NICK slircbot");
    assert_eq!(
        Message::user("slircbot", "Straylight Bot").to_string(),
        "USER slircbot 0 * :Straylight Bot"
    );
    assert_eq!(
        Message::cap("REQ", ["multi-prefix server-time"]).to_string(),
        "CAP REQ :multi-prefix server-time"
    );
}

#[test]
fn numerics_and_server_prefix() {
    let msg = Message::parse(":irc.example.net 001 slircbot :Welcome to the network").unwrap();
    assert_eq!(msg.command, "001");
    assert_eq!(msg.prefix, Some(Prefix::ServerName("irc.example.net".into())));
    assert_eq!(msg.nick(), Some("irc.example.net"));
}

#[test]
fn multiline_cap_ls() {
    let first = Message::parse(":srv CAP * LS * :multi-prefix sasl=PLAIN").unwrap();
    assert_eq!(first.params, vec!["*", "LS", "*", "multi-prefix sasl=PLAIN"]);
    let last = Message::parse(":srv CAP * LS :server-time").unwrap();
    assert_eq!(last.params, vec!["*", "LS", "server-time"]);
}

#[test]
fn twitch_style_tags() {
    let msg = Message::parse(
        "@badges=broadcaster/1;color=#FF0000;display-name=Dan;emotes= :dan!dan@dan.tmi.twitch.tv PRIVMSG #dan :hey",
    )
    .unwrap();
    assert_eq!(msg.tag_value("display-name"), Some("Dan"));
    assert_eq!(msg.tag_value("emotes"), Some(""));
    assert_eq!(msg.nick(), Some("dan"));
}

#[test]
fn casemapped_comparison() {
    assert!(irc_eq("#Rust[]", "#rust{}"));
    assert!(!irc_eq("#rust", "#rusty"));
}

#[test]
fn stream_of_mixed_terminators_and_garbage() {
    let mut codec = LineCodec::new();
    let mut buf = BytesMut::from(
        ":srv 001 me :hi\r\n\r\nnot a valid line because 12\r\n999x\nPING :a\n:srv PING :b\r\n",
    );
    let mut out = Vec::new();
    while let Some(line) = codec.decode(&mut buf).unwrap() {
        out.extend(Message::parse(&line));
    }
    // "not a valid line because 12" parses: `not` is a letters-only command.
    let commands: Vec<_> = out.iter().map(|m| m.command.as_str()).collect();
    assert_eq!(commands, ["001", "not", "PING", "PING"]);
}

#[test]
fn line_codec_round_trip_through_bytes() {
    let mut codec = LineCodec::new();
    let mut buf = BytesMut::new();
    codec.encode(Message::privmsg("#a", "hello world").to_string(), &mut buf).unwrap();
    codec.encode("PONG :x", &mut buf).unwrap();
    assert_eq!(&buf[..], b"PRIVMSG #a :hello world\r\nPONG :x\r\n");

    assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("PRIVMSG #a :hello world"));
    assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("PONG :x"));
    assert_eq!(codec.decode(&mut buf).unwrap(), None);
}
