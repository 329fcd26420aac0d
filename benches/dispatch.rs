//! Routing and access-control overhead, without a network.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use slircbot::config::{AclLists, ClientOptions};
use slircbot::dispatch::{Registry, acl, command_fn, filter_fn, regex_fn};
use slircbot::proto::Message;
use slircbot::{ChatMessage, Client, Dispatcher};
use std::sync::Arc;

fn registry() -> Arc<Registry> {
    let registry = Registry::new();
    for name in ["echo", "help", "weather", "weekly", "wolfram", "tell", "seen", "stock"] {
        registry
            .register_command(name, Vec::<String>::new(), command_fn(|_, _, _| async { Ok(()) }))
            .unwrap();
    }
    registry
        .register_regex_handler("url", r"https?://\S+", regex_fn(|_, _, _| async { Ok(()) }))
        .unwrap();
    registry
        .register_filter("pass", filter_fn(|m, _| Some(m)))
        .unwrap();
    Arc::new(registry)
}

fn chat(line: &str) -> ChatMessage {
    ChatMessage::from_message(&Message::parse(line).unwrap()).unwrap()
}

fn benchmark_routing(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let _guard = rt.enter();
    let dispatcher = Dispatcher::new(registry());
    let (client, _events) = Client::new(ClientOptions::new("bench", "127.0.0.1", 1, "bot"));

    let mut group = c.benchmark_group("route");
    group.throughput(Throughput::Elements(1));

    for (name, line) in [
        ("exact_command", ":a!b@c PRIVMSG #chan :!echo hello"),
        ("prefix_command", ":a!b@c PRIVMSG #chan :!wol 2+2"),
        ("ambiguous", ":a!b@c PRIVMSG #chan :!we oslo"),
        ("regex", ":a!b@c PRIVMSG #chan :see https://example.com"),
        ("no_match", ":a!b@c PRIVMSG #chan :just chatting"),
    ] {
        let msg = chat(line);
        group.bench_function(name, |b| {
            b.iter(|| black_box(dispatcher.dispatch_message(&client, msg.clone())))
        });
    }

    group.finish();
}

fn benchmark_acl(c: &mut Criterion) {
    let mut options = ClientOptions::new("bench", "127.0.0.1", 1, "bot");
    options.plugins = Some(AclLists::deny(["spamwords", "tell", "seen"]));
    options.channels.push("#rust".into());

    c.bench_function("acl/global_deny", |b| {
        b.iter(|| black_box(acl::is_allowed(&options, black_box("echo"), Some("#rust"))))
    });
}

criterion_group!(benches, benchmark_routing, benchmark_acl);
criterion_main!(benches);
