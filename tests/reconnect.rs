//! Connection loss and recovery.

mod common;

use common::{MockServer, options_for, wait_for};
use slircbot::network::{Connection, ConnectionEvent};
use slircbot::{Client, ClientEvent};
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn dropped_server_triggers_one_reconnect_and_reregistration() -> anyhow::Result<()> {
    let server = MockServer::bind().await?;
    let mut options = options_for("test", server.port());
    options.connection.auto_reconnect = true;
    options.connection.reconnect_delay_secs = 1;
    let (client, mut events) = Client::new(options);

    client.connect().await;
    let mut conn = server.accept().await?;
    conn.read_registration().await?;

    drop(conn);
    wait_for(&mut events, |e| matches!(e, ClientEvent::Closed)).await?;
    let event = wait_for(&mut events, |e| matches!(e, ClientEvent::Reconnecting(_))).await?;
    assert!(matches!(event, ClientEvent::Reconnecting(d) if d == Duration::from_secs(1)));

    let mut conn = server.accept().await?;
    let lines = conn.read_registration().await?;
    assert_eq!(lines[0], "CAP LS 302");
    wait_for(&mut events, |e| matches!(e, ClientEvent::Registered)).await?;

    client.disconnect();
    Ok(())
}

#[tokio::test]
async fn close_burst_schedules_a_single_timer() -> anyhow::Result<()> {
    let server = MockServer::bind().await?;
    let mut config = options_for("test", server.port()).connection;
    config.auto_reconnect = true;
    config.reconnect_delay_secs = 2;
    let (connection, mut events) = Connection::new("test", config);

    connection.connect().await;
    let conn = server.accept().await?;
    drop(conn);

    // Wait for the close, then pile on more close reports.
    loop {
        let event = timeout(Duration::from_secs(5), events.recv()).await?;
        if matches!(event, Some(ConnectionEvent::Closed)) {
            break;
        }
    }
    assert!(!connection.schedule_reconnect());
    assert!(!connection.schedule_reconnect());

    let mut reconnecting = 0;
    while let Ok(Some(event)) = timeout(Duration::from_millis(500), events.recv()).await {
        if matches!(event, ConnectionEvent::Reconnecting(_)) {
            reconnecting += 1;
        }
    }
    assert_eq!(reconnecting, 1);

    connection.disconnect();
    Ok(())
}

#[tokio::test]
async fn disconnect_cancels_pending_reconnect() -> anyhow::Result<()> {
    let server = MockServer::bind().await?;
    let mut options = options_for("test", server.port());
    options.connection.auto_reconnect = true;
    options.connection.reconnect_delay_secs = 1;
    let (client, mut events) = Client::new(options);

    client.connect().await;
    let conn = server.accept().await?;
    drop(conn);
    wait_for(&mut events, |e| matches!(e, ClientEvent::Reconnecting(_))).await?;

    client.disconnect();
    wait_for(&mut events, |e| matches!(e, ClientEvent::Disconnected)).await?;

    // Nothing comes back after the delay would have fired.
    assert!(server.accept_within(Duration::from_millis(1500)).await.is_none());
    Ok(())
}
