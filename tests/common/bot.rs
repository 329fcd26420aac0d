//! Bot-side helpers.

use slircbot::config::ClientOptions;
use slircbot::{ClientEvent, ManagerEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Options for a client connecting to the mock server on `port`, with no
/// join delay and no auto-reconnect.
pub fn options_for(name: &str, port: u16) -> ClientOptions {
    let mut options = ClientOptions::new(name, "127.0.0.1", port, "slircbot");
    options.join_delay_secs = 0;
    options.connection.auto_reconnect = false;
    options
}

/// Receive client events until one matches, within five seconds.
#[allow(dead_code)]
pub async fn wait_for<F>(
    rx: &mut mpsc::UnboundedReceiver<ClientEvent>,
    mut predicate: F,
) -> anyhow::Result<ClientEvent>
where
    F: FnMut(&ClientEvent) -> bool,
{
    timeout(Duration::from_secs(5), async {
        while let Some(event) = rx.recv().await {
            if predicate(&event) {
                return Ok(event);
            }
        }
        anyhow::bail!("event stream ended")
    })
    .await?
}

/// Receive manager events until one matches, within five seconds.
#[allow(dead_code)]
pub async fn wait_for_tagged<F>(
    rx: &mut mpsc::UnboundedReceiver<ManagerEvent>,
    mut predicate: F,
) -> anyhow::Result<ManagerEvent>
where
    F: FnMut(&ManagerEvent) -> bool,
{
    timeout(Duration::from_secs(5), async {
        while let Some(event) = rx.recv().await {
            if predicate(&event) {
                return Ok(event);
            }
        }
        anyhow::bail!("event stream ended")
    })
    .await?
}
